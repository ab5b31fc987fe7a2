//! Five spiral arms winding into a dark eye.

use std::f32::consts::{PI, TAU};

use beatglow_api::{FrameContext, Palette, Visualization};
use nannou::color::{IntoLinSrgba, LinSrgba};
use nannou::prelude::*;

use super::{bin_at, radial_glow};

const SPIRALS: usize = 5;
const STEPS: usize = 120;
/// Vertical half-extent of the palette gradient
const GRADIENT_REACH: f32 = 350.0;

pub struct Vortex;

/// Offset from the center of the point at `t` along one arm.
fn spiral_point(
    t: f32,
    base_angle: f32,
    amplitude: f32,
    bass: f32,
    spin: f32,
    seconds: f32,
) -> Vec2 {
    let radius = t * (350.0 + bass * 100.0) * (1.0 + amplitude * 0.2 + bass * 0.3);
    let angle = base_angle + t * PI * 4.0 + spin * 2.0 + seconds * (1.0 + bass * 2.0);
    let wobble = (t * 20.0 + seconds * 3.0).sin() * amplitude * 15.0 * (1.0 + bass * 2.0);
    let r = radius + wobble;
    vec2(r * angle.cos(), r * angle.sin() * 0.7)
}

/// Palette gradient running top to bottom through the three palette colors.
fn gradient_at(palette: &Palette, dy: f32) -> Rgba {
    let t = ((dy + GRADIENT_REACH) / (GRADIENT_REACH * 2.0)).clamp(0.0, 1.0);
    let (from, to, local) = if t < 0.5 {
        (palette.primary, palette.secondary, t * 2.0)
    } else {
        (palette.secondary, palette.tertiary, (t - 0.5) * 2.0)
    };
    let channel = |i: usize| (from[i] as f32 + (to[i] as f32 - from[i] as f32) * local) / 255.0;
    rgba(channel(0), channel(1), channel(2), 1.0)
}

impl Visualization for Vortex {
    fn name(&self) -> &'static str {
        "Vortex"
    }

    fn draw(&mut self, ctx: &FrameContext) {
        let draw = ctx.draw;
        let bass = ctx.metrics.bass;
        let seconds = ctx.seconds();
        let center = ctx.center();

        for spiral in 0..SPIRALS {
            let base_angle = spiral as f32 / SPIRALS as f32 * TAU;
            let mut arm: Vec<(Vec2, LinSrgba)> = Vec::with_capacity(STEPS);

            for i in 0..STEPS {
                let t = i as f32 / STEPS as f32;
                let amplitude = ctx.sample(bin_at(t, ctx.buffer_len())) / 255.0;
                let offset = spiral_point(t, base_angle, amplitude, bass, ctx.rotation.y, seconds);
                let pos = ctx.to_world(center + offset);
                arm.push((pos, gradient_at(ctx.palette, offset.y).into_lin_srgba()));

                if i % 15 == 0 && amplitude > 0.5 {
                    draw.ellipse().xy(pos).radius(2.0 + amplitude * 3.0).color(WHITE);
                }
            }

            draw.polyline().weight(3.0).points_colored(arm);
        }

        let world_center = ctx.to_world(center);
        let eye = 50.0 + bass * 50.0 + ctx.metrics.average * 30.0;
        radial_glow(
            draw,
            world_center,
            eye,
            rgba(0.545, 0.361, 0.965, 0.5 + bass * 0.3),
            6,
        );
        radial_glow(draw, world_center, eye * 0.5, rgba(0.0, 0.0, 0.0, 1.0), 4);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::test_support::context;
    use crate::renderer::tint;
    use beatglow_api::PALETTES;

    #[test]
    fn test_spiral_starts_at_the_eye_when_silent() {
        let start = spiral_point(0.0, 1.0, 0.0, 0.0, 0.0, 2.0);
        assert!(start.length() < 1e-4);
    }

    #[test]
    fn test_spiral_widens_and_is_squashed() {
        let mut last = 0.0;
        for i in 1..=10 {
            let t = i as f32 / 10.0;
            let p = spiral_point(t, 0.0, 0.0, 0.0, 0.0, 0.0);
            let radius = t * 350.0;
            assert!(p.y.abs() <= radius * 0.7 + 1e-3);
            let span = vec2(p.x, p.y / 0.7).length();
            assert!(span > last);
            last = span;
        }
    }

    #[test]
    fn test_gradient_runs_through_the_palette() {
        let palette = &PALETTES[0];
        assert_eq!(gradient_at(palette, -GRADIENT_REACH), tint(palette.primary, 1.0));
        assert_eq!(gradient_at(palette, 0.0), tint(palette.secondary, 1.0));
        assert_eq!(gradient_at(palette, GRADIENT_REACH * 2.0), tint(palette.tertiary, 1.0));
    }

    #[test]
    fn test_draw_smoke() {
        let draw = Draw::new();
        let spectrum = vec![200u8; 256];
        Vortex.draw(&context(&draw, &spectrum, 0.7, 1200.0));
    }
}
