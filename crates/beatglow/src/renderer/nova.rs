//! Exploding star: two counter-rotating sets of rays around a hot core.

use std::f32::consts::TAU;

use beatglow_api::{FrameContext, Visualization};
use nannou::color::{IntoLinSrgba, LinSrgba};
use nannou::prelude::*;

use super::{bin_at, radial_glow, tint};

const RAYS: usize = 48;
const INNER_RAYS: usize = 24;

pub struct Nova;

fn ray_length(amplitude: f32, bass: f32) -> f32 {
    79.0 + amplitude * 238.0 + bass * 79.0
}

/// A tapering ray from `from` to `to`, `width` wide at its base.
fn ray(draw: &Draw, from: Vec2, to: Vec2, width: f32, inner: LinSrgba, outer: LinSrgba) {
    let dir = (to - from).normalize_or_zero();
    let side = vec2(-dir.y, dir.x) * width * 0.5;
    let mid = from.lerp(to, 0.5);
    let mut faded = outer;
    faded.alpha = 0.0;
    let points: Vec<(Vec2, LinSrgba)> = vec![
        (from + side, inner),
        (mid + side * 0.5, outer),
        (to, faded),
        (mid - side * 0.5, outer),
        (from - side, inner),
    ];
    draw.polygon().points_colored(points);
}

impl Visualization for Nova {
    fn name(&self) -> &'static str {
        "Nova"
    }

    fn draw(&mut self, ctx: &FrameContext) {
        let draw = ctx.draw;
        let bass = ctx.metrics.bass;
        let seconds = ctx.seconds();
        let center = ctx.to_world(ctx.center());
        let len = ctx.buffer_len();
        let white = rgba(1.0, 1.0, 1.0, 1.0);
        let hot = white.into_lin_srgba();

        let spin = seconds * 4.0;
        for i in 0..RAYS {
            let t = i as f32 / RAYS as f32;
            let amplitude = ctx.sample(bin_at(t, len)) / 255.0;
            let angle = t * TAU + spin;
            let dir = vec2(angle.cos(), angle.sin());
            let end = center + dir * ray_length(amplitude, bass);
            let width = 2.0 + amplitude * 7.9 + bass * 4.0;

            let color = ctx.color(t * 360.0, 0.0).to_hsla(0.8).into_lin_srgba();
            ray(draw, center, end, width, hot, color);

            if amplitude > 0.47 {
                draw.ellipse()
                    .xy(end)
                    .radius(2.0 + amplitude * 4.0)
                    .color(color);
            }
        }

        let counter_spin = -seconds * 5.3;
        for i in 0..INNER_RAYS {
            let t = i as f32 / INNER_RAYS as f32;
            let amplitude = ctx.sample(bin_at(t * 0.5, len)) / 255.0;
            let angle = t * TAU + counter_spin;
            let end = center + vec2(angle.cos(), angle.sin()) * (53.0 + amplitude * 106.0);
            ray(
                draw,
                center,
                end,
                1.5 + amplitude * 3.0,
                hot,
                tint(ctx.palette.secondary, 0.7).into_lin_srgba(),
            );
        }

        let core = 53.0 + bass * 33.0;
        radial_glow(draw, center, core, tint(ctx.palette.secondary, 0.8), 6);
        radial_glow(draw, center, core * 0.6, tint(ctx.palette.primary, 1.0), 5);
        radial_glow(draw, center, core * 0.25, white, 3);
    }
}
