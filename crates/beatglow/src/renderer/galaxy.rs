//! Spiral galaxy: four arms and a disc of stars orbiting a black hole.

use std::f32::consts::{FRAC_PI_2, TAU};

use beatglow_api::{FrameContext, Visualization};
use nannou::prelude::*;
use rand::Rng;

use super::radial_glow;

const NUM_STARS: usize = 250;
const ARMS: usize = 4;

struct Star {
    angle: f32,
    radius: f32,
    z: f32,
    size: f32,
    freq_band: usize,
}

struct Visible {
    screen: Vec2,
    z: f32,
    size: f32,
    amplitude: f32,
}

#[derive(Default)]
pub struct Galaxy {
    stars: Vec<Star>,
    visible: Vec<Visible>,
}

impl Galaxy {
    fn spawn(&mut self, bands: usize) {
        let mut rng = rand::rng();
        let bands = bands.max(1);
        self.stars = (0..NUM_STARS)
            .map(|_| Star {
                angle: rng.random_range(0.0..TAU),
                radius: rng.random_range(20.0..320.0),
                z: rng.random_range(-50.0..50.0),
                size: rng.random_range(0.5..2.5),
                freq_band: rng.random_range(0..bands),
            })
            .collect();
    }

    /// Orbit every star; louder bands and more bass spin faster.
    fn advance(&mut self, ctx: &FrameContext) {
        let bass = ctx.metrics.bass;
        for star in &mut self.stars {
            let amplitude = ctx.sample(star.freq_band) / 255.0;
            star.angle += 0.002 + amplitude * 0.01 + bass * 0.02;
        }
    }

    fn draw_arms(ctx: &FrameContext) {
        let bass = ctx.metrics.bass;
        let reach = 350.0 + bass * 100.0;
        for arm in 0..ARMS {
            let mut points = Vec::new();
            let mut r = 20.0;
            while r < reach {
                let angle = r * 0.03 + arm as f32 * FRAC_PI_2 + ctx.rotation.y + bass * 0.3;
                let projected = ctx.project(vec3(r * angle.cos(), r * angle.sin() * 0.4, 0.0));
                if !projected.culled {
                    points.push(ctx.to_world(projected.screen));
                }
                r += 5.0;
            }
            ctx.draw
                .polyline()
                .weight(20.0)
                .caps_round()
                .points(points)
                .color(rgba(0.545, 0.361, 0.965, 0.3));
        }
    }
}

impl Visualization for Galaxy {
    fn name(&self) -> &'static str {
        "Galaxy"
    }

    fn draw(&mut self, ctx: &FrameContext) {
        if self.stars.len() < NUM_STARS {
            self.spawn(ctx.buffer_len());
        }
        self.advance(ctx);
        Self::draw_arms(ctx);

        self.visible.clear();
        for star in &self.stars {
            let point = vec3(
                star.angle.cos() * star.radius,
                star.angle.sin() * star.radius * 0.4,
                star.z,
            );
            let rotated = ctx.rotate(point);
            let projected = ctx.project_rotated(rotated);
            if projected.culled {
                continue;
            }
            let amplitude = ctx.sample(star.freq_band) / 255.0;
            self.visible.push(Visible {
                screen: projected.screen,
                z: rotated.z,
                size: (star.size + amplitude * 3.0) * projected.scale,
                amplitude,
            });
        }
        self.visible.sort_by(|a, b| a.z.total_cmp(&b.z));

        let draw = ctx.draw;
        for (i, star) in self.visible.iter().enumerate() {
            let pos = ctx.to_world(star.screen);
            let brightness = 0.3 + star.amplitude * 0.7;
            if star.amplitude > 0.5 {
                let halo = ctx.color(star.amplitude * 255.0, i as f32).to_hsla(0.3);
                draw.ellipse().xy(pos).radius(star.size * 3.0).color(halo);
            }
            draw.ellipse()
                .xy(pos)
                .radius(star.size)
                .color(rgba(1.0, 1.0, 1.0, brightness));
        }

        let hole = 60.0 + ctx.metrics.bass * 50.0 + ctx.metrics.average * 30.0;
        let center = ctx.to_world(ctx.center());
        radial_glow(draw, center, hole * 1.6, rgba(0.545, 0.361, 0.965, 0.4), 6);
        draw.ellipse()
            .xy(center)
            .radius(hole * 0.5)
            .color(rgba(0.0, 0.0, 0.0, 1.0));
    }

    fn reset(&mut self) {
        self.stars.clear();
        self.visible.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::test_support::context;

    #[test]
    fn test_spawn_fills_the_disc() {
        let mut galaxy = Galaxy::default();
        galaxy.spawn(64);
        assert_eq!(galaxy.stars.len(), NUM_STARS);
        for star in &galaxy.stars {
            assert!(star.freq_band < 64);
            assert!((20.0..320.0).contains(&star.radius));
            assert!(star.z.abs() <= 50.0);
        }
    }

    #[test]
    fn test_louder_spectrum_orbits_faster() {
        let draw = Draw::new();
        let quiet = vec![0u8; 64];
        let loud = vec![255u8; 64];

        let mut galaxy = Galaxy::default();
        galaxy.spawn(64);
        let before: Vec<f32> = galaxy.stars.iter().map(|s| s.angle).collect();
        galaxy.advance(&context(&draw, &quiet, 0.0, 0.0));
        let slow: Vec<f32> = galaxy.stars.iter().map(|s| s.angle).collect();
        galaxy.advance(&context(&draw, &loud, 0.0, 0.0));

        for ((start, mid), star) in before.iter().zip(&slow).zip(&galaxy.stars) {
            assert!((mid - start - 0.002).abs() < 1e-5);
            assert!(star.angle - mid > mid - start);
        }
    }

    #[test]
    fn test_draw_and_reset() {
        let draw = Draw::new();
        let spectrum = vec![200u8; 128];
        let mut galaxy = Galaxy::default();
        galaxy.draw(&context(&draw, &spectrum, 0.5, 500.0));
        assert_eq!(galaxy.stars.len(), NUM_STARS);
        galaxy.reset();
        assert!(galaxy.stars.is_empty());
    }
}
