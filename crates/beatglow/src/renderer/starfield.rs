//! Warp-speed starfield; bass and mids set the speed.

use beatglow_api::{FrameContext, Visualization};
use nannou::prelude::*;
use rand::Rng;

use super::radial_glow;

const NUM_STARS: usize = 300;
/// Depth at which stars respawn
const FAR: f32 = 1000.0;
const FOCAL: f32 = 500.0;
const MAX_TRAIL: f32 = 50.0;

#[derive(Clone, Copy)]
struct Star {
    x: f32,
    y: f32,
    z: f32,
    size: f32,
}

#[derive(Default)]
pub struct Starfield {
    stars: Vec<Star>,
}

impl Starfield {
    fn spawn(&mut self) {
        let mut rng = rand::rng();
        self.stars = (0..NUM_STARS)
            .map(|_| Star {
                x: rng.random_range(-1500.0..1500.0),
                y: rng.random_range(-1500.0..1500.0),
                z: rng.random_range(0.0..FAR),
                size: rng.random_range(1.0..3.0),
            })
            .collect();
    }

    fn speed(ctx: &FrameContext) -> f32 {
        5.0 + ctx.metrics.bass * 20.0 + ctx.metrics.mid * 10.0
    }

    /// Move every star toward the viewer, recycling the ones that pass it.
    fn advance(&mut self, speed: f32, width: f32, height: f32) {
        let mut rng = rand::rng();
        let half_w = width * 1.5;
        let half_h = height * 1.5;
        for star in &mut self.stars {
            star.z -= speed;
            if star.z <= 0.0 {
                star.z = FAR;
                star.x = rng.random_range(-half_w..half_w);
                star.y = rng.random_range(-half_h..half_h);
            }
        }
    }
}

impl Visualization for Starfield {
    fn name(&self) -> &'static str {
        "Starfield"
    }

    fn draw(&mut self, ctx: &FrameContext) {
        if self.stars.len() < NUM_STARS {
            self.spawn();
        }
        let speed = Self::speed(ctx);
        self.advance(speed, ctx.width.max(1.0), ctx.height.max(1.0));

        let draw = ctx.draw;
        let bass = ctx.metrics.bass;
        let center = ctx.center();
        let trail = (speed * 2.0).min(MAX_TRAIL);

        for star in &self.stars {
            let scale = FOCAL / star.z;
            let pos = center + vec2(star.x, star.y) * scale;
            if pos.x < 0.0 || pos.x > ctx.width || pos.y < 0.0 || pos.y > ctx.height {
                continue;
            }

            let prev_scale = FOCAL / (star.z + trail);
            let prev = center + vec2(star.x, star.y) * prev_scale;
            let brightness = ((FAR - star.z) / 500.0).min(1.0);
            let size = star.size * scale * (1.0 + bass);

            draw.line()
                .start(ctx.to_world(prev))
                .end(ctx.to_world(pos))
                .weight(size * 0.5)
                .color(rgba(1.0, 1.0, 1.0, brightness * 0.5));
            draw.ellipse()
                .xy(ctx.to_world(pos))
                .radius(size)
                .color(rgba(1.0, 1.0, 1.0, brightness));
        }

        radial_glow(
            draw,
            ctx.to_world(center),
            100.0 + bass * 100.0,
            rgba(0.545, 0.361, 0.965, 0.3 + bass * 0.3),
            8,
        );
    }

    fn reset(&mut self) {
        self.stars.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::test_support::context;

    #[test]
    fn test_stars_recycle_past_the_viewer() {
        let mut field = Starfield::default();
        field.spawn();
        for _ in 0..500 {
            field.advance(35.0, 800.0, 600.0);
            assert!(field.stars.iter().all(|s| s.z > 0.0 && s.z <= FAR));
        }
    }

    #[test]
    fn test_speed_follows_bass_and_mid() {
        let draw = Draw::new();
        let calm = context(&draw, &[], 0.0, 0.0);
        let loud = context(&draw, &[], 1.0, 0.0);
        assert_eq!(Starfield::speed(&calm), 5.0);
        assert_eq!(Starfield::speed(&loud), 30.0);
    }

    #[test]
    fn test_reset_respawns_on_next_draw() {
        let draw = Draw::new();
        let mut field = Starfield::default();
        field.draw(&context(&draw, &[], 0.5, 0.0));
        assert_eq!(field.stars.len(), NUM_STARS);
        field.reset();
        assert!(field.stars.is_empty());
        field.draw(&context(&draw, &[], 0.5, 16.0));
        assert_eq!(field.stars.len(), NUM_STARS);
    }
}
