//! Bonfire of rising flame particles; bass feeds it more fuel.

use beatglow_api::{FrameContext, Visualization};
use nannou::prelude::*;
use rand::Rng;

use super::radial_glow;

/// Oldest flames are dropped past this count
const MAX_FLAMES: usize = 300;
const EMBERS: usize = 5;

struct Flame {
    pos: Vec2,
    vel: Vec2,
    size: f32,
    life: f32,
    decay: f32,
}

#[derive(Default)]
pub struct Fire {
    flames: Vec<Flame>,
}

/// Flame color for `heat` in `[0, 1]`: deep red through orange to a
/// yellow-white core.
fn heat_color(heat: f32) -> [f32; 3] {
    let heat = heat.clamp(0.0, 1.0);
    let [r, g, b] = if heat > 0.7 {
        [255.0, 200.0 + heat * 55.0, heat * 100.0]
    } else if heat > 0.4 {
        [255.0, 100.0 + heat * 150.0, 0.0]
    } else {
        [200.0 + heat * 55.0, heat * 100.0, 0.0]
    };
    [r / 255.0, g / 255.0, b / 255.0]
}

impl Fire {
    /// Feed new flames from the base of the fire. Screen space.
    fn spawn(&mut self, ctx: &FrameContext) {
        let mut rng = rand::rng();
        let bass = ctx.metrics.bass;
        let (w, h) = (ctx.width, ctx.height);
        let count = 8 + (bass * 15.0).floor() as usize;
        for _ in 0..count {
            let amplitude = ctx.sample(rng.random_range(0..ctx.buffer_len().max(1))) / 255.0;
            self.flames.push(Flame {
                pos: vec2(w * rng.random_range(0.35..0.65), h - 50.0),
                vel: vec2(
                    rng.random_range(-1.0..1.0),
                    -4.0 - rng.random_range(0.0..4.0) - amplitude * 5.0,
                ),
                size: 15.0 + rng.random_range(0.0..25.0) + amplitude * 20.0,
                life: 1.0,
                decay: rng.random_range(0.015..0.025),
            });
        }
    }

    fn step(&mut self, seconds: f32) {
        for flame in &mut self.flames {
            flame.vel.x += (flame.pos.y * 0.02 + seconds * 3.0).sin() * 0.3;
            flame.vel.x *= 0.95;
            flame.vel.y *= 0.99;
            flame.pos += flame.vel;
            flame.life -= flame.decay;
            flame.size *= 0.98;
        }
        self.flames.retain(|f| f.life > 0.0);
        if self.flames.len() > MAX_FLAMES {
            let excess = self.flames.len() - MAX_FLAMES;
            self.flames.drain(..excess);
        }
    }
}

impl Visualization for Fire {
    fn name(&self) -> &'static str {
        "Fire"
    }

    fn draw(&mut self, ctx: &FrameContext) {
        let draw = ctx.draw;
        draw.rect()
            .w_h(ctx.width, ctx.height)
            .color(rgba(5.0 / 255.0, 2.0 / 255.0, 0.0, 1.0));

        self.spawn(ctx);
        self.step(ctx.seconds());

        for flame in &self.flames {
            let [r, g, b] = heat_color(flame.life);
            radial_glow(
                draw,
                ctx.to_world(flame.pos),
                flame.size,
                rgba(r, g, b, flame.life * 0.8),
                4,
            );
        }

        let bass = ctx.metrics.bass;
        if bass > 0.4 || ctx.metrics.high > 0.5 {
            let mut rng = rand::rng();
            for _ in 0..EMBERS {
                let pos = vec2(
                    ctx.width * rng.random_range(0.3..0.7),
                    ctx.height * rng.random_range(0.2..0.9),
                );
                draw.ellipse()
                    .xy(ctx.to_world(pos))
                    .radius(rng.random_range(1.0..3.0))
                    .color(rgba(1.0, 0.8, 0.4, rng.random_range(0.5..1.0)));
            }
        }

        let base = ctx.to_world(vec2(ctx.width / 2.0, ctx.height));
        radial_glow(draw, base, 200.0 + bass * 100.0, rgba(1.0, 0.39, 0.0, 0.5), 8);
    }

    fn reset(&mut self) {
        self.flames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::test_support::context;

    #[test]
    fn test_heat_color_bands() {
        assert_eq!(heat_color(0.0), [200.0 / 255.0, 0.0, 0.0]);
        assert_eq!(heat_color(0.5), [1.0, 175.0 / 255.0, 0.0]);
        assert_eq!(heat_color(1.0), [1.0, 1.0, 100.0 / 255.0]);
        assert_eq!(heat_color(3.0), heat_color(1.0));
    }

    #[test]
    fn test_bass_feeds_more_flames() {
        let draw = Draw::new();
        let spectrum = vec![100u8; 64];
        let mut quiet = Fire::default();
        quiet.spawn(&context(&draw, &spectrum, 0.0, 0.0));
        let mut loud = Fire::default();
        loud.spawn(&context(&draw, &spectrum, 1.0, 0.0));
        assert_eq!(quiet.flames.len(), 8);
        assert_eq!(loud.flames.len(), 23);
        assert!(loud.flames.iter().all(|f| f.vel.y < 0.0));
    }

    #[test]
    fn test_flames_are_capped_keeping_the_newest() {
        let draw = Draw::new();
        let spectrum = vec![255u8; 64];
        let ctx = context(&draw, &spectrum, 1.0, 0.0);
        let mut fire = Fire::default();
        for _ in 0..30 {
            fire.spawn(&ctx);
            fire.step(0.0);
            assert!(fire.flames.len() <= MAX_FLAMES);
        }
        assert_eq!(fire.flames.len(), MAX_FLAMES);
        // Newest flames have aged a single step
        let newest = fire.flames.last().map(|f| f.life).unwrap_or_default();
        assert!(newest > 0.97);
    }

    #[test]
    fn test_draw_and_reset() {
        let draw = Draw::new();
        let mut fire = Fire::default();
        fire.draw(&context(&draw, &[], 0.8, 100.0));
        assert!(!fire.flames.is_empty());
        fire.reset();
        assert!(fire.flames.is_empty());
    }
}
