//! Expanding rings fired on every beat.

use std::f32::consts::TAU;

use beatglow_api::{AudioMetrics, FrameContext, Visualization};
use nannou::prelude::*;
use rand::Rng;

use super::{bin_at, radial_glow, tint};

/// Minimum spacing between two spawned waves
const SPAWN_COOLDOWN_MS: f64 = 80.0;
const DISTORTION_SEGMENTS: usize = 32;

struct Wave {
    radius: f32,
    max_radius: f32,
    speed: f32,
    alpha: f32,
    /// Degrees
    hue: f32,
    thickness: f32,
}

#[derive(Default)]
pub struct Shockwave {
    waves: Vec<Wave>,
    last_spawn: Option<f64>,
}

impl Shockwave {
    fn spawn(&mut self, metrics: &AudioMetrics, time: f64) {
        if !metrics.is_beat {
            return;
        }
        if self
            .last_spawn
            .is_some_and(|last| time - last <= SPAWN_COOLDOWN_MS)
        {
            return;
        }
        self.last_spawn = Some(time);

        let bass = metrics.bass;
        self.waves.push(Wave {
            radius: 20.0,
            max_radius: 500.0 + bass * 400.0,
            speed: 10.0 + bass * 25.0,
            alpha: 1.0,
            hue: rand::rng().random_range(0.0..360.0),
            thickness: 5.0 + bass * 15.0,
        });
    }

    /// Grow every wave and drop the ones that faded out.
    fn advance(&mut self) {
        for wave in &mut self.waves {
            wave.radius += wave.speed;
            wave.alpha = 1.0 - wave.radius / wave.max_radius;
        }
        self.waves.retain(|w| w.alpha > 0.0);
    }
}

impl Visualization for Shockwave {
    fn name(&self) -> &'static str {
        "Shockwave"
    }

    fn draw(&mut self, ctx: &FrameContext) {
        self.spawn(&ctx.metrics, ctx.time);
        self.advance();

        let draw = ctx.draw;
        let center = ctx.to_world(ctx.center());

        for wave in &self.waves {
            let hue = wave.hue / 360.0;
            draw.ellipse()
                .xy(center)
                .radius(wave.radius)
                .no_fill()
                .stroke_weight(wave.thickness * wave.alpha)
                .stroke(hsla(hue, 1.0, 0.6, wave.alpha));
            draw.ellipse()
                .xy(center)
                .radius(wave.radius * 0.95)
                .no_fill()
                .stroke_weight(wave.thickness * 0.5 * wave.alpha)
                .stroke(hsla((hue + 30.0 / 360.0).fract(), 1.0, 0.8, wave.alpha * 0.5));

            for j in 0..DISTORTION_SEGMENTS {
                let t = j as f32 / DISTORTION_SEGMENTS as f32;
                let amp = ctx.sample(bin_at(t, ctx.buffer_len())) / 255.0;
                let wobble = amp * 30.0;
                let dir = vec2((t * TAU).cos(), (t * TAU).sin());
                draw.line()
                    .start(center + dir * (wave.radius - wobble))
                    .end(center + dir * (wave.radius + wobble))
                    .weight(2.0)
                    .color(hsla(hue, 1.0, 0.7, wave.alpha * amp));
            }
        }

        let pulse = 30.0 + ctx.metrics.bass * 50.0;
        radial_glow(draw, center, pulse, tint(ctx.palette.primary, 1.0), 6);
        radial_glow(draw, center, pulse * 0.4, rgba(1.0, 1.0, 1.0, 1.0), 3);
    }

    fn reset(&mut self) {
        self.waves.clear();
        self.last_spawn = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::test_support::context;

    fn beat(bass: f32) -> AudioMetrics {
        AudioMetrics {
            bass,
            is_beat: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_beats_spawn_waves_with_cooldown() {
        let mut shock = Shockwave::default();
        shock.spawn(&beat(0.8), 1000.0);
        assert_eq!(shock.waves.len(), 1);
        shock.spawn(&beat(0.8), 1050.0);
        assert_eq!(shock.waves.len(), 1);
        shock.spawn(&beat(0.8), 1100.0);
        assert_eq!(shock.waves.len(), 2);
        shock.spawn(&AudioMetrics::default(), 2000.0);
        assert_eq!(shock.waves.len(), 2);
    }

    #[test]
    fn test_waves_fade_out_and_are_dropped() {
        let mut shock = Shockwave::default();
        shock.spawn(&beat(0.0), 0.0);
        // 20 + 10 * 48 = 500: the wave reaches its max radius on step 48
        for _ in 0..47 {
            shock.advance();
        }
        assert_eq!(shock.waves.len(), 1);
        assert!(shock.waves[0].alpha > 0.0 && shock.waves[0].alpha < 0.1);
        shock.advance();
        assert!(shock.waves.is_empty());
    }

    #[test]
    fn test_draw_and_reset() {
        let draw = Draw::new();
        let spectrum = vec![180u8; 256];
        let mut shock = Shockwave::default();
        shock.draw(&context(&draw, &spectrum, 0.9, 0.0));
        assert_eq!(shock.waves.len(), 1);
        shock.reset();
        assert!(shock.waves.is_empty());
        assert!(shock.last_spawn.is_none());
    }
}
