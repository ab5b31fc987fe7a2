//! Ring of radial bars lying flat in the XZ plane, tilted by the scene
//! rotation.

use std::f32::consts::TAU;

use beatglow_api::{FrameContext, Visualization};
use nannou::color::{IntoLinSrgba, LinSrgba};
use nannou::prelude::*;

use super::bin_at;

const BARS: usize = 64;

struct Bar {
    inner: Vec2,
    outer: Vec2,
    z: f32,
    amplitude: f32,
}

#[derive(Default)]
pub struct Bars {
    bars: Vec<Bar>,
}

impl Visualization for Bars {
    fn name(&self) -> &'static str {
        "Bars"
    }

    fn draw(&mut self, ctx: &FrameContext) {
        let draw = ctx.draw;
        let bass = ctx.metrics.bass;
        let bar_width = 8.0 + bass * 4.0;
        let max_height = ctx.width.min(ctx.height) * 0.35 * (1.0 + bass * 0.3);
        let inner_radius = 80.0 + bass * 30.0;

        self.bars.clear();
        for i in 0..BARS {
            let t = i as f32 / BARS as f32;
            let (sin_a, cos_a) = (t * TAU).sin_cos();
            let amplitude = ctx.sample(bin_at(t, ctx.buffer_len())) / 255.0;
            let outer_radius = inner_radius + amplitude * max_height;

            let r1 = ctx.rotate(vec3(inner_radius * cos_a, 0.0, inner_radius * sin_a));
            let r2 = ctx.rotate(vec3(outer_radius * cos_a, 0.0, outer_radius * sin_a));
            let p1 = ctx.project_rotated(r1);
            let p2 = ctx.project_rotated(r2);
            if p1.culled && p2.culled {
                continue;
            }

            self.bars.push(Bar {
                inner: p1.screen,
                outer: p2.screen,
                z: (r1.z + r2.z) / 2.0,
                amplitude,
            });
        }

        self.bars.sort_by(|a, b| a.z.total_cmp(&b.z));

        for bar in &self.bars {
            let value = bar.amplitude * 255.0;
            let start = ctx.to_world(bar.inner);
            let end = ctx.to_world(bar.outer);
            let points: [(Vec2, LinSrgba); 3] = [
                (start, rgba(0.0, 0.969, 1.0, 0.3).into_lin_srgba()),
                (start.lerp(end, 0.5), ctx.color(value, 0.0).to_hsla(1.0).into_lin_srgba()),
                (end, ctx.color(value, 60.0).to_hsla(1.0).into_lin_srgba()),
            ];
            draw.polyline()
                .weight(bar_width * (0.5 + bar.amplitude * 0.5))
                .caps_round()
                .points_colored(points);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::test_support::context;

    #[test]
    fn test_all_bars_visible_at_rest() {
        let draw = Draw::new();
        let spectrum = vec![0u8; 256];
        let ctx = context(&draw, &spectrum, 0.0, 0.0);
        let mut bars = Bars::default();
        bars.draw(&ctx);
        assert_eq!(bars.bars.len(), BARS);
        assert!(bars.bars.windows(2).all(|w| w[0].z <= w[1].z));
    }

    #[test]
    fn test_loud_bars_reach_further() {
        let draw = Draw::new();
        let quiet = vec![0u8; 256];
        let loud = vec![255u8; 256];

        let mut bars = Bars::default();
        bars.draw(&context(&draw, &quiet, 0.0, 0.0));
        let quiet_len: f32 = bars.bars.iter().map(|b| b.inner.distance(b.outer)).sum();
        bars.draw(&context(&draw, &loud, 0.0, 0.0));
        let loud_len: f32 = bars.bars.iter().map(|b| b.inner.distance(b.outer)).sum();
        assert!(loud_len > quiet_len);
    }
}
