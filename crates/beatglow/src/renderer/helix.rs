//! Double helix twisting with the bass, rungs every fifth segment.

use std::f32::consts::{PI, TAU};

use beatglow_api::{FrameContext, Visualization};
use nannou::prelude::*;

use super::bin_at;

const SEGMENTS: usize = 100;
const RUNG_EVERY: usize = 5;

#[derive(Clone, Copy)]
struct StrandPoint {
    screen: Vec2,
    amplitude: f32,
    culled: bool,
}

#[derive(Default)]
pub struct Helix {
    strands: [Vec<StrandPoint>; 2],
}

impl Visualization for Helix {
    fn name(&self) -> &'static str {
        "Helix"
    }

    fn draw(&mut self, ctx: &FrameContext) {
        let draw = ctx.draw;
        let bass = ctx.metrics.bass;
        let length = 400.0 + bass * 100.0;
        let radius = 80.0 + bass * 40.0;

        for strand in &mut self.strands {
            strand.clear();
        }

        for i in 0..SEGMENTS {
            let t = i as f32 / SEGMENTS as f32;
            let amplitude = ctx.sample(bin_at(t, ctx.buffer_len())) / 255.0;

            let y = (t - 0.5) * length;
            let angle = t * 2.0 * TAU + ctx.rotation.y * 2.0 + bass * 0.5;
            let r = radius * (1.0 + amplitude * 0.5 + bass * 0.3);

            for (k, strand) in self.strands.iter_mut().enumerate() {
                let a = angle + k as f32 * PI;
                let projected = ctx.project(vec3(r * a.cos(), y, r * a.sin()));
                strand.push(StrandPoint {
                    screen: projected.screen,
                    amplitude,
                    culled: projected.culled,
                });
            }
        }

        let [first, second] = &self.strands;

        for (a, b) in first.iter().zip(second).step_by(RUNG_EVERY) {
            if a.culled && b.culled {
                continue;
            }
            draw.line()
                .start(ctx.to_world(a.screen))
                .end(ctx.to_world(b.screen))
                .weight(2.0 + a.amplitude * 4.0)
                .color(rgba(0.545, 0.361, 0.965, 0.3 + a.amplitude * 0.7));
        }

        let palette = ctx.palette;
        for (strand, color) in [(first, palette.primary(1.0)), (second, palette.secondary(1.0))] {
            draw.polyline()
                .weight(4.0)
                .points(strand.iter().map(|p| ctx.to_world(p.screen)))
                .color(color);
        }

        for p in first.iter().step_by(RUNG_EVERY).chain(second.iter().step_by(RUNG_EVERY)) {
            if !p.culled {
                draw.ellipse()
                    .xy(ctx.to_world(p.screen))
                    .radius(4.0 + p.amplitude * 8.0)
                    .color(WHITE);
            }
        }
    }
}
