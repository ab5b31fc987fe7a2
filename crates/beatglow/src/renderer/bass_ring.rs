//! Concentric wobbling rings driven by the low half of the spectrum.

use std::f32::consts::TAU;

use beatglow_api::{FrameContext, Visualization};
use nannou::prelude::*;

use super::{bin_at, radial_glow, tint};

const RING_COUNT: usize = 15;
const SEGMENTS: usize = 64;

pub struct BassRing;

/// Radius of ring `i` before the per-angle wobble.
fn ring_radius(i: usize, amplitude: f32, bass: f32, seconds: f32) -> f32 {
    let base = (50.0 + i as f32 * 30.0) * (1.0 + bass * 0.3);
    let pulse = (seconds * 8.0 - i as f32 * 0.5).sin() * amplitude * 20.0 * (1.0 + bass);
    base + pulse + bass * 80.0
}

impl Visualization for BassRing {
    fn name(&self) -> &'static str {
        "Bass Ring"
    }

    fn draw(&mut self, ctx: &FrameContext) {
        let draw = ctx.draw;
        let bass = ctx.metrics.bass;
        let seconds = ctx.seconds();
        let center = ctx.to_world(ctx.center());

        for i in 0..RING_COUNT {
            // Lower half of the spectrum only
            let bin = bin_at(i as f32 / RING_COUNT as f32 * 0.5, ctx.buffer_len());
            let amplitude = ctx.sample(bin) / 255.0;
            let radius = ring_radius(i, amplitude, bass, seconds);
            let thickness = 3.0 + amplitude * 15.0;

            let points: Vec<Vec2> = (0..=SEGMENTS)
                .map(|j| {
                    let angle = j as f32 / SEGMENTS as f32 * TAU;
                    let r = radius + (angle * 8.0 + seconds * 10.0).sin() * amplitude * 15.0;
                    // Symmetric about the x axis, so no y flip is needed
                    center + vec2(angle.cos(), angle.sin()) * r
                })
                .collect();

            let color = ctx.color(i as f32 * 20.0 + amplitude * 100.0, 0.0);
            draw.polyline()
                .weight(thickness)
                .points(points.iter().copied())
                .color(color.to_hsla(0.5 + amplitude * 0.5));

            if amplitude > 0.6 {
                draw.polyline()
                    .weight(thickness * 0.5)
                    .points(points)
                    .color(rgba(1.0, 1.0, 1.0, amplitude - 0.5));
            }
        }

        let core_size = 40.0 + bass * 120.0;
        let palette = ctx.palette;
        radial_glow(draw, center, core_size, tint(palette.secondary, 0.8), 6);
        radial_glow(draw, center, core_size * 0.6, tint(palette.primary, 0.9), 5);
        draw.ellipse().xy(center).radius(core_size * 0.2).color(WHITE);

        if bass > 0.5 {
            draw.ellipse()
                .xy(center)
                .radius(core_size * 1.5)
                .no_fill()
                .stroke_weight(3.0 + bass * 5.0)
                .stroke(rgba(1.0, 1.0, 1.0, bass - 0.3));
        }
    }
}
