//! Mirrored petals in concentric layers around a bright core.

use std::f32::consts::TAU;

use beatglow_api::{FrameContext, Visualization};
use nannou::prelude::*;

use super::{radial_glow, tint};

const SEGMENTS: usize = 10;
const LAYERS: usize = 5;
/// Samples per quadratic curve of a petal edge
const CURVE_STEPS: usize = 12;

pub struct Kaleidoscope;

fn quadratic(a: Vec2, control: Vec2, b: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    a * u * u + control * 2.0 * u * t + b * t * t
}

/// Closed petal outline lying along +x: out to `length` on one curve and back
/// to the origin on its mirror image.
fn petal(length: f32, half_width: f32) -> Vec<Vec2> {
    let bulge = length * half_width.tan();
    let tip = vec2(length, 0.0);
    let mut points = Vec::with_capacity(CURVE_STEPS * 2 + 1);
    for s in 0..=CURVE_STEPS {
        let t = s as f32 / CURVE_STEPS as f32;
        points.push(quadratic(Vec2::ZERO, vec2(length * 0.5, -bulge), tip, t));
    }
    for s in 1..=CURVE_STEPS {
        let t = s as f32 / CURVE_STEPS as f32;
        points.push(quadratic(tip, vec2(length * 0.5, bulge), Vec2::ZERO, t));
    }
    points
}

impl Visualization for Kaleidoscope {
    fn name(&self) -> &'static str {
        "Kaleidoscope"
    }

    fn draw(&mut self, ctx: &FrameContext) {
        let draw = ctx.draw;
        let bass = ctx.metrics.bass;
        let center = ctx.center();
        let len = ctx.buffer_len().max(1);
        let half_width = TAU / SEGMENTS as f32 * 0.4;

        for layer in 0..LAYERS {
            let layer_radius = (50.0 + layer as f32 * 60.0) * (1.0 + bass * 0.4);

            for i in 0..SEGMENTS {
                let angle = i as f32 / SEGMENTS as f32 * TAU + ctx.rotation.y + bass * 0.2;
                let amplitude = ctx.sample((i + layer * SEGMENTS) % len) / 255.0;
                let length = layer_radius * (1.0 + amplitude * 0.3 + bass * 0.2);

                let (sin_a, cos_a) = angle.sin_cos();
                let outline: Vec<Vec2> = petal(length, half_width)
                    .into_iter()
                    .map(|p| {
                        let turned = vec2(p.x * cos_a - p.y * sin_a, p.x * sin_a + p.y * cos_a);
                        ctx.to_world(center + turned)
                    })
                    .collect();

                let hue = (layer * 40 + i * 20) as f32;
                let fill = ctx.color(hue + amplitude * 100.0, 0.0);
                draw.polygon()
                    .points(outline.iter().copied())
                    .color(fill.to_hsla(0.35 + amplitude * 0.3));
                draw.polyline()
                    .weight(1.0)
                    .points(outline)
                    .color(ctx.color(hue, 0.0).to_hsla(1.0));
            }
        }

        let world_center = ctx.to_world(center);
        let core = 80.0 + bass * 60.0 + ctx.metrics.average * 40.0;
        radial_glow(draw, world_center, core, tint(ctx.palette.primary, 1.0), 8);
        radial_glow(draw, world_center, core * 0.3, rgba(1.0, 1.0, 1.0, 1.0), 4);
    }
}
