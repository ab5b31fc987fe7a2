//! Flat perspective tunnel of wobbling rings rushing toward the viewer.

use std::f32::consts::TAU;

use beatglow_api::{FrameContext, Visualization};
use nannou::prelude::*;

use super::bin_at;

const RINGS: usize = 15;
const SEGMENTS: usize = 24;
/// Depth period of the ring scroll
const DEPTH: f32 = 600.0;

pub struct Tunnel;

/// Screen-space outline of ring `i` (0 nearest the center), closed.
fn ring_outline(ctx: &FrameContext, i: usize, seconds: f32) -> (Vec<Vec2>, f32, usize) {
    let bass = ctx.metrics.bass;
    let center = ctx.center();
    let t = i as f32 / RINGS as f32;
    let freq_index = bin_at(t, ctx.buffer_len());
    let amplitude = ctx.sample(freq_index) / 255.0;

    let base_radius = t * (400.0 + bass * 150.0) + 20.0;
    let z = i as f32 * 30.0 - (seconds * (100.0 + bass * 200.0)) % DEPTH;
    let perspective = DEPTH / (DEPTH + z).max(1.0);
    let radius = base_radius * perspective * (1.0 + amplitude * 0.3 + bass * 0.3);

    let mut points: Vec<Vec2> = (0..SEGMENTS)
        .map(|j| {
            let angle = j as f32 / SEGMENTS as f32 * TAU;
            let phase = angle * 4.0 + seconds * 2.0 + i as f32 * 0.5;
            let wobble = phase.sin() * amplitude * 20.0 * (1.0 + bass);
            let r = radius + wobble;
            let a = angle + ctx.rotation.y;
            vec2(center.x + r * a.cos(), center.y + r * a.sin() * 0.8)
        })
        .collect();
    if let Some(first) = points.first().copied() {
        points.push(first);
    }
    (points, amplitude, freq_index)
}

impl Visualization for Tunnel {
    fn name(&self) -> &'static str {
        "Tunnel"
    }

    fn draw(&mut self, ctx: &FrameContext) {
        let draw = ctx.draw;
        let seconds = ctx.seconds();

        // Far rings first so near ones paint over them
        for i in (0..=RINGS).rev() {
            let (outline, amplitude, freq_index) = ring_outline(ctx, i, seconds);
            let world: Vec<Vec2> = outline.iter().map(|p| ctx.to_world(*p)).collect();

            if i < RINGS / 3 {
                let alpha = (1.0 - i as f32 / RINGS as f32) * (0.2 + amplitude * 0.3);
                draw.polygon()
                    .points(world.iter().copied())
                    .color(rgba(1.0, 0.176, 0.584, alpha * 0.1));
            }

            let color = ctx.color(freq_index as f32 + i as f32 * 10.0, 0.0);
            draw.polyline()
                .weight(2.0 + amplitude * 3.0)
                .points(world)
                .color(color.to_hsla(1.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::test_support::context;

    #[test]
    fn test_ring_outline_is_closed() {
        let draw = Draw::new();
        let spectrum = vec![90u8; 256];
        let ctx = context(&draw, &spectrum, 0.2, 1234.0);
        let (outline, amplitude, _) = ring_outline(&ctx, 3, ctx.seconds());
        assert_eq!(outline.len(), SEGMENTS + 1);
        assert_eq!(outline.first(), outline.last());
        assert!((amplitude - 90.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_outer_rings_are_wider() {
        let draw = Draw::new();
        let spectrum = vec![0u8; 256];
        let ctx = context(&draw, &spectrum, 0.0, 0.0);
        let width = |i| {
            let (outline, _, _) = ring_outline(&ctx, i, 0.0);
            outline.iter().map(|p| p.x).fold(f32::MIN, f32::max)
        };
        assert!(width(10) > width(2));
    }
}
