//! Synthwave horizon: striped sun, scrolling perspective grid and a mountain
//! line that jumps with the music.

use beatglow_api::{FrameContext, Visualization};
use nannou::color::{IntoLinSrgba, LinSrgba};
use nannou::prelude::*;

use super::{bin_at, radial_glow};

const HORIZONTAL_LINES: usize = 20;
const VERTICAL_LINES: i32 = 15;
const SUN_STRIPES: usize = 8;

pub struct NeonGrid;

fn hex(rgb: u32, alpha: f32) -> Rgba {
    let channel = |shift: u32| ((rgb >> shift) & 0xff) as f32 / 255.0;
    rgba(channel(16), channel(8), channel(0), alpha)
}

/// Depth in `[0, 1)` of horizontal line `i` at `seconds`; lines scroll toward
/// the viewer and wrap back to the horizon.
fn grid_depth(i: usize, seconds: f32, bass: f32) -> f32 {
    let t = i as f32 / HORIZONTAL_LINES as f32 + seconds * (2.0 + bass * 3.0) * 0.1;
    t.rem_euclid(1.0)
}

/// Mountain silhouette in screen space, left to right across `width`.
fn mountains(ctx: &FrameContext, horizon: f32) -> Vec<Vec2> {
    let seconds = ctx.seconds();
    let len = ctx.buffer_len();
    let mut points = Vec::new();
    let mut x = 0.0;
    while x <= ctx.width {
        let amplitude = ctx.sample(bin_at(x / ctx.width.max(1.0), len)) / 255.0;
        let lift = 20.0 + amplitude * 100.0 + (x * 0.02 + seconds).sin() * 20.0;
        points.push(vec2(x, horizon - lift));
        x += 20.0;
    }
    points
}

impl Visualization for NeonGrid {
    fn name(&self) -> &'static str {
        "Neon Grid"
    }

    fn draw(&mut self, ctx: &FrameContext) {
        let draw = ctx.draw;
        let (w, h) = (ctx.width, ctx.height);
        let bass = ctx.metrics.bass;
        let seconds = ctx.seconds();
        let horizon = h * 0.5;
        let cx = w / 2.0;

        let sky_bottom = hex(0x1a0030, 1.0).into_lin_srgba();
        let sky_top = hex(0x0a0015, 1.0).into_lin_srgba();
        let sky: [(Vec2, LinSrgba); 4] = [
            (ctx.to_world(vec2(0.0, 0.0)), sky_top),
            (ctx.to_world(vec2(w, 0.0)), sky_top),
            (ctx.to_world(vec2(w, horizon)), sky_bottom),
            (ctx.to_world(vec2(0.0, horizon)), sky_bottom),
        ];
        draw.polygon().points_colored(sky);

        let sun_y = horizon - 50.0 - bass * 30.0;
        let sun_radius = 120.0 + bass * 40.0;
        let sun = ctx.to_world(vec2(cx, sun_y));
        radial_glow(draw, sun, sun_radius * 1.5, hex(0xff2d95, 0.6), 8);
        draw.ellipse().xy(sun).radius(sun_radius).color(hex(0xff8c00, 1.0));
        for i in 0..SUN_STRIPES {
            let y = sun_y + i as f32 * 15.0 - 20.0;
            let dy = y - sun_y;
            if dy.abs() >= sun_radius {
                continue;
            }
            let half = (sun_radius * sun_radius - dy * dy).sqrt();
            draw.line()
                .start(ctx.to_world(vec2(cx - half, y)))
                .end(ctx.to_world(vec2(cx + half, y)))
                .weight(4.0)
                .color(hex(0x1a0030, 1.0));
        }

        let ground = hex(0x0a0015, 1.0);
        draw.rect()
            .xy(ctx.to_world(vec2(cx, (horizon + h) / 2.0)))
            .w_h(w, h - horizon)
            .color(ground);

        let amplitude = ctx.metrics.average;
        for i in 0..HORIZONTAL_LINES {
            let t = grid_depth(i, seconds, bass);
            let y = horizon + t.powf(1.5) * (h - horizon);
            draw.line()
                .start(ctx.to_world(vec2(0.0, y)))
                .end(ctx.to_world(vec2(w, y)))
                .weight(1.0 + t * 2.0)
                .color(hex(0xff2d95, t * (0.5 + amplitude * 0.5)));
        }
        for i in -VERTICAL_LINES..=VERTICAL_LINES {
            let top_x = cx + i as f32 * 30.0;
            let bottom_x = cx + (top_x - cx) * 3.0;
            draw.line()
                .start(ctx.to_world(vec2(top_x, horizon)))
                .end(ctx.to_world(vec2(bottom_x, h)))
                .weight(1.0)
                .color(hex(0x00f7ff, 0.3 + amplitude * 0.5));
        }

        let ridge = mountains(ctx, horizon);
        let world: Vec<Vec2> = ridge.iter().map(|p| ctx.to_world(*p)).collect();
        let mut fill = world.clone();
        fill.push(ctx.to_world(vec2(w, horizon)));
        fill.push(ctx.to_world(vec2(0.0, horizon)));
        draw.polygon().points(fill).color(hex(0x1a0030, 1.0));
        draw.polyline()
            .weight(2.0)
            .points(world)
            .color(hex(0xff2d95, 1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::test_support::context;

    #[test]
    fn test_grid_depth_wraps() {
        for i in 0..HORIZONTAL_LINES {
            for step in 0..50 {
                let t = grid_depth(i, step as f32 * 0.37, 0.8);
                assert!((0.0..1.0).contains(&t), "line {} at {}: {}", i, step, t);
            }
        }
        assert_eq!(grid_depth(5, 0.0, 0.0), 0.25);
    }

    #[test]
    fn test_mountains_stay_above_the_horizon() {
        let draw = Draw::new();
        let spectrum = vec![255u8; 64];
        let ctx = context(&draw, &spectrum, 1.0, 4321.0);
        let ridge = mountains(&ctx, 300.0);
        assert_eq!(ridge.len(), 41);
        assert!(ridge.iter().all(|p| p.y <= 300.0));
        assert_eq!(ridge.first().map(|p| p.x), Some(0.0));
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(hex(0xff8c00, 1.0), rgba(1.0, 140.0 / 255.0, 0.0, 1.0));
    }

    #[test]
    fn test_draw_smoke() {
        let draw = Draw::new();
        NeonGrid.draw(&context(&draw, &[], 0.0, 0.0));
        NeonGrid.draw(&context(&draw, &[128; 256], 0.9, 10_000.0));
    }
}
