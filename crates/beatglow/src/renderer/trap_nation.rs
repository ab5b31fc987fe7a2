//! Circular spectrum with inward mirror bars, a pulsing core, rotating
//! accents and a particle burst on heavy bass. The default mode.

use std::f32::consts::{FRAC_PI_2, TAU};

use beatglow_api::{FrameContext, Visualization};
use nannou::color::{IntoLinSrgba, LinSrgba};
use nannou::prelude::*;
use rand::Rng;

use super::{bin_at, radial_glow, tint};

const BAR_COUNT: usize = 64;
const INNER_BAR_COUNT: usize = 32;
const INNER_BAR_MAX_HEIGHT: f32 = 50.0;
const ACCENT_COUNT: usize = 8;
/// Bass level above which particles burst from the rim
const BURST_THRESHOLD: f32 = 0.5;

pub struct TrapNation;

/// Point at `radius` along `angle` around `center`, in screen space.
fn polar(center: Vec2, radius: f32, angle: f32) -> Vec2 {
    center + vec2(angle.cos(), angle.sin()) * radius
}

impl Visualization for TrapNation {
    fn name(&self) -> &'static str {
        "Trap Nation"
    }

    fn draw(&mut self, ctx: &FrameContext) {
        let draw = ctx.draw;
        let bass = ctx.metrics.bass;
        let seconds = ctx.seconds();
        let len = ctx.buffer_len();
        let center = ctx.center();
        let world_center = ctx.to_world(center);

        let inner_radius = 100.0 + bass * 40.0 + ctx.metrics.beat_intensity * 20.0;
        let max_bar_height = 200.0 + bass * 100.0;

        for ring in (0..4).rev() {
            let ring_radius = inner_radius + 250.0 + ring as f32 * 30.0 + bass * 80.0;
            draw.ellipse()
                .xy(world_center)
                .radius(ring_radius)
                .no_fill()
                .stroke_weight(2.0)
                .stroke(rgba(0.29, 0.62, 1.0, 0.05 - ring as f32 * 0.01));
        }

        // Outer bars, starting from the top
        let bar_weight = TAU * inner_radius / BAR_COUNT as f32;
        for i in 0..BAR_COUNT {
            let t = i as f32 / BAR_COUNT as f32;
            let amplitude = ctx.sample(bin_at(t, len)) / 255.0;
            let angle = t * TAU - FRAC_PI_2;

            let start = ctx.to_world(polar(center, inner_radius, angle));
            let end = ctx.to_world(polar(center, inner_radius + amplitude * max_bar_height, angle));

            let points: [(Vec2, LinSrgba); 3] = [
                (start, rgba(0.29, 0.62, 1.0, 0.8 + amplitude * 0.2).into_lin_srgba()),
                (
                    start.lerp(end, 0.5),
                    ctx.color(amplitude * 255.0 + i as f32 * 2.0, 0.0)
                        .to_hsla(1.0)
                        .into_lin_srgba(),
                ),
                (end, rgba(0.545, 0.361, 0.965, 0.6 + amplitude * 0.4).into_lin_srgba()),
            ];
            draw.polyline()
                .weight(bar_weight * 0.7)
                .caps_round()
                .points_colored(points);

            if amplitude > 0.6 {
                draw.line()
                    .start(start)
                    .end(end)
                    .weight(bar_weight * 0.9)
                    .caps_round()
                    .color(rgba(1.0, 1.0, 1.0, (amplitude - 0.6) * 0.5));
            }
        }

        let inner_weight =
            TAU * (inner_radius - INNER_BAR_MAX_HEIGHT) / INNER_BAR_COUNT as f32 * 0.5;
        for i in 0..INNER_BAR_COUNT {
            let t = i as f32 / INNER_BAR_COUNT as f32;
            let amplitude = ctx.sample(bin_at(t, len)) / 255.0;
            let angle = t * TAU - FRAC_PI_2;
            let outer = polar(center, inner_radius, angle);
            let inner = polar(center, inner_radius - amplitude * INNER_BAR_MAX_HEIGHT, angle);
            draw.line()
                .start(ctx.to_world(outer))
                .end(ctx.to_world(inner))
                .weight(inner_weight.max(1.0))
                .caps_round()
                .color(rgba(0.388, 0.4, 0.945, 0.4 + amplitude * 0.4));
        }

        // Dark core with an indigo rim
        draw.ellipse()
            .xy(world_center)
            .radius(inner_radius)
            .color(rgba(0.02, 0.02, 0.02, (0.9 - bass * 0.4) * 0.8));
        radial_glow(
            draw,
            world_center,
            inner_radius,
            rgba(0.388, 0.4, 0.945, 0.1 + bass * 0.4),
            6,
        );

        draw.ellipse()
            .xy(world_center)
            .radius(inner_radius)
            .no_fill()
            .stroke_weight(2.0 + bass * 6.0)
            .stroke(rgba(0.29, 0.62, 1.0, 0.3 + bass * 0.7));
        draw.ellipse()
            .xy(world_center)
            .radius(inner_radius * 0.6)
            .no_fill()
            .stroke_weight(1.0 + bass * 2.0)
            .stroke(rgba(0.545, 0.361, 0.965, 0.2 + bass * 0.5));

        let dot_size = 20.0 + bass * 30.0;
        radial_glow(draw, world_center, dot_size, tint(ctx.palette.secondary, 1.0), 5);
        draw.ellipse().xy(world_center).radius(dot_size * 0.25).color(WHITE);

        let accent_start = inner_radius + max_bar_height + 20.0;
        let accent_end = accent_start + 30.0 + bass * 50.0;
        for i in 0..ACCENT_COUNT {
            let angle = i as f32 / ACCENT_COUNT as f32 * TAU + seconds * (0.5 + bass);
            draw.line()
                .start(ctx.to_world(polar(center, accent_start, angle)))
                .end(ctx.to_world(polar(center, accent_end, angle)))
                .weight(2.0 + bass * 3.0)
                .color(rgba(1.0, 1.0, 1.0, 0.2 + bass * 0.5));
        }

        if bass > BURST_THRESHOLD {
            let mut rng = rand::rng();
            let count = 16 + (bass * 16.0) as usize;
            for i in 0..count {
                let angle = i as f32 / count as f32 * TAU + seconds;
                let radius =
                    inner_radius + max_bar_height + 50.0 + rng.random_range(0.0..80.0) * bass;
                draw.ellipse()
                    .xy(ctx.to_world(polar(center, radius, angle)))
                    .radius(2.0 + rng.random_range(0.0..4.0) * bass)
                    .color(rgba(1.0, 1.0, 1.0, rng.random_range(0.5..1.0)));
            }
        }
    }
}
