//! Rotating point sphere, each point pushed outward by its spectrum bin.

use std::f32::consts::{PI, TAU};

use beatglow_api::{FrameContext, Visualization};
use nannou::prelude::*;

const RINGS: usize = 16;
const SEGMENTS: usize = 32;
/// Squared screen distance under which neighbouring points are linked
const LINK_DISTANCE_SQ: f32 = 2500.0;

struct SpherePoint {
    screen: Vec2,
    /// Rotated depth, used for painter's ordering
    z: f32,
    scale: f32,
    amplitude: f32,
    freq_index: usize,
}

#[derive(Default)]
pub struct Sphere {
    /// Scratch buffer reused between frames
    points: Vec<SpherePoint>,
}

impl Visualization for Sphere {
    fn name(&self) -> &'static str {
        "Sphere"
    }

    fn draw(&mut self, ctx: &FrameContext) {
        let draw = ctx.draw;
        let bass = ctx.metrics.bass;
        let len = ctx.buffer_len().max(1);
        let base_radius = ctx.width.min(ctx.height) * 0.25 * (1.0 + bass * 0.3);

        self.points.clear();
        for i in 0..RINGS {
            let (sin_phi, cos_phi) = (i as f32 / RINGS as f32 * PI).sin_cos();
            for j in 0..SEGMENTS {
                let (sin_theta, cos_theta) = (j as f32 / SEGMENTS as f32 * TAU).sin_cos();

                let freq_index = (i * SEGMENTS + j) % len;
                let amplitude = ctx.sample(freq_index) / 255.0;
                let radius = base_radius * (1.0 + amplitude * 0.5);

                let rotated = ctx.rotate(vec3(
                    radius * sin_phi * cos_theta,
                    radius * cos_phi,
                    radius * sin_phi * sin_theta,
                ));
                let projected = ctx.project_rotated(rotated);
                if !projected.culled {
                    self.points.push(SpherePoint {
                        screen: projected.screen,
                        z: rotated.z,
                        scale: projected.scale,
                        amplitude,
                        freq_index,
                    });
                }
            }
        }

        self.points.sort_by(|a, b| a.z.total_cmp(&b.z));

        let link_color = rgba(0.0, 0.969, 1.0, 0.15);
        let count = self.points.len();
        for i in (0..count).step_by(2) {
            let a = &self.points[i];
            for b in &self.points[i + 1..(i + 6).min(count)] {
                if a.screen.distance_squared(b.screen) < LINK_DISTANCE_SQ {
                    draw.line()
                        .start(ctx.to_world(a.screen))
                        .end(ctx.to_world(b.screen))
                        .weight(0.5)
                        .color(link_color);
                }
            }
        }

        for p in &self.points {
            let size = (2.0 + p.amplitude * 6.0) * p.scale;
            if size < 0.5 {
                continue;
            }
            let pos = ctx.to_world(p.screen);
            let glow = ctx.color(p.freq_index as f32 + p.amplitude * 100.0, 0.0);
            draw.ellipse()
                .xy(pos)
                .radius(size * 1.5)
                .color(glow.to_hsla(0.6));
            draw.ellipse().xy(pos).radius(size * 0.4).color(WHITE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::test_support::context;

    #[test]
    fn test_points_sorted_back_to_front() {
        let draw = Draw::new();
        let spectrum = vec![128u8; 256];
        let ctx = context(&draw, &spectrum, 0.5, 0.0);
        let mut sphere = Sphere::default();
        sphere.draw(&ctx);

        assert!(!sphere.points.is_empty());
        assert!(sphere.points.len() <= RINGS * SEGMENTS);
        assert!(sphere.points.windows(2).all(|w| w[0].z <= w[1].z));
    }

    #[test]
    fn test_empty_spectrum_does_not_panic() {
        let draw = Draw::new();
        let ctx = context(&draw, &[], 0.0, 0.0);
        Sphere::default().draw(&ctx);
    }
}
