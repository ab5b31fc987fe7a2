//! Drifting 3D particle cloud with proximity links.
//!
//! Each particle listens to one spectrum bin; louder bins jitter harder.

use beatglow_api::{FrameContext, Visualization};
use nannou::prelude::*;
use rand::Rng;

const NUM_PARTICLES: usize = 150;
/// Half-extent of the cube particles bounce inside
const BOUND: f32 = 300.0;
const DAMPING: f32 = 0.98;
/// Cap on link lines drawn per frame
const MAX_LINKS: usize = 400;

#[derive(Clone)]
struct Particle {
    position: Vec3,
    velocity: Vec3,
    /// Spectrum bin this particle responds to
    freq_band: usize,
}

struct Visible {
    screen: Vec2,
    z: f32,
    scale: f32,
    amplitude: f32,
    freq_band: usize,
}

#[derive(Default)]
pub struct Particles {
    particles: Vec<Particle>,
    visible: Vec<Visible>,
}

impl Particles {
    fn spawn(&mut self) {
        let mut rng = rand::rng();
        self.particles = (0..NUM_PARTICLES)
            .map(|_| Particle {
                position: vec3(
                    rng.random_range(-BOUND..BOUND),
                    rng.random_range(-BOUND..BOUND),
                    rng.random_range(-BOUND..BOUND),
                ),
                velocity: vec3(
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                ),
                freq_band: rng.random_range(0..256),
            })
            .collect();
    }

    fn step(&mut self, ctx: &FrameContext) {
        let mut rng = rand::rng();
        for p in &mut self.particles {
            let amplitude = ctx.sample(p.freq_band) / 255.0;
            let jitter = 0.2 * (1.0 + amplitude * 2.0);
            p.velocity += vec3(
                rng.random_range(-0.5..0.5),
                rng.random_range(-0.5..0.5),
                rng.random_range(-0.5..0.5),
            ) * jitter;
            p.velocity *= DAMPING;
            p.position += p.velocity;

            if p.position.x.abs() > BOUND {
                p.velocity.x = -p.velocity.x;
            }
            if p.position.y.abs() > BOUND {
                p.velocity.y = -p.velocity.y;
            }
            if p.position.z.abs() > BOUND {
                p.velocity.z = -p.velocity.z;
            }
        }
    }
}

/// Pairs of `points` closer than `max_distance`, with their distance, up to
/// `MAX_LINKS` of them.
fn proximity_links(points: &[Vec2], max_distance: f32) -> Vec<(usize, usize, f32)> {
    let mut links = Vec::new();
    for (i, a) in points.iter().enumerate() {
        for (j, b) in points.iter().enumerate().skip(i + 1) {
            let dist = a.distance(*b);
            if dist < max_distance {
                links.push((i, j, dist));
                if links.len() == MAX_LINKS {
                    return links;
                }
            }
        }
    }
    links
}

impl Visualization for Particles {
    fn name(&self) -> &'static str {
        "Particles"
    }

    fn draw(&mut self, ctx: &FrameContext) {
        if self.particles.is_empty() {
            self.spawn();
        }
        self.step(ctx);

        let draw = ctx.draw;
        let bass = ctx.metrics.bass;

        self.visible.clear();
        for p in &self.particles {
            let rotated = ctx.rotate(p.position);
            let projected = ctx.project_rotated(rotated);
            if projected.culled {
                continue;
            }
            self.visible.push(Visible {
                screen: projected.screen,
                z: rotated.z,
                scale: projected.scale,
                amplitude: ctx.sample(p.freq_band) / 255.0,
                freq_band: p.freq_band,
            });
        }
        self.visible.sort_by(|a, b| a.z.total_cmp(&b.z));

        let link_distance = 100.0 + bass * 50.0;
        let screens: Vec<Vec2> = self.visible.iter().map(|v| v.screen).collect();
        for (i, j, dist) in proximity_links(&screens, link_distance) {
            draw.line()
                .start(ctx.to_world(screens[i]))
                .end(ctx.to_world(screens[j]))
                .weight(0.5)
                .color(rgba(0.0, 0.969, 1.0, 0.2 * (1.0 - dist / link_distance)));
        }

        for p in &self.visible {
            let size = (2.0 + p.amplitude * 4.0) * p.scale;
            if size < 0.5 {
                continue;
            }
            let pos = ctx.to_world(p.screen);
            let color = ctx.color(p.freq_band as f32 + p.amplitude * 100.0, 0.0);
            draw.ellipse()
                .xy(pos)
                .radius(size)
                .color(color.to_hsla(0.5 + p.amplitude * 0.5));
            draw.ellipse().xy(pos).radius(size * 0.3).color(WHITE);
        }
    }

    fn reset(&mut self) {
        self.particles.clear();
        self.visible.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::test_support::context;

    #[test]
    fn test_spawns_on_first_draw() {
        let draw = Draw::new();
        let spectrum = vec![100u8; 256];
        let mut particles = Particles::default();
        particles.draw(&context(&draw, &spectrum, 0.3, 0.0));
        assert_eq!(particles.particles.len(), NUM_PARTICLES);
        assert!(particles.particles.iter().all(|p| p.freq_band < 256));
    }

    #[test]
    fn test_reset_respawns() {
        let draw = Draw::new();
        let spectrum = vec![100u8; 256];
        let mut particles = Particles::default();
        particles.draw(&context(&draw, &spectrum, 0.3, 0.0));
        particles.reset();
        assert!(particles.particles.is_empty());
        particles.draw(&context(&draw, &spectrum, 0.3, 16.0));
        assert_eq!(particles.particles.len(), NUM_PARTICLES);
    }

    #[test]
    fn test_links_join_close_pairs_only() {
        let points = [vec2(0.0, 0.0), vec2(10.0, 0.0), vec2(500.0, 0.0)];
        let links = proximity_links(&points, 100.0);
        assert_eq!(links, vec![(0, 1, 10.0)]);
    }

    #[test]
    fn test_links_are_capped() {
        // Everything within reach of everything: 150 * 149 / 2 candidate pairs
        let points: Vec<Vec2> = (0..NUM_PARTICLES).map(|i| vec2(i as f32 * 0.1, 0.0)).collect();
        let links = proximity_links(&points, 100.0);
        assert_eq!(links.len(), MAX_LINKS);
        assert!(links.iter().all(|(i, j, _)| i < j));
    }

    #[test]
    fn test_particles_stay_near_bounds() {
        let draw = Draw::new();
        let spectrum = vec![255u8; 256];
        let mut particles = Particles::default();
        for frame in 0..300 {
            particles.draw(&context(&draw, &spectrum, 1.0, frame as f64 * 16.0));
        }
        // Velocity flips once a particle crosses the bound, so overshoot is small
        let limit = BOUND + 50.0;
        assert!(particles
            .particles
            .iter()
            .all(|p| p.position.abs().max_element() < limit));
    }
}
