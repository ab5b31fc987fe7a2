//! Perspective projection and the accumulated scene rotation.
//!
//! All screen coordinates here use a top-left origin with y pointing down.
//! [`FrameContext::to_world`](crate::FrameContext::to_world) converts them to
//! nannou's centered, y-up space.

use nannou::prelude::{vec3, Vec2, Vec3};

/// Field of view used by every built-in plugin
pub const DEFAULT_FOV: f32 = 500.0;

/// Points projected further than this outside the viewport are culled
const CULL_MARGIN: f32 = 200.0;

/// Rotate a point around the Y axis, then around the X axis.
///
/// The order is fixed; swapping it changes every plugin's geometry.
pub fn rotate(x: f32, y: f32, z: f32, rot_x: f32, rot_y: f32) -> Vec3 {
    let (sin_y, cos_y) = rot_y.sin_cos();
    let x1 = x * cos_y - z * sin_y;
    let z1 = x * sin_y + z * cos_y;

    let (sin_x, cos_x) = rot_x.sin_cos();
    let y1 = y * cos_x - z1 * sin_x;
    let z2 = y * sin_x + z1 * cos_x;

    vec3(x1, y1, z2)
}

/// Result of projecting one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    /// Screen-space position (top-left origin)
    pub screen: Vec2,
    /// Perspective scale, never negative
    pub scale: f32,
    /// Behind the near plane, past the far plane, or well off screen
    pub culled: bool,
}

/// Perspective-project a 3D point onto a `width` x `height` viewport.
///
/// The near plane sits at `-fov + 50` and the far plane at `fov * 3`.
pub fn project(point: Vec3, center: Vec2, fov: f32, width: f32, height: f32) -> Projected {
    let near = -fov + 50.0;
    let far = fov * 3.0;

    let scale = fov / (fov + point.z.max(near));
    let screen = Vec2::new(center.x + point.x * scale, center.y + point.y * scale);

    let offscreen = screen.x < -CULL_MARGIN
        || screen.x > width + CULL_MARGIN
        || screen.y < -CULL_MARGIN
        || screen.y > height + CULL_MARGIN;

    Projected {
        screen,
        scale: scale.max(0.0),
        culled: point.z < near || point.z > far || offscreen,
    }
}

/// Scene rotation shared by every plugin, advanced once per displayed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    /// Step the rotation for a frame at `time_ms` since start.
    pub fn advance(&mut self, time_ms: f64) {
        self.x = ((time_ms * 0.0003).sin() * 0.3) as f32;
        self.y += 0.003;
        self.z = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::FRAC_PI_2;

    const W: f32 = 1920.0;
    const H: f32 = 1080.0;

    fn center() -> Vec2 {
        Vec2::new(W / 2.0, H / 2.0)
    }

    #[test]
    fn test_rotate_y_then_x() {
        // Quarter turn around Y carries +x onto +z
        let p = rotate(100.0, 0.0, 0.0, 0.0, FRAC_PI_2);
        assert!(p.x.abs() < 1e-3);
        assert!(p.y.abs() < 1e-3);
        assert!((p.z - 100.0).abs() < 1e-3);

        let p = rotate(100.0, 0.0, 0.0, FRAC_PI_2, FRAC_PI_2);
        assert!(p.x.abs() < 1e-3);
        assert!((p.y + 100.0).abs() < 1e-3);
        assert!(p.z.abs() < 1e-3);
    }

    #[test]
    fn test_rotation_order_matters() {
        fn rotate_x_then_y(p: Vec3, rot_x: f32, rot_y: f32) -> Vec3 {
            let (sin_x, cos_x) = rot_x.sin_cos();
            let y1 = p.y * cos_x - p.z * sin_x;
            let z1 = p.y * sin_x + p.z * cos_x;
            let (sin_y, cos_y) = rot_y.sin_cos();
            vec3(p.x * cos_y - z1 * sin_y, y1, p.x * sin_y + z1 * cos_y)
        }

        let point = vec3(100.0, 0.0, 0.0);
        let y_first = rotate(point.x, point.y, point.z, FRAC_PI_2, FRAC_PI_2);
        let x_first = rotate_x_then_y(point, FRAC_PI_2, FRAC_PI_2);
        assert!((y_first - vec3(0.0, -100.0, 0.0)).length() < 1e-3);
        assert!((x_first - vec3(0.0, 0.0, 100.0)).length() < 1e-3);
        assert!(y_first.distance(x_first) > 100.0);
    }

    #[test]
    fn test_project_origin_is_center() {
        let p = project(Vec3::ZERO, center(), DEFAULT_FOV, W, H);
        assert_eq!(p.screen, center());
        assert_eq!(p.scale, 1.0);
        assert!(!p.culled);
    }

    #[test]
    fn test_far_points_culled() {
        let p = project(vec3(0.0, 0.0, DEFAULT_FOV * 3.0 + 1.0), center(), DEFAULT_FOV, W, H);
        assert!(p.culled);
    }

    #[test]
    fn test_near_points_culled() {
        let p = project(vec3(0.0, 0.0, -DEFAULT_FOV), center(), DEFAULT_FOV, W, H);
        assert!(p.culled);
        assert!(p.scale >= 0.0);
    }

    #[test]
    fn test_offscreen_points_culled() {
        let p = project(vec3(5000.0, 0.0, 0.0), center(), DEFAULT_FOV, W, H);
        assert!(p.culled);
        let p = project(vec3(W / 2.0 + 150.0, 0.0, 0.0), center(), DEFAULT_FOV, W, H);
        assert!(!p.culled);
    }

    #[test]
    fn test_rotation_advance() {
        let mut rotation = RotationState::default();
        rotation.advance(0.0);
        assert_eq!(rotation.x, 0.0);
        assert!((rotation.y - 0.003).abs() < 1e-6);
        rotation.advance(1000.0);
        assert!((rotation.x - (0.3f64.sin() * 0.3) as f32).abs() < 1e-6);
        assert!((rotation.y - 0.006).abs() < 1e-6);
        assert_eq!(rotation.z, 0.0);
    }

    proptest! {
        #[test]
        fn prop_beyond_far_plane_is_culled(
            x in -2000.0f32..2000.0,
            y in -2000.0f32..2000.0,
            dz in 0.001f32..5000.0,
            fov in 100.0f32..1000.0,
        ) {
            let p = project(vec3(x, y, fov * 3.0 + dz), center(), fov, W, H);
            prop_assert!(p.culled);
        }

        #[test]
        fn prop_scale_never_negative(
            x in -2000.0f32..2000.0,
            y in -2000.0f32..2000.0,
            z in -5000.0f32..5000.0,
            fov in 100.0f32..1000.0,
        ) {
            let p = project(vec3(x, y, z), center(), fov, W, H);
            prop_assert!(p.scale >= 0.0);
            if !p.culled {
                prop_assert!(p.scale > 0.0);
            }
        }
    }
}
