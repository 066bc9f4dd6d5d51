//! Orbit/pan/dolly camera driven by pointer-drag deltas.

use glam::{Mat4, Vec3, Vec4};

use aoview_core::transform;

/// Remaps GL-style clip depth [-1, 1] into the [0, 1] range wgpu clips to.
const DEPTH_REMAP: Mat4 = Mat4::from_cols(
    Vec4::new(1.0, 0.0, 0.0, 0.0),
    Vec4::new(0.0, 1.0, 0.0, 0.0),
    Vec4::new(0.0, 0.0, 0.5, 0.0),
    Vec4::new(0.0, 0.0, 0.5, 1.0),
);

const DEPTH_REMAP_INV: Mat4 = Mat4::from_cols(
    Vec4::new(1.0, 0.0, 0.0, 0.0),
    Vec4::new(0.0, 1.0, 0.0, 0.0),
    Vec4::new(0.0, 0.0, 2.0, 0.0),
    Vec4::new(0.0, 0.0, -1.0, 1.0),
);

/// Pan/dolly speed factors, expressed per pixel of pointer movement.
const PAN_SPEED: f32 = 0.007;
const ORBIT_SPEED: f32 = 0.007;
const DOLLY_SPEED: f32 = 0.03;

/// Closest the eye may sit to the look-at point.
const MIN_DISTANCE: f32 = 1.0;

/// A look-at camera for viewing the scene.
///
/// Drag deltas are in pixels; positive `dx` is rightward, positive `dy` is
/// downward (window coordinates).
#[derive(Debug, Clone)]
pub struct Camera {
    /// Eye position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub lookat: Vec3,
    /// Full vertical field of view in radians.
    pub fov_y: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
}

impl Camera {
    /// Creates the default scene camera looking down at the origin.
    #[must_use]
    pub fn new(aspect: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, 1.5, 1.5),
            lookat: Vec3::ZERO,
            fov_y: std::f32::consts::FRAC_PI_2,
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Distance between the eye and look-at points.
    #[must_use]
    pub fn distance(&self) -> f32 {
        (self.lookat - self.eye).length()
    }

    /// Returns `(view, normal)` transforms for the current pose.
    #[must_use]
    pub fn view_matrices(&self) -> (Mat4, Mat4) {
        transform::look_at(self.eye, self.lookat, Vec3::Y)
    }

    /// Projection matrix for the current lens parameters.
    #[must_use]
    pub fn projection(&self) -> Mat4 {
        transform::perspective(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Closed-form inverse of [`projection`](Self::projection).
    #[must_use]
    pub fn projection_inverse(&self) -> Mat4 {
        transform::perspective_inverse(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Projection with clip depth remapped to [0, 1] for the GPU.
    #[must_use]
    pub fn clip_projection(&self) -> Mat4 {
        DEPTH_REMAP * self.projection()
    }

    /// Inverse of [`clip_projection`](Self::clip_projection).
    #[must_use]
    pub fn clip_projection_inverse(&self) -> Mat4 {
        self.projection_inverse() * DEPTH_REMAP_INV
    }

    /// Translates eye and look-at together in the view plane.
    ///
    /// The offset scales with the view distance, so a drag covers the same
    /// fraction of the screen regardless of how far out the camera sits.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = self.lookat - self.eye;
        let scale = forward.length() * PAN_SPEED;

        let right = forward.cross(Vec3::Y).normalize();
        let up = forward.cross(Vec3::Y).cross(forward).normalize();

        let offset = -right * dx * scale + up * dy * scale;
        self.eye += offset;
        self.lookat += offset;
    }

    /// Moves the eye along the view direction.
    ///
    /// The step grows with the square root of the current distance. When a
    /// drag would bring the eye within [`MIN_DISTANCE`] of the look-at
    /// point, the look-at point is pushed forward instead so the pair never
    /// collapses.
    pub fn dolly(&mut self, dx: f32) {
        let forward = self.lookat - self.eye;
        let mut len = forward.length();
        let dir = forward.normalize();

        len -= len.sqrt() * dx * DOLLY_SPEED;
        self.eye = self.lookat - dir * len;

        if len < MIN_DISTANCE {
            log::debug!("dolly hit minimum distance, pushing look-at point forward");
            self.lookat = self.eye + dir;
        }
    }

    /// Orbits the eye around the look-at point.
    ///
    /// Horizontal motion first rotates in the X/Z plane about the world Y
    /// axis, then vertical motion rotates about the local right axis.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        let offset = self.eye - self.lookat;

        let theta = -dx * ORBIT_SPEED;
        let (sin, cos) = theta.sin_cos();
        let swung = Vec3::new(
            cos * offset.x + sin * offset.z,
            offset.y,
            -sin * offset.x + cos * offset.z,
        );

        let theta = -dy * ORBIT_SPEED;
        let forward = -swung;
        let up = forward.cross(Vec3::Y).cross(forward).normalize();

        let len = forward.length();
        let dir = forward.normalize();

        let tilted = (dir * theta.cos() + up * theta.sin()) * len;
        self.eye = self.lookat - tilted;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1024.0 / 768.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f32 = 1e-4;

    proptest! {
        #[test]
        fn dolly_respects_minimum_distance_for_any_drag(dx in -500.0f32..500.0) {
            let mut camera = Camera::default();
            camera.dolly(dx);
            prop_assert!(camera.distance() >= 1.0 - 1e-3);
        }

        #[test]
        fn dolly_sequences_respect_minimum_distance(drags in proptest::collection::vec(-200.0f32..200.0, 1..20)) {
            let mut camera = Camera::default();
            for dx in drags {
                camera.dolly(dx);
                prop_assert!(camera.distance() >= 1.0 - 1e-3);
            }
        }

        #[test]
        fn orbit_preserves_distance_and_lookat(dx in -300.0f32..300.0, dy in -300.0f32..300.0) {
            let mut camera = Camera::default();
            let before = camera.distance();
            camera.orbit(dx, dy);
            prop_assert!((camera.distance() - before).abs() < 1e-3);
            prop_assert_eq!(camera.lookat, Vec3::ZERO);
        }

        #[test]
        fn pan_moves_eye_and_lookat_in_lockstep(dx in -300.0f32..300.0, dy in -300.0f32..300.0) {
            let mut camera = Camera::default();
            let distance = camera.distance();
            let gap = camera.eye - camera.lookat;
            camera.pan(dx, dy);
            prop_assert!((camera.distance() - distance).abs() < 1e-3);
            prop_assert!((camera.eye - camera.lookat - gap).length() < 1e-3);
        }
    }

    #[test]
    fn default_pose_looks_at_origin() {
        let camera = Camera::default();
        assert_eq!(camera.eye, Vec3::new(0.0, 1.5, 1.5));
        assert_eq!(camera.lookat, Vec3::ZERO);
        assert!((camera.distance() - 4.5f32.sqrt()).abs() < EPS);
    }

    #[test]
    fn pan_shifts_both_points_and_keeps_distance() {
        let mut camera = Camera::default();
        let (eye0, lookat0) = (camera.eye, camera.lookat);
        let distance0 = camera.distance();

        camera.pan(100.0, 0.0);

        assert!((camera.distance() - distance0).abs() < EPS);
        let eye_offset = camera.eye - eye0;
        let lookat_offset = camera.lookat - lookat0;
        assert!((eye_offset - lookat_offset).length() < EPS);
        assert!(eye_offset.length() > 0.0);
    }

    #[test]
    fn dolly_in_reduces_distance() {
        let mut camera = Camera::default();
        let before = camera.distance();
        camera.dolly(10.0);
        assert!(camera.distance() < before);
    }

    #[test]
    fn dolly_never_collapses_below_minimum_distance() {
        let mut camera = Camera::default();
        camera.eye = Vec3::new(0.0, 0.0, 1.2);

        // A huge drag would push the eye straight through the look-at point.
        camera.dolly(500.0);
        assert!(camera.distance() >= 1.0 - EPS);

        // Repeated drags keep the invariant.
        for _ in 0..50 {
            camera.dolly(50.0);
            assert!(camera.distance() >= 1.0 - EPS);
        }
    }

    #[test]
    fn orbit_preserves_distance() {
        let mut camera = Camera::default();
        let before = camera.distance();
        camera.orbit(35.0, -20.0);
        assert!((camera.distance() - before).abs() < 1e-3);
        assert_eq!(camera.lookat, Vec3::ZERO);
    }

    #[test]
    fn horizontal_orbit_keeps_height() {
        let mut camera = Camera::default();
        camera.orbit(120.0, 0.0);
        assert!((camera.eye.y - 1.5).abs() < EPS);
    }

    #[test]
    fn clip_projection_maps_depth_to_unit_range() {
        let camera = Camera::default();
        let proj = camera.clip_projection();

        let near = proj * Vec4::new(0.0, 0.0, -camera.near, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -camera.far, 1.0);
        assert!((near.z / near.w).abs() < EPS);
        assert!((far.z / far.w - 1.0).abs() < EPS);
    }

    #[test]
    fn clip_projection_inverse_round_trips() {
        let camera = Camera::default();
        let proj = camera.clip_projection();
        let inv = camera.clip_projection_inverse();

        let p = Vec4::new(0.4, -0.2, -3.0, 1.0);
        let clip = proj * p;
        let back = inv * clip;
        let back = back / back.w;
        assert!((back - p).length() < EPS);
    }

    #[test]
    fn view_matrices_place_eye_at_view_origin() {
        let camera = Camera::default();
        let (view, _) = camera.view_matrices();
        let eye_v = view * camera.eye.extend(1.0);
        assert!(eye_v.truncate().length() < EPS);
    }
}
