//! Matrix constructors for the rendering pipeline.
//!
//! Everything here is a pure function over [`glam`] value types. Vector
//! algebra (dot/cross/normalize and friends) comes straight from
//! [`glam::Vec3`]; this module adds the transform constructors the passes
//! need, most importantly the look-at pair (position + normal transforms)
//! and the perspective projection together with its closed-form inverse.

use glam::{Mat4, Vec3, Vec4};

/// Rotation about the world X axis by `theta` radians (right-hand rule).
pub fn rotation_x(theta: f32) -> Mat4 {
    Mat4::from_rotation_x(theta)
}

/// Rotation about the world Y axis by `theta` radians (right-hand rule).
pub fn rotation_y(theta: f32) -> Mat4 {
    Mat4::from_rotation_y(theta)
}

/// Rotation about the world Z axis by `theta` radians (right-hand rule).
pub fn rotation_z(theta: f32) -> Mat4 {
    Mat4::from_rotation_z(theta)
}

/// Rotation about an arbitrary axis by `theta` radians (Rodrigues form).
///
/// A zero axis yields the identity.
pub fn rotation_about_axis(axis: Vec3, theta: f32) -> Mat4 {
    let n = axis.normalize_or_zero();
    if n == Vec3::ZERO {
        return Mat4::IDENTITY;
    }
    Mat4::from_axis_angle(n, theta)
}

/// Non-uniform scaling.
pub fn scaling(sx: f32, sy: f32, sz: f32) -> Mat4 {
    Mat4::from_scale(Vec3::new(sx, sy, sz))
}

/// Inverse-transpose of [`scaling`], for transforming normals.
pub fn scaling_inverse_transpose(sx: f32, sy: f32, sz: f32) -> Mat4 {
    Mat4::from_scale(Vec3::new(1.0 / sx, 1.0 / sy, 1.0 / sz))
}

/// Translation.
pub fn translation(tx: f32, ty: f32, tz: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(tx, ty, tz))
}

/// Inverse-transpose of [`translation`], for transforming normals.
///
/// The negated offsets land in the bottom row, so direction vectors
/// (w = 0) pass through unchanged: translation does not move normals.
pub fn translation_inverse_transpose(tx: f32, ty: f32, tz: f32) -> Mat4 {
    Mat4::from_cols(
        Vec4::new(1.0, 0.0, 0.0, -tx),
        Vec4::new(0.0, 1.0, 0.0, -ty),
        Vec4::new(0.0, 0.0, 1.0, -tz),
        Vec4::W,
    )
}

/// Builds the view transforms for a camera at `eye` looking at `target`.
///
/// Returns `(position_transform, normal_transform)`. The basis is
/// right-handed: `forward = normalize(target - eye)`,
/// `right = forward x up`, `true_up = right x forward`. The position
/// transform is rotation composed with translation by `-eye`; the normal
/// transform composes with the inverse-transpose translation instead, so
/// normals only rotate.
///
/// Undefined when `up` is parallel to the view direction (not guarded).
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> (Mat4, Mat4) {
    let forward = (target - eye).normalize();
    let right = forward.cross(up).normalize();
    let true_up = right.cross(forward).normalize();

    // Rows are (right, true_up, -forward); glam is column-major.
    let rotation = Mat4::from_cols(
        Vec4::new(right.x, true_up.x, -forward.x, 0.0),
        Vec4::new(right.y, true_up.y, -forward.y, 0.0),
        Vec4::new(right.z, true_up.z, -forward.z, 0.0),
        Vec4::W,
    );

    let position = rotation * translation(-eye.x, -eye.y, -eye.z);
    let normal = rotation * translation_inverse_transpose(-eye.x, -eye.y, -eye.z);
    (position, normal)
}

/// OpenGL-style right-handed perspective projection (`w = -z`).
///
/// `fov_y` is the full vertical field of view in radians; `near` and `far`
/// must both be positive with `near < far`.
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let y = 1.0 / (fov_y * 0.5).tan();
    let x = y / aspect;
    let z1 = -(far + near) / (far - near);
    let z2 = (-2.0 * near * far) / (far - near);

    Mat4::from_cols(
        Vec4::new(x, 0.0, 0.0, 0.0),
        Vec4::new(0.0, y, 0.0, 0.0),
        Vec4::new(0.0, 0.0, z1, -1.0),
        Vec4::new(0.0, 0.0, z2, 0.0),
    )
}

/// Closed-form inverse of [`perspective`] with the same parameters.
///
/// Used for reconstructing view-space positions from a depth sample; the
/// analytic form is cheaper and better conditioned than a general 4x4
/// inversion.
pub fn perspective_inverse(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let y = 1.0 / (fov_y * 0.5).tan();
    let x = y / aspect;
    let z2 = (-2.0 * near * far) / (far - near);

    Mat4::from_cols(
        Vec4::new(1.0 / x, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 1.0 / y, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 0.0, 1.0 / z2),
        Vec4::new(0.0, 0.0, -1.0, (far + near) / (2.0 * far * near)),
    )
}

/// Maps canonical `[-1, 1]^3` device coordinates to a pixel-space viewport.
pub fn viewport(x: f32, y: f32, width: f32, height: f32) -> Mat4 {
    translation(x, y, 0.0) * scaling(0.5 * width, 0.5 * height, 0.5) * translation(1.0, 1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f32 = 1e-4;

    fn assert_mat_eq(a: Mat4, b: Mat4) {
        for (x, y) in a
            .to_cols_array()
            .iter()
            .zip(b.to_cols_array().iter())
        {
            assert!((x - y).abs() < EPS, "{a:?} != {b:?}");
        }
    }

    fn finite_vec3() -> impl Strategy<Value = Vec3> {
        (-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0)
            .prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    proptest! {
        #[test]
        fn cross_is_anticommutative(a in finite_vec3(), b in finite_vec3()) {
            let lhs = a.cross(b);
            let rhs = -(b.cross(a));
            prop_assert!((lhs - rhs).length() < EPS);
        }

        #[test]
        fn dot_is_commutative(a in finite_vec3(), b in finite_vec3()) {
            prop_assert!((a.dot(b) - b.dot(a)).abs() < EPS);
        }

        #[test]
        fn normalize_yields_unit_length(v in finite_vec3()) {
            prop_assume!(v.length() > 1e-3);
            prop_assert!((v.normalize().length() - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn identity_is_multiplicative_unit() {
        let m = rotation_about_axis(Vec3::new(1.0, 2.0, 3.0), 0.7)
            * translation(4.0, -5.0, 6.0)
            * scaling(2.0, 3.0, 4.0);
        assert_mat_eq(m * Mat4::IDENTITY, m);
        assert_mat_eq(Mat4::IDENTITY * m, m);
    }

    #[test]
    fn axis_rotations_match_arbitrary_axis_form() {
        let theta = 1.1;
        assert_mat_eq(rotation_x(theta), rotation_about_axis(Vec3::X, theta));
        assert_mat_eq(rotation_y(theta), rotation_about_axis(Vec3::Y, theta));
        assert_mat_eq(rotation_z(theta), rotation_about_axis(Vec3::Z, theta));
    }

    #[test]
    fn rotation_about_zero_axis_is_identity() {
        assert_mat_eq(rotation_about_axis(Vec3::ZERO, 2.0), Mat4::IDENTITY);
    }

    #[test]
    fn scaling_inverse_transpose_undoes_scaling() {
        let m = scaling(2.0, 4.0, 0.5) * scaling_inverse_transpose(2.0, 4.0, 0.5);
        assert_mat_eq(m, Mat4::IDENTITY);
    }

    #[test]
    fn translation_inverse_transpose_fixes_directions() {
        // Direction vectors (w = 0) must pass through unchanged.
        let m = translation_inverse_transpose(3.0, -7.0, 1.5);
        let d = Vec4::new(0.2, -0.6, 0.9, 0.0);
        let out = m * d;
        assert!((out - d).length() < EPS);
    }

    #[test]
    fn perspective_inverse_round_trips_view_space_points() {
        let (fov, aspect, near, far) = (std::f32::consts::FRAC_PI_2, 4.0 / 3.0, 0.1, 1000.0);
        let proj = perspective(fov, aspect, near, far);
        let inv = perspective_inverse(fov, aspect, near, far);

        for &z in &[-0.1f32, -1.0, -10.0, -500.0, -999.0] {
            let p = Vec4::new(0.3, -0.8, z, 1.0);
            let clip = proj * p;
            let back = inv * clip;
            let back = back / back.w;
            assert!(
                (back - p).length() < (EPS * z.abs().max(1.0)),
                "round trip failed for z = {z}: {back:?}"
            );
        }
    }

    #[test]
    fn perspective_maps_near_and_far_to_clip_bounds() {
        let proj = perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        let near = proj * Vec4::new(0.0, 0.0, -0.1, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -100.0, 1.0);
        assert!((near.z / near.w + 1.0).abs() < EPS);
        assert!((far.z / far.w - 1.0).abs() < EPS);
    }

    #[test]
    fn look_at_maps_eye_to_origin_and_target_onto_neg_z() {
        let eye = Vec3::new(0.0, 1.5, 1.5);
        let target = Vec3::ZERO;
        let (view, _) = look_at(eye, target, Vec3::Y);

        let eye_v = view * eye.extend(1.0);
        assert!(eye_v.truncate().length() < EPS);

        let target_v = view * target.extend(1.0);
        assert!(target_v.x.abs() < EPS);
        assert!(target_v.y.abs() < EPS);
        assert!(target_v.z < 0.0);
    }

    #[test]
    fn look_at_basis_is_orthonormal() {
        let (view, _) = look_at(Vec3::new(1.0, 2.0, 3.0), Vec3::new(-0.5, 0.0, 1.0), Vec3::Y);

        // Rows of the upper 3x3 are the camera's right/up/back axes.
        let cols = [view.x_axis, view.y_axis, view.z_axis];
        let rows = [
            Vec3::new(cols[0].x, cols[1].x, cols[2].x),
            Vec3::new(cols[0].y, cols[1].y, cols[2].y),
            Vec3::new(cols[0].z, cols[1].z, cols[2].z),
        ];
        for i in 0..3 {
            assert!((rows[i].length() - 1.0).abs() < EPS, "row {i} not unit");
            for j in (i + 1)..3 {
                assert!(rows[i].dot(rows[j]).abs() < EPS, "rows {i},{j} not orthogonal");
            }
        }
    }

    #[test]
    fn look_at_normal_transform_only_rotates_directions() {
        let (view, normal) = look_at(Vec3::new(0.0, 2.0, 5.0), Vec3::new(1.0, 0.0, -2.0), Vec3::Y);

        // Directions (w = 0) see the rotational part of both transforms, so
        // the two agree on them and preserve length.
        let d = Vec4::new(0.0, 1.0, 0.0, 0.0);
        let a = (normal * d).truncate();
        let b = (view * d).truncate();
        assert!((a - b).length() < EPS);
        assert!((a.length() - 1.0).abs() < EPS);
    }

    #[test]
    fn viewport_maps_ndc_corners_to_pixels() {
        let vp = viewport(0.0, 0.0, 1024.0, 768.0);
        let lo = vp * Vec4::new(-1.0, -1.0, -1.0, 1.0);
        let hi = vp * Vec4::new(1.0, 1.0, 1.0, 1.0);
        assert!(lo.truncate().length() < EPS);
        assert!((hi.x - 1024.0).abs() < EPS);
        assert!((hi.y - 768.0).abs() < EPS);
        assert!((hi.z - 1.0).abs() < EPS);
    }
}
