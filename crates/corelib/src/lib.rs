//! Core types: math re-exports, Transform, Camera, animation evaluators.

pub use glam::{Mat4, Quat, Vec3, vec3};

pub mod animation;
pub mod camera;
pub mod transform;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_transform_is_identity_matrix() {
        let t = transform::Transform::identity();
        assert_eq!(t.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn translate_then_scale_matrix() {
        let t = transform::Transform::from_trs(
            vec3(1.0, 2.0, 3.0),
            vec3(0.0, 0.0, 0.0),
            vec3(2.0, 2.0, 2.0),
        );
        // Last column is the translation, the diagonal the scale (no rotation).
        let m = t.matrix().to_cols_array();
        assert!((m[12] - 1.0).abs() < 1e-6);
        assert!((m[13] - 2.0).abs() < 1e-6);
        assert!((m[14] - 3.0).abs() < 1e-6);
        assert!((m[0] - 2.0).abs() < 1e-6);
        assert!((m[5] - 2.0).abs() < 1e-6);
        assert!((m[10] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn rotation_is_in_degrees_x_then_y() {
        let t = transform::Transform::from_trs(Vec3::ZERO, vec3(90.0, 90.0, 0.0), Vec3::ONE);
        let expected = Mat4::from_rotation_x(90f32.to_radians()) * Mat4::from_rotation_y(90f32.to_radians());
        let p = t.matrix().transform_point3(vec3(1.0, 0.0, 0.0));
        let q = expected.transform_point3(vec3(1.0, 0.0, 0.0));
        assert!((p - q).length() < 1e-5);
    }

    #[test]
    fn camera_pv_is_finite() {
        let cam = camera::Camera::new_perspective(
            vec3(0.0, 0.0, 4.0),
            vec3(0.0, 0.0, 0.0),
            Vec3::Y,
            60f32.to_radians(),
            0.1,
            100.0,
            16.0 / 9.0,
        );
        let pv = cam.proj_view();
        let a = pv.to_cols_array();
        assert!(a.iter().all(|f| f.is_finite()));
    }

    #[test]
    fn camera_fly_keeps_direction() {
        let mut cam = camera::Camera::new_perspective(
            vec3(0.0, 0.0, 3.0),
            Vec3::ZERO,
            Vec3::Y,
            45f32.to_radians(),
            0.01,
            2000.0,
            1.0,
        );
        let before = cam.forward();
        let step = cam.right() * 2.0;
        cam.fly(step);
        assert!((cam.forward() - before).length() < 1e-6);
        assert!((cam.eye - vec3(2.0, 0.0, 3.0)).length() < 1e-6);
    }
}
