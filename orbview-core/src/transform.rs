/// Model transforms: translate / euler rotate / scale, and the normal matrix
use nalgebra::{Matrix3, Matrix4, Vector3};

/// Rotation around three axes (in radians), applied X then Y then Z
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Placement of a model in the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translate: Vector3<f32>,
    pub rotate: RotationState,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub fn new(translate: [f32; 3], rotate: [f32; 3], scale: [f32; 3]) -> Self {
        Self {
            translate: Vector3::from(translate),
            rotate: RotationState::new(rotate[0], rotate[1], rotate[2]),
            scale: Vector3::from(scale),
        }
    }

    pub fn identity() -> Self {
        Self {
            translate: Vector3::zeros(),
            rotate: RotationState::zero(),
            scale: Vector3::repeat(1.0),
        }
    }

    /// Model-to-world matrix.
    ///
    /// Each step right-multiplies onto identity: translate, rotate X,
    /// rotate Y, rotate Z, scale. Vertices therefore see the scale first and
    /// the translation last.
    pub fn world_matrix(&self) -> Matrix4<f32> {
        Self::translation_matrix(self.translate)
            * Self::rotation_matrix(&self.rotate)
            * Self::scale_matrix(self.scale)
    }

    /// Create a rotation matrix from a rotation state
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

        rx * ry * rz
    }

    pub fn translation_matrix(translate: Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(&translate)
    }

    pub fn scale_matrix(scale: Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Inverse-transpose of the upper-left 3x3 of `view_model`.
///
/// Returns identity when that block is singular, so degenerate scales never
/// push NaNs into shading.
pub fn normal_matrix(view_model: &Matrix4<f32>) -> Matrix3<f32> {
    let linear: Matrix3<f32> = view_model.fixed_view::<3, 3>(0, 0).into_owned();

    match linear.try_inverse() {
        Some(inverse) if inverse.iter().all(|v| v.is_finite()) => inverse.transpose(),
        _ => {
            log::warn!("view-model matrix is singular, using identity normal matrix");
            Matrix3::identity()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector4};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_rotation_state() {
        let state = RotationState::default();
        assert_eq!(state, RotationState::zero());

        let state = RotationState::new(0.1, 0.2, 0.3);
        assert_eq!((state.x, state.y, state.z), (0.1, 0.2, 0.3));
    }

    #[test]
    fn test_identity_rotation() {
        let rotation = RotationState::zero();
        let matrix = Transform::rotation_matrix(&rotation);
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_identity_transform_is_identity_matrix() {
        assert_eq!(Transform::identity().world_matrix(), Matrix4::identity());
    }

    #[test]
    fn test_scale_applies_before_translate() {
        let transform = Transform::new([1.0, 2.0, 3.0], [0.0, 0.0, 0.0], [2.0, 2.0, 2.0]);
        let p = transform
            .world_matrix()
            .transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert!((p - Point3::new(3.0, 4.0, 5.0)).norm() < 1e-6);
    }

    #[test]
    fn test_rotation_order_x_then_y_then_z() {
        // With M = Rx * Ry * Rz a vertex is rotated about Z first.
        let transform = Transform::new([0.0; 3], [FRAC_PI_2, 0.0, FRAC_PI_2], [1.0; 3]);
        let v = transform.world_matrix() * Vector4::new(1.0, 0.0, 0.0, 0.0);
        // Rz: x -> y, then Rx: y -> z
        assert!((v - Vector4::new(0.0, 0.0, 1.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_normal_matrix_under_nonuniform_scale() {
        let transform = Transform::new([0.5, 0.0, 0.0], [0.0, 0.3, 0.0], [0.8, 0.5, 0.5]);
        let world = transform.world_matrix();
        let normal = normal_matrix(&world);

        // A tangent in the x/y plane and the z normal stay perpendicular
        let tangent = world.fixed_view::<3, 3>(0, 0) * Vector3::new(1.0, 1.0, 0.0);
        let n = normal * Vector3::z();
        assert!(tangent.dot(&n).abs() < 1e-5);
    }

    #[test]
    fn test_normal_matrix_singular_falls_back_to_identity() {
        let transform = Transform::new([0.0; 3], [0.0; 3], [0.0, 1.0, 1.0]);
        let normal = normal_matrix(&transform.world_matrix());
        assert_eq!(normal, Matrix3::identity());
    }
}
