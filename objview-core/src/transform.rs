/// Model transforms and the per-tick spin state
use nalgebra::{Matrix4, Vector3};

/// Rotation around three axes (in radians)
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
        Self::new(0.0, 0.0, 0.0)
    }

    /// Rotate by delta amounts (in radians), keeping each angle within one turn
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        let tau = std::f32::consts::TAU;
        self.x = (self.x + dx).rem_euclid(tau);
        self.y = (self.y + dy).rem_euclid(tau);
        self.z = (self.z + dz).rem_euclid(tau);
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

pub struct Transform;

impl Transform {
    /// Rotation matrix applying X, then Y, then Z
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));
        rz * ry * rx
    }

    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Inverse-transpose of the upper 3x3 block, used to carry normals into eye space
    pub fn normal_matrix(model_view: &Matrix4<f32>) -> Matrix4<f32> {
        let linear = model_view.fixed_view::<3, 3>(0, 0).into_owned();
        let normal = linear
            .try_inverse()
            .map(|inverse| inverse.transpose())
            .unwrap_or(linear);
        normal.to_homogeneous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_state_wraps() {
        let mut state = RotationState::zero();
        state.rotate(0.1, 0.2, 0.3);
        assert!((state.x - 0.1).abs() < 1e-6);
        assert!((state.y - 0.2).abs() < 1e-6);
        assert!((state.z - 0.3).abs() < 1e-6);

        state.rotate(std::f32::consts::TAU, 0.0, -0.4);
        assert!((state.x - 0.1).abs() < 1e-5);
        assert!(state.z >= 0.0 && state.z < std::f32::consts::TAU);
    }

    #[test]
    fn test_identity_rotation() {
        let matrix = Transform::rotation_matrix(&RotationState::zero());
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_normal_matrix_ignores_translation() {
        let model_view = Transform::translation_matrix(0.0, 0.0, -15.0);
        let normal = Transform::normal_matrix(&model_view);
        assert!((normal - Matrix4::identity()).norm() < 1e-6);
    }
}
