//! Placement descriptors for loaded models.

use cgmath::{Deg, Matrix4, Vector3, Zero};

/// Where and how a model sits in the scene.
///
/// Immutable once handed to a load call. Defaults to the identity
/// placement: origin, no rotation, unit scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vector3<f32>,
    /// Euler rotation in degrees, applied X then Y then Z.
    pub rotation: [Deg<f32>; 3],
    /// Uniform scale factor.
    pub scale: f32,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: [Deg(0.0); 3],
            scale: 1.0,
        }
    }
}

impl Placement {
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, x: Deg<f32>, y: Deg<f32>, z: Deg<f32>) -> Self {
        self.rotation = [x, y, z];
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Composes the placement into a model matrix. Order matters: T * R * S,
    /// with the Euler axes applied X first.
    pub fn matrix(&self) -> Matrix4<f32> {
        let t = Matrix4::from_translation(self.position);
        let r = Matrix4::from_angle_z(self.rotation[2])
            * Matrix4::from_angle_y(self.rotation[1])
            * Matrix4::from_angle_x(self.rotation[0]);
        let s = Matrix4::from_scale(self.scale);
        t * r * s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::SquareMatrix;

    #[test]
    fn default_is_identity() {
        let placement = Placement::default();
        assert_eq!(placement.position, Vector3::zero());
        assert_eq!(placement.rotation, [Deg(0.0); 3]);
        assert_eq!(placement.scale, 1.0);

        let matrix = placement.matrix();
        let identity = Matrix4::<f32>::identity();
        for i in 0..4 {
            for j in 0..4 {
                assert!((matrix[i][j] - identity[i][j]).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn translation_lands_in_last_column() {
        let matrix = Placement::at(5.0, -1.0, 2.5).matrix();
        assert_eq!(matrix[3][0], 5.0);
        assert_eq!(matrix[3][1], -1.0);
        assert_eq!(matrix[3][2], 2.5);
    }

    #[test]
    fn uniform_scale_scales_basis_vectors() {
        let matrix = Placement::default().with_scale(2.0).matrix();
        assert_eq!(matrix[0][0], 2.0);
        assert_eq!(matrix[1][1], 2.0);
        assert_eq!(matrix[2][2], 2.0);
    }

    #[test]
    fn y_rotation_turns_x_axis_toward_negative_z() {
        let matrix = Placement::default()
            .with_rotation(Deg(0.0), Deg(90.0), Deg(0.0))
            .matrix();
        // Rotating +X by 90 degrees around Y yields -Z.
        let x_axis = matrix[0];
        assert!((x_axis[0]).abs() < 1e-6);
        assert!((x_axis[2] + 1.0).abs() < 1e-6);
    }
}
