use foundation::math::mat::{
    Mat4, mat4_mul, mat4_rotation_x, mat4_rotation_y, mat4_scale_uniform,
};

/// Stage mesh pose: scroll-driven tilt, idle spin, orientation-dependent
/// scale.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeshTransform {
    pub rotation_x: f64,
    pub rotation_y: f64,
    pub scale: f64,
}

impl MeshTransform {
    pub fn identity() -> Self {
        Self {
            rotation_x: 0.0,
            rotation_y: 0.0,
            scale: 1.0,
        }
    }

    /// Model matrix: scale first, then tilt (X), then spin (Y).
    pub fn model_matrix(&self) -> Mat4 {
        let rx = mat4_rotation_x(self.rotation_x);
        let ry = mat4_rotation_y(self.rotation_y);
        let s = mat4_scale_uniform(self.scale);
        mat4_mul(ry, mat4_mul(rx, s))
    }
}
