use foundation::math::mat::{Mat4, mat4_look_at_rh, mat4_mul, mat4_perspective_rh};
use foundation::math::vec::Vec3;

/// Perspective camera looking at the scene origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_y_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    pub position: Vec3,
}

impl PerspectiveCamera {
    pub fn new(fov_y_deg: f64, aspect: f64, near: f64, far: f64, position: Vec3) -> Self {
        Self {
            fov_y_deg,
            aspect,
            near,
            far,
            position,
        }
    }

    /// Update the aspect ratio after a viewport resize. The projection is
    /// recomputed lazily in [`view_proj`](Self::view_proj).
    pub fn set_aspect(&mut self, aspect: f64) {
        self.aspect = aspect.max(1e-6);
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = mat4_look_at_rh(
            self.position,
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let proj = mat4_perspective_rh(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far);
        mat4_mul(proj, view)
    }
}
