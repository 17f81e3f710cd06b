//! Pure assembly of the per-frame snapshot the GPU backend consumes.
//!
//! The backend (wgpu, in the web app crate) takes a [`RenderFrame`] and
//! writes it into its uniform buffer verbatim; everything here is plain
//! data so the composition step is host-testable.

use foundation::math::mat::Mat4;
use motion::scroll::Viewport;
use scene::camera::PerspectiveCamera;
use scene::material::UniformSet;
use scene::transform::MeshTransform;

/// Everything the backend needs to draw one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderFrame {
    pub view_proj: Mat4,
    pub model: Mat4,
    /// Shader uniforms in `UniformKey::ALL` order.
    pub uniforms: [f32; 6],
    /// Viewport size in CSS pixels.
    pub viewport: [f32; 2],
}

pub struct Renderer;

impl Renderer {
    pub fn compose(
        camera: &PerspectiveCamera,
        transform: &MeshTransform,
        uniforms: &UniformSet,
        viewport: Viewport,
    ) -> RenderFrame {
        RenderFrame {
            view_proj: camera.view_proj(),
            model: transform.model_matrix(),
            uniforms: uniforms.to_f32_array(),
            viewport: [viewport.width as f32, viewport.height as f32],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Renderer;
    use foundation::math::vec::Vec3;
    use motion::scroll::Viewport;
    use scene::camera::PerspectiveCamera;
    use scene::material::{AnimationSettings, UniformKey, UniformSet};
    use scene::transform::MeshTransform;

    #[test]
    fn compose_carries_uniforms_and_viewport() {
        let camera = PerspectiveCamera::new(75.0, 16.0 / 9.0, 0.1, 10.0, Vec3::new(0.0, 0.0, 2.5));
        let mut uniforms = UniformSet::from_settings(&AnimationSettings::default());
        uniforms.set(UniformKey::Frequency, 2.0);

        let frame = Renderer::compose(
            &camera,
            &MeshTransform::identity(),
            &uniforms,
            Viewport::new(1280.0, 720.0),
        );

        assert_eq!(frame.uniforms[0], 2.0f32);
        assert_eq!(frame.viewport, [1280.0, 720.0]);
        assert_eq!(frame.view_proj, camera.view_proj());
    }

    #[test]
    fn model_matrix_tracks_transform() {
        let camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 10.0, Vec3::new(0.0, 0.0, 2.5));
        let pose = MeshTransform {
            rotation_x: 0.3,
            rotation_y: 1.2,
            scale: 0.75,
        };
        let frame = Renderer::compose(
            &camera,
            &pose,
            &UniformSet::from_settings(&AnimationSettings::default()),
            Viewport::new(800.0, 600.0),
        );
        assert_eq!(frame.model, pose.model_matrix());
    }
}
