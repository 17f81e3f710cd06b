//! Scroll stage: binds scroll progress to the wireframe material and mesh
//! pose, and owns the per-frame simulation step.
//!
//! This module is pure (no DOM, no GPU), so the whole scroll-to-uniform
//! pipeline is unit-testable on the host. The browser shell in `lib.rs`
//! feeds it events and hands its per-frame snapshot to the wgpu backend.

use std::f64::consts::PI;

use foundation::math::interp::round_dp;
use foundation::math::vec::Vec3;
use gpu::{RenderFrame, Renderer};
use motion::frame::Frame;
use motion::scroll::{ScrollState, ScrollSurface, SmoothScroll, Viewport};
use motion::tween::{TweenDefaults, Tweener};
use scene::camera::PerspectiveCamera;
use scene::material::{AnimationSettings, UniformKey, UniformSet};
use scene::transform::MeshTransform;

pub const CAMERA_FOV_Y_DEG: f64 = 75.0;
pub const CAMERA_NEAR: f64 = 0.1;
pub const CAMERA_FAR: f64 = 10.0;
pub const CAMERA_DISTANCE: f64 = 2.5;

/// Idle spin around Y, layered under the scroll-driven X tilt (rad/s).
pub const IDLE_SPIN_RATE: f64 = 0.05;

/// Mesh scale presets; portrait viewports get the smaller mesh.
pub const PORTRAIT_SCALE: f64 = 0.75;
pub const LANDSCAPE_SCALE: f64 = 1.0;

/// Ceiling on the device pixel ratio so ultra-high-DPI displays do not
/// quadruple the fill cost.
pub const MAX_PIXEL_RATIO: f64 = 1.5;

/// Cap on the per-frame delta to avoid large jumps after a background tab.
pub const MAX_FRAME_DT_S: f64 = 0.1;

/// Tweened properties. One channel per target so overwrite semantics apply
/// per property.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StageChannel {
    RotationX,
    Uniform(UniformKey),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StageConfig {
    /// Pointer-driven uniform targets. Off by default; the interaction is
    /// kept behind this flag rather than wired unconditionally.
    pub pointer_parallax: bool,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            pointer_parallax: false,
        }
    }
}

/// What the shell must apply to the canvas and GPU surface after a resize.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ResizeOutcome {
    pub physical_width: u32,
    pub physical_height: u32,
    pub pixel_ratio: f64,
}

pub struct ScrollStage<S> {
    config: StageConfig,
    smooth: SmoothScroll<S>,
    settings: AnimationSettings,
    uniforms: UniformSet,
    transform: MeshTransform,
    camera: PerspectiveCamera,
    tweener: Tweener<StageChannel>,
    frame: Frame,
    started_at_s: Option<f64>,
    last_now_s: Option<f64>,
}

impl<S: ScrollSurface> ScrollStage<S> {
    pub fn new(surface: S, viewport: Viewport, config: StageConfig) -> Self {
        let settings = AnimationSettings::default();
        Self {
            config,
            smooth: SmoothScroll::new(surface, viewport),
            uniforms: UniformSet::from_settings(&settings),
            settings,
            transform: MeshTransform::identity(),
            camera: PerspectiveCamera::new(
                CAMERA_FOV_Y_DEG,
                viewport.aspect(),
                CAMERA_NEAR,
                CAMERA_FAR,
                Vec3::new(0.0, 0.0, CAMERA_DISTANCE),
            ),
            tweener: Tweener::new(TweenDefaults::default()),
            frame: Frame::zero(),
            started_at_s: None,
            last_now_s: None,
        }
    }

    pub fn set_pointer_parallax(&mut self, enabled: bool) {
        self.config.pointer_parallax = enabled;
    }

    pub fn scroll(&self) -> &ScrollState {
        self.smooth.state()
    }

    pub fn uniforms(&self) -> &UniformSet {
        &self.uniforms
    }

    pub fn transform(&self) -> &MeshTransform {
        &self.transform
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    /// Scroll event handler. Returns `true` when the caller should schedule
    /// one scroll-animation callback for the next frame; bursts within a
    /// frame return `false` after the first (single in-flight token).
    pub fn on_scroll(&mut self) -> bool {
        self.smooth.begin_scroll_pass()
    }

    /// The coalesced per-burst recompute: refresh `normalized` and retarget
    /// the rotation and every animated uniform. Settings whose endpoints are
    /// equal never issue a tween.
    pub fn update_scroll_animations(&mut self) {
        let normalized = self.smooth.finish_scroll_pass();

        self.tweener.go(
            StageChannel::RotationX,
            self.transform.rotation_x,
            normalized * PI,
        );

        for (key, setting) in self.settings.iter() {
            if setting.is_animated() {
                self.tweener.go(
                    StageChannel::Uniform(key),
                    self.uniforms.get(key),
                    setting.target(normalized),
                );
            }
        }
    }

    /// Resize: pick the scale preset, remeasure the scroll extent, refresh
    /// the camera aspect and clamp the device pixel ratio.
    pub fn on_resize(&mut self, viewport: Viewport, device_pixel_ratio: f64) -> ResizeOutcome {
        self.transform.scale = if viewport.is_portrait() {
            PORTRAIT_SCALE
        } else {
            LANDSCAPE_SCALE
        };

        self.smooth.on_resize(viewport);
        self.camera.set_aspect(viewport.aspect());

        let pixel_ratio = device_pixel_ratio.min(MAX_PIXEL_RATIO);
        ResizeOutcome {
            physical_width: (viewport.width * pixel_ratio).round().max(1.0) as u32,
            physical_height: (viewport.height * pixel_ratio).round().max(1.0) as u32,
            pixel_ratio,
        }
    }

    /// Pointer handler for the opt-in parallax interaction: maps the pointer
    /// position to frequency/amplitude (x) and density/strength (y) targets
    /// through the same tween channels the scroll path uses.
    pub fn on_pointer_move(&mut self, x_px: f64, y_px: f64) {
        if !self.config.pointer_parallax {
            return;
        }

        let viewport = self.smooth.viewport();
        let mx = round_dp(x_px / viewport.width.max(1.0), 2) * 4.0;
        let my = round_dp(y_px / viewport.height.max(1.0), 2) * 2.0;

        for key in [UniformKey::Frequency, UniformKey::Amplitude] {
            self.tweener
                .go(StageChannel::Uniform(key), self.uniforms.get(key), mx);
        }
        for key in [UniformKey::Density, UniformKey::Strength] {
            self.tweener
                .go(StageChannel::Uniform(key), self.uniforms.get(key), my);
        }
    }

    /// Per-frame step: idle spin, tween advancement, soft-scroll easing.
    /// `now_s` is wall-clock seconds; the first call anchors the timebase.
    pub fn advance(&mut self, now_s: f64) {
        let started = *self.started_at_s.get_or_insert(now_s);
        let dt = (now_s - self.last_now_s.unwrap_or(now_s)).clamp(0.0, MAX_FRAME_DT_S);
        self.last_now_s = Some(now_s);
        self.frame = self.frame.advanced(dt);

        self.transform.rotation_y = (now_s - started) * IDLE_SPIN_RATE;

        for (channel, value) in self.tweener.step(self.frame.dt_s) {
            match channel {
                StageChannel::RotationX => self.transform.rotation_x = value,
                StageChannel::Uniform(key) => self.uniforms.set(key, value),
            }
        }

        self.smooth.update();
    }

    /// Snapshot for the GPU backend.
    pub fn render_frame(&self) -> RenderFrame {
        Renderer::compose(
            &self.camera,
            &self.transform,
            &self.uniforms,
            self.smooth.viewport(),
        )
    }

    #[cfg(test)]
    fn tweener(&self) -> &Tweener<StageChannel> {
        &self.tweener
    }
}

#[cfg(test)]
mod tests {
    use super::{
        LANDSCAPE_SCALE, MAX_PIXEL_RATIO, PORTRAIT_SCALE, ResizeOutcome, ScrollStage, StageChannel,
        StageConfig,
    };
    use motion::scroll::Viewport;
    use motion::scroll::testing::FakeSurface;
    use scene::material::UniformKey;
    use std::f64::consts::PI;

    fn stage() -> ScrollStage<FakeSurface> {
        stage_with_config(StageConfig::default())
    }

    fn stage_with_config(config: StageConfig) -> ScrollStage<FakeSurface> {
        let surface = FakeSurface {
            rect_height: 3000.0,
            client_height: 3000.0,
            ..FakeSurface::default()
        };
        let viewport = Viewport::new(1280.0, 720.0);
        let mut stage = ScrollStage::new(surface, viewport, config);
        stage.on_resize(viewport, 1.0);
        stage
    }

    fn scroll_to(stage: &mut ScrollStage<FakeSurface>, offset: f64) {
        stage.smooth.surface_mut().offset = offset;
        stage.advance_hard();
    }

    impl ScrollStage<FakeSurface> {
        /// Pull the hard offset without waiting for the easing tail.
        fn advance_hard(&mut self) {
            self.smooth.update();
        }
    }

    #[test]
    fn portrait_resize_shrinks_mesh() {
        let mut stage = stage();
        stage.on_resize(Viewport::new(600.0, 900.0), 1.0);
        assert_eq!(stage.transform().scale, PORTRAIT_SCALE);

        stage.on_resize(Viewport::new(900.0, 600.0), 1.0);
        assert_eq!(stage.transform().scale, LANDSCAPE_SCALE);
    }

    #[test]
    fn resize_clamps_device_pixel_ratio() {
        let mut stage = stage();
        let outcome = stage.on_resize(Viewport::new(1000.0, 500.0), 2.0);
        assert_eq!(
            outcome,
            ResizeOutcome {
                physical_width: 1500,
                physical_height: 750,
                pixel_ratio: MAX_PIXEL_RATIO,
            }
        );

        let outcome = stage.on_resize(Viewport::new(1000.0, 500.0), 1.0);
        assert_eq!(outcome.pixel_ratio, 1.0);
        assert_eq!(outcome.physical_width, 1000);
    }

    #[test]
    fn resize_updates_camera_aspect() {
        let mut stage = stage();
        stage.on_resize(Viewport::new(800.0, 400.0), 1.0);
        assert_eq!(stage.camera().aspect, 2.0);
    }

    #[test]
    fn scroll_bursts_coalesce_to_one_pass() {
        let mut stage = stage();
        assert!(stage.on_scroll());
        assert!(!stage.on_scroll());
        assert!(!stage.on_scroll());

        stage.update_scroll_animations();
        assert!(stage.on_scroll());
    }

    #[test]
    fn scroll_pass_targets_rotation_and_animated_uniforms() {
        let mut stage = stage();
        // limit = 3000 - 720 = 2280; half-way, rounded to one decimal.
        scroll_to(&mut stage, 1140.0);

        stage.on_scroll();
        stage.update_scroll_animations();

        let n = stage.scroll().normalized;
        assert_eq!(n, 0.5);
        assert_eq!(
            stage.tweener().target_of(StageChannel::RotationX),
            Some(n * PI)
        );
        // start=0, end=4 at n=0.5 -> 2.
        assert_eq!(
            stage
                .tweener()
                .target_of(StageChannel::Uniform(UniformKey::Frequency)),
            Some(2.0)
        );
        // Equal-endpoint settings never tween.
        assert_eq!(
            stage
                .tweener()
                .target_of(StageChannel::Uniform(UniformKey::Amplitude)),
            None
        );
        assert_eq!(
            stage
                .tweener()
                .target_of(StageChannel::Uniform(UniformKey::Density)),
            None
        );
    }

    #[test]
    fn uniforms_settle_on_scroll_targets() {
        let mut stage = stage();
        scroll_to(&mut stage, 2280.0);
        stage.on_scroll();
        stage.update_scroll_animations();

        stage.advance(0.0);
        // Default tween duration is 6.6 s; step well past it in capped
        // increments.
        for i in 1..=100 {
            stage.advance(i as f64 * 0.1);
        }

        assert_eq!(stage.uniforms().get(UniformKey::Frequency), 4.0);
        assert_eq!(stage.uniforms().get(UniformKey::Strength), 1.1);
        assert_eq!(stage.uniforms().get(UniformKey::ColorMix), 0.0);
        assert_eq!(stage.uniforms().get(UniformKey::Opacity), 0.66);
        assert!((stage.transform().rotation_x - PI).abs() < 1e-12);
    }

    #[test]
    fn idle_spin_tracks_elapsed_time() {
        let mut stage = stage();
        stage.advance(10.0);
        assert_eq!(stage.transform().rotation_y, 0.0);

        stage.advance(12.0);
        assert!((stage.transform().rotation_y - 2.0 * super::IDLE_SPIN_RATE).abs() < 1e-12);
    }

    #[test]
    fn advance_drives_the_frame_timebase() {
        let mut stage = stage();
        stage.advance(5.0);
        stage.advance(5.05);
        let frame = stage.frame();
        assert_eq!(frame.index, 2);
        assert!((frame.dt_s - 0.05).abs() < 1e-12);
        // The first frame anchors the clock; only the second contributes dt.
        assert!((frame.time.0 - 0.05).abs() < 1e-12);
    }

    #[test]
    fn pointer_parallax_is_inert_by_default() {
        let mut stage = stage();
        stage.on_pointer_move(640.0, 360.0);
        assert!(stage.tweener().is_idle());
    }

    #[test]
    fn pointer_parallax_targets_four_uniforms_when_enabled() {
        let mut stage = stage_with_config(StageConfig {
            pointer_parallax: true,
        });
        stage.on_pointer_move(640.0, 360.0);

        // x: round(640/1280, 2dp) * 4 = 2; y: round(360/720, 2dp) * 2 = 1.
        let tw = stage.tweener();
        assert_eq!(
            tw.target_of(StageChannel::Uniform(UniformKey::Frequency)),
            Some(2.0)
        );
        assert_eq!(
            tw.target_of(StageChannel::Uniform(UniformKey::Amplitude)),
            Some(2.0)
        );
        assert_eq!(
            tw.target_of(StageChannel::Uniform(UniformKey::Density)),
            Some(1.0)
        );
        assert_eq!(
            tw.target_of(StageChannel::Uniform(UniformKey::Strength)),
            Some(1.0)
        );
        assert_eq!(tw.target_of(StageChannel::RotationX), None);
    }

    #[test]
    fn render_frame_reflects_stage_state() {
        let mut stage = stage();
        stage.advance(0.0);
        let frame = stage.render_frame();
        assert_eq!(frame.viewport, [1280.0, 720.0]);
        assert_eq!(frame.uniforms[1], 4.0f32); // amplitude start
        assert_eq!(frame.model, stage.transform().model_matrix());
    }

    #[test]
    fn short_page_scroll_pass_is_well_defined() {
        let surface = FakeSurface {
            rect_height: 400.0,
            client_height: 400.0,
            ..FakeSurface::default()
        };
        let viewport = Viewport::new(1280.0, 720.0);
        let mut stage = ScrollStage::new(surface, viewport, StageConfig::default());
        stage.on_resize(viewport, 1.0);

        stage.on_scroll();
        stage.update_scroll_animations();
        assert_eq!(stage.scroll().normalized, 0.0);
        assert_eq!(stage.tweener().target_of(StageChannel::RotationX), Some(0.0));
    }
}
