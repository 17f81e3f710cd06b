//! Soft scrolling over the native scrollbar.
//!
//! The browser keeps the real (hard) scroll position; `SmoothScroll` eases a
//! soft value toward it each frame and translates the page content by the
//! soft value, which reads as inertia. All document access goes through the
//! [`ScrollSurface`] trait so this module stays host-testable; the DOM
//! implementation lives in the web app crate.

use foundation::math::interp::{clamp, exp_step, round_dp};

/// Interpolation factor applied per frame when easing `soft` toward `hard`.
pub const SCROLL_EASE: f64 = 0.05;

/// Below this the eased value snaps to zero, cutting the infinite
/// exponential tail near the top of the page.
pub const SOFT_SNAP_THRESHOLD: f64 = 0.01;

/// Current window dimensions in CSS pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_portrait(&self) -> bool {
        self.width < self.height
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height.max(1.0)
    }
}

/// Shared scroll state, owned by [`SmoothScroll`] and read by the stage.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScrollState {
    /// Total scrollable content height (px).
    pub height: f64,
    /// Maximum scrollable offset: content height minus viewport height.
    pub limit: f64,
    /// Raw scroll offset, clamped to `[0, limit]`.
    pub hard: f64,
    /// Eased offset; approaches `hard` each frame, never clamped itself.
    pub soft: f64,
    /// Per-frame interpolation factor.
    pub ease: f64,
    /// Scroll progress in `[0, 1]`, one decimal; recomputed on scroll
    /// events only, not every frame.
    pub normalized: f64,
    /// Single in-flight token for the scroll-animation pass.
    pub running: bool,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            height: 0.0,
            limit: 0.0,
            hard: 0.0,
            soft: 0.0,
            ease: SCROLL_EASE,
            normalized: 0.0,
            running: false,
        }
    }
}

impl ScrollState {
    /// Scroll progress from the current hard offset, one decimal.
    ///
    /// Defined as 0 when there is no scroll range (`limit <= 0`), so a page
    /// shorter than the viewport never produces NaN.
    pub fn progress(&self) -> f64 {
        if self.limit <= 0.0 {
            0.0
        } else {
            round_dp(self.hard / self.limit, 1)
        }
    }
}

/// Document capabilities the scroller needs. One implementation wraps the
/// real DOM; tests substitute a fake.
pub trait ScrollSurface {
    /// Bounding-box height of the content element.
    fn content_rect_height(&self) -> f64;
    /// Layout (client) height of the content element.
    fn content_client_height(&self) -> f64;
    /// Current native scroll offset.
    fn scroll_offset(&self) -> f64;
    /// Stretch the document body so the native scrollbar spans the content.
    fn set_body_height(&mut self, px: f64);
    /// Translate the content element vertically by `px` CSS pixels.
    fn set_content_offset(&mut self, px: f64);
}

/// Eases the scroll offset and keeps the body sized to the content extent.
#[derive(Debug)]
pub struct SmoothScroll<S> {
    surface: S,
    viewport: Viewport,
    state: ScrollState,
}

impl<S: ScrollSurface> SmoothScroll<S> {
    pub fn new(surface: S, viewport: Viewport) -> Self {
        Self {
            surface,
            viewport,
            state: ScrollState::default(),
        }
    }

    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Measure the content and size the document body to match.
    ///
    /// Must run before the first [`update`](Self::update) and again after
    /// every resize. The scroll limit floors at zero for content shorter
    /// than the viewport.
    pub fn set_sizes(&mut self) {
        self.state.height = self.surface.content_rect_height();
        self.state.limit = (self.surface.content_client_height() - self.viewport.height).max(0.0);
        self.surface.set_body_height(self.state.height);
    }

    /// Per-frame easing step: pull `hard` from the surface, clamp it, move
    /// `soft` toward it and push the translation to the content element.
    pub fn update(&mut self) {
        self.state.hard = clamp(self.surface.scroll_offset(), 0.0, self.state.limit);
        self.state.soft = exp_step(self.state.soft, self.state.hard, self.state.ease);

        if self.state.soft < SOFT_SNAP_THRESHOLD {
            self.state.soft = 0.0;
        }

        self.surface.set_content_offset(-self.state.soft);
    }

    pub fn on_resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.set_sizes();
    }

    /// Claim the scroll-animation token. Returns `true` when the caller
    /// should schedule a pass; `false` while one is already pending, which
    /// coalesces event bursts to at most one pass per frame.
    pub fn begin_scroll_pass(&mut self) -> bool {
        if self.state.running {
            return false;
        }
        self.state.running = true;
        true
    }

    /// Release the token and recompute `normalized` from the current hard
    /// offset. Returns the new progress value.
    pub fn finish_scroll_pass(&mut self) -> f64 {
        self.state.running = false;
        self.state.normalized = self.state.progress();
        self.state.normalized
    }
}

/// Test support: an in-memory [`ScrollSurface`] for host tests of code that
/// is generic over the surface.
pub mod testing {
    use super::ScrollSurface;

    /// In-memory surface recording the writes a real DOM would receive.
    #[derive(Debug, Default)]
    pub struct FakeSurface {
        pub rect_height: f64,
        pub client_height: f64,
        pub offset: f64,
        pub body_height: Option<f64>,
        pub content_offset: Option<f64>,
    }

    impl ScrollSurface for FakeSurface {
        fn content_rect_height(&self) -> f64 {
            self.rect_height
        }

        fn content_client_height(&self) -> f64 {
            self.client_height
        }

        fn scroll_offset(&self) -> f64 {
            self.offset
        }

        fn set_body_height(&mut self, px: f64) {
            self.body_height = Some(px);
        }

        fn set_content_offset(&mut self, px: f64) {
            self.content_offset = Some(px);
        }
    }
}
