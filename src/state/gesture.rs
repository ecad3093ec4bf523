//! Pinch/pan transform state.
//!
//! Two independent gesture tracks (pinch and pan) drive one shared zoom and
//! pixel offset. Each track remembers the values committed when its last
//! gesture ended; live updates are always relative to those.

use eframe::egui::Vec2;

/// Default lower zoom bound (multiplier on the fitted scale).
pub const MIN_ZOOM: f32 = 1.0;
/// Default upper zoom bound.
pub const MAX_ZOOM: f32 = 8.0;

pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

/// Largest pan distance along one axis that keeps zoomed content covering
/// the viewport.
pub fn max_shift(zoom: f32, dim: f32) -> f32 {
    ((dim * zoom - dim) / 2.0).max(0.0)
}

/// Bounds a pan offset along one axis for the given zoom.
pub fn clamp_offset(offset: f32, zoom: f32, dim: f32) -> f32 {
    let shift = max_shift(zoom, dim);
    clamp(offset, -shift, shift)
}

/// Lifecycle of one gesture track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrackState {
    #[default]
    Idle,
    Active,
}

/// Zoom and pan offset of the map.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureState {
    min_zoom: f32,
    max_zoom: f32,
    viewport: Vec2,

    /// Current zoom multiplier
    zoom: f32,
    /// Current pan offset in pixels
    offset: Vec2,

    committed_zoom: f32,
    committed_offset: Vec2,

    pinch: TrackState,
    pan: TrackState,

    /// Cumulative pinch factor of the active gesture (1.0 when idle)
    live_scale: f32,
    /// Cumulative translation of the active pan (zero when idle)
    live_translation: Vec2,
}

impl Default for GestureState {
    fn default() -> Self {
        Self::new(MIN_ZOOM, MAX_ZOOM)
    }
}

impl GestureState {
    pub fn new(min_zoom: f32, max_zoom: f32) -> Self {
        Self {
            min_zoom,
            max_zoom,
            viewport: Vec2::ZERO,
            zoom: min_zoom,
            offset: Vec2::ZERO,
            committed_zoom: min_zoom,
            committed_offset: Vec2::ZERO,
            pinch: TrackState::Idle,
            pan: TrackState::Idle,
            live_scale: 1.0,
            live_translation: Vec2::ZERO,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Cumulative scale factor of the active pinch (1.0 when idle).
    pub fn live_scale(&self) -> f32 {
        self.live_scale
    }

    /// Updates the viewport size and re-applies the pan bounds.
    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
        self.offset = self.clamp_to_viewport(self.offset);
        self.committed_offset = self.clamp_to_viewport(self.committed_offset);
    }

    fn clamp_to_viewport(&self, offset: Vec2) -> Vec2 {
        Vec2::new(
            clamp_offset(offset.x, self.zoom, self.viewport.x),
            clamp_offset(offset.y, self.zoom, self.viewport.y),
        )
    }

    pub fn begin_pinch(&mut self) {
        self.pinch = TrackState::Active;
        self.live_scale = 1.0;
    }

    /// Applies the cumulative scale factor of the active pinch.
    ///
    /// The offset is re-clamped against the new zoom, so a zoom-out pulls the
    /// map back inside its bounds.
    pub fn apply_pinch_delta(&mut self, scale_factor: f32) {
        if !scale_factor.is_finite() || scale_factor <= 0.0 {
            return;
        }
        if self.pinch == TrackState::Idle {
            self.begin_pinch();
        }

        // Keep the factor within what the zoom bounds can use, so that
        // reversing a pinch past a bound takes effect at once
        self.live_scale = clamp(
            scale_factor,
            self.min_zoom / self.committed_zoom,
            self.max_zoom / self.committed_zoom,
        );
        self.zoom = clamp(
            self.committed_zoom * self.live_scale,
            self.min_zoom,
            self.max_zoom,
        );
        self.offset = self.clamp_to_viewport(self.committed_offset + self.live_translation);
    }

    /// Commits the current zoom. Cancellation behaves the same way.
    pub fn end_pinch(&mut self) {
        if self.pinch == TrackState::Idle {
            return;
        }
        self.committed_zoom = self.zoom;
        if self.pan == TrackState::Idle {
            self.committed_offset = self.offset;
        }
        self.live_scale = 1.0;
        self.pinch = TrackState::Idle;
    }

    pub fn cancel_pinch(&mut self) {
        self.end_pinch();
    }

    pub fn begin_pan(&mut self) {
        self.pan = TrackState::Active;
        self.live_translation = Vec2::ZERO;
    }

    /// Applies the cumulative translation of the active pan.
    pub fn apply_pan_delta(&mut self, translation: Vec2) {
        if !translation.x.is_finite() || !translation.y.is_finite() {
            return;
        }
        if self.pan == TrackState::Idle {
            self.begin_pan();
        }

        self.live_translation = translation;
        self.offset = self.clamp_to_viewport(self.committed_offset + translation);
    }

    /// Commits the current offset. Cancellation behaves the same way.
    pub fn end_pan(&mut self) {
        if self.pan == TrackState::Idle {
            return;
        }
        self.committed_offset = self.offset;
        self.live_translation = Vec2::ZERO;
        self.pan = TrackState::Idle;
    }

    pub fn cancel_pan(&mut self) {
        self.end_pan();
    }

    /// Returns to the fitted view, dropping any active gesture.
    pub fn reset(&mut self) {
        let viewport = self.viewport;
        *self = Self::new(self.min_zoom, self.max_zoom);
        self.viewport = viewport;
    }
}

#[cfg(test)]
impl GestureState {
    pub fn committed_zoom(&self) -> f32 {
        self.committed_zoom
    }

    pub fn committed_offset(&self) -> Vec2 {
        self.committed_offset
    }

    pub fn pinch_state(&self) -> TrackState {
        self.pinch
    }

    pub fn pan_state(&self) -> TrackState {
        self.pan
    }

    /// Pan bounds for the current zoom, per axis.
    pub fn max_shift(&self) -> Vec2 {
        Vec2::new(
            max_shift(self.zoom, self.viewport.x),
            max_shift(self.zoom, self.viewport.y),
        )
    }
}
