//! Live map view: fitted projection, gesture transform and the cached
//! render pass.

use super::frame::FrameThrottle;
use super::gesture::GestureState;
use crate::geo::{self, CountryCollection, Fit, PathEntry, Projection};
use eframe::egui::{Pos2, Vec2};

/// Owns everything needed to turn the country collection into painted paths.
///
/// Layout changes and gesture updates only mark the view dirty; the
/// projection and paths are rebuilt at most once per frame in [`MapView::frame`].
pub struct MapView {
    collection: CountryCollection,
    viewport: Vec2,
    fit: Fit,
    gesture: GestureState,
    throttle: FrameThrottle,
    projection: Option<Projection>,
    paths: Vec<PathEntry>,
    recomputes: u64,
}

impl MapView {
    pub fn new(collection: CountryCollection, min_zoom: f32, max_zoom: f32) -> Self {
        Self {
            collection,
            viewport: Vec2::ZERO,
            fit: Fit::degenerate(),
            gesture: GestureState::new(min_zoom, max_zoom),
            throttle: FrameThrottle::new(),
            projection: None,
            paths: Vec::new(),
            recomputes: 0,
        }
    }

    /// True once a usable viewport has been laid out.
    pub fn is_ready(&self) -> bool {
        !self.fit.is_degenerate()
    }

    /// Handles a layout change of the map surface.
    pub fn on_layout(&mut self, width: f32, height: f32) {
        let viewport = Vec2::new(width.round(), height.round());
        if viewport == self.viewport {
            return;
        }

        self.viewport = viewport;
        self.fit = geo::fit(viewport.x, viewport.y, &self.collection);
        if self.fit.is_degenerate() {
            log::debug!("Map viewport {}x{} is not drawable yet", width, height);
        } else {
            log::debug!(
                "Fitted map to {}x{}: scale {:.2}",
                viewport.x,
                viewport.y,
                self.fit.scale0
            );
        }
        self.gesture.set_viewport(viewport);
        self.throttle.request();
    }

    pub fn begin_pinch(&mut self) {
        if self.is_ready() {
            self.gesture.begin_pinch();
        }
    }

    /// Feeds the cumulative scale factor of the active pinch.
    pub fn pinch(&mut self, scale_factor: f32) {
        if self.is_ready() {
            self.gesture.apply_pinch_delta(scale_factor);
            self.throttle.request();
        }
    }

    /// Cumulative factor of the active pinch, 1.0 when none is active.
    pub fn live_scale(&self) -> f32 {
        self.gesture.live_scale()
    }

    pub fn end_pinch(&mut self) {
        self.gesture.end_pinch();
    }

    pub fn cancel_pinch(&mut self) {
        self.gesture.cancel_pinch();
    }

    pub fn begin_pan(&mut self) {
        if self.is_ready() {
            self.gesture.begin_pan();
        }
    }

    /// Feeds the cumulative translation of the active pan.
    pub fn pan(&mut self, translation: Vec2) {
        if self.is_ready() {
            self.gesture.apply_pan_delta(translation);
            self.throttle.request();
        }
    }

    pub fn end_pan(&mut self) {
        self.gesture.end_pan();
    }

    pub fn cancel_pan(&mut self) {
        self.gesture.cancel_pan();
    }

    /// Returns to the fitted view.
    pub fn reset_view(&mut self) {
        self.gesture.reset();
        self.throttle.request();
    }

    /// The projection for the current zoom and pan.
    pub fn live_projection(&self) -> Option<Projection> {
        if !self.is_ready() {
            return None;
        }
        Some(Projection::new(
            self.fit.scale0 * self.gesture.zoom() as f64,
            self.fit.translate0 + self.gesture.offset(),
            self.viewport.x,
            self.viewport.y,
        ))
    }

    /// Runs the pending recompute, if any. Call once per frame.
    ///
    /// Returns true if the paths were rebuilt.
    pub fn frame(&mut self) -> bool {
        if !self.throttle.take() {
            return false;
        }

        self.projection = self.live_projection();
        self.paths = match &self.projection {
            Some(projection) => geo::build_path_entries(&self.collection, projection),
            None => Vec::new(),
        };
        self.recomputes += 1;
        log::trace!(
            "Render pass {}: {} paths ({} requests coalesced so far)",
            self.recomputes,
            self.paths.len(),
            self.throttle.coalesced()
        );
        true
    }

    /// Projection used by the current render pass.
    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    /// Paths of the current render pass.
    pub fn paths(&self) -> &[PathEntry] {
        &self.paths
    }

    /// Finds the country under a viewport position.
    pub fn hit(&self, pos: Pos2) -> Option<&PathEntry> {
        geo::hit_test(&self.paths, pos)
    }
}

#[cfg(test)]
impl MapView {
    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    /// Number of render passes built so far.
    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }
}
