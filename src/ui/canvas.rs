//! Central canvas UI: the world map.

use super::colors;
use crate::geo::{self, MapStyle};
use crate::state::{AppState, MapView};
use eframe::egui::{self, Align2, FontId, Pos2, Rect, Sense, Vec2};
use web_time::Instant;

/// Zoom change per point of vertical wheel scroll, applied exponentially.
const WHEEL_ZOOM_RATE: f32 = 0.001;

/// Gesture progress carried between frames.
///
/// egui reports per-frame deltas; the map view expects the cumulative
/// scale and translation of the active gesture.
#[derive(Debug, Default)]
pub struct CanvasInput {
    pinching: bool,
    pan_translation: Option<Vec2>,
}

impl CanvasInput {
    /// Feeds one frame of zoom input. `factor` is this frame's relative zoom;
    /// 1.0 means no zoom input, which ends the pinch unless fingers are down.
    fn zoom(&mut self, map: &mut MapView, factor: f32, touching: bool) {
        if factor.is_finite() && factor > 0.0 && factor != 1.0 {
            if !self.pinching {
                self.pinching = true;
                map.begin_pinch();
            }
            map.pinch(map.live_scale() * factor);
        } else if self.pinching && !touching {
            self.pinching = false;
            map.end_pinch();
        }
    }

    fn begin_pan(&mut self, map: &mut MapView) {
        self.pan_translation = Some(Vec2::ZERO);
        map.begin_pan();
    }

    fn pan(&mut self, map: &mut MapView, delta: Vec2) {
        let translation = self.pan_translation.unwrap_or_default() + delta;
        self.pan_translation = Some(translation);
        map.pan(translation);
    }

    fn end_pan(&mut self, map: &mut MapView) {
        if self.pan_translation.take().is_some() {
            map.end_pan();
        }
    }

    /// Abandons any gesture in progress, keeping the view where it is.
    fn cancel(&mut self, map: &mut MapView) {
        if std::mem::take(&mut self.pinching) {
            map.cancel_pinch();
        }
        if self.pan_translation.take().is_some() {
            map.cancel_pan();
        }
    }

    fn is_active(&self) -> bool {
        self.pinching || self.pan_translation.is_some()
    }
}

/// Relative zoom for one frame of wheel scrolling. Always positive.
fn wheel_zoom_factor(scroll_y: f32) -> f32 {
    (scroll_y * WHEEL_ZOOM_RATE).exp()
}

/// Render the map, or the reason it cannot be shown.
pub fn render_canvas(ctx: &egui::Context, state: &mut AppState, input: &mut CanvasInput) {
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE)
        .show(ctx, |ui| {
            let available_size = ui.available_size();
            let (response, painter) = ui.allocate_painter(available_size, Sense::click_and_drag());
            let rect = response.rect;

            let style = MapStyle::default();
            painter.rect_filled(rect, 0.0, style.ocean);

            if let Some(message) = &state.geometry_error {
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    format!("Unable to load the map.\n{}", message),
                    FontId::proportional(14.0),
                    colors::canvas::ERROR_TEXT,
                );
                return;
            }

            let Some(map) = state.map.as_mut() else {
                return;
            };
            map.on_layout(rect.width(), rect.height());
            handle_gestures(&response, map, input);

            if let Some(pointer) = response.hover_pos() {
                let pos = (pointer - rect.min).to_pos2();
                if let Some(entry) = map.hit(pos) {
                    response.clone().on_hover_text_at_pointer(entry.name.as_str());
                }
                render_cursor_readout(&painter, rect, map, pos);
            }

            if response.double_clicked() {
                map.reset_view();
            } else if response.clicked() && !state.is_loading() {
                if let Some(pointer) = response.interact_pointer_pos() {
                    let pos = (pointer - rect.min).to_pos2();
                    state.handle_tap(pos, Instant::now());
                }
            }

            let AppState { map, selection, .. } = state;
            let Some(map) = map.as_mut() else {
                return;
            };
            map.frame();
            geo::paint_paths(
                &painter,
                map.paths(),
                rect.min.to_vec2(),
                &style,
                |iso| selection.contains(iso),
            );

            if !selection.is_loaded() {
                render_loading(ui, rect);
            }
        });
}

fn handle_gestures(response: &egui::Response, map: &mut MapView, input: &mut CanvasInput) {
    let ctx = &response.ctx;

    // Focus loss, a cancelled touch, or the pointer leaving mid-drag all end
    // the gesture without a release
    let interrupted = ctx.input(|i| {
        !i.focused
            || (input.pan_translation.is_some() && !i.pointer.has_pointer())
            || i.events.iter().any(|e| {
                matches!(
                    e,
                    egui::Event::Touch {
                        phase: egui::TouchPhase::Cancel,
                        ..
                    }
                )
            })
    });
    if interrupted && input.is_active() {
        log::debug!("Map gesture interrupted");
        input.cancel(map);
        return;
    }

    // Pinch (touch or ctrl+scroll) and plain wheel scrolling both zoom
    let mut factor = 1.0;
    if response.hovered() {
        factor = ctx.input(|i| i.zoom_delta());
        let scroll = ctx.input(|i| i.raw_scroll_delta);
        if scroll.y != 0.0 {
            factor *= wheel_zoom_factor(scroll.y);
        }
    }
    let touching = ctx.input(|i| i.multi_touch().is_some());
    input.zoom(map, factor, touching);

    if response.drag_started() {
        input.begin_pan(map);
    }
    if response.dragged() {
        input.pan(map, response.drag_delta());
    }
    if response.drag_stopped() {
        input.end_pan(map);
    }
}

/// Paints the geographic position under the pointer in the corner.
fn render_cursor_readout(painter: &egui::Painter, rect: Rect, map: &MapView, pos: Pos2) {
    let Some(projection) = map.projection() else {
        return;
    };
    if !projection.screen_rect().contains(pos) {
        return;
    }

    let coord = projection.invert(pos);
    let lat = format!("{:.1}°{}", coord.y.abs(), if coord.y >= 0.0 { 'N' } else { 'S' });
    let lon = format!("{:.1}°{}", coord.x.abs(), if coord.x >= 0.0 { 'E' } else { 'W' });
    painter.text(
        rect.right_bottom() - Vec2::new(8.0, 6.0),
        Align2::RIGHT_BOTTOM,
        format!("{} {}", lat, lon),
        FontId::monospace(11.0),
        colors::canvas::READOUT,
    );
}

fn render_loading(ui: &egui::Ui, rect: Rect) {
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, colors::canvas::loading_veil());

    let spinner_rect = Rect::from_center_size(rect.center(), Vec2::splat(32.0));
    egui::Spinner::new().paint_at(ui, spinner_rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::test_fixtures::three_countries;
    use crate::state::{MAX_ZOOM, MIN_ZOOM};

    fn laid_out_map() -> MapView {
        let mut map = MapView::new(three_countries(), MIN_ZOOM, MAX_ZOOM);
        map.on_layout(200.0, 100.0);
        map.frame();
        map
    }

    #[test]
    fn test_wheel_factor_stays_positive() {
        for scroll in [-5000.0, -1500.0, -1.0, 0.0, 1.0, 1500.0] {
            let factor = wheel_zoom_factor(scroll);
            assert!(factor.is_finite() && factor > 0.0, "factor {} for {}", factor, scroll);
        }
        assert_eq!(wheel_zoom_factor(0.0), 1.0);
    }

    #[test]
    fn test_fast_wheel_out_zooms_out() {
        let mut map = laid_out_map();
        let mut input = CanvasInput::default();

        input.zoom(&mut map, 4.0, false);
        input.zoom(&mut map, 1.0, false);
        assert_eq!(map.gesture().zoom(), 4.0);

        // One fast notch out reaches the lower bound instead of stalling
        input.zoom(&mut map, wheel_zoom_factor(-1500.0), false);
        assert_eq!(map.gesture().zoom(), MIN_ZOOM);

        input.zoom(&mut map, wheel_zoom_factor(500.0), false);
        assert!(map.gesture().zoom() > MIN_ZOOM);
    }

    #[test]
    fn test_zoom_out_after_overshoot() {
        let mut map = laid_out_map();
        let mut input = CanvasInput::default();

        for _ in 0..10 {
            input.zoom(&mut map, wheel_zoom_factor(800.0), false);
        }
        assert_eq!(map.gesture().zoom(), MAX_ZOOM);

        // Same wheel session: the first step back already zooms out
        input.zoom(&mut map, 0.5, false);
        assert_eq!(map.gesture().zoom(), MAX_ZOOM / 2.0);
    }

    #[test]
    fn test_pinch_held_while_touching() {
        let mut map = laid_out_map();
        let mut input = CanvasInput::default();

        input.zoom(&mut map, 2.0, true);
        input.zoom(&mut map, 1.0, true);
        assert!(input.is_active());
        input.zoom(&mut map, 1.5, true);
        assert_eq!(map.gesture().zoom(), 3.0);

        input.zoom(&mut map, 1.0, false);
        assert!(!input.is_active());
    }

    #[test]
    fn test_cancel_keeps_view_and_resets_input() {
        let mut map = laid_out_map();
        let mut input = CanvasInput::default();

        input.zoom(&mut map, 2.0, true);
        input.begin_pan(&mut map);
        input.pan(&mut map, Vec2::new(30.0, 0.0));
        input.pan(&mut map, Vec2::new(20.0, 0.0));
        assert_eq!(map.gesture().offset().x, 50.0);

        input.cancel(&mut map);
        assert!(!input.is_active());
        assert_eq!(map.gesture().zoom(), 2.0);
        assert_eq!(map.gesture().offset().x, 50.0);

        // The next gesture starts from the committed view
        input.zoom(&mut map, 1.5, false);
        assert_eq!(map.gesture().zoom(), 3.0);

        // A release after the cancel does nothing
        input.end_pan(&mut map);
        assert_eq!(map.gesture().offset().x, 50.0);
    }
}
