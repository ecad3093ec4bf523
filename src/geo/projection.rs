//! Map projection and coordinate transformation.
//!
//! Handles converting between geographic coordinates (lon/lat) and
//! screen coordinates for rendering on the canvas.

use super::CountryCollection;
use eframe::egui::{Pos2, Rect, Vec2};
use geo_types::Coord;

/// Base scale and translation that fit a whole collection into a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    /// Scale at zoom 1 (pixels per radian)
    pub scale0: f64,
    /// Translation at zoom 1, in pixels
    pub translate0: Vec2,
    degenerate: bool,
}

impl Fit {
    /// Identity fit used while the viewport or the data cannot be fitted.
    pub fn degenerate() -> Self {
        Self {
            scale0: 1.0,
            translate0: Vec2::ZERO,
            degenerate: true,
        }
    }

    /// True when no real fit could be computed (empty viewport or no coordinates).
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }
}

/// Computes the equirectangular fit of `collection` into a `width` x `height` viewport.
///
/// The scale is the largest one that keeps every projected vertex inside the
/// viewport, and the result is centered on both axes. Never fails: an empty
/// viewport or a collection without finite coordinates yields [`Fit::degenerate`].
pub fn fit(width: f32, height: f32, collection: &CountryCollection) -> Fit {
    if width <= 0.0 || height <= 0.0 || !width.is_finite() || !height.is_finite() {
        return Fit::degenerate();
    }

    // Bounds in unit-scale projected space (x = lambda, y = -phi)
    let bounds = collection
        .coords()
        .map(|c| (c.x.to_radians(), -c.y.to_radians()))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .fold(None, |acc: Option<(f64, f64, f64, f64)>, (x, y)| {
            Some(match acc {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            })
        });

    let Some((x0, y0, x1, y1)) = bounds else {
        return Fit::degenerate();
    };

    let w = width as f64;
    let h = height as f64;
    let dx = x1 - x0;
    let dy = y1 - y0;

    let k = match (dx > 0.0, dy > 0.0) {
        (true, true) => (w / dx).min(h / dy),
        (true, false) => w / dx,
        (false, true) => h / dy,
        // A single point: keep unit scale and center it
        (false, false) => 1.0,
    };

    Fit {
        scale0: k,
        translate0: Vec2::new(
            ((w - k * (x0 + x1)) / 2.0) as f32,
            ((h - k * (y0 + y1)) / 2.0) as f32,
        ),
        degenerate: false,
    }
}

/// Equirectangular projection for converting geographic to screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Pixels per radian
    pub scale: f64,
    /// Screen position of (0°, 0°)
    pub translate: Vec2,
    /// Viewport size the projection was built for
    pub viewport: Vec2,
}

impl Projection {
    /// Builds a projection. Pure function of its inputs.
    pub fn new(scale: f64, translate: Vec2, width: f32, height: f32) -> Self {
        Self {
            scale,
            translate,
            viewport: Vec2::new(width, height),
        }
    }

    /// Converts geographic coordinates (lon, lat) to screen position.
    pub fn project(&self, coord: Coord<f64>) -> Pos2 {
        let x = self.scale * coord.x.to_radians() + self.translate.x as f64;
        let y = -self.scale * coord.y.to_radians() + self.translate.y as f64;
        Pos2::new(x as f32, y as f32)
    }

    /// Converts screen position to geographic coordinates (lon, lat).
    pub fn invert(&self, pos: Pos2) -> Coord<f64> {
        let lon = (pos.x as f64 - self.translate.x as f64) / self.scale;
        let lat = -(pos.y as f64 - self.translate.y as f64) / self.scale;
        Coord {
            x: lon.to_degrees(),
            y: lat.to_degrees(),
        }
    }

    /// Viewport rectangle anchored at the origin.
    pub fn screen_rect(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, self.viewport)
    }
}

#[cfg(test)]
impl Projection {
    /// Builds the projection at rest (zoom 1, no pan) for a fit.
    pub fn from_fit(fit: &Fit, width: f32, height: f32) -> Self {
        Self::new(fit.scale0, fit.translate0, width, height)
    }
}
