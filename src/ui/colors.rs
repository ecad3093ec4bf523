//! Centralized color constants for the UI.
//!
//! Country fills and borders live in [`crate::geo::MapStyle`]; this module
//! covers the chrome around the map.

use eframe::egui::Color32;

/// General UI colors for labels and values.
pub mod ui {
    use super::Color32;

    /// Muted gray for labels.
    pub const LABEL: Color32 = Color32::from_rgb(100, 100, 110);
    /// Emphasized count of selected countries.
    pub const VALUE: Color32 = Color32::from_rgb(40, 40, 50);
    /// Save in progress.
    pub const SAVING: Color32 = Color32::from_rgb(230, 140, 60);
}

/// Colors for the map canvas.
pub mod canvas {
    use super::Color32;

    /// Text shown when the boundaries could not be loaded.
    pub const ERROR_TEXT: Color32 = Color32::from_rgb(200, 60, 60);
    /// Cursor coordinate readout.
    pub const READOUT: Color32 = Color32::from_rgb(90, 100, 120);

    /// Veil drawn over the map while the selection loads - requires alpha, use function.
    pub fn loading_veil() -> Color32 {
        Color32::from_rgba_unmultiplied(255, 255, 255, 140)
    }
}
