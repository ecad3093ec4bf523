//! Top bar UI: app title, selection count and save status.

use super::colors;
use crate::state::AppState;
use eframe::egui::{self, RichText};
use web_time::Instant;

pub fn render_top_bar(ctx: &egui::Context, state: &mut AppState, saving: bool) {
    egui::TopBottomPanel::top("top_bar")
        .exact_height(36.0)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                ui.label(RichText::new("World Picker").strong().size(16.0));

                ui.separator();

                ui.label(RichText::new("Selected:").size(13.0).color(colors::ui::LABEL));
                let count = ui.label(
                    RichText::new(state.selection.len().to_string())
                        .size(13.0)
                        .strong()
                        .color(colors::ui::VALUE),
                );
                if !state.selection.is_empty() {
                    count.on_hover_ui(|ui| {
                        let codes: Vec<String> = state
                            .selection
                            .current_selection()
                            .iter()
                            .map(|iso| iso.to_string())
                            .collect();
                        ui.label(codes.join(", "));
                    });
                }

                let can_clear = !state.is_loading() && !state.selection.is_empty();
                if ui
                    .add_enabled(can_clear, egui::Button::new("Clear"))
                    .on_hover_text("Deselect all countries")
                    .clicked()
                {
                    state.clear_selection(Instant::now());
                }

                if saving {
                    ui.separator();
                    ui.spinner();
                    ui.label(RichText::new("Saving…").size(12.0).color(colors::ui::SAVING));
                }
            });
        });
}
