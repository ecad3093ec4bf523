//! Modal notification window.

use crate::state::NotificationQueue;
use eframe::egui::{self, RichText};

/// Shows the oldest pending notification until it is acknowledged.
pub fn render_notification(ctx: &egui::Context, notifications: &mut NotificationQueue) {
    let Some(notification) = notifications.current() else {
        return;
    };

    let mut acknowledged = false;
    egui::Window::new(RichText::new(&notification.title).strong())
        .id(egui::Id::new("notification"))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(&notification.message);
            ui.add_space(8.0);
            ui.vertical_centered(|ui| {
                if ui.button("OK").clicked() {
                    acknowledged = true;
                }
            });
        });

    if acknowledged {
        notifications.dismiss();
    }
}
