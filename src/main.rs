#![warn(clippy::all)]

//! World Picker - an interactive world map for picking countries.
//!
//! Countries are drawn from a bundled TopoJSON boundary dataset. Tapping a
//! country toggles it, pinch and drag zoom and pan the map, and the
//! selection is saved to the configured backend shortly after each change.

mod config;
mod geo;
mod state;
mod storage;
mod ui;

use config::AppConfig;
use eframe::egui;
use state::AppState;
use storage::{ConfiguredBackend, PersistenceChannel, PersistenceEvent};
use web_time::Instant;

/// Boundary dataset embedded at compile time.
static WORLD_TOPOLOGY: &str = include_str!("../assets/world.topo.json");

// Native entry point
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    env_logger::init();

    let native_options = eframe::NativeOptions::default();

    eframe::run_native(
        "World Picker",
        native_options,
        Box::new(|cc| Ok(Box::new(WorldPickerApp::new(cc)))),
    )
}

// WASM entry point - main is not called on wasm32
#[cfg(target_arch = "wasm32")]
fn main() {}

/// Entry point for the WASM application.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn start() {
    use eframe::wasm_bindgen::JsCast as _;

    // Redirect `log` messages to `console.log`:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let document = web_sys::window()
            .expect("No window")
            .document()
            .expect("No document");

        let canvas = document
            .get_element_by_id("app_canvas")
            .expect("Failed to find app_canvas")
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .expect("app_canvas was not a HtmlCanvasElement");

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(WorldPickerApp::new(cc)))),
            )
            .await;

        // Remove the loading text once the app has loaded:
        if let Some(loading_text) = document.get_element_by_id("loading_text") {
            match start_result {
                Ok(_) => {
                    loading_text.remove();
                }
                Err(e) => {
                    loading_text.set_inner_html(
                        "<p>The app has crashed. See the developer console for details.</p>",
                    );
                    panic!("Failed to start eframe: {e:?}");
                }
            }
        }
    });
}

/// Main application state and logic.
pub struct WorldPickerApp {
    /// Application state containing all sub-states
    state: AppState,

    /// Where the selection is loaded from and saved to
    backend: ConfiguredBackend,

    /// Channel for async fetch/save operations
    persistence: PersistenceChannel,

    /// Gesture progress on the map canvas
    canvas_input: ui::CanvasInput,
}

impl WorldPickerApp {
    /// Creates a new WorldPickerApp instance.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        let config = AppConfig::load();
        let mut state = AppState::new(&config);
        load_boundaries(&mut state, &config);

        let backend = ConfiguredBackend::from_config(&config.backend);
        let mut persistence = PersistenceChannel::new();
        persistence.fetch(cc.egui_ctx.clone(), backend.clone());

        Self {
            state,
            backend,
            persistence,
            canvas_input: ui::CanvasInput::default(),
        }
    }

    /// Applies completed persistence operations and starts due saves.
    fn sync_persistence(&mut self, ctx: &egui::Context) {
        let now = Instant::now();

        while let Some(event) = self.persistence.try_recv() {
            match event {
                PersistenceEvent::Fetch(outcome) => self.state.apply_fetch(outcome, now),
                PersistenceEvent::Save(outcome) => self.state.apply_save(outcome),
            }
        }

        if let Some(request) = self.state.selection.poll(now) {
            self.persistence
                .save(ctx.clone(), self.backend.clone(), request.codes);
        }

        // Wake up again when the pending save falls due
        if let Some(deadline) = self.state.selection.pending_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
    }
}

/// Loads the configured boundary file, or the bundled dataset.
#[cfg(not(target_arch = "wasm32"))]
fn load_boundaries(state: &mut AppState, config: &AppConfig) {
    let Some(path) = &config.topology_path else {
        state.load_map(WORLD_TOPOLOGY);
        return;
    };

    match std::fs::read_to_string(path) {
        Ok(text) if path.ends_with(".geojson") => state.set_map(geo::load_geojson(&text)),
        Ok(text) => state.load_map(&text),
        Err(e) => {
            log::error!("Failed to read {}: {}, using bundled boundaries", path, e);
            state.load_map(WORLD_TOPOLOGY);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn load_boundaries(state: &mut AppState, config: &AppConfig) {
    if config.topology_path.is_some() {
        log::warn!("topology_path is ignored on the web, using bundled boundaries");
    }
    state.load_map(WORLD_TOPOLOGY);
}

impl eframe::App for WorldPickerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_persistence(ctx);

        let saving = self.persistence.is_saving();
        ui::render_top_bar(ctx, &mut self.state, saving);
        ui::render_canvas(ctx, &mut self.state, &mut self.canvas_input);
        ui::render_notification(ctx, &mut self.state.notifications);

        // A toggle in this frame may have scheduled a save
        if let Some(deadline) = self.state.selection.pending_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(Instant::now()));
        }
    }
}
