use node_weave::graph_utils::graph::GraphDocument;
use node_weave::gui::frontend::WeaveApp;
use node_weave::persistence::persist;
use node_weave::persistence::settings::AppSettings;

use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();
    // Resolve settings once; the GUI and autosave paths read this copy
    persist::set_settings_override(AppSettings::load().unwrap_or_default());
    let loaded_state = persist::load_active().ok().flatten();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 740.0])
            // Provide sensible bounds so the UI stays usable on small screens
            .with_min_inner_size([640.0, 400.0])
            .with_resizable(true),
        ..Default::default()
    };
    eframe::run_native(
        "Node-Weave",
        options,
        Box::new(move |_cc| {
            if let Some(state) = loaded_state {
                Ok(Box::new(WeaveApp::from_state(state)) as Box<dyn eframe::App>)
            } else {
                // No prior state: start with an empty graph
                Ok(Box::new(WeaveApp::new(GraphDocument::new())) as Box<dyn eframe::App>)
            }
        }),
    )
}
