use aroma_lens::app::AromaLensApp;
use aroma_lens::config::AppConfig;
use aroma_lens::data;
use aroma_lens::state::AppState;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::from_args(std::env::args_os().skip(1));

    // A catalogue that cannot be loaded is fatal: no partial dataset, no window.
    let dataset = match data::loader::load_file(&config.source_path, config.unmapped_policy) {
        Ok(dataset) => dataset,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    if !dataset.unmapped_labels().is_empty() {
        log::warn!(
            "{} effect label(s) passed through unmapped: {:?}",
            dataset.unmapped_labels().len(),
            dataset.unmapped_labels()
        );
    }

    let state = AppState::new(dataset, &config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size),
        ..Default::default()
    };

    eframe::run_native(
        "Aroma Lens – Interactive Perfume Analytics",
        options,
        Box::new(|_cc| Ok(Box::new(AromaLensApp::new(state)))),
    )
}
