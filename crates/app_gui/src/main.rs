use eframe::{NativeOptions, egui};

mod app;

use app::UiApp;

fn main() {
    tracing_subscriber::fmt::init();
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([560.0, 640.0]),
        ..Default::default()
    };
    if let Err(e) = eframe::run_native(
        "Clasificación de Tumores Cerebrales",
        options,
        Box::new(|_cc| {
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(Box::new(UiApp::default()))
        }),
    ) {
        eprintln!("Aplicación terminada con error: {e}");
    }
}
