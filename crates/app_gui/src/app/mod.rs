//! Upload form state and submit orchestration.

mod form;

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;
use std::time::Duration;

use eframe::{App, Frame, egui};
use mri_core::{CandidateImage, DEFAULT_ENDPOINT, PredictError, PredictionClient};

pub(crate) const PROMPT_SELECT: &str = "Por favor, selecciona una imagen antes de enviar.";
pub(crate) const GENERIC_FAILURE: &str =
    "Ocurrió un error al procesar la imagen. Intenta nuevamente.";

/// Result of one classification request, tagged with the request sequence
/// it belongs to.
struct Outcome {
    seq: u64,
    result: Result<String, PredictError>,
}

pub struct UiApp {
    endpoint: String,
    candidate: Option<CandidateImage>,
    error_message: Option<String>,
    result_message: Option<String>,
    loading: bool,
    drag_hover: bool,
    /// Monotonic request counter; only the outcome matching `in_flight`
    /// may touch displayed state.
    seq: u64,
    in_flight: Option<u64>,
    tx: Sender<Outcome>,
    rx: Receiver<Outcome>,
    preview: Option<egui::TextureHandle>,
    preview_failed: bool,
}

impl Default for UiApp {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl UiApp {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let (tx, rx) = channel();
        Self {
            endpoint: endpoint.into(),
            candidate: None,
            error_message: None,
            result_message: None,
            loading: false,
            drag_hover: false,
            seq: 0,
            in_flight: None,
            tx,
            rx,
            preview: None,
            preview_failed: false,
        }
    }

    /// Accepts a file from the picker or a drop. On success the file
    /// replaces the current candidate and any prior messages; on failure
    /// the previous candidate stays untouched and only the error shows.
    fn select_file(&mut self, path: PathBuf) {
        match CandidateImage::from_path(&path) {
            Ok(image) => {
                self.candidate = Some(image);
                self.error_message = None;
                self.result_message = None;
                self.preview = None;
                self.preview_failed = false;
                // A response still in flight belongs to the old candidate.
                self.in_flight = None;
                self.loading = false;
            }
            Err(e) => {
                tracing::warn!("selección rechazada para {}: {e}", path.display());
                self.error_message = Some(e.to_string());
                // One message box at a time.
                self.result_message = None;
            }
        }
    }

    /// Back to the initial state.
    fn cancel(&mut self) {
        self.candidate = None;
        self.error_message = None;
        self.result_message = None;
        self.preview = None;
        self.preview_failed = false;
        self.in_flight = None;
        self.loading = false;
    }

    /// Starts a classification request on a worker thread. Without a
    /// candidate this only shows the selection prompt; no network call.
    fn submit(&mut self) {
        let Some(image) = self.candidate.clone() else {
            self.result_message = Some(PROMPT_SELECT.to_string());
            self.error_message = None;
            return;
        };
        self.seq += 1;
        let seq = self.seq;
        self.in_flight = Some(seq);
        self.loading = true;
        self.error_message = None;
        self.result_message = None;

        let tx = self.tx.clone();
        let endpoint = self.endpoint.clone();
        thread::spawn(move || {
            let result = PredictionClient::new(endpoint).classify(&image);
            // The app may have moved on; poll_outcomes decides.
            let _ = tx.send(Outcome { seq, result });
        });
    }

    /// Applies finished requests. An outcome whose sequence no longer
    /// matches the in-flight one (Cancel or a newer Select happened) is
    /// dropped instead of overwriting current state.
    fn poll_outcomes(&mut self) {
        while let Ok(outcome) = self.rx.try_recv() {
            if self.in_flight != Some(outcome.seq) {
                tracing::warn!("respuesta obsoleta descartada (solicitud {})", outcome.seq);
                continue;
            }
            self.in_flight = None;
            self.loading = false;
            match outcome.result {
                Ok(label) => {
                    self.result_message = Some(format!("Resultado de la predicción: {label}"));
                    self.error_message = None;
                }
                Err(e) => {
                    tracing::warn!("predicción fallida: {e}");
                    self.error_message = Some(GENERIC_FAILURE.to_string());
                    self.result_message = None;
                }
            }
        }
    }

    fn handle_drag_and_drop(&mut self, ctx: &egui::Context) {
        self.drag_hover = ctx.input(|i| !i.raw.hovered_files.is_empty());
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        // Only one candidate at a time; the last drop wins.
        if let Some(path) = dropped.into_iter().next_back() {
            self.select_file(path);
        }
    }
}

impl App for UiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_outcomes();
        self.handle_drag_and_drop(ctx);
        egui::CentralPanel::default().show(ctx, |ui| self.render_form(ui));
        if self.loading {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
