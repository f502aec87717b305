//! Form rendering: heading, message boxes, drop zone, action buttons.

use eframe::egui;

use super::UiApp;

const APP_VERSION: &str = env!("NEUROSCAN_VERSION");
const PREVIEW_SIZE: u32 = 208;

const GREEN: egui::Color32 = egui::Color32::from_rgb(34, 197, 94);
const RED: egui::Color32 = egui::Color32::from_rgb(239, 68, 68);

impl UiApp {
    pub(super) fn render_form(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(12.0);
            ui.heading("CLASIFICACIÓN DE TUMORES CEREBRALES");
            ui.add_space(4.0);
            ui.label("Sube una resonancia magnética cerebral para clasificar el tipo de tumor.");
        });
        ui.add_space(10.0);

        // One box at a time: result (neutral) or error (alerting).
        if let Some(msg) = &self.result_message {
            message_box(ui, msg, GREEN);
            ui.add_space(8.0);
        }
        if let Some(msg) = &self.error_message {
            message_box(ui, msg, RED);
            ui.add_space(8.0);
        }

        self.render_drop_zone(ui);

        ui.add_space(12.0);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let submit_label = if self.loading { "Procesando..." } else { "Enviar" };
            if ui
                .add_enabled(!self.loading, egui::Button::new(submit_label))
                .clicked()
            {
                self.submit();
            }
            if ui.button("Cancelar").clicked() {
                self.cancel();
            }
        });

        ui.with_layout(egui::Layout::bottom_up(egui::Align::Min), |ui| {
            ui.label(egui::RichText::new(format!("v{APP_VERSION}")).small().weak());
        });
    }

    fn render_drop_zone(&mut self, ui: &mut egui::Ui) {
        let fill = if self.drag_hover {
            ui.visuals().widgets.hovered.bg_fill
        } else {
            ui.visuals().extreme_bg_color
        };
        egui::Frame::new()
            .fill(fill)
            .stroke(egui::Stroke::new(1.0, ui.visuals().widgets.inactive.bg_stroke.color))
            .corner_radius(8)
            .inner_margin(egui::Margin::same(16))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.set_min_height(240.0);
                ui.vertical_centered(|ui| {
                    if self.candidate.is_some() {
                        self.render_preview(ui);
                    } else {
                        ui.add_space(60.0);
                        ui.label("Arrastra una imagen o");
                        ui.add_space(4.0);
                        if ui.button("Sube una imagen").clicked()
                            && let Some(path) = rfd::FileDialog::new()
                                .add_filter("Imágenes", &["png", "jpg", "jpeg"])
                                .pick_file()
                        {
                            self.select_file(path);
                        }
                        ui.add_space(4.0);
                        ui.label(
                            egui::RichText::new("Formatos permitidos: PNG, JPG, JPEG (máximo 10MB)")
                                .small()
                                .weak(),
                        );
                    }
                });
            });
    }

    fn render_preview(&mut self, ui: &mut egui::Ui) {
        let size = egui::Vec2::splat(PREVIEW_SIZE as f32);
        if let Some(id) = self.preview_texture(ui.ctx()) {
            ui.image((id, size));
        } else {
            let (resp, painter) = ui.allocate_painter(size, egui::Sense::hover());
            painter.rect_filled(resp.rect, 4.0, egui::Color32::from_gray(40));
        }
        if let Some(image) = &self.candidate {
            ui.add_space(4.0);
            ui.label(
                egui::RichText::new(image.path.file_name().unwrap_or_default().to_string_lossy())
                    .small(),
            );
        }
    }

    fn preview_texture(&mut self, ctx: &egui::Context) -> Option<egui::TextureId> {
        if let Some(tex) = &self.preview {
            return Some(tex.id());
        }
        if self.preview_failed {
            return None;
        }
        let image = self.candidate.as_ref()?;
        match image::load_from_memory(&image.bytes) {
            Ok(decoded) => {
                let thumb = image::imageops::thumbnail(&decoded, PREVIEW_SIZE, PREVIEW_SIZE);
                let (w, h) = thumb.dimensions();
                let pixels = thumb.into_raw();
                let color =
                    egui::ColorImage::from_rgba_unmultiplied([w as usize, h as usize], &pixels);
                let name = format!("preview:{}", image.path.display());
                let tex = ctx.load_texture(name, color, egui::TextureOptions::LINEAR);
                let id = tex.id();
                self.preview = Some(tex);
                Some(id)
            }
            Err(e) => {
                tracing::warn!(
                    "no se pudo decodificar la vista previa de {}: {e}",
                    image.path.display()
                );
                self.preview_failed = true;
                None
            }
        }
    }
}

fn message_box(ui: &mut egui::Ui, text: &str, fill: egui::Color32) {
    egui::Frame::new()
        .fill(fill)
        .corner_radius(6)
        .inner_margin(egui::Margin::symmetric(12, 8))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.colored_label(egui::Color32::WHITE, text);
            });
        });
}
