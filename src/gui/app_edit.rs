// Edit tab: active image selection, preview and adjustments

use super::{PhotoEditorApp, Status};
use eframe::egui;
use image::DynamicImage;
use log::{debug, error};
use photo_editor::{Axis, EditorError, EnhanceFactors, JobId, PreviewState};

const ROTATION_PRESETS: [f32; 3] = [90.0, 180.0, 270.0];

impl PhotoEditorApp {
    pub(crate) fn render_edit_tab(&mut self, ui: &mut egui::Ui) {
        ui.heading("Edit Images");
        ui.separator();

        self.render_active_image_combo(ui);
        ui.add_space(10.0);

        ui.horizontal_top(|ui| {
            self.render_preview(ui);
            ui.add_space(10.0);
            ui.vertical(|ui| {
                self.render_resize_fields(ui);
                ui.add_space(10.0);
                self.render_enhance_fields(ui);
            });
        });
    }

    fn render_active_image_combo(&mut self, ui: &mut egui::Ui) {
        let active = self.editor.active();
        let selected_text = active
            .and_then(|id| self.library.display_label(id))
            .unwrap_or_else(|| "Select an Image to Edit".to_string());

        let mut chosen: Option<JobId> = None;
        ui.horizontal(|ui| {
            ui.label("Active image:");
            egui::ComboBox::from_id_salt("active_image")
                .selected_text(selected_text)
                .width(420.0)
                .show_ui(ui, |ui| {
                    for job in self.library.iter() {
                        let id = job.id();
                        let label = self.library.display_label(id).unwrap_or_default();
                        if ui.selectable_label(active == Some(id), label).clicked() {
                            chosen = Some(id);
                        }
                    }
                });
        });

        if let Some(id) = chosen {
            if Some(id) != active {
                self.activate(ui.ctx(), id);
            }
        }
    }

    /// Make `id` the active job, fill the fields from its settings and show it
    fn activate(&mut self, ctx: &egui::Context, id: JobId) {
        if let Err(e) = self.editor.select(&self.library, id) {
            self.report_error(e);
            return;
        }
        self.load_fields_from_job();
        let preview = self.editor.materialize_preview(&mut self.library);
        self.show_preview(ctx, preview);
    }

    fn load_fields_from_job(&mut self) {
        let settings = match self.editor.active_job(&self.library) {
            Ok(job) => job.settings.clone(),
            Err(_) => return,
        };
        self.width_text = settings.target_width.to_string();
        self.height_text = settings.target_height.to_string();
        self.rotation_text = format_value(settings.rotation);
        self.contrast_text = format_value(settings.contrast);
        self.sharpness_text = format_value(settings.sharpness);
        self.brightness_text = format_value(settings.brightness);
    }

    pub(crate) fn clear_edit_fields(&mut self) {
        self.width_text.clear();
        self.height_text.clear();
        self.rotation_text.clear();
        self.contrast_text.clear();
        self.sharpness_text.clear();
        self.brightness_text.clear();
        self.preview = None;
    }

    fn render_preview(&mut self, ui: &mut egui::Ui) {
        let size = egui::vec2(self.editor.preview_width as f32, self.editor.preview_height as f32);
        let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
        ui.painter().rect_filled(rect, 0.0, egui::Color32::BLACK);

        if let Some(texture) = &self.preview {
            let image_size = texture.size_vec2();
            let image_rect = egui::Rect::from_center_size(rect.center(), image_size);
            egui::Image::new(egui::load::SizedTexture::from_handle(texture)).paint_at(ui, image_rect);
        }
    }

    fn render_resize_fields(&mut self, ui: &mut egui::Ui) {
        ui.label("Resize:");

        let mut edited: Option<(Axis, String)> = None;
        ui.horizontal(|ui| {
            let width = ui.add(
                egui::TextEdit::singleline(&mut self.width_text)
                    .hint_text("New X Res")
                    .desired_width(80.0),
            );
            if width.lost_focus() {
                edited = Some((Axis::Width, self.width_text.clone()));
            }

            ui.label("x");

            let height = ui.add(
                egui::TextEdit::singleline(&mut self.height_text)
                    .hint_text("New Y Res")
                    .desired_width(80.0),
            );
            if height.lost_focus() {
                edited = Some((Axis::Height, self.height_text.clone()));
            }
        });

        ui.checkbox(&mut self.editor.keep_aspect_ratio, "Keep aspect ratio");

        if let Some((axis, text)) = edited {
            self.apply_dimension(axis, &text);
        }
    }

    fn apply_dimension(&mut self, axis: Axis, text: &str) {
        let value = match text.trim().parse::<u32>() {
            Ok(value) if value > 0 => value,
            _ => {
                debug!("Ignoring invalid dimension {:?}", text);
                self.load_fields_from_job();
                return;
            }
        };

        match self.editor.set_dimension(&mut self.library, value, axis) {
            Ok((width, height)) => {
                self.width_text = width.to_string();
                self.height_text = height.to_string();
            }
            // Typing into the fields with nothing selected is not an error
            Err(EditorError::NoActiveJob) => {}
            Err(e) => self.report_error(e),
        }
    }

    fn render_enhance_fields(&mut self, ui: &mut egui::Ui) {
        let mut preset: Option<f32> = None;

        ui.label("Enter Rotation Degrees:");
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.rotation_text)
                    .hint_text("Enter rotation degrees")
                    .desired_width(120.0),
            );
            egui::ComboBox::from_id_salt("rotation_presets")
                .selected_text("Degrees")
                .show_ui(ui, |ui| {
                    for degrees in ROTATION_PRESETS {
                        if ui.selectable_label(false, format!("{}", degrees)).clicked() {
                            preset = Some(degrees);
                        }
                    }
                });
        });

        ui.add_space(5.0);
        ui.label("Contrast:");
        ui.add(egui::TextEdit::singleline(&mut self.contrast_text).hint_text("i.e. 1.3 for 30%"));
        ui.label("Sharpness:");
        ui.add(egui::TextEdit::singleline(&mut self.sharpness_text).hint_text("0 b/w, 1.0 orig, 1.0+ sharpen"));
        ui.label("Brightness:");
        ui.add(egui::TextEdit::singleline(&mut self.brightness_text).hint_text("0 b, 1.0 orig, 1.0+ brighten"));

        ui.add_space(10.0);

        let has_active = self.editor.active().is_some();
        let has_enhanced = self
            .editor
            .active_job(&self.library)
            .map(|job| job.has_enhanced())
            .unwrap_or(false);

        let mut apply = false;
        let mut toggle = false;
        ui.horizontal(|ui| {
            apply = ui.add_enabled(has_active, egui::Button::new("Apply")).clicked();
            toggle = ui
                .add_enabled(has_enhanced, egui::Button::new("Toggle Image Changes"))
                .clicked();
        });

        if has_enhanced {
            if let Ok(job) = self.editor.active_job(&self.library) {
                let showing = match job.preview_state() {
                    PreviewState::ShowingOriginal => "Showing original",
                    PreviewState::ShowingEnhanced => "Showing changes",
                };
                ui.weak(showing);
            }
        }

        let ctx = ui.ctx().clone();
        if let Some(degrees) = preset {
            self.rotation_text = format_value(degrees);
            match self.editor.rotate(&mut self.library, degrees, false) {
                // Picking a preset with nothing selected only fills the field
                Err(EditorError::NoActiveJob) => {}
                preview => self.show_preview(&ctx, preview),
            }
        }
        if apply {
            self.apply_edits(&ctx);
        }
        if toggle {
            self.toggle_preview(&ctx);
        }
    }

    fn apply_edits(&mut self, ctx: &egui::Context) {
        let rotation = parse_or(&self.rotation_text, 0.0);
        let factors = EnhanceFactors {
            contrast: parse_or(&self.contrast_text, 1.0),
            sharpness: parse_or(&self.sharpness_text, 1.0),
            brightness: parse_or(&self.brightness_text, 1.0),
        };

        if let Err(e) = self.editor.set_attributes(&mut self.library, rotation, factors) {
            self.report_error(e);
            return;
        }

        let preview = self.editor.enhance(&mut self.library, factors);
        self.show_preview(ctx, preview);
    }

    fn toggle_preview(&mut self, ctx: &egui::Context) {
        if let Err(e) = self.editor.toggle_preview(&mut self.library) {
            self.report_error(e);
            return;
        }
        let preview = self.editor.materialize_preview(&mut self.library);
        self.show_preview(ctx, preview);
    }

    fn show_preview(&mut self, ctx: &egui::Context, preview: photo_editor::Result<DynamicImage>) {
        match preview {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let size = [rgba.width() as usize, rgba.height() as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
                self.preview = Some(ctx.load_texture("preview", color_image, egui::TextureOptions::LINEAR));
            }
            Err(e) => self.report_error(e),
        }
    }

    pub(crate) fn report_error(&mut self, e: EditorError) {
        error!("{}", e);
        self.status = Status::Error(e.to_string());
    }
}

fn parse_or(text: &str, default: f32) -> f32 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return default;
    }
    match trimmed.parse::<f32>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            debug!("Ignoring invalid number {:?}", text);
            default
        }
    }
}

fn format_value(value: f32) -> String {
    format!("{}", value)
}
