// Export tab and the missing fields dialog

use super::{PhotoEditorApp, Status};
use eframe::egui;
use log::info;
use photo_editor::export::{export_job, BaseName, ExportRequest};
use photo_editor::ExportFormat;
use strum::IntoEnumIterator;

impl PhotoEditorApp {
    pub(crate) fn render_export_tab(&mut self, ui: &mut egui::Ui) {
        ui.heading("Export Images");
        ui.separator();

        ui.horizontal(|ui| {
            ui.add_enabled(
                false,
                egui::TextEdit::singleline(&mut self.export_dir)
                    .hint_text("Browse to export directory")
                    .desired_width(360.0),
            );
            if ui.button("Browse to Export Dir").clicked() {
                if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                    self.export_dir = dir.display().to_string();
                }
            }
        });

        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.checkbox(&mut self.use_original_filename, "Use original filename");
            ui.add_enabled(
                !self.use_original_filename,
                egui::TextEdit::singleline(&mut self.custom_name).hint_text("Enter File Name"),
            );
        });

        ui.label("Enter prefix/suffix for filename:")
            .on_hover_text("Add a prefix or suffix to the file name when saving out the file.");
        ui.horizontal(|ui| {
            ui.add(egui::TextEdit::singleline(&mut self.prefix).hint_text("Enter Prefix"));
            ui.add(egui::TextEdit::singleline(&mut self.suffix).hint_text("Enter Suffix"));
        });

        ui.horizontal(|ui| {
            ui.label("Image format:");
            let selected_text = self
                .export_format
                .map(|format| format.to_string())
                .unwrap_or_else(|| "Choose Image Format".to_string());
            egui::ComboBox::from_id_salt("export_format")
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    for format in ExportFormat::iter() {
                        ui.selectable_value(&mut self.export_format, Some(format), format.to_string());
                    }
                });
        });

        ui.checkbox(&mut self.append_number, "Append incremental number");

        ui.add_space(10.0);

        let button = egui::Button::new("Export File(s)").min_size(egui::vec2(200.0, 40.0));
        if ui.add(button).clicked() {
            self.export_active();
        }
    }

    fn export_request(&self) -> ExportRequest {
        ExportRequest {
            directory: self.export_dir_path(),
            base_name: if self.use_original_filename {
                BaseName::Original
            } else {
                BaseName::Custom(self.custom_name.clone())
            },
            prefix: self.prefix.clone(),
            suffix: self.suffix.clone(),
            format: self.export_format,
            append_number: self.append_number,
        }
    }

    fn export_active(&mut self) {
        let request = self.export_request();
        let job = self.editor.active_job(&self.library).ok();

        match export_job(job, &request) {
            Ok(path) => {
                info!("Saved {}", path.display());
                self.status = Status::Info(format!("Saved {}", path.display()));
            }
            Err(e) => match e.export_issues() {
                Some(issues) => self.missing_fields = issues.to_vec(),
                None => self.report_error(e),
            },
        }
    }

    pub(crate) fn render_missing_fields_dialog(&mut self, ctx: &egui::Context) {
        if self.missing_fields.is_empty() {
            return;
        }

        let mut close = false;
        egui::Window::new("Warning! Missing Fields")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("Cannot process export due to missing fields:");
                ui.add_space(5.0);
                for issue in &self.missing_fields {
                    ui.label(format!("• {}", issue));
                }
                ui.add_space(10.0);
                if ui.button("OK").clicked() {
                    close = true;
                }
            });

        if close {
            self.missing_fields.clear();
        }
    }
}
