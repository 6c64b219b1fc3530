use eframe::egui;
use log::{error, info, warn};
use photo_editor::utils::{truncate_file_path, IMAGE_EXTENSIONS};
use photo_editor::{EditorConfig, Editor, ExportFormat, ExportIssue, ImageLibrary, JobId, LoadReport};
use std::collections::BTreeSet;
use std::path::PathBuf;

#[path = "app_edit.rs"]
mod app_edit;
#[path = "app_export.rs"]
mod app_export;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Load,
    Edit,
    Export,
}

/// Last outcome shown at the bottom of the window
#[derive(Debug, Clone)]
pub(crate) enum Status {
    Idle,
    Info(String),
    Error(String),
}

pub struct PhotoEditorApp {
    tab: Tab,
    library: ImageLibrary,
    editor: Editor,

    // Load tab
    selected_paths: BTreeSet<JobId>,

    // Edit tab, fields hold the text as typed
    width_text: String,
    height_text: String,
    rotation_text: String,
    contrast_text: String,
    sharpness_text: String,
    brightness_text: String,
    preview: Option<egui::TextureHandle>,

    // Export tab
    export_dir: String,
    use_original_filename: bool,
    custom_name: String,
    prefix: String,
    suffix: String,
    export_format: Option<ExportFormat>,
    append_number: bool,
    missing_fields: Vec<ExportIssue>,

    status: Status,
}

impl PhotoEditorApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: EditorConfig, library: ImageLibrary) -> Self {
        Self {
            tab: Tab::Load,
            library,
            editor: Editor::new(config.preview_width, config.preview_height, config.keep_aspect_ratio),
            selected_paths: BTreeSet::new(),
            width_text: String::new(),
            height_text: String::new(),
            rotation_text: String::new(),
            contrast_text: String::new(),
            sharpness_text: String::new(),
            brightness_text: String::new(),
            preview: None,
            export_dir: config
                .export_dir
                .map(|dir| dir.display().to_string())
                .unwrap_or_default(),
            use_original_filename: config.use_original_filename,
            custom_name: String::new(),
            prefix: config.prefix,
            suffix: config.suffix,
            export_format: config.export_format,
            append_number: config.append_number,
            missing_fields: Vec::new(),
            status: Status::Idle,
        }
    }

    fn render_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Exit").clicked() {
                        info!("Exit requested from menu");
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });
    }

    fn render_tabs(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.tab, Tab::Load, "Load Images");
            ui.selectable_value(&mut self.tab, Tab::Edit, "Edit Images");
            ui.selectable_value(&mut self.tab, Tab::Export, "Export Images");
        });
        ui.separator();
    }

    fn render_load_tab(&mut self, ui: &mut egui::Ui) {
        ui.heading("Load Images");
        ui.separator();

        ui.horizontal(|ui| {
            if ui.button("Browse Image File(s)").clicked() {
                if let Some(paths) = rfd::FileDialog::new()
                    .add_filter("Images", &IMAGE_EXTENSIONS)
                    .pick_files()
                {
                    let report = self.library.add_files(&paths);
                    self.report_load(&report);
                }
            }

            if ui.button("Browse Image Folder").clicked() {
                if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                    match self.library.add_folder(&dir) {
                        Ok(report) => self.report_load(&report),
                        Err(e) => {
                            error!("{}", e);
                            self.status = Status::Error(e.to_string());
                        }
                    }
                }
            }
        });

        ui.add_space(10.0);

        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_min_size(egui::vec2(500.0, 250.0));
            egui::ScrollArea::vertical().max_height(250.0).show(ui, |ui| {
                if self.library.is_empty() {
                    ui.weak("No images loaded");
                }
                for job in self.library.iter() {
                    let id = job.id();
                    let selected = self.selected_paths.contains(&id);
                    let label = job.path().display().to_string();
                    if ui.selectable_label(selected, label).clicked() {
                        if selected {
                            self.selected_paths.remove(&id);
                        } else {
                            self.selected_paths.insert(id);
                        }
                    }
                }
            });
        });

        ui.add_space(10.0);

        ui.horizontal(|ui| {
            let has_selection = !self.selected_paths.is_empty();
            if ui
                .add_enabled(has_selection, egui::Button::new("Remove Selected File(s)"))
                .clicked()
            {
                self.remove_selected();
            }

            if ui
                .add_enabled(!self.library.is_empty(), egui::Button::new("Clear File(s)"))
                .clicked()
            {
                self.clear_list();
            }
        });
    }

    fn report_load(&mut self, report: &LoadReport) {
        self.status = if report.skipped.is_empty() {
            Status::Info(format!("Added {} image(s)", report.added.len()))
        } else {
            let names: Vec<String> = report
                .skipped
                .iter()
                .map(|(path, _)| truncate_file_path(&path.display().to_string()))
                .collect();
            warn!("{} file(s) could not be loaded", names.len());
            Status::Error(format!(
                "Added {} image(s), skipped {}: {}",
                report.added.len(),
                names.len(),
                names.join(", ")
            ))
        };
    }

    fn remove_selected(&mut self) {
        let ids: Vec<JobId> = self.selected_paths.iter().copied().collect();
        self.library.remove(&ids);
        self.selected_paths.clear();

        let active = self.editor.active();
        self.editor.sync_with(&self.library);
        if active != self.editor.active() {
            self.clear_edit_fields();
        }
    }

    fn clear_list(&mut self) {
        self.library.clear();
        self.selected_paths.clear();
        self.editor.reset();
        self.clear_edit_fields();
    }

    fn render_status(&self, ui: &mut egui::Ui) {
        match &self.status {
            Status::Idle => {}
            Status::Info(message) => {
                ui.label(message);
            }
            Status::Error(message) => {
                ui.colored_label(egui::Color32::RED, message);
            }
        }
    }

    pub(crate) fn export_dir_path(&self) -> Option<PathBuf> {
        let trimmed = self.export_dir.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        }
    }
}

impl eframe::App for PhotoEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.render_menu_bar(ctx);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.render_status(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_tabs(ui);

            egui::ScrollArea::vertical().show(ui, |ui| match self.tab {
                Tab::Load => self.render_load_tab(ui),
                Tab::Edit => self.render_edit_tab(ui),
                Tab::Export => self.render_export_tab(ui),
            });
        });

        self.render_missing_fields_dialog(ctx);
    }
}
