// GUI entry point for photo-editor

use anyhow::Result;
use clap::Parser;
use eframe::egui;
use log::{info, warn};
use photo_editor::{logging, Args, EditorConfig, ImageLibrary};

mod app;
use app::PhotoEditorApp;

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = EditorConfig::load(&args)?;
    let library = preload(&args);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 640.0])
            .with_min_inner_size([800.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Photo Editor",
        options,
        Box::new(move |cc| Ok(Box::new(PhotoEditorApp::new(cc, config, library)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start the editor window: {}", e))
}

/// Load files and folders given on the command line
fn preload(args: &Args) -> ImageLibrary {
    let mut library = ImageLibrary::new();

    let (dirs, files): (Vec<_>, Vec<_>) = args.paths.iter().cloned().partition(|path| path.is_dir());

    for dir in &dirs {
        if let Err(e) = library.add_folder(dir) {
            warn!("{}", e);
        }
    }
    if !files.is_empty() {
        library.add_files(&files);
    }

    if !library.is_empty() {
        info!("Preloaded {} image(s)", library.len());
    }
    library
}
