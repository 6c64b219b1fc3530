use clap::{Parser, ValueEnum};
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use strum_macros::{Display, EnumIter};

/// Formats an edited image can be exported as
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[value(name = "png")]
    #[strum(serialize = "PNG")]
    Png,
    #[value(name = "jpeg", alias = "jpg")]
    #[serde(alias = "jpg")]
    #[strum(serialize = "JPEG")]
    Jpeg,
    #[value(name = "bmp")]
    #[strum(serialize = "BMP")]
    Bmp,
    #[value(name = "gif")]
    #[strum(serialize = "GIF")]
    Gif,
}

impl ExportFormat {
    /// File extension written for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Bmp => "bmp",
            ExportFormat::Gif => "gif",
        }
    }

    pub fn image_format(&self) -> ImageFormat {
        match self {
            ExportFormat::Png => ImageFormat::Png,
            ExportFormat::Jpeg => ImageFormat::Jpeg,
            ExportFormat::Bmp => ImageFormat::Bmp,
            ExportFormat::Gif => ImageFormat::Gif,
        }
    }

    /// JPEG has no alpha channel, everything else keeps it
    pub fn supports_alpha(&self) -> bool {
        !matches!(self, ExportFormat::Jpeg)
    }
}

#[derive(Parser, Debug, Default)]
#[command(
    name = "photo-editor",
    about = "Desktop photo editor: resize, rotate, enhance and export images",
    long_about = "
Photo Editor

Load images, adjust size, rotation, contrast, sharpness and brightness,
preview the result and export it with a configurable file name.

Every argument is optional. Without arguments the editor starts with an
empty image list.

Example Usage:
  # Start empty
  photo-editor

  # Preload a folder and two files, export as JPEG into ~/edited
  photo-editor ~/Photos/trip ~/Photos/a.png ~/Photos/b.gif -o ~/edited -f jpeg

  # Use a specific settings file and verbose logging
  photo-editor --config ./editor.json --verbose"
)]
pub struct Args {
    /// Image files or folders to load at startup
    #[arg(value_name = "FILE|DIR")]
    pub paths: Vec<PathBuf>,

    /// Directory exported images are written to
    #[arg(short = 'o', long = "export-dir", value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Export format preselected in the Export tab
    #[arg(short = 'f', long = "format", value_name = "FORMAT")]
    pub format: Option<ExportFormat>,

    /// JSON settings file (defaults to the user config directory)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}
