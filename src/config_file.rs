use crate::cli::{Args, ExportFormat};
use crate::editor::{DEFAULT_PREVIEW_HEIGHT, DEFAULT_PREVIEW_WIDTH};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = "photo-editor";
const CONFIG_FILE_NAME: &str = "config.json";

/// Startup settings read from a JSON file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    pub preview_width: u32,
    pub preview_height: u32,
    pub keep_aspect_ratio: bool,
    pub export_dir: Option<PathBuf>,
    pub prefix: String,
    pub suffix: String,
    pub export_format: Option<ExportFormat>,
    pub append_number: bool,
    pub use_original_filename: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            preview_width: DEFAULT_PREVIEW_WIDTH,
            preview_height: DEFAULT_PREVIEW_HEIGHT,
            keep_aspect_ratio: true,
            export_dir: None,
            prefix: String::new(),
            suffix: String::new(),
            export_format: None,
            append_number: false,
            use_original_filename: true,
        }
    }
}

impl EditorConfig {
    /// `<config_dir>/photo-editor/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: EditorConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config.sanitized())
    }

    /// Load the settings for this launch and apply command-line overrides.
    ///
    /// An explicit `--config` must exist. The default location is optional.
    pub fn load(args: &Args) -> Result<Self> {
        let mut config = match &args.config_file {
            Some(path) => {
                let config = Self::from_file(path)?;
                info!("Loaded configuration from: {:?}", path);
                config
            }
            None => match Self::default_path() {
                Some(path) if path.is_file() => {
                    let config = Self::from_file(&path)?;
                    info!("Loaded configuration from: {:?}", path);
                    config
                }
                _ => {
                    debug!("No configuration file, using defaults");
                    Self::default()
                }
            },
        };

        config.merge_args(args);
        Ok(config)
    }

    /// Command-line values take precedence over file values
    pub fn merge_args(&mut self, args: &Args) {
        if let Some(dir) = &args.export_dir {
            self.export_dir = Some(dir.clone());
        }
        if let Some(format) = args.format {
            self.export_format = Some(format);
        }
    }

    fn sanitized(mut self) -> Self {
        self.preview_width = self.preview_width.max(1);
        self.preview_height = self.preview_height.max(1);
        self
    }
}
