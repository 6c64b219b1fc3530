// Library exports for reuse by the GUI and tests
pub mod cli;
pub mod config_file;
pub mod editor;
pub mod error;
pub mod export;
pub mod image_processing;
pub mod job;
pub mod loader;
pub mod logging;
pub mod utils;

// Re-export commonly used types
pub use cli::{Args, ExportFormat};
pub use config_file::EditorConfig;
pub use editor::Editor;
pub use error::{EditorError, ExportIssue, Result};
pub use export::{BaseName, ExportRequest};
pub use image_processing::{Axis, EnhanceFactors};
pub use job::{EditSettings, ImageJob, JobId, PreviewState};
pub use loader::{ImageLibrary, LoadReport};
