use image::{DynamicImage, ImageFormat};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{EditorError, Result};

/// Opaque handle to a loaded image, stable for the lifetime of the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub(crate) u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which of the two cached buffers the preview is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewState {
    #[default]
    ShowingOriginal,
    ShowingEnhanced,
}

impl PreviewState {
    pub fn toggled(self) -> Self {
        match self {
            PreviewState::ShowingOriginal => PreviewState::ShowingEnhanced,
            PreviewState::ShowingEnhanced => PreviewState::ShowingOriginal,
        }
    }
}

/// User-editable attributes of a job.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSettings {
    pub target_width: u32,
    pub target_height: u32,
    /// Degrees, positive is clockwise
    pub rotation: f32,
    pub contrast: f32,
    pub sharpness: f32,
    pub brightness: f32,
}

impl EditSettings {
    fn for_dimensions(width: u32, height: u32) -> Self {
        Self {
            target_width: width,
            target_height: height,
            rotation: 0.0,
            contrast: 1.0,
            sharpness: 1.0,
            brightness: 1.0,
        }
    }
}

/// Everything known about one loaded image: identity, the dimensions read at
/// load time, the edit settings and the decoded pixel buffers.
///
/// Buffers are filled lazily by the editor. `enhanced` is always the result
/// of rotating `unrotated` (or `original` when no enhancement was applied) by
/// `settings.rotation`.
#[derive(Debug)]
pub struct ImageJob {
    id: JobId,
    path: PathBuf,
    name: String,
    format: ImageFormat,
    original_width: u32,
    original_height: u32,
    aspect_ratio: f64,
    aspect_ratio_inv: f64,

    pub settings: EditSettings,

    original: Option<DynamicImage>,
    unrotated: Option<DynamicImage>,
    enhanced: Option<DynamicImage>,
    preview: PreviewState,
}

impl ImageJob {
    /// Read just the header of `path` and build a job from it.
    pub fn open(id: JobId, path: &Path) -> Result<Self> {
        let reader = image::ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| EditorError::io(path, e))?;

        let format = reader.format().ok_or_else(|| {
            EditorError::image(
                path,
                image::ImageError::Unsupported(
                    image::error::UnsupportedError::from_format_and_kind(
                        image::error::ImageFormatHint::PathExtension(path.to_path_buf()),
                        image::error::UnsupportedErrorKind::Format(
                            image::error::ImageFormatHint::Unknown,
                        ),
                    ),
                ),
            )
        })?;

        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| EditorError::image(path, e))?;

        Ok(Self::from_parts(id, path, format, width, height))
    }

    pub(crate) fn from_parts(
        id: JobId,
        path: &Path,
        format: ImageFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let (aspect_ratio, aspect_ratio_inv) = if width == 0 || height == 0 {
            (1.0, 1.0)
        } else {
            (
                height as f64 / width as f64,
                width as f64 / height as f64,
            )
        };

        Self {
            id,
            path: path.to_path_buf(),
            name,
            format,
            original_width: width,
            original_height: height,
            aspect_ratio,
            aspect_ratio_inv,
            settings: EditSettings::for_dimensions(width, height),
            original: None,
            unrotated: None,
            enhanced: None,
            preview: PreviewState::default(),
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name including extension
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File name without extension, used as the default export base name
    pub fn stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image")
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn original_dimensions(&self) -> (u32, u32) {
        (self.original_width, self.original_height)
    }

    /// height / width, fixed at load time
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// width / height, fixed at load time
    pub fn aspect_ratio_inv(&self) -> f64 {
        self.aspect_ratio_inv
    }

    pub fn original(&self) -> Option<&DynamicImage> {
        self.original.as_ref()
    }

    pub fn enhanced(&self) -> Option<&DynamicImage> {
        self.enhanced.as_ref()
    }

    pub fn has_enhanced(&self) -> bool {
        self.enhanced.is_some()
    }

    pub fn preview_state(&self) -> PreviewState {
        self.preview
    }

    /// The buffer the preview should currently show.
    pub fn displayed(&self) -> Option<&DynamicImage> {
        match self.preview {
            PreviewState::ShowingEnhanced => self.enhanced.as_ref().or(self.original.as_ref()),
            PreviewState::ShowingOriginal => self.original.as_ref(),
        }
    }

    /// Source for rotation: the last enhancement result, or the original.
    pub(crate) fn rotation_source(&self) -> Option<&DynamicImage> {
        self.unrotated.as_ref().or(self.original.as_ref())
    }

    pub(crate) fn set_original(&mut self, img: DynamicImage) {
        self.original = Some(img);
    }

    pub(crate) fn set_unrotated(&mut self, img: DynamicImage) {
        self.unrotated = Some(img);
    }

    pub(crate) fn set_enhanced(&mut self, img: DynamicImage) {
        self.enhanced = Some(img);
        self.preview = PreviewState::ShowingEnhanced;
    }

    /// Swap between original and enhanced. Stays on the original while no
    /// enhanced buffer exists.
    pub(crate) fn toggle_preview(&mut self) -> PreviewState {
        if self.enhanced.is_some() {
            self.preview = self.preview.toggled();
        }
        self.preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    #[test]
    fn test_aspect_ratio_fixed_at_load() {
        let mut job = ImageJob::from_parts(JobId(1), Path::new("/tmp/a.png"), ImageFormat::Png, 400, 300);
        assert_eq!(job.aspect_ratio(), 0.75);
        assert!((job.aspect_ratio_inv() - 400.0 / 300.0).abs() < 1e-12);

        job.settings.target_width = 100;
        job.settings.target_height = 900;
        job.set_original(DynamicImage::new_rgb8(10, 10));
        assert_eq!(job.aspect_ratio(), 0.75);
        assert_eq!(job.original_dimensions(), (400, 300));
    }

    #[test]
    fn test_defaults() {
        let job = ImageJob::from_parts(JobId(7), Path::new("/photos/shot.JPG"), ImageFormat::Jpeg, 640, 480);
        assert_eq!(job.name(), "shot.JPG");
        assert_eq!(job.stem(), "shot");
        assert_eq!(job.settings.target_width, 640);
        assert_eq!(job.settings.target_height, 480);
        assert_eq!(job.settings.rotation, 0.0);
        assert_eq!(job.settings.contrast, 1.0);
        assert_eq!(job.settings.sharpness, 1.0);
        assert_eq!(job.settings.brightness, 1.0);
        assert!(job.original().is_none());
        assert!(!job.has_enhanced());
        assert_eq!(job.preview_state(), PreviewState::ShowingOriginal);
    }

    #[test]
    fn test_toggle_needs_enhanced_buffer() {
        let mut job = ImageJob::from_parts(JobId(1), Path::new("a.png"), ImageFormat::Png, 2, 2);
        job.set_original(DynamicImage::new_rgb8(2, 2));
        assert_eq!(job.toggle_preview(), PreviewState::ShowingOriginal);

        let enhanced: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(2, 2, Rgb([9, 9, 9]));
        job.set_enhanced(DynamicImage::ImageRgb8(enhanced));
        assert_eq!(job.preview_state(), PreviewState::ShowingEnhanced);
        assert_eq!(job.toggle_preview(), PreviewState::ShowingOriginal);
        assert_eq!(job.displayed(), job.original());
        assert_eq!(job.toggle_preview(), PreviewState::ShowingEnhanced);
        assert_eq!(job.displayed(), job.enhanced());
    }

    #[test]
    fn test_open_reads_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.png");
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(12, 8, Rgb([1, 2, 3]));
        img.save(&path).unwrap();

        let job = ImageJob::open(JobId(3), &path).unwrap();
        assert_eq!(job.format(), ImageFormat::Png);
        assert_eq!(job.original_dimensions(), (12, 8));
        assert!((job.aspect_ratio() - 8.0 / 12.0).abs() < 1e-12);
        assert!(job.original().is_none());
    }

    #[test]
    fn test_open_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.png");
        std::fs::write(&path, b"definitely not an image").unwrap();
        assert!(ImageJob::open(JobId(1), &path).is_err());
    }
}
