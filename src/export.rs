use image::DynamicImage;
use log::{debug, info, warn};
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::cli::ExportFormat;
use crate::error::{EditorError, ExportIssue, Result};
use crate::image_processing;
use crate::job::ImageJob;
use crate::utils::sanitize_filename;

/// Where the exported file's base name comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseName {
    /// Stem of the source file
    Original,
    Custom(String),
}

/// Everything the export tab collects before writing a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub directory: Option<PathBuf>,
    pub base_name: BaseName,
    pub prefix: String,
    pub suffix: String,
    pub format: Option<ExportFormat>,
    pub append_number: bool,
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self {
            directory: None,
            base_name: BaseName::Original,
            prefix: String::new(),
            suffix: String::new(),
            format: None,
            append_number: false,
        }
    }
}

impl ExportRequest {
    /// List every missing precondition for exporting `job`.
    pub fn validate(&self, job: Option<&ImageJob>) -> Vec<ExportIssue> {
        let mut issues = Vec::new();

        match &self.directory {
            Some(dir) if !dir.as_os_str().is_empty() => {}
            _ => issues.push(ExportIssue::MissingDirectory),
        }

        match job {
            None => issues.push(ExportIssue::NoSelection),
            Some(job) if !job.has_enhanced() => issues.push(ExportIssue::NotEdited),
            Some(_) => {}
        }

        if self.format.is_none() {
            issues.push(ExportIssue::MissingFormat);
        }

        if let BaseName::Custom(name) = &self.base_name {
            if sanitize_filename(name).is_empty() {
                issues.push(ExportIssue::MissingFileName);
            }
        }

        issues
    }

    /// Base name for `job`, before prefix and suffix are added
    fn base_for(&self, job: &ImageJob) -> String {
        match &self.base_name {
            BaseName::Original => job.stem().to_string(),
            BaseName::Custom(name) => sanitize_filename(name),
        }
    }
}

/// `{prefix_}base{_suffix}{_number}.ext`, skipping empty segments
pub fn build_name(prefix: &str, base: &str, suffix: &str, number: &str, ext: &str) -> String {
    let stem = join_segments(&[prefix, base, suffix, number]);
    if ext.is_empty() {
        stem
    } else {
        format!("{}.{}", stem, ext)
    }
}

fn join_segments(segments: &[&str]) -> String {
    segments
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

/// Smallest positive number not yet used by a `stem_NN.ext` name.
///
/// Gaps are filled first, so `shot_01`, `shot_02`, `shot_04` gives 3.
pub fn next_increment<S: AsRef<str>>(existing_names: &[S], stem: &str) -> u32 {
    let pattern = format!(r"^{}_(\d{{2,}})\.[^.]+$", regex::escape(stem));
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            warn!("Cannot match numbered names for {:?}: {}", stem, e);
            return 1;
        }
    };

    let used: BTreeSet<u32> = existing_names
        .iter()
        .filter_map(|name| re.captures(name.as_ref()))
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .collect();

    let mut candidate = 1;
    for n in &used {
        if *n != candidate {
            break;
        }
        candidate += 1;
    }
    candidate
}

/// Two-digit counter, wider when needed
pub fn format_increment(number: u32) -> String {
    format!("{:02}", number)
}

/// File names (not paths) of the regular files in `dir`
pub fn scan_directory_names(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|e| EditorError::io(dir, e))?;
    let mut names = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| EditorError::io(dir, e))?;
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    names.sort();
    Ok(names)
}

/// Compute the output file name for `job`, scanning the directory for
/// existing numbered files when numbering is on.
pub fn output_file_name(job: &ImageJob, request: &ExportRequest, format: ExportFormat, dir: &Path) -> Result<String> {
    let prefix = sanitize_filename(&request.prefix);
    let suffix = sanitize_filename(&request.suffix);
    let base = request.base_for(job);

    let number = if request.append_number {
        let stem = join_segments(&[&prefix, &base, &suffix]);
        let existing = scan_directory_names(dir)?;
        format_increment(next_increment(&existing, &stem))
    } else {
        String::new()
    };

    Ok(build_name(&prefix, &base, &suffix, &number, format.extension()))
}

/// Pixels to write: the unrotated edit scaled to the target size, then rotated.
pub fn render_export_image(job: &ImageJob) -> Result<DynamicImage> {
    let source = job
        .rotation_source()
        .ok_or_else(|| EditorError::ExportPreconditions(vec![ExportIssue::NotEdited]))?;

    let settings = &job.settings;
    let resized = image_processing::resize_exact(source, settings.target_width, settings.target_height)?;
    Ok(image_processing::rotate(&resized, settings.rotation)?)
}

/// Convert to a pixel type the encoder for `format` accepts.
///
/// JPEG drops alpha, GIF only takes 8-bit RGB(A), BMP only 8-bit layouts.
/// PNG keeps 8 and 16-bit buffers and gets 16-bit RGBA for float data.
pub fn convert_for_format(img: DynamicImage, format: ExportFormat) -> DynamicImage {
    use DynamicImage::*;

    match (format, img) {
        (ExportFormat::Jpeg, img @ (ImageRgb8(_) | ImageLuma8(_))) => img,
        (ExportFormat::Jpeg, img) => ImageRgb8(img.to_rgb8()),
        (ExportFormat::Gif, img @ (ImageRgb8(_) | ImageRgba8(_))) => img,
        (ExportFormat::Gif, img) => ImageRgba8(img.to_rgba8()),
        (ExportFormat::Bmp, img @ (ImageRgb8(_) | ImageRgba8(_) | ImageLuma8(_) | ImageLumaA8(_))) => img,
        (ExportFormat::Bmp, img) => ImageRgba8(img.to_rgba8()),
        (ExportFormat::Png, img @ (ImageRgb32F(_) | ImageRgba32F(_))) => ImageRgba16(img.to_rgba16()),
        (ExportFormat::Png, img) => img,
    }
}

/// Encode into a file created here, so a missing or read-only directory is
/// reported as an I/O error rather than an encoding one.
fn write_image(img: &DynamicImage, path: &Path, format: ExportFormat) -> Result<()> {
    let file = fs::File::create(path).map_err(|e| EditorError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    img.write_to(&mut writer, format.image_format())
        .map_err(|e| match e {
            image::ImageError::IoError(source) => EditorError::io(path, source),
            other => EditorError::image(path, other),
        })?;

    writer.flush().map_err(|e| EditorError::io(path, e))
}

/// Validate, name, render and save the selected job. Returns the written path.
///
/// Nothing touches the disk when validation fails.
pub fn export_job(job: Option<&ImageJob>, request: &ExportRequest) -> Result<PathBuf> {
    let issues = request.validate(job);
    let (job, dir, format) = match (job, &request.directory, request.format) {
        (Some(job), Some(dir), Some(format)) if issues.is_empty() => (job, dir, format),
        _ => {
            debug!("Export blocked: {:?}", issues);
            return Err(EditorError::ExportPreconditions(issues));
        }
    };

    let file_name = output_file_name(job, request, format, dir)?;
    let path = dir.join(file_name);
    if path.exists() {
        warn!("Overwriting {}", path.display());
    }

    let rendered = convert_for_format(render_export_image(job)?, format);
    write_image(&rendered, &path, format)?;

    info!(
        "Exported {} as {} ({}x{})",
        job.name(),
        path.display(),
        rendered.width(),
        rendered.height()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Editor;
    use crate::image_processing::EnhanceFactors;
    use crate::loader::ImageLibrary;
    use image::{GenericImageView, ImageBuffer, Rgba};

    fn edited_library(dir: &Path, name: &str) -> (ImageLibrary, Editor) {
        let path = dir.join(name);
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_fn(40, 20, |x, y| Rgba([x as u8 * 5, y as u8 * 10, 60, 255]));
        img.save(&path).unwrap();

        let mut library = ImageLibrary::new();
        let id = library.add_files(&[path]).added[0];
        let mut editor = Editor::default();
        editor.select(&library, id).unwrap();
        (library, editor)
    }

    fn request_for(dir: &Path) -> ExportRequest {
        ExportRequest {
            directory: Some(dir.to_path_buf()),
            format: Some(ExportFormat::Png),
            ..ExportRequest::default()
        }
    }

    #[test]
    fn test_build_name() {
        assert_eq!(build_name("", "photo", "", "", "png"), "photo.png");
        assert_eq!(build_name("vac", "photo", "2024", "", "png"), "vac_photo_2024.png");
        assert_eq!(build_name("", "photo", "", "07", "jpg"), "photo_07.jpg");
        assert_eq!(build_name("a", "b", "c", "12", "bmp"), "a_b_c_12.bmp");
    }

    #[test]
    fn test_next_increment_fills_gap() {
        let existing = ["shot_01.png", "shot_02.png", "shot_04.png"];
        let n = next_increment(&existing, "shot");
        assert_eq!(n, 3);
        assert_eq!(build_name("", "shot", "", &format_increment(n), "png"), "shot_03.png");
    }

    #[test]
    fn test_next_increment_starts_at_one() {
        let existing = ["shot.png", "other_01.png", "shot_1.png", "shot_ab.png"];
        assert_eq!(format_increment(next_increment(&existing, "shot")), "01");
        assert_eq!(next_increment::<&str>(&[], "shot"), 1);
    }

    #[test]
    fn test_next_increment_after_max_and_wide_numbers() {
        let existing = ["img_01.png", "img_02.jpg", "img_03.bmp"];
        assert_eq!(next_increment(&existing, "img"), 4);

        let wide: Vec<String> = (1..=100).map(|n| format!("img_{:02}.png", n)).collect();
        assert_eq!(format_increment(next_increment(wide.as_slice(), "img")), "101");
    }

    #[test]
    fn test_next_increment_escapes_stem() {
        let existing = ["a.b_01.png", "axb_02.png"];
        assert_eq!(next_increment(&existing, "a.b"), 2);
    }

    #[test]
    fn test_validation_lists_every_issue_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (library, editor) = edited_library(dir.path(), "photo.png");
        let job = editor.active_job(&library).ok();

        let request = ExportRequest {
            base_name: BaseName::Custom("   ".into()),
            ..ExportRequest::default()
        };
        let err = export_job(job, &request).unwrap_err();
        assert_eq!(
            err.export_issues().unwrap(),
            &[
                ExportIssue::MissingDirectory,
                ExportIssue::NotEdited,
                ExportIssue::MissingFormat,
                ExportIssue::MissingFileName,
            ]
        );

        let err = export_job(None, &request_for(dir.path())).unwrap_err();
        assert_eq!(err.export_issues().unwrap(), &[ExportIssue::NoSelection]);

        let names = scan_directory_names(dir.path()).unwrap();
        assert_eq!(names, vec!["photo.png".to_string()]);
    }

    #[test]
    fn test_unedited_image_is_rejected() {
        let out = tempfile::tempdir().unwrap();
        let src = tempfile::tempdir().unwrap();
        let (library, editor) = edited_library(src.path(), "photo.png");

        let err = export_job(editor.active_job(&library).ok(), &request_for(out.path())).unwrap_err();
        assert_eq!(err.export_issues().unwrap(), &[ExportIssue::NotEdited]);
        assert!(scan_directory_names(out.path()).unwrap().is_empty());
    }

    #[test]
    fn test_export_writes_resized_rotated_file() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let (mut library, editor) = edited_library(src.path(), "beach.png");

        editor
            .set_dimension(&mut library, 20, image_processing::Axis::Width)
            .unwrap();
        editor.rotate(&mut library, 90.0, false).unwrap();

        let request = ExportRequest {
            prefix: "vac".into(),
            suffix: "2024".into(),
            ..request_for(out.path())
        };
        let path = export_job(editor.active_job(&library).ok(), &request).unwrap();

        assert_eq!(path, out.path().join("vac_beach_2024.png"));
        let written = image::open(&path).unwrap();
        // 40x20 scaled to 20x10, then turned on its side
        assert_eq!(written.dimensions(), (10, 20));
    }

    #[test]
    fn test_export_numbering_and_custom_name() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let (mut library, editor) = edited_library(src.path(), "photo.png");
        editor.enhance(&mut library, EnhanceFactors::default()).unwrap();

        fs::write(out.path().join("trip_01.jpg"), b"taken").unwrap();
        fs::write(out.path().join("trip_03.jpg"), b"taken").unwrap();

        let request = ExportRequest {
            base_name: BaseName::Custom("trip".into()),
            format: Some(ExportFormat::Jpeg),
            append_number: true,
            ..request_for(out.path())
        };

        let job = editor.active_job(&library).ok();
        let first = export_job(job, &request).unwrap();
        assert_eq!(first.file_name().unwrap(), "trip_02.jpg");
        let second = export_job(job, &request).unwrap();
        assert_eq!(second.file_name().unwrap(), "trip_04.jpg");

        let written = image::open(&first).unwrap();
        assert_eq!(written.dimensions(), (40, 20));
        assert!(!written.color().has_alpha());
    }

    #[test]
    fn test_unreadable_directory_is_io_error() {
        let src = tempfile::tempdir().unwrap();
        let (mut library, editor) = edited_library(src.path(), "photo.png");
        editor.enhance(&mut library, EnhanceFactors::default()).unwrap();
        let job = editor.active_job(&library).ok();

        for append_number in [true, false] {
            let request = ExportRequest {
                append_number,
                ..request_for(&src.path().join("missing"))
            };
            let err = export_job(job, &request).unwrap_err();
            assert!(matches!(err, EditorError::Io { .. }), "{:?}", err);
        }
    }

    fn export_source(dir: &Path, img: DynamicImage) -> (ImageLibrary, Editor) {
        let path = dir.join("source.png");
        img.save(&path).unwrap();

        let mut library = ImageLibrary::new();
        let id = library.add_files(&[path]).added[0];
        let mut editor = Editor::default();
        editor.select(&library, id).unwrap();
        editor.enhance(&mut library, EnhanceFactors::default()).unwrap();
        (library, editor)
    }

    #[test]
    fn test_grey_and_16_bit_sources_export_to_every_format() {
        use image::{Luma, Rgb};
        use strum::IntoEnumIterator;

        let grey: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_fn(8, 8, |x, y| Luma([(x * 30 + y) as u8]));
        let deep: ImageBuffer<Rgb<u16>, Vec<u16>> =
            ImageBuffer::from_fn(8, 8, |x, y| Rgb([(x * 8000) as u16, (y * 8000) as u16, 30000]));

        for source in [DynamicImage::ImageLuma8(grey), DynamicImage::ImageRgb16(deep)] {
            let src = tempfile::tempdir().unwrap();
            let out = tempfile::tempdir().unwrap();
            let (library, editor) = export_source(src.path(), source);
            let job = editor.active_job(&library).ok();

            for format in ExportFormat::iter() {
                let request = ExportRequest {
                    format: Some(format),
                    ..request_for(out.path())
                };
                let path = export_job(job, &request)
                    .unwrap_or_else(|e| panic!("{} export failed: {}", format, e));
                assert_eq!(image::open(&path).unwrap().dimensions(), (8, 8));
            }
        }
    }

    #[test]
    fn test_convert_for_format() {
        let grey = DynamicImage::new_luma8(2, 2);
        assert_eq!(convert_for_format(grey.clone(), ExportFormat::Gif).color(), image::ColorType::Rgba8);
        assert_eq!(convert_for_format(grey.clone(), ExportFormat::Png).color(), image::ColorType::L8);
        assert_eq!(convert_for_format(grey, ExportFormat::Bmp).color(), image::ColorType::L8);

        let deep = DynamicImage::new_rgba16(2, 2);
        assert_eq!(convert_for_format(deep.clone(), ExportFormat::Jpeg).color(), image::ColorType::Rgb8);
        assert_eq!(convert_for_format(deep.clone(), ExportFormat::Bmp).color(), image::ColorType::Rgba8);
        assert_eq!(convert_for_format(deep, ExportFormat::Png).color(), image::ColorType::Rgba16);

        let float = DynamicImage::new_rgb32f(2, 2);
        assert_eq!(convert_for_format(float, ExportFormat::Png).color(), image::ColorType::Rgba16);
    }
}
