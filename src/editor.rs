use image::DynamicImage;
use log::debug;

use crate::error::{EditorError, Result};
use crate::image_processing::{self, Axis, EnhanceFactors};
use crate::job::{ImageJob, JobId, PreviewState};
use crate::loader::ImageLibrary;

pub const DEFAULT_PREVIEW_WIDTH: u32 = 500;
pub const DEFAULT_PREVIEW_HEIGHT: u32 = 400;

/// Applies edits to the active job.
///
/// The editor only holds a handle; every operation resolves it against the
/// library it is given, so a job removed from the list is reported as
/// `UnknownJob` rather than edited through a stale reference.
#[derive(Debug, Clone)]
pub struct Editor {
    active: Option<JobId>,
    pub preview_width: u32,
    pub preview_height: u32,
    pub keep_aspect_ratio: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self {
            active: None,
            preview_width: DEFAULT_PREVIEW_WIDTH,
            preview_height: DEFAULT_PREVIEW_HEIGHT,
            keep_aspect_ratio: true,
        }
    }
}

impl Editor {
    pub fn new(preview_width: u32, preview_height: u32, keep_aspect_ratio: bool) -> Self {
        Self {
            active: None,
            preview_width: preview_width.max(1),
            preview_height: preview_height.max(1),
            keep_aspect_ratio,
        }
    }

    pub fn active(&self) -> Option<JobId> {
        self.active
    }

    pub fn select(&mut self, library: &ImageLibrary, id: JobId) -> Result<()> {
        library.job(id)?;
        debug!("Active image is now {}", id);
        self.active = Some(id);
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.active = None;
    }

    /// Forget the active handle, e.g. after the list was cleared
    pub fn reset(&mut self) {
        if let Some(id) = self.active.take() {
            debug!("Dropped active image {}", id);
        }
    }

    /// Drop the active handle if its job is no longer in `library`
    pub fn sync_with(&mut self, library: &ImageLibrary) {
        if let Some(id) = self.active {
            if !library.contains(id) {
                self.reset();
            }
        }
    }

    pub fn active_job<'a>(&self, library: &'a ImageLibrary) -> Result<&'a ImageJob> {
        let id = self.active.ok_or(EditorError::NoActiveJob)?;
        library.job(id)
    }

    fn active_job_mut<'a>(&self, library: &'a mut ImageLibrary) -> Result<&'a mut ImageJob> {
        let id = self.active.ok_or(EditorError::NoActiveJob)?;
        library.job_mut(id)
    }

    /// Decode the active image if needed and return the displayed buffer
    /// scaled to the preview area.
    pub fn materialize_preview(&self, library: &mut ImageLibrary) -> Result<DynamicImage> {
        let job = self.active_job_mut(library)?;
        ensure_original(job)?;
        self.preview_of(job)
    }

    /// Store a new width or height and, when the aspect ratio is locked,
    /// recompute the other one. Returns the persisted target size.
    pub fn set_dimension(&self, library: &mut ImageLibrary, value: u32, axis: Axis) -> Result<(u32, u32)> {
        let keep_aspect_ratio = self.keep_aspect_ratio;
        let job = self.active_job_mut(library)?;
        let value = value.max(1);
        let ratio = job.aspect_ratio();

        match axis {
            Axis::Width => {
                job.settings.target_width = value;
                if keep_aspect_ratio {
                    job.settings.target_height =
                        image_processing::complementary_dimension(value, axis, ratio);
                }
            }
            Axis::Height => {
                job.settings.target_height = value;
                if keep_aspect_ratio {
                    job.settings.target_width =
                        image_processing::complementary_dimension(value, axis, ratio);
                }
            }
        }

        debug!(
            "Target size of {} set to {}x{}",
            job.id(),
            job.settings.target_width,
            job.settings.target_height
        );
        Ok((job.settings.target_width, job.settings.target_height))
    }

    /// Rotate the active image to an absolute angle.
    ///
    /// The rotation always starts from the unrotated buffer, so applying the
    /// same angle twice gives the same image. With `already_applied` the
    /// stored angle is left as it is.
    pub fn rotate(&self, library: &mut ImageLibrary, degrees: f32, already_applied: bool) -> Result<DynamicImage> {
        check_finite("rotation", degrees)?;
        let job = self.active_job_mut(library)?;
        ensure_original(job)?;

        let rotated = match job.rotation_source() {
            Some(source) => image_processing::rotate(source, degrees)?,
            None => return Err(EditorError::NoActiveJob),
        };

        job.set_enhanced(rotated);
        if !already_applied {
            job.settings.rotation = degrees;
        }

        self.preview_of(job)
    }

    /// Apply contrast, sharpness and brightness to the original pixels, then
    /// re-apply the stored rotation on top. Nothing is stored unless both
    /// steps succeed.
    pub fn enhance(&self, library: &mut ImageLibrary, factors: EnhanceFactors) -> Result<DynamicImage> {
        check_factors(factors)?;
        let job = self.active_job_mut(library)?;
        let rotation = job.settings.rotation;
        check_finite("rotation", rotation)?;
        ensure_original(job)?;

        let enhanced = match job.original() {
            Some(original) => image_processing::enhance(original, factors),
            None => return Err(EditorError::NoActiveJob),
        };
        let rotated = image_processing::rotate(&enhanced, rotation)?;

        debug!("Enhanced {} with {:?}", job.id(), factors);
        job.settings.contrast = factors.contrast;
        job.settings.sharpness = factors.sharpness;
        job.settings.brightness = factors.brightness;
        job.set_unrotated(enhanced);
        job.set_enhanced(rotated);

        self.preview_of(job)
    }

    /// Switch the preview between the original and enhanced buffers.
    pub fn toggle_preview(&self, library: &mut ImageLibrary) -> Result<PreviewState> {
        let job = self.active_job_mut(library)?;
        Ok(job.toggle_preview())
    }

    /// Store rotation and enhancement values typed by the user without
    /// touching any pixels.
    pub fn set_attributes(&self, library: &mut ImageLibrary, rotation: f32, factors: EnhanceFactors) -> Result<()> {
        check_finite("rotation", rotation)?;
        check_factors(factors)?;
        let job = self.active_job_mut(library)?;
        job.settings.rotation = rotation;
        job.settings.contrast = factors.contrast;
        job.settings.sharpness = factors.sharpness;
        job.settings.brightness = factors.brightness;
        Ok(())
    }

    fn preview_of(&self, job: &ImageJob) -> Result<DynamicImage> {
        let displayed = job.displayed().ok_or(EditorError::NoActiveJob)?;
        Ok(image_processing::fit_to_area(
            displayed,
            self.preview_width,
            self.preview_height,
        )?)
    }
}

/// Decode the full image the first time it is needed
fn ensure_original(job: &mut ImageJob) -> Result<()> {
    if job.original().is_some() {
        return Ok(());
    }

    debug!("Decoding {}", job.path().display());
    let img = image::open(job.path()).map_err(|e| EditorError::image(job.path(), e))?;
    job.set_original(img);
    Ok(())
}

fn check_finite(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EditorError::InvalidValue { field, value })
    }
}

fn check_factors(factors: EnhanceFactors) -> Result<()> {
    check_finite("contrast", factors.contrast)?;
    check_finite("sharpness", factors.sharpness)?;
    check_finite("brightness", factors.brightness)
}
