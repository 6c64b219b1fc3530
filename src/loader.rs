use log::{debug, info, warn};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{EditorError, Result};
use crate::job::{ImageJob, JobId};
use crate::utils::{is_image_file, truncate_file_path};

/// Outcome of adding a batch of paths
#[derive(Debug, Default)]
pub struct LoadReport {
    pub added: Vec<JobId>,
    /// Paths that could not be read as images, with the reason
    pub skipped: Vec<(PathBuf, String)>,
}

impl LoadReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.skipped.is_empty()
    }
}

/// The list of loaded images, in the order they were added.
#[derive(Debug, Default)]
pub struct ImageLibrary {
    jobs: Vec<ImageJob>,
    next_id: u64,
}

impl ImageLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make candidates absolute, then drop those already loaded or repeated
    /// earlier in `candidates`. Paths are compared as strings; order is
    /// preserved.
    pub fn refine_paths(&self, candidates: &[PathBuf]) -> Vec<PathBuf> {
        let mut seen: HashSet<String> = self
            .jobs
            .iter()
            .map(|job| job.path().to_string_lossy().into_owned())
            .collect();

        candidates
            .iter()
            .map(|path| absolute_path(path))
            .filter(|path| seen.insert(path.to_string_lossy().into_owned()))
            .collect()
    }

    /// Read the header of every new path and append a job for it.
    ///
    /// Unreadable files are logged and reported, they never abort the load.
    pub fn add_files(&mut self, candidates: &[PathBuf]) -> LoadReport {
        let refined = self.refine_paths(candidates);
        let mut report = LoadReport::default();

        if refined.len() < candidates.len() {
            debug!(
                "Ignoring {} path(s) already in the list",
                candidates.len() - refined.len()
            );
        }

        for path in refined {
            let id = JobId(self.next_id);
            match ImageJob::open(id, &path) {
                Ok(job) => {
                    let (width, height) = job.original_dimensions();
                    debug!(
                        "Loaded {} ({}x{}, {:?}) as {}",
                        path.display(),
                        width,
                        height,
                        job.format(),
                        id
                    );
                    self.next_id += 1;
                    self.jobs.push(job);
                    report.added.push(id);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    report.skipped.push((path, e.to_string()));
                }
            }
        }

        info!(
            "Added {} image(s), {} in list",
            report.added.len(),
            self.jobs.len()
        );
        report
    }

    /// Add every image directly inside `dir` (not recursive).
    ///
    /// Files without an image extension are logged and ignored. Only a
    /// directory that cannot be read is an error.
    pub fn add_folder(&mut self, dir: &Path) -> Result<LoadReport> {
        if !dir.is_dir() {
            return Err(EditorError::io(
                dir,
                io::Error::new(io::ErrorKind::NotFound, "not a readable directory"),
            ));
        }

        debug!("Scanning directory: {}", dir.display());

        let walker = WalkDir::new(dir)
            .follow_links(false)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        let mut candidates = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "directory walk failed"));
                    return Err(EditorError::io(dir, source));
                }
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            if is_image_file(path) {
                candidates.push(path.to_path_buf());
            } else {
                warn!("{} is not an image file, skipping", path.display());
            }
        }

        Ok(self.add_files(&candidates))
    }

    /// Remove the given jobs, returning how many were actually removed
    pub fn remove(&mut self, ids: &[JobId]) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(|job| !ids.contains(&job.id()));
        let removed = before - self.jobs.len();
        if removed > 0 {
            info!("Removed {} image(s), {} in list", removed, self.jobs.len());
        }
        removed
    }

    pub fn clear(&mut self) {
        if !self.jobs.is_empty() {
            info!("Cleared {} image(s)", self.jobs.len());
        }
        self.jobs.clear();
    }

    pub fn get(&self, id: JobId) -> Option<&ImageJob> {
        self.jobs.iter().find(|job| job.id() == id)
    }

    pub fn get_mut(&mut self, id: JobId) -> Option<&mut ImageJob> {
        self.jobs.iter_mut().find(|job| job.id() == id)
    }

    /// Like `get`, but a missing job is an error
    pub fn job(&self, id: JobId) -> Result<&ImageJob> {
        self.get(id).ok_or(EditorError::UnknownJob(id))
    }

    pub fn job_mut(&mut self, id: JobId) -> Result<&mut ImageJob> {
        self.get_mut(id).ok_or(EditorError::UnknownJob(id))
    }

    pub fn contains(&self, id: JobId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageJob> {
        self.jobs.iter()
    }

    pub fn ids(&self) -> Vec<JobId> {
        self.jobs.iter().map(ImageJob::id).collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Shortened path for selection widgets
    pub fn display_label(&self, id: JobId) -> Option<String> {
        self.get(id)
            .map(|job| truncate_file_path(&job.path().to_string_lossy()))
    }
}

/// `./a.png` and `/home/me/a.png` name the same file; keep the path as
/// given if the working directory is unavailable.
fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|e| {
        debug!("Keeping {} relative: {}", path.display(), e);
        path.to_path_buf()
    })
}
