//! Running one operation over many device files.
//!
//! A failing file is logged and recorded; it never stops the batch. With
//! `parallel` the files are spread over rayon's pool, each file still
//! processed start to finish by a single worker.

use std::path::{Path, PathBuf};

use adg_codec::is_device_file;
use adg_library::LibraryError;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::AdgError;

/// A file the batch could not process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Per-file outcome of [`run_batch`], in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub succeeded: Vec<PathBuf>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// All `.adg`/`.adv` files below `root`, sorted.
pub fn find_device_files(root: &Path) -> Result<Vec<PathBuf>, AdgError> {
    if !root.exists() {
        return Err(LibraryError::NotFound(root.to_path_buf()).into());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.map_err(|err| LibraryError::Io {
            path: err.path().unwrap_or(root).to_path_buf(),
            source: err.into(),
        })?;
        if entry.file_type().is_file() && is_device_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Where `input` (somewhere below `in_root`) lands below `out_root`.
///
/// Inputs outside `in_root` keep only their file name.
pub fn mirror_output_path(input: &Path, in_root: &Path, out_root: &Path) -> PathBuf {
    match input.strip_prefix(in_root) {
        Ok(relative) if !relative.as_os_str().is_empty() => out_root.join(relative),
        _ => out_root.join(input.file_name().unwrap_or(input.as_os_str())),
    }
}

/// Apply `op` to every input and collect the outcomes.
pub fn run_batch<F>(inputs: &[PathBuf], parallel: bool, op: F) -> BatchReport
where
    F: Fn(&Path) -> Result<(), AdgError> + Sync,
{
    let outcomes: Vec<(&PathBuf, Result<(), AdgError>)> = if parallel {
        inputs.par_iter().map(|input| (input, op(input))).collect()
    } else {
        inputs.iter().map(|input| (input, op(input))).collect()
    };

    let mut report = BatchReport::default();
    for (input, outcome) in outcomes {
        match outcome {
            Ok(()) => report.succeeded.push(input.clone()),
            Err(err) => {
                warn!(path = %input.display(), error = %err, "skipping file");
                report.failed.push(BatchFailure {
                    path: input.clone(),
                    error: err.to_string(),
                });
            }
        }
    }
    info!(
        total = report.total(),
        failed = report.failed.len(),
        parallel,
        "batch finished"
    );
    report
}
