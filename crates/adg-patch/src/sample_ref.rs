//! Rewriting the sample file reference of a pad or zone.

use adg_vocab::{PATH, RELATIVE_PATH, SAMPLE_FILE_REF_PATH};
use adg_xml::{Document, NodeId};
use tracing::{debug, warn};

use crate::{PatchError, SamplePath};

/// Live's portable form of a sample path: `../../` followed by the last three
/// `/`-separated segments of the absolute path.
///
/// The depth is fixed and does not depend on where the device file actually
/// lives. Paths with fewer than three segments keep all of them (a leading
/// `/` yields an empty first segment).
pub fn relative_sample_path(absolute: &str) -> String {
    let segments: Vec<&str> = absolute.split('/').collect();
    let tail = &segments[segments.len().saturating_sub(3)..];
    format!("../../{}", tail.join("/"))
}

/// Point the first `SampleRef/FileRef` below `element` at `sample`.
///
/// Only `Path` and, if present, `RelativePath` change; every other field of
/// the reference is inherited from the template. Returns `false` when the
/// element carries no file reference.
pub fn set_sample_reference(
    doc: &mut Document,
    element: NodeId,
    sample: &SamplePath,
) -> Result<bool, PatchError> {
    let Some(file_ref) = doc.select_first(element, SAMPLE_FILE_REF_PATH)? else {
        warn!(element = %doc.describe(element), "no sample reference to rewrite");
        return Ok(false);
    };
    let Some(path) = doc.child_element(file_ref, PATH) else {
        warn!(element = %doc.describe(file_ref), "file reference has no Path");
        return Ok(false);
    };
    doc.set_value(path, sample)?;
    if let Some(relative) = doc.child_element(file_ref, RELATIVE_PATH) {
        doc.set_value(relative, relative_sample_path(sample.as_str()))?;
    }
    debug!(sample = %sample, "sample reference rewritten");
    Ok(true)
}
