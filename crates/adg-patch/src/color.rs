//! Pad color coding by sample category.

use std::collections::BTreeMap;

use adg_library::{ColorCategory, ColorScheme};
use adg_vocab::{
    AUTO_COLORED, AUTO_COLOR_SCHEME, DOCUMENT_COLOR_INDEX, DRUM_BRANCH_PRESET, NAME,
    SESSION_VIEW_BRANCH_WIDTH,
};
use adg_xml::{Document, NodeId};
use tracing::{debug, info, warn};

use crate::PatchError;

const DRUM_CELL_SAMPLE: &str = ".//DrumCell/UserSample/Value/SampleRef/FileRef/Path";
const SIMPLER_SAMPLE: &str =
    ".//OriginalSimpler/MultiSampleMap/SampleParts/MultiSamplePart/SampleRef/FileRef/Path";

/// Names this short, or naming a pack or library, say nothing about the sound.
fn is_meaningful(name: &str) -> bool {
    name.chars().count() > 3 && !name.contains("Pack") && !name.contains("Library")
}

/// Outcome of [`apply_pad_colors`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorReport {
    pub colored: usize,
    pub skipped: usize,
    pub by_category: BTreeMap<ColorCategory, usize>,
}

/// The text a pad is categorized by: its first meaningful `Name`, else the
/// DrumCell sample path, else the Simpler sample path.
pub fn pad_display_name(doc: &Document, pad: NodeId) -> Result<Option<String>, PatchError> {
    let named = doc
        .select(pad, &format!(".//{NAME}"))?
        .into_iter()
        .filter_map(|id| doc.value(id))
        .find(|name| is_meaningful(name));
    if named.is_some() {
        return Ok(named);
    }
    for path in [DRUM_CELL_SAMPLE, SIMPLER_SAMPLE] {
        if let Some(id) = doc.select_first(pad, path)? {
            return Ok(doc.value(id));
        }
    }
    Ok(None)
}

/// Give `pad` a fixed color and switch off auto coloring.
///
/// Pads without color elements get them inserted after
/// `SessionViewBranchWidth`; returns `false` when that anchor is missing too.
pub fn set_pad_color(doc: &mut Document, pad: NodeId, color: u8) -> Result<bool, PatchError> {
    if let Some(index) = doc.child_element(pad, DOCUMENT_COLOR_INDEX) {
        doc.set_value(index, color)?;
        if let Some(auto) = doc.child_element(pad, AUTO_COLORED) {
            doc.set_value(auto, "false")?;
        }
        return Ok(true);
    }

    let Some(anchor) = doc.child_element(pad, SESSION_VIEW_BRANCH_WIDTH) else {
        warn!(pad = %doc.describe(pad), "no color elements and no SessionViewBranchWidth");
        return Ok(false);
    };
    let index = doc.create_value_element(DOCUMENT_COLOR_INDEX, color);
    let auto = doc.create_value_element(AUTO_COLORED, "false");
    let scheme = doc.create_value_element(AUTO_COLOR_SCHEME, 0);
    doc.insert_after(anchor, index)?;
    doc.insert_after(index, auto)?;
    doc.insert_after(auto, scheme)?;
    Ok(true)
}

/// Color every pad by the category of its display name.
///
/// Pads are visited in document order; a pad's color never depends on its
/// note, so pads without `ReceivingNote` are colored like any other.
pub fn apply_pad_colors(doc: &mut Document, scheme: &ColorScheme) -> Result<ColorReport, PatchError> {
    let pads = doc.select(doc.root(), &format!(".//{DRUM_BRANCH_PRESET}"))?;
    let mut report = ColorReport::default();
    for (index, pad) in pads.into_iter().enumerate() {
        let Some(name) = pad_display_name(doc, pad)? else {
            report.skipped += 1;
            continue;
        };
        let category = ColorCategory::from_name(&name);
        let color = scheme.color(category);
        if set_pad_color(doc, pad, color)? {
            debug!(pad = index + 1, %name, category = category.key(), color, "colored pad");
            report.colored += 1;
            *report.by_category.entry(category).or_default() += 1;
        } else {
            report.skipped += 1;
        }
    }
    info!(colored = report.colored, skipped = report.skipped, "applied pad colors");
    Ok(report)
}
