//! Drum pad note routing: remapping, single-pad edits and trimming.

use adg_vocab::{
    BRANCH_PRESETS, DRUM_BRANCH_PRESET, MIDI_MAX, PAD_SCROLL_POSITION, RECEIVING_NOTE, SENDING_NOTE,
    ZONE_SETTINGS,
};
use adg_xml::{Document, NodeId};
use tracing::{debug, info, warn};

use crate::slots::{ordered_targets, receiving_note, receiving_note_element, SlotOrder};
use crate::{check_index, check_midi, int_value, missing, set_child_value, PatchError};

/// Pad 1 plays note 92, pad 2 note 91, and so on downwards.
const PAD_NOTE_BASE: u8 = 93;

const ALL_PADS: &str = ".//DrumBranchPreset";

/// Note played by the 1-based `pad`, `None` outside 1..=93.
pub fn pad_to_note(pad: u8) -> Option<u8> {
    match pad {
        0 => None,
        pad => PAD_NOTE_BASE.checked_sub(pad),
    }
}

/// 1-based pad number of `note`, `None` above note 92.
pub fn note_to_pad(note: u8) -> Option<u8> {
    PAD_NOTE_BASE.checked_sub(note).filter(|pad| *pad > 0)
}

/// Outcome of [`remap_notes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapReport {
    /// Pads whose note was rewritten.
    pub remapped: usize,
    /// Pads whose shifted note had to be clamped into 0..=127.
    pub clamped: usize,
    /// Old and new `PadScrollPosition`, when it was moved.
    pub scroll: Option<(i64, i64)>,
}

/// `ReceivingNote` of every pad, indexed by document order.
pub fn note_mappings(doc: &Document) -> Result<Vec<i64>, PatchError> {
    doc.select(doc.root(), ALL_PADS)?
        .into_iter()
        .map(|pad| receiving_note(doc, pad))
        .collect()
}

/// Shift every pad's `ReceivingNote` by `shift`.
///
/// With `clamp` the results are pinned to 0..=127; otherwise any result
/// outside that range fails the call before the first write. A non-zero
/// `scroll_shift` moves `PadScrollPosition`, always clamped.
pub fn remap_notes(
    doc: &mut Document,
    shift: i64,
    scroll_shift: i64,
    clamp: bool,
) -> Result<RemapReport, PatchError> {
    let max = i64::from(MIDI_MAX);
    let pads = doc.select(doc.root(), ALL_PADS)?;
    let mut plan = Vec::with_capacity(pads.len());
    let mut report = RemapReport::default();
    for (index, pad) in pads.iter().enumerate() {
        let element = receiving_note_element(doc, *pad)?;
        let old = int_value(doc, element)?;
        let shifted = old + shift;
        let new = if (0..=max).contains(&shifted) {
            shifted
        } else if clamp {
            let pinned = shifted.clamp(0, max);
            warn!(pad = index + 1, old, shifted, pinned, "note out of range, clamping");
            report.clamped += 1;
            pinned
        } else {
            return Err(PatchError::Validation(format!(
                "pad {}: note {old} shifted by {shift} leaves the MIDI range",
                index + 1
            )));
        };
        plan.push((element, old, new));
    }

    for (index, (element, old, new)) in plan.into_iter().enumerate() {
        doc.set_value(element, new)?;
        debug!(pad = index + 1, old, new, "remapped pad");
    }
    report.remapped = pads.len();

    if scroll_shift != 0 {
        let root = doc.root();
        match doc.select_first(root, &format!(".//{PAD_SCROLL_POSITION}"))? {
            Some(scroll) => {
                let old = int_value(doc, scroll)?;
                let new = (old + scroll_shift).clamp(0, max);
                doc.set_value(scroll, new)?;
                report.scroll = Some((old, new));
            }
            None => warn!("no PadScrollPosition to shift"),
        }
    }
    info!(pads = report.remapped, shift, clamped = report.clamped, "remapped pad notes");
    Ok(report)
}

/// Set the `ReceivingNote` of the pad at `index` (document order) and
/// return the previous note.
pub fn set_pad_note(doc: &mut Document, index: usize, note: i64) -> Result<i64, PatchError> {
    let note = check_midi("MIDI note", note)?;
    let pads = doc.select(doc.root(), ALL_PADS)?;
    check_index("pad index", index, pads.len())?;
    let element = receiving_note_element(doc, pads[index])?;
    let old = int_value(doc, element)?;
    doc.set_value(element, note)?;
    debug!(pad = index, old, new = note, "set pad note");
    Ok(old)
}

/// Point `pad` at a new trigger note and the note it forwards to its chain.
pub fn set_pad_routing(doc: &mut Document, pad: NodeId, receiving: u8, sending: u8) -> Result<(), PatchError> {
    check_midi("receiving note", i64::from(receiving))?;
    check_midi("sending note", i64::from(sending))?;
    let zone = doc
        .child_element(pad, ZONE_SETTINGS)
        .ok_or_else(|| missing(doc, pad, ZONE_SETTINGS))?;
    set_child_value(doc, zone, RECEIVING_NOTE, receiving)?;
    set_child_value(doc, zone, SENDING_NOTE, sending)
}

/// Keep only the `keep` highest-note pads in every `BranchPresets`
/// container and return how many pads were removed.
///
/// All containers are checked before the first removal. Containers nested
/// in an already removed pad are skipped.
pub fn trim_pads(doc: &mut Document, keep: usize) -> Result<usize, PatchError> {
    let containers = doc.select(doc.root(), &format!(".//{BRANCH_PRESETS}"))?;
    let mut plan = Vec::new();
    for container in containers {
        let pads = ordered_targets(doc, container, DRUM_BRANCH_PRESET, &SlotOrder::Descending(receiving_note))?;
        if pads.len() > keep {
            plan.push((container, pads[keep..].to_vec()));
        }
    }

    let mut removed = 0;
    for (container, pads) in plan {
        if !doc.is_attached(container) {
            debug!(container = %doc.describe(container), "container removed with its pad");
            continue;
        }
        for pad in pads {
            if doc.remove(pad) {
                removed += 1;
            }
        }
    }
    if removed > 0 {
        info!(removed, keep, "trimmed drum pads");
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::DRUM_RACK;

    fn scroll(doc: &Document) -> Option<String> {
        doc.select_first(doc.root(), ".//PadScrollPosition")
            .expect("path")
            .and_then(|id| doc.value(id))
    }

    #[test]
    fn pad_note_convention() {
        assert_eq!(pad_to_note(1), Some(92));
        assert_eq!(pad_to_note(16), Some(77));
        assert_eq!(pad_to_note(93), Some(0));
        assert_eq!(pad_to_note(0), None);
        assert_eq!(pad_to_note(94), None);
        assert_eq!(note_to_pad(92), Some(1));
        assert_eq!(note_to_pad(36), Some(57));
        assert_eq!(note_to_pad(93), None);
    }

    #[test]
    fn mappings_follow_document_order() {
        let doc = Document::parse(DRUM_RACK).expect("parse");
        assert_eq!(note_mappings(&doc).expect("mappings"), vec![90, 92, 91]);
    }

    #[test]
    fn remap_shifts_notes_and_scroll() {
        let mut doc = Document::parse(DRUM_RACK).expect("parse");
        let report = remap_notes(&mut doc, -12, 5, false).expect("remap");
        assert_eq!(report.remapped, 3);
        assert_eq!(report.clamped, 0);
        assert_eq!(report.scroll, Some((20, 25)));
        assert_eq!(note_mappings(&doc).expect("mappings"), vec![78, 80, 79]);
        assert_eq!(scroll(&doc).as_deref(), Some("25"));
    }

    #[test]
    fn remap_without_clamp_rejects_before_writing() {
        let mut doc = Document::parse(DRUM_RACK).expect("parse");
        let err = remap_notes(&mut doc, 36, 0, false).expect_err("must fail");
        assert!(matches!(err, PatchError::Validation(_)));
        assert_eq!(doc.to_xml(), DRUM_RACK);
    }

    #[test]
    fn remap_with_clamp_pins_notes() {
        let mut doc = Document::parse(DRUM_RACK).expect("parse");
        let report = remap_notes(&mut doc, 36, -40, true).expect("remap");
        assert_eq!(report.clamped, 1);
        assert_eq!(note_mappings(&doc).expect("mappings"), vec![126, 127, 127]);
        assert_eq!(report.scroll, Some((20, 0)));
    }

    #[test]
    fn set_pad_note_validates() {
        let mut doc = Document::parse(DRUM_RACK).expect("parse");
        assert_eq!(set_pad_note(&mut doc, 2, 60).expect("set"), 91);
        assert_eq!(note_mappings(&doc).expect("mappings"), vec![90, 92, 60]);
        assert!(matches!(set_pad_note(&mut doc, 3, 60), Err(PatchError::Validation(_))));
        assert!(matches!(set_pad_note(&mut doc, 0, 128), Err(PatchError::Validation(_))));
        assert!(matches!(set_pad_note(&mut doc, 0, -1), Err(PatchError::Validation(_))));
    }

    #[test]
    fn routing_rewrites_both_notes() {
        let mut doc = Document::parse(DRUM_RACK).expect("parse");
        let pad = doc.select(doc.root(), ".//DrumBranchPreset").expect("select")[1];
        set_pad_routing(&mut doc, pad, 77, 36).expect("routing");
        assert_eq!(receiving_note(&doc, pad).expect("note"), 77);
        let sending = doc.select_first(pad, "ZoneSettings/SendingNote").expect("path").expect("sending");
        assert_eq!(doc.value(sending).as_deref(), Some("36"));
        assert!(matches!(set_pad_routing(&mut doc, pad, 128, 60), Err(PatchError::Validation(_))));
    }

    #[test]
    fn trim_keeps_highest_notes() {
        let mut doc = Document::parse(DRUM_RACK).expect("parse");
        assert_eq!(trim_pads(&mut doc, 2).expect("trim"), 1);
        assert_eq!(note_mappings(&doc).expect("mappings"), vec![92, 91]);
        let xml = doc.to_xml();
        assert!(!xml.contains("Pad A"));
        assert!(xml.contains("<BranchPresets>\n\t\t\t<DrumBranchPreset Id=\"1\">"));
        assert!(Document::parse(&xml).is_ok());

        assert_eq!(trim_pads(&mut doc, 16).expect("trim"), 0);
    }

    #[test]
    fn trim_skips_racks_inside_removed_pads() {
        let nested = "<Ableton>\n\t<BranchPresets>\n\
            \t\t<DrumBranchPreset><ZoneSettings><ReceivingNote Value=\"92\" /></ZoneSettings></DrumBranchPreset>\n\
            \t\t<DrumBranchPreset>\n\
            \t\t\t<BranchPresets>\n\
            \t\t\t\t<DrumBranchPreset><ZoneSettings><ReceivingNote Value=\"50\" /></ZoneSettings></DrumBranchPreset>\n\
            \t\t\t\t<DrumBranchPreset><ZoneSettings><ReceivingNote Value=\"40\" /></ZoneSettings></DrumBranchPreset>\n\
            \t\t\t</BranchPresets>\n\
            \t\t\t<ZoneSettings><ReceivingNote Value=\"91\" /></ZoneSettings>\n\
            \t\t</DrumBranchPreset>\n\
            \t</BranchPresets>\n</Ableton>";
        let mut doc = Document::parse(nested).expect("parse");
        assert_eq!(trim_pads(&mut doc, 1).expect("trim"), 1);
        assert_eq!(note_mappings(&doc).expect("mappings"), vec![92]);
    }
}
