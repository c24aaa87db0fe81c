//! Rebuilding a sampler's zone list (`MultiSampleMap/SampleParts`).

use std::fmt;
use std::str::FromStr;

use adg_vocab::{
    CROSSFADE_MAX, CROSSFADE_MIN, DRUM_PAD_COUNT, ID, KEY_RANGE, MAX, MIDI_MAX, MIN,
    MULTI_SAMPLE_PART, NAME, ROOT_KEY, VELOCITY_RANGE,
};
use adg_xml::{Document, NodeId};
use tracing::{debug, warn};

use crate::sample_ref::set_sample_reference;
use crate::slots::{assign_slots, KeyFn, SlotOrder};
use crate::velocity::set_velocity_range;
use crate::{missing, require, set_child_value, set_optional_value, PatchError, SamplePath, ZoneRange};

const SAMPLE_PARTS_PATH: &str = ".//MultiSampleMap/SampleParts";

/// Zone used when the template sampler has none to copy from.
const PART_SKELETON: &str = concat!(
    r#"<MultiSamplePart Id="0" HasImportedSlicePoints="false">"#,
    r#"<LomId Value="0" /><Name Value="" /><Selection Value="true" />"#,
    r#"<IsActive Value="true" /><Solo Value="false" />"#,
    r#"<KeyRange><Min Value="0" /><Max Value="127" /><CrossfadeMin Value="0" /><CrossfadeMax Value="127" /></KeyRange>"#,
    r#"<VelocityRange><Min Value="1" /><Max Value="127" /><CrossfadeMin Value="1" /><CrossfadeMax Value="127" /></VelocityRange>"#,
    r#"<SelectorRange><Min Value="0" /><Max Value="127" /><CrossfadeMin Value="0" /><CrossfadeMax Value="127" /></SelectorRange>"#,
    r#"<RootKey Value="60" /><Detune Value="0" /><TuneScale Value="100" /><Panorama Value="0" />"#,
    r#"<Volume Value="1" /><Link Value="false" /><SampleStart Value="0" /><SampleEnd Value="0" />"#,
    r#"<SampleRef><FileRef><RelativePathType Value="3" /><RelativePath Value="" /><Path Value="" />"#,
    r#"<Type Value="1" /><LivePackName Value="" /><LivePackId Value="" /><OriginalFileSize Value="0" />"#,
    r#"<OriginalCrc Value="0" /><SourceHint Value="" /></FileRef>"#,
    r#"<LastModDate Value="0" /><SourceContext /><SampleUsageHint Value="0" /><DefaultDuration Value="0" /></SampleRef>"#,
    r#"<SliceCount Value="1" /></MultiSamplePart>"#,
);

/// How consecutive samples are laid out on the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyLayout {
    /// One note per sample from note 0 upwards.
    #[default]
    Chromatic,
    /// One note per sample from note 36 upwards.
    Percussion,
    /// Notes 0..31, at most 32 samples.
    Drum,
}

impl KeyLayout {
    pub const fn first_note(self) -> u8 {
        match self {
            KeyLayout::Chromatic | KeyLayout::Drum => 0,
            KeyLayout::Percussion => 36,
        }
    }

    pub const fn max_parts(self) -> Option<usize> {
        match self {
            KeyLayout::Drum => Some(DRUM_PAD_COUNT),
            KeyLayout::Chromatic | KeyLayout::Percussion => None,
        }
    }
}

impl fmt::Display for KeyLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeyLayout::Chromatic => "chromatic",
            KeyLayout::Percussion => "percussion",
            KeyLayout::Drum => "drum",
        })
    }
}

impl FromStr for KeyLayout {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromatic" => Ok(KeyLayout::Chromatic),
            "percussion" => Ok(KeyLayout::Percussion),
            "drum" => Ok(KeyLayout::Drum),
            other => Err(PatchError::Validation(format!("unknown key layout '{other}'"))),
        }
    }
}

/// Everything written into one rebuilt zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartSpec {
    pub sample: SamplePath,
    pub name: String,
    pub keys: ZoneRange,
    pub root_key: u8,
    pub velocity: ZoneRange,
}

impl PartSpec {
    /// Zone playing `sample` on a single note at full velocity.
    pub fn single_note(sample: SamplePath, note: u8) -> Self {
        PartSpec {
            name: sample.stem().to_string(),
            sample,
            keys: ZoneRange::single(note),
            root_key: note,
            velocity: ZoneRange::new(1, MIDI_MAX),
        }
    }
}

/// Map samples to single-note zones following `layout`. Samples that would
/// land above note 127 are dropped.
pub fn layout_parts(samples: &[SamplePath], layout: KeyLayout) -> Vec<PartSpec> {
    let limit = layout.max_parts().unwrap_or(usize::MAX);
    let mut parts = Vec::new();
    for (index, sample) in samples.iter().take(limit).enumerate() {
        let note = usize::from(layout.first_note()) + index;
        if note > usize::from(MIDI_MAX) {
            warn!(
                dropped = samples.len().min(limit) - index,
                "samples exceed the MIDI note range"
            );
            break;
        }
        parts.push(PartSpec::single_note(sample.clone(), note as u8));
    }
    parts
}

pub fn set_key_range(doc: &mut Document, part: NodeId, range: ZoneRange) -> Result<(), PatchError> {
    let block = doc
        .child_element(part, KEY_RANGE)
        .ok_or_else(|| missing(doc, part, KEY_RANGE))?;
    set_child_value(doc, block, MIN, range.min)?;
    set_child_value(doc, block, MAX, range.max)?;
    set_optional_value(doc, block, CROSSFADE_MIN, range.min)?;
    set_optional_value(doc, block, CROSSFADE_MAX, range.max)?;
    Ok(())
}

pub fn set_root_key(doc: &mut Document, part: NodeId, note: u8) -> Result<(), PatchError> {
    set_child_value(doc, part, ROOT_KEY, note)
}

fn write_part(doc: &mut Document, part: NodeId, spec: &PartSpec) -> Result<bool, PatchError> {
    set_optional_value(doc, part, NAME, &spec.name)?;
    set_key_range(doc, part, spec.keys)?;
    set_velocity_range(doc, part, spec.velocity)?;
    set_root_key(doc, part, spec.root_key)?;
    set_sample_reference(doc, part, &spec.sample)
}

/// Fail unless `part` has every element [`write_part`] sets.
fn check_template(doc: &Document, part: NodeId) -> Result<(), PatchError> {
    for block in [KEY_RANGE, VELOCITY_RANGE] {
        let range = doc
            .child_element(part, block)
            .ok_or_else(|| missing(doc, part, block))?;
        for bound in [MIN, MAX] {
            if doc.child_element(range, bound).is_none() {
                return Err(missing(doc, range, bound));
            }
        }
    }
    if doc.child_element(part, ROOT_KEY).is_none() {
        return Err(missing(doc, part, ROOT_KEY));
    }
    Ok(())
}

/// Replace the zones of `sampler` with one `MultiSamplePart` per spec.
///
/// New zones are copies of the first existing zone, so loop, gain and warp
/// settings of the template carry over; a built-in skeleton is used when the
/// template has no zone. Returns the number of zones whose sample reference
/// was written. A template zone lacking key range, velocity range or root
/// key is a structure error and leaves the document untouched.
pub fn rebuild_sample_parts(
    doc: &mut Document,
    sampler: NodeId,
    parts: &[PartSpec],
) -> Result<usize, PatchError> {
    let container = require(doc, sampler, SAMPLE_PARTS_PATH)?;
    let template = match doc.child_element(container, MULTI_SAMPLE_PART) {
        Some(existing) => existing,
        None => {
            let skeleton = Document::parse(PART_SKELETON)?;
            let imported = doc.import(&skeleton, skeleton.root());
            let indent = format!(
                "{}\t",
                doc.leading_whitespace(container).unwrap_or_else(|| "\n".to_string())
            );
            doc.indent_subtree(imported, &indent);
            imported
        }
    };
    check_template(doc, template)?;

    doc.clear_children(container);
    for index in 0..parts.len() {
        let part = doc.deep_clone(template);
        doc.set_attribute(part, ID, &index.to_string())?;
        doc.append_indented(container, part)?;
    }

    let values: Vec<Option<&PartSpec>> = parts.iter().map(Some).collect();
    let written = assign_slots(
        doc,
        container,
        MULTI_SAMPLE_PART,
        SlotOrder::<KeyFn>::Document,
        &values,
        |doc, part, spec| write_part(doc, part, spec),
    )?;
    debug!(parts = parts.len(), written, "rebuilt sample parts");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::SAMPLER;
    use adg_vocab::PATH;

    fn samples(names: &[&str]) -> Vec<SamplePath> {
        names
            .iter()
            .map(|name| SamplePath::new(format!("/lib/Keys/Set/{name}.wav")).expect("path"))
            .collect()
    }

    fn child_value(doc: &Document, parent: NodeId, path: &str) -> String {
        doc.select_first(parent, path)
            .expect("path")
            .and_then(|id| doc.value(id))
            .unwrap_or_default()
    }

    #[test]
    fn layouts_assign_consecutive_notes() {
        let parts = layout_parts(&samples(&["a", "b"]), KeyLayout::Percussion);
        assert_eq!(parts[0].keys, ZoneRange::single(36));
        assert_eq!(parts[1].root_key, 37);
        assert_eq!(parts[1].name, "b");

        let many: Vec<String> = (0..40).map(|i| format!("s{i}")).collect();
        let names: Vec<&str> = many.iter().map(String::as_str).collect();
        assert_eq!(layout_parts(&samples(&names), KeyLayout::Drum).len(), 32);

        let lots: Vec<String> = (0..100).map(|i| format!("p{i}")).collect();
        let names: Vec<&str> = lots.iter().map(String::as_str).collect();
        let percussion = layout_parts(&samples(&names), KeyLayout::Percussion);
        assert_eq!(percussion.len(), 92);
        assert_eq!(percussion[91].root_key, 127);
    }

    #[test]
    fn rebuild_clones_template_zone() {
        let mut doc = Document::parse(SAMPLER).expect("parse");
        let sampler = doc.select_first(doc.root(), ".//MultiSampler").expect("path").expect("sampler");
        let parts = layout_parts(&samples(&["Kick", "Snare", "Hat"]), KeyLayout::Chromatic);
        let written = rebuild_sample_parts(&mut doc, sampler, &parts).expect("rebuild");
        assert_eq!(written, 3);

        let zones = doc.select(sampler, ".//MultiSamplePart").expect("select");
        assert_eq!(zones.len(), 3);
        for (index, zone) in zones.iter().enumerate() {
            assert_eq!(doc.attribute(*zone, "Id"), Some(index.to_string()));
            assert_eq!(child_value(&doc, *zone, "KeyRange/Min"), index.to_string());
            assert_eq!(child_value(&doc, *zone, "KeyRange/CrossfadeMax"), index.to_string());
            assert_eq!(child_value(&doc, *zone, "RootKey"), index.to_string());
            // template-only settings are inherited
            assert_eq!(child_value(&doc, *zone, "Volume"), "0.5");
        }
        assert_eq!(child_value(&doc, zones[1], "Name"), "Snare");
        assert_eq!(child_value(&doc, zones[2], ".//FileRef/Path"), "/lib/Keys/Set/Hat.wav");
        assert_eq!(child_value(&doc, zones[2], ".//FileRef/RelativePath"), "../../Keys/Set/Hat.wav");

        let xml = doc.to_xml();
        assert!(xml.contains("<SampleParts>\n\t\t\t\t\t<MultiSamplePart Id=\"0\""));
        assert!(xml.contains("</MultiSamplePart>\n\t\t\t\t\t<MultiSamplePart Id=\"1\""));
        assert!(xml.contains("</MultiSamplePart>\n\t\t\t\t</SampleParts>"));
        assert!(Document::parse(&xml).is_ok());
    }

    #[test]
    fn rebuild_from_skeleton_when_template_is_empty() {
        let xml = "<Ableton>\n\t<MultiSampler>\n\t\t<MultiSampleMap>\n\t\t\t<SampleParts />\n\t\t</MultiSampleMap>\n\t</MultiSampler>\n</Ableton>";
        let mut doc = Document::parse(xml).expect("parse");
        let sampler = doc.child_element(doc.root(), "MultiSampler").expect("sampler");
        let mut spec = PartSpec::single_note(SamplePath::new("/x/y/z/Tom.aif").expect("path"), 48);
        spec.velocity = ZoneRange::new(61, 100);
        let written = rebuild_sample_parts(&mut doc, sampler, &[spec]).expect("rebuild");
        assert_eq!(written, 1);

        let zone = doc.select_first(sampler, ".//MultiSamplePart").expect("path").expect("zone");
        assert_eq!(child_value(&doc, zone, "Name"), "Tom");
        assert_eq!(child_value(&doc, zone, &format!("{VELOCITY_RANGE}/Min")), "61");
        assert_eq!(child_value(&doc, zone, &format!(".//FileRef/{PATH}")), "/x/y/z/Tom.aif");
        let out = doc.to_xml();
        assert!(out.contains("<SampleParts>\n\t\t\t\t<MultiSamplePart Id=\"0\" HasImportedSlicePoints=\"false\">\n\t\t\t\t\t<LomId Value=\"0\" />"));
        assert!(out.contains("\t\t\t\t\t<KeyRange>\n\t\t\t\t\t\t<Min Value=\"48\" />"));
    }

    #[test]
    fn missing_sample_parts_is_a_structure_error() {
        let mut doc = Document::parse("<Ableton><MultiSampler /></Ableton>").expect("parse");
        let sampler = doc.child_element(doc.root(), "MultiSampler").expect("sampler");
        let parts = layout_parts(&samples(&["a"]), KeyLayout::Chromatic);
        assert!(matches!(
            rebuild_sample_parts(&mut doc, sampler, &parts),
            Err(PatchError::Structure(_))
        ));
    }

    #[test]
    fn incomplete_template_leaves_zones_untouched() {
        let mut doc = Document::parse(SAMPLER).expect("parse");
        let sampler = doc.select_first(doc.root(), ".//MultiSampler").expect("path").expect("sampler");
        let template = doc.select_first(sampler, ".//MultiSamplePart").expect("path").expect("zone");
        let velocity = doc.child_element(template, VELOCITY_RANGE).expect("velocity");
        assert!(doc.remove(velocity));
        let before = doc.to_xml();

        let parts = layout_parts(&samples(&["Kick", "Snare"]), KeyLayout::Chromatic);
        assert!(matches!(
            rebuild_sample_parts(&mut doc, sampler, &parts),
            Err(PatchError::Structure(message)) if message.contains(VELOCITY_RANGE)
        ));
        assert_eq!(doc.to_xml(), before);
        assert_eq!(doc.select(sampler, ".//MultiSamplePart").expect("select").len(), 1);
    }

    #[test]
    fn template_without_range_bound_is_rejected() {
        let mut doc = Document::parse(SAMPLER).expect("parse");
        let sampler = doc.select_first(doc.root(), ".//MultiSampler").expect("path").expect("sampler");
        let max = doc.select_first(sampler, ".//MultiSamplePart/KeyRange/Max").expect("path").expect("max");
        assert!(doc.remove(max));
        let before = doc.to_xml();

        let parts = layout_parts(&samples(&["Kick"]), KeyLayout::Chromatic);
        assert!(rebuild_sample_parts(&mut doc, sampler, &parts).is_err());
        assert_eq!(doc.to_xml(), before);
    }
}
