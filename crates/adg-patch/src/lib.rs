//! Structural patching of Ableton Live device documents.
//!
//! Every operation works on a parsed [`Document`] in place, validates its
//! parameters before touching the tree, and leaves all unrelated markup
//! exactly as it was.

pub mod color;
pub mod midi_map;
pub mod pads;
pub mod sample_ref;
pub mod sampler;
pub mod slots;
pub mod velocity;

use std::fmt;
use std::path::Path;

use adg_xml::{Document, NodeId, XmlError};
use thiserror::Error;

pub use color::{apply_pad_colors, pad_display_name, set_pad_color, ColorReport};
pub use midi_map::{
    add_transpose_mapping, apply_cc_mappings, configure_cc_slot, insert_key_midi,
    parse_cc_mappings, set_macro_name, set_macro_value, CcMapping, TransposeReport,
};
pub use pads::{
    note_mappings, note_to_pad, pad_to_note, remap_notes, set_pad_note, set_pad_routing, trim_pads,
    RemapReport,
};
pub use sample_ref::{relative_sample_path, set_sample_reference};
pub use sampler::{layout_parts, rebuild_sample_parts, set_key_range, set_root_key, KeyLayout, PartSpec};
pub use slots::{assign_slots, ordered_targets, receiving_note, KeyFn, SlotOrder};
pub use velocity::{set_velocity_range, velocity_ranges};

/// Errors raised while patching a document.
#[derive(Debug, Error)]
pub enum PatchError {
    /// An element the operation depends on is missing or malformed.
    #[error("structure: {0}")]
    Structure(String),
    /// A caller-supplied parameter is out of range; nothing was modified.
    #[error("validation: {0}")]
    Validation(String),
    #[error(transparent)]
    Xml(#[from] XmlError),
}

/// Inclusive `[min, max]` range of MIDI notes or velocities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneRange {
    pub min: u8,
    pub max: u8,
}

impl ZoneRange {
    /// The whole MIDI range, 0..=127.
    pub const FULL: ZoneRange = ZoneRange { min: 0, max: 127 };

    pub const fn new(min: u8, max: u8) -> Self {
        ZoneRange { min, max }
    }

    /// A zone covering a single note.
    pub const fn single(note: u8) -> Self {
        ZoneRange { min: note, max: note }
    }
}

impl fmt::Display for ZoneRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Absolute path of a sample as written into a `FileRef`.
///
/// Never empty: an absent sample is expressed as `None`, not as `""`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SamplePath(String);

impl SamplePath {
    pub fn new(path: impl Into<String>) -> Result<Self, PatchError> {
        let path = path.into();
        if path.is_empty() {
            return Err(PatchError::Validation("sample path must not be empty".into()));
        }
        Ok(SamplePath(path))
    }

    pub fn from_path(path: &Path) -> Result<Self, PatchError> {
        SamplePath::new(path.to_string_lossy().into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name without extension, used to name zones.
    pub fn stem(&self) -> &str {
        Path::new(&self.0)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for SamplePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SamplePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub(crate) fn missing(doc: &Document, id: NodeId, what: &str) -> PatchError {
    PatchError::Structure(format!("{} has no {what}", doc.describe(id)))
}

/// First element matching `path` below `from`, or a structure error.
pub(crate) fn require(doc: &Document, from: NodeId, path: &str) -> Result<NodeId, PatchError> {
    doc.select_first(from, path)?
        .ok_or_else(|| missing(doc, from, path.trim_start_matches(|c: char| c == '.' || c == '/')))
}

/// Integer `Value` of an element.
pub(crate) fn int_value(doc: &Document, id: NodeId) -> Result<i64, PatchError> {
    let raw = doc
        .value(id)
        .ok_or_else(|| missing(doc, id, "Value attribute"))?;
    raw.trim().parse().map_err(|_| {
        PatchError::Structure(format!("{} has non-integer Value '{raw}'", doc.describe(id)))
    })
}

/// Set the `Value` of the direct child `name`, which must exist.
pub(crate) fn set_child_value(
    doc: &mut Document,
    parent: NodeId,
    name: &str,
    value: impl fmt::Display,
) -> Result<(), PatchError> {
    let child = doc
        .child_element(parent, name)
        .ok_or_else(|| missing(doc, parent, name))?;
    doc.set_value(child, value)?;
    Ok(())
}

/// Set the `Value` of the direct child `name` when present.
pub(crate) fn set_optional_value(
    doc: &mut Document,
    parent: NodeId,
    name: &str,
    value: impl fmt::Display,
) -> Result<bool, PatchError> {
    match doc.child_element(parent, name) {
        Some(child) => {
            doc.set_value(child, value)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

pub(crate) fn check_midi(what: &str, value: i64) -> Result<u8, PatchError> {
    u8::try_from(value)
        .ok()
        .filter(|v| *v <= adg_vocab::MIDI_MAX)
        .ok_or_else(|| PatchError::Validation(format!("{what} must be 0-127, got {value}")))
}

pub(crate) fn check_index(what: &str, value: usize, count: usize) -> Result<(), PatchError> {
    match count {
        0 => Err(PatchError::Validation(format!("{what} {value}: nothing to address"))),
        _ if value < count => Ok(()),
        _ => Err(PatchError::Validation(format!(
            "{what} must be 0-{}, got {value}",
            count - 1
        ))),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Three pads in scrambled note order, one DrumCell sample each.
    pub const DRUM_RACK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Ableton MajorVersion="5" Creator="Ableton Live 12.1">
	<GroupDevicePreset>
		<BranchPresets>
			<DrumBranchPreset Id="0">
				<Name Value="Pad A" />
				<SessionViewBranchWidth Value="55" />
				<DevicePresets>
					<AbletonDevicePreset Id="0">
						<Device>
							<DrumCell Id="0">
								<UserSample>
									<Value>
										<SampleRef>
											<FileRef>
												<RelativePathType Value="3" />
												<RelativePath Value="../../Old/Kit/A.wav" />
												<Path Value="/old/Old/Kit/A.wav" />
											</FileRef>
										</SampleRef>
									</Value>
								</UserSample>
							</DrumCell>
						</Device>
					</AbletonDevicePreset>
				</DevicePresets>
				<ZoneSettings>
					<ReceivingNote Value="90" />
					<SendingNote Value="60" />
				</ZoneSettings>
			</DrumBranchPreset>
			<DrumBranchPreset Id="1">
				<Name Value="Pad B" />
				<SessionViewBranchWidth Value="55" />
				<DocumentColorIndex Value="3" />
				<AutoColored Value="true" />
				<AutoColorScheme Value="0" />
				<DevicePresets>
					<AbletonDevicePreset Id="0">
						<Device>
							<DrumCell Id="0">
								<UserSample>
									<Value>
										<SampleRef>
											<FileRef>
												<RelativePathType Value="3" />
												<RelativePath Value="../../Old/Kit/B.wav" />
												<Path Value="/old/Old/Kit/B.wav" />
											</FileRef>
										</SampleRef>
									</Value>
								</UserSample>
							</DrumCell>
						</Device>
					</AbletonDevicePreset>
				</DevicePresets>
				<ZoneSettings>
					<ReceivingNote Value="92" />
					<SendingNote Value="60" />
				</ZoneSettings>
			</DrumBranchPreset>
			<DrumBranchPreset Id="2">
				<Name Value="Pad C" />
				<SessionViewBranchWidth Value="55" />
				<DevicePresets>
					<AbletonDevicePreset Id="0">
						<Device>
							<DrumCell Id="0">
								<UserSample>
									<Value>
										<SampleRef>
											<FileRef>
												<RelativePathType Value="3" />
												<RelativePath Value="../../Old/Kit/C.wav" />
												<Path Value="/old/Old/Kit/C.wav" />
											</FileRef>
										</SampleRef>
									</Value>
								</UserSample>
							</DrumCell>
						</Device>
					</AbletonDevicePreset>
				</DevicePresets>
				<ZoneSettings>
					<ReceivingNote Value="91" />
					<SendingNote Value="60" />
				</ZoneSettings>
			</DrumBranchPreset>
		</BranchPresets>
		<PadScrollPosition Value="20" />
	</GroupDevicePreset>
</Ableton>
"#;

    /// A sampler with a single template zone.
    pub const SAMPLER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Ableton MajorVersion="5" Creator="Ableton Live 12.1">
	<MultiSampler Id="0">
		<Player>
			<MultiSampleMap>
				<SampleParts>
					<MultiSamplePart Id="7" HasImportedSlicePoints="false">
						<LomId Value="0" />
						<Name Value="Template" />
						<Selection Value="true" />
						<KeyRange>
							<Min Value="0" />
							<Max Value="127" />
							<CrossfadeMin Value="0" />
							<CrossfadeMax Value="127" />
						</KeyRange>
						<VelocityRange>
							<Min Value="1" />
							<Max Value="127" />
							<CrossfadeMin Value="1" />
							<CrossfadeMax Value="127" />
						</VelocityRange>
						<RootKey Value="60" />
						<Volume Value="0.5" />
						<SampleRef>
							<FileRef>
								<RelativePath Value="" />
								<Path Value="" />
							</FileRef>
						</SampleRef>
					</MultiSamplePart>
				</SampleParts>
			</MultiSampleMap>
			<TransposeKey>
				<LomId Value="0" />
				<Manual Value="0" />
			</TransposeKey>
		</Player>
	</MultiSampler>
</Ableton>
"#;
}
