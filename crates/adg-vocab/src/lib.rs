//! Names of the Ableton Live device elements touched by the patchers.
//!
//! Leaf values always live in a `Value` attribute of a self-describing
//! element, e.g. `<ReceivingNote Value="92" />`.

/// Scalar attribute carried by every leaf element (`Value`).
pub const VALUE: &str = "Value";
/// Numeric identifier attribute on repeated elements (`Id`).
pub const ID: &str = "Id";
/// Host version attribute on the root element (`Creator`).
pub const CREATOR: &str = "Creator";

/// Drum pad (`DrumBranchPreset`).
pub const DRUM_BRANCH_PRESET: &str = "DrumBranchPreset";
/// Container of the rack's branches (`BranchPresets`).
pub const BRANCH_PRESETS: &str = "BranchPresets";
/// Display name of a branch or zone (`Name`).
pub const NAME: &str = "Name";
/// Per-pad note routing block (`ZoneSettings`).
pub const ZONE_SETTINGS: &str = "ZoneSettings";
/// MIDI note that triggers a pad (`ReceivingNote`).
pub const RECEIVING_NOTE: &str = "ReceivingNote";
/// MIDI note a pad forwards to its chain (`SendingNote`).
pub const SENDING_NOTE: &str = "SendingNote";
/// Device chain of a branch (`DevicePresets`).
pub const DEVICE_PRESETS: &str = "DevicePresets";
/// Device wrapper inside a chain (`AbletonDevicePreset`).
pub const ABLETON_DEVICE_PRESET: &str = "AbletonDevicePreset";
/// First visible pad row of a drum rack (`PadScrollPosition`).
pub const PAD_SCROLL_POSITION: &str = "PadScrollPosition";

/// Sampler zone (`MultiSamplePart`).
pub const MULTI_SAMPLE_PART: &str = "MultiSamplePart";
/// Zone container (`SampleParts`).
pub const SAMPLE_PARTS: &str = "SampleParts";
/// Sampler's zone map (`MultiSampleMap`).
pub const MULTI_SAMPLE_MAP: &str = "MultiSampleMap";
/// Sampler device (`MultiSampler`).
pub const MULTI_SAMPLER: &str = "MultiSampler";
/// Drum cell device (`DrumCell`).
pub const DRUM_CELL: &str = "DrumCell";
/// Simpler device (`OriginalSimpler`).
pub const ORIGINAL_SIMPLER: &str = "OriginalSimpler";
pub const KEY_RANGE: &str = "KeyRange";
pub const VELOCITY_RANGE: &str = "VelocityRange";
pub const SELECTOR_RANGE: &str = "SelectorRange";
pub const ROOT_KEY: &str = "RootKey";
pub const MIN: &str = "Min";
pub const MAX: &str = "Max";
pub const CROSSFADE_MIN: &str = "CrossfadeMin";
pub const CROSSFADE_MAX: &str = "CrossfadeMax";

/// Sample reference block (`SampleRef`).
pub const SAMPLE_REF: &str = "SampleRef";
/// File reference inside a sample reference (`FileRef`).
pub const FILE_REF: &str = "FileRef";
/// Absolute sample path (`Path`).
pub const PATH: &str = "Path";
/// Portable sample path (`RelativePath`).
pub const RELATIVE_PATH: &str = "RelativePath";
/// Path relative to the first `SampleRef` descendant of a pad or zone.
pub const SAMPLE_FILE_REF_PATH: &str = ".//SampleRef/FileRef";
/// Path from a pad to its trigger note.
pub const RECEIVING_NOTE_PATH: &str = ".//ZoneSettings/ReceivingNote";

/// Pad color (`DocumentColorIndex`).
pub const DOCUMENT_COLOR_INDEX: &str = "DocumentColorIndex";
pub const AUTO_COLORED: &str = "AutoColored";
pub const AUTO_COLOR_SCHEME: &str = "AutoColorScheme";
/// Anchor after which missing color elements are inserted.
pub const SESSION_VIEW_BRANCH_WIDTH: &str = "SessionViewBranchWidth";

/// MIDI mapping block attached to an automatable parameter (`KeyMidi`).
pub const KEY_MIDI: &str = "KeyMidi";
pub const PERSISTENT_KEY_STRING: &str = "PersistentKeyString";
pub const IS_NOTE: &str = "IsNote";
pub const CHANNEL: &str = "Channel";
pub const NOTE_OR_CONTROLLER: &str = "NoteOrController";
pub const LOWER_RANGE_NOTE: &str = "LowerRangeNote";
pub const UPPER_RANGE_NOTE: &str = "UpperRangeNote";
pub const CONTROLLER_MAP_MODE: &str = "ControllerMapMode";
/// Live object id; mappings are inserted right after it.
pub const LOM_ID: &str = "LomId";
/// Current value of an automatable parameter (`Manual`).
pub const MANUAL: &str = "Manual";

/// CC Control MIDI effect (`MidiCcControl`).
pub const MIDI_CC_CONTROL: &str = "MidiCcControl";
/// Sampler transpose parameter (`TransposeKey`).
pub const TRANSPOSE_KEY: &str = "TransposeKey";

/// Number of macro knobs on a rack.
pub const MACRO_COUNT: usize = 16;
/// Number of assignable float slots on CC Control (Custom B..M).
pub const CC_SLOT_COUNT: usize = 12;
/// Pads in the standard drum rack layout.
pub const DRUM_PAD_COUNT: usize = 32;
/// Highest valid MIDI note or controller value.
pub const MIDI_MAX: u8 = 127;

/// `MacroControls.<index>` element name.
pub fn macro_control(index: usize) -> String {
    format!("MacroControls.{index}")
}

/// `MacroDefaults.<index>` element name.
pub fn macro_default(index: usize) -> String {
    format!("MacroDefaults.{index}")
}

/// `MacroDisplayNames.<index>` element name.
pub fn macro_display_name(index: usize) -> String {
    format!("MacroDisplayNames.{index}")
}

/// `CustomFloatTargets.<slot>` element name.
pub fn custom_float_target(slot: usize) -> String {
    format!("CustomFloatTargets.{slot}")
}

/// `CustomFloatNames.<slot>` element name.
pub fn custom_float_name(slot: usize) -> String {
    format!("CustomFloatNames.{slot}")
}

/// `CustomFloatValues.<slot>` element name.
pub fn custom_float_value(slot: usize) -> String {
    format!("CustomFloatValues.{slot}")
}

/// Letter of a CC Control slot as shown in Live (slot 0 is "Custom B").
pub fn cc_slot_letter(slot: usize) -> Option<char> {
    "BCDEFGHIJKLM".chars().nth(slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexed_names() {
        assert_eq!(macro_control(15), "MacroControls.15");
        assert_eq!(custom_float_value(3), "CustomFloatValues.3");
        assert_eq!(custom_float_name(11), "CustomFloatNames.11");
        assert_eq!(cc_slot_letter(0), Some('B'));
        assert_eq!(cc_slot_letter(11), Some('M'));
        assert_eq!(cc_slot_letter(CC_SLOT_COUNT), None);
    }
}
