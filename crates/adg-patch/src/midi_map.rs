//! Macro mappings: `KeyMidi` blocks on CC Control slots and transpose
//! parameters, plus macro values and names.

use std::fmt;
use std::str::FromStr;

use adg_vocab::{
    cc_slot_letter, custom_float_name, custom_float_target, custom_float_value, macro_control,
    macro_default, macro_display_name, ABLETON_DEVICE_PRESET, CC_SLOT_COUNT, CHANNEL,
    CONTROLLER_MAP_MODE, DEVICE_PRESETS, IS_NOTE, KEY_MIDI, LOM_ID, LOWER_RANGE_NOTE, MACRO_COUNT,
    MANUAL, MIDI_CC_CONTROL, MIDI_MAX, NOTE_OR_CONTROLLER, PERSISTENT_KEY_STRING, TRANSPOSE_KEY,
    UPPER_RANGE_NOTE,
};
use adg_xml::{Document, NodeId};
use tracing::{debug, info, warn};

use crate::{check_index, check_midi, int_value, missing, require, set_child_value, PatchError};

/// Mappings are received on channel 16, which Live reserves for macros.
const MACRO_CHANNEL: u8 = 16;

/// Reference to Live's built-in CC Control preset.
const CC_CONTROL_PRESET_REF: &str = concat!(
    r#"<AbletonDefaultPresetRef Id="0"><FileRef><RelativePathType Value="7" />"#,
    r#"<RelativePath Value="Devices/MIDI Effects/CC Control" />"#,
    r#"<Path Value="/Applications/Ableton Live 12 Suite.app/Contents/App-Resources/Builtin/Devices/MIDI Effects/CC Control" />"#,
    r#"<Type Value="2" /><LivePackName Value="" /><LivePackId Value="" /><OriginalFileSize Value="0" />"#,
    r#"<OriginalCrc Value="0" /><SourceHint Value="" /></FileRef><DeviceId Name="" /></AbletonDefaultPresetRef>"#,
);

const CC_CONTROL_HEAD: &str = concat!(
    r#"<LomId Value="0" /><LomIdView Value="0" /><IsExpanded Value="true" /><BreakoutIsExpanded Value="false" />"#,
    r#"<On><LomId Value="0" /><Manual Value="true" /><AutomationTarget Id="0"><LockEnvelope Value="0" /></AutomationTarget>"#,
    r#"<MidiCCOnOffThresholds><Min Value="64" /><Max Value="127" /></MidiCCOnOffThresholds></On>"#,
    r#"<ModulationSourceCount Value="0" /><ParametersListWrapper LomId="0" /><Pointee Id="0" />"#,
    r#"<LastSelectedTimeableIndex Value="0" /><LastSelectedClipEnvelopeIndex Value="0" />"#,
);

const CC_CONTROL_STATE: &str = concat!(
    r#"<LockedScripts /><IsFolded Value="false" /><ShouldShowPresetName Value="true" />"#,
    r#"<UserName Value="" /><Annotation Value="" /><SourceContext><Value /></SourceContext>"#,
    r#"<MpePitchBendUsesTuning Value="true" /><ViewData Value="{}" /><OverwriteProtectionNumber Value="3075" />"#,
);

const CC_CONTROL_BOOL: &str = concat!(
    r#"<CustomBoolName Value="Custom A" /><CustomBoolTarget Value="64" />"#,
    r#"<CustomBoolValue><LomId Value="0" /><Manual Value="false" />"#,
    r#"<AutomationTarget Id="0"><LockEnvelope Value="0" /></AutomationTarget>"#,
    r#"<MidiCCOnOffThresholds><Min Value="64" /><Max Value="127" /></MidiCCOnOffThresholds></CustomBoolValue>"#,
);

/// One CC Control slot routed to a macro: `Custom <slot letter>` listens to
/// controller `cc` and drives macro `macro_index` (both 0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcMapping {
    pub slot: usize,
    pub cc: u8,
    pub macro_index: usize,
}

impl CcMapping {
    pub fn new(slot: usize, cc: i64, macro_index: usize) -> Result<Self, PatchError> {
        check_index("CC Control slot", slot, CC_SLOT_COUNT)?;
        let cc = check_midi("CC number", cc)?;
        check_index("macro index", macro_index, MACRO_COUNT)?;
        Ok(CcMapping {
            slot,
            cc,
            macro_index,
        })
    }
}

impl fmt::Display for CcMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.slot, self.cc, self.macro_index)
    }
}

impl FromStr for CcMapping {
    type Err = PatchError;

    /// `slot:cc:macro`, e.g. `3:119:15`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PatchError::Validation(format!("invalid mapping '{s}', expected slot:cc:macro"));
        let fields: Vec<&str> = s.trim().split(':').map(str::trim).collect();
        let [slot, cc, macro_index] = fields.as_slice() else {
            return Err(invalid());
        };
        CcMapping::new(
            slot.parse().map_err(|_| invalid())?,
            cc.parse().map_err(|_| invalid())?,
            macro_index.parse().map_err(|_| invalid())?,
        )
    }
}

/// Parse a comma separated list of `slot:cc:macro` triples.
pub fn parse_cc_mappings(list: &str) -> Result<Vec<CcMapping>, PatchError> {
    list.split(',')
        .filter(|item| !item.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// Build a detached `KeyMidi` block mapping a parameter to `macro_index`,
/// indented one level below `indent`.
fn key_midi(doc: &mut Document, macro_index: usize, indent: &str) -> Result<NodeId, PatchError> {
    let block = doc.create_element(KEY_MIDI);
    let fields = [
        doc.create_value_element(PERSISTENT_KEY_STRING, ""),
        doc.create_value_element(IS_NOTE, "false"),
        doc.create_value_element(CHANNEL, MACRO_CHANNEL),
        doc.create_value_element(NOTE_OR_CONTROLLER, macro_index),
        doc.create_value_element(LOWER_RANGE_NOTE, -1),
        doc.create_value_element(UPPER_RANGE_NOTE, -1),
        doc.create_value_element(CONTROLLER_MAP_MODE, 0),
    ];
    for field in fields {
        doc.append_child(block, field)?;
    }
    doc.indent_subtree(block, indent);
    Ok(block)
}

/// Insert a `KeyMidi` for `macro_index` directly after the `LomId` of
/// `param`. Returns `false` when the parameter has no `LomId`.
pub fn insert_key_midi(doc: &mut Document, param: NodeId, macro_index: usize) -> Result<bool, PatchError> {
    check_index("macro index", macro_index, MACRO_COUNT)?;
    let Some(lom_id) = doc.child_element(param, LOM_ID) else {
        warn!(param = %doc.describe(param), "parameter has no LomId, mapping skipped");
        return Ok(false);
    };
    let indent = doc.leading_whitespace(lom_id).unwrap_or_default();
    let block = key_midi(doc, macro_index, &indent)?;
    doc.insert_after(lom_id, block)?;
    Ok(true)
}

fn remove_key_midi(doc: &mut Document, param: NodeId) -> usize {
    let existing: Vec<NodeId> = doc
        .child_elements(param)
        .filter(|id| doc.name(*id) == Some(KEY_MIDI))
        .collect();
    existing.into_iter().filter(|id| doc.remove(*id)).count()
}

struct SlotElements {
    target: NodeId,
    value: NodeId,
}

fn slot_elements(doc: &Document, cc_control: NodeId, slot: usize) -> Result<SlotElements, PatchError> {
    let target = require(doc, cc_control, &format!(".//{}", custom_float_target(slot)))?;
    let value = require(doc, cc_control, &format!(".//{}", custom_float_value(slot)))?;
    if doc.child_element(value, LOM_ID).is_none() {
        return Err(missing(doc, value, LOM_ID));
    }
    Ok(SlotElements { target, value })
}

/// Route one CC Control slot to a macro. Any previous `KeyMidi` of the slot
/// is replaced, so the slot never carries two mappings.
pub fn configure_cc_slot(doc: &mut Document, cc_control: NodeId, mapping: &CcMapping) -> Result<(), PatchError> {
    let slot = slot_elements(doc, cc_control, mapping.slot)?;
    doc.set_value(slot.target, mapping.cc)?;
    let replaced = remove_key_midi(doc, slot.value);
    insert_key_midi(doc, slot.value, mapping.macro_index)?;
    debug!(
        slot = %cc_slot_letter(mapping.slot).unwrap_or('?'),
        cc = mapping.cc,
        macro_number = mapping.macro_index + 1,
        replaced,
        "configured CC slot"
    );
    Ok(())
}

fn controller_xml(name: &str, min: i32, max: i32) -> String {
    format!(
        concat!(
            r#"<{name}><LomId Value="0" /><Manual Value="0" />"#,
            r#"<MidiControllerRange><Min Value="{min}" /><Max Value="{max}" /></MidiControllerRange>"#,
            r#"<AutomationTarget Id="0"><LockEnvelope Value="0" /></AutomationTarget>"#,
            r#"<ModulationTarget Id="0"><LockEnvelope Value="0" /></ModulationTarget></{name}>"#,
        ),
        name = name,
        min = min,
        max = max,
    )
}

/// A factory CC Control device wrapped in its `AbletonDevicePreset`, with
/// every slot unassigned.
fn cc_control_preset_xml() -> String {
    let mut device = format!(
        "<{MIDI_CC_CONTROL} Id=\"0\">{CC_CONTROL_HEAD}<LastPresetRef><Value>{CC_CONTROL_PRESET_REF}</Value></LastPresetRef>{CC_CONTROL_STATE}"
    );
    device.push_str(&controller_xml("ModWheel", 0, 127));
    device.push_str(&controller_xml("PitchBend", -64, 64));
    device.push_str(&controller_xml("Pressure", 0, 127));
    device.push_str(CC_CONTROL_BOOL);
    for slot in 0..CC_SLOT_COUNT {
        let letter = cc_slot_letter(slot).unwrap_or('?');
        device.push_str(&format!("<{} Value=\"Custom {letter}\" />", custom_float_name(slot)));
    }
    for slot in 0..CC_SLOT_COUNT {
        device.push_str(&format!("<{} Value=\"0\" />", custom_float_target(slot)));
    }
    for slot in 0..CC_SLOT_COUNT {
        device.push_str(&controller_xml(&custom_float_value(slot), 0, 127));
    }
    format!(
        "<{ABLETON_DEVICE_PRESET} Id=\"0\" OverwriteProtectionNumber=\"3075\"><Device>{device}</{MIDI_CC_CONTROL}></Device><PresetRef>{CC_CONTROL_PRESET_REF}</PresetRef></{ABLETON_DEVICE_PRESET}>"
    )
}

/// The CC Control device mappings are written to.
enum CcControl {
    Existing(NodeId),
    /// Built detached; `preset` goes first into `chain` once the mappings
    /// have been checked against `device`.
    Missing {
        chain: NodeId,
        preset: NodeId,
        device: NodeId,
    },
}

impl CcControl {
    fn device(&self) -> NodeId {
        match self {
            CcControl::Existing(device) | CcControl::Missing { device, .. } => *device,
        }
    }
}

fn locate_cc_control(doc: &mut Document) -> Result<CcControl, PatchError> {
    let root = doc.root();
    if let Some(device) = doc.select_first(root, &format!(".//{MIDI_CC_CONTROL}"))? {
        return Ok(CcControl::Existing(device));
    }
    let chain = require(doc, root, &format!(".//{DEVICE_PRESETS}"))?;
    let template = Document::parse(&cc_control_preset_xml())?;
    let preset = doc.import(&template, template.root());
    let device = require(doc, preset, &format!("Device/{MIDI_CC_CONTROL}"))?;
    Ok(CcControl::Missing { chain, preset, device })
}

/// Apply `mappings` to the first CC Control device of the document.
///
/// A rack without one gets a factory CC Control inserted at the front of
/// its first device chain. Every slot is looked up before the first write;
/// a document without any `DevicePresets` is a structure error.
pub fn apply_cc_mappings(doc: &mut Document, mappings: &[CcMapping]) -> Result<usize, PatchError> {
    let target = locate_cc_control(doc)?;
    let cc_control = target.device();
    for mapping in mappings {
        slot_elements(doc, cc_control, mapping.slot)?;
    }
    if let CcControl::Missing { chain, preset, .. } = target {
        doc.prepend_indented(chain, preset)?;
        if let Some(indent) = doc.leading_whitespace(preset) {
            doc.indent_subtree(preset, &indent);
        }
        info!(chain = %doc.describe(chain), "inserted CC Control device");
    }
    for mapping in mappings {
        configure_cc_slot(doc, cc_control, mapping)?;
    }
    info!(mappings = mappings.len(), "applied CC Control mappings");
    Ok(mappings.len())
}

/// Outcome of [`add_transpose_mapping`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransposeReport {
    /// `TransposeKey` parameters in the document.
    pub found: usize,
    pub added: usize,
    /// Parameters already mapped to the requested macro.
    pub already_mapped: usize,
    pub macro_updated: bool,
}

fn check_macro_value(value: f64) -> Result<(), PatchError> {
    if value.is_finite() && (0.0..=f64::from(MIDI_MAX)).contains(&value) {
        Ok(())
    } else {
        Err(PatchError::Validation(format!("macro value must be 0-127, got {value}")))
    }
}

/// Map every sampler transpose parameter to `macro_index` and park that
/// macro at `value` (63.5 is no transposition).
///
/// A parameter mapped to another macro is remapped.
pub fn add_transpose_mapping(
    doc: &mut Document,
    macro_index: usize,
    value: f64,
) -> Result<TransposeReport, PatchError> {
    check_index("macro index", macro_index, MACRO_COUNT)?;
    check_macro_value(value)?;

    let root = doc.root();
    let params = doc.select(root, &format!(".//{TRANSPOSE_KEY}"))?;
    let mut report = TransposeReport {
        found: params.len(),
        ..TransposeReport::default()
    };
    for param in params {
        let mapped = doc
            .child_element(param, KEY_MIDI)
            .and_then(|block| doc.child_element(block, NOTE_OR_CONTROLLER))
            .map(|controller| int_value(doc, controller))
            .transpose()?;
        if mapped == Some(macro_index as i64) {
            report.already_mapped += 1;
            continue;
        }
        if mapped.is_some() {
            remove_key_midi(doc, param);
        }
        if insert_key_midi(doc, param, macro_index)? {
            report.added += 1;
        }
    }

    match doc.select_first(root, &format!(".//{}", macro_control(macro_index)))? {
        Some(control) => {
            report.macro_updated = set_optional_manual(doc, control, value)?;
        }
        None => warn!(macro_number = macro_index + 1, "no macro control to update"),
    }
    if let Some(default) = doc.select_first(root, &format!(".//{}", macro_default(macro_index)))? {
        doc.set_value(default, -1)?;
    }
    info!(
        found = report.found,
        added = report.added,
        already_mapped = report.already_mapped,
        macro_number = macro_index + 1,
        "mapped transpose parameters"
    );
    Ok(report)
}

fn set_optional_manual(doc: &mut Document, control: NodeId, value: f64) -> Result<bool, PatchError> {
    match doc.child_element(control, MANUAL) {
        Some(manual) => {
            doc.set_value(manual, value)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Set the current value of macro `index` (0-based).
pub fn set_macro_value(doc: &mut Document, index: usize, value: f64) -> Result<(), PatchError> {
    check_index("macro index", index, MACRO_COUNT)?;
    check_macro_value(value)?;
    let root = doc.root();
    let control = require(doc, root, &format!(".//{}", macro_control(index)))?;
    set_child_value(doc, control, MANUAL, value)
}

/// Rename macro `index` (0-based).
pub fn set_macro_name(doc: &mut Document, index: usize, name: &str) -> Result<(), PatchError> {
    check_index("macro index", index, MACRO_COUNT)?;
    let root = doc.root();
    let label = require(doc, root, &format!(".//{}", macro_display_name(index)))?;
    doc.set_value(label, name)?;
    Ok(())
}
