//! Drum racks built from a template rack and a folder of samples.

use std::path::{Path, PathBuf};

use adg_library::{
    categorize_by_folder, categorize_samples, flatten_by_priority, group_velocity_layers,
    parse_auto_sampled, scan_audio_files, NoteLayout,
};
use adg_patch::{
    assign_slots, pad_to_note, rebuild_sample_parts, receiving_note, set_pad_routing,
    set_sample_reference, velocity_ranges, PartSpec, PatchError, SamplePath, SlotOrder, ZoneRange,
};
use adg_vocab::{BRANCH_PRESETS, DRUM_BRANCH_PRESET, DRUM_PAD_COUNT, ID, MULTI_SAMPLER, NAME};
use adg_xml::{Document, NodeId};
use tracing::{debug, info, warn};

use crate::{AdgError, Built, Device};

/// Note every multi-velocity pad forwards to its sampler.
const SAMPLER_SENDING_NOTE: u8 = 60;

/// Fills the pads of a template drum rack.
///
/// Pad 1 is the pad with the highest `ReceivingNote`; the n-th sample goes to
/// pad n. Pads without a sample keep whatever the template holds.
#[derive(Debug, Clone)]
pub struct DrumRackBuilder {
    template: Device,
    recursive: bool,
    categorize: bool,
    max_samples: usize,
}

impl DrumRackBuilder {
    pub fn new(template: Device) -> Self {
        Self {
            template,
            recursive: true,
            categorize: false,
            max_samples: DRUM_PAD_COUNT,
        }
    }

    /// Descend into subfolders when scanning (default `true`).
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Order scanned samples by drum category instead of by name.
    pub fn categorize(mut self, categorize: bool) -> Self {
        self.categorize = categorize;
        self
    }

    /// Upper bound on samples taken from a folder (default 32).
    pub fn max_samples(mut self, max: usize) -> Self {
        self.max_samples = max;
        self
    }

    /// Assign `slots[n]` to pad n+1; `None` leaves the pad untouched.
    pub fn from_samples(&self, slots: &[Option<SamplePath>]) -> Result<Built, AdgError> {
        let mut device = self.template.clone();
        let doc = device.document_mut();
        let root = doc.root();
        let pads = assign_slots(
            doc,
            root,
            ".//DrumBranchPreset",
            SlotOrder::Descending(receiving_note),
            slots,
            |doc, pad, sample| set_sample_reference(doc, pad, sample),
        )?;
        let samples = slots.iter().flatten().count();
        info!(pads, samples, "filled drum rack");
        Ok(Built {
            device,
            pads,
            samples,
        })
    }

    /// Build from the audio files below `dir`.
    pub fn from_folder(&self, dir: &Path) -> Result<Built, AdgError> {
        let mut files = if self.categorize {
            flatten_by_priority(&categorize_samples(dir, self.recursive)?)
        } else {
            scan_audio_files(dir, self.recursive)?
        };
        files.retain(|path| path.is_file());
        files.truncate(self.max_samples);
        if files.is_empty() {
            return Err(AdgError::NoSamples(dir.to_path_buf()));
        }
        let slots = to_slots(files.into_iter().map(Some))?;
        self.from_samples(&slots)
    }

    /// Build from category subfolders (`Kicks/`, `Snares/`, ...) placed
    /// according to `layout`.
    pub fn from_categorized_folders(&self, dir: &Path, layout: NoteLayout) -> Result<Built, AdgError> {
        let categorized = categorize_by_folder(dir)?;
        let assigned = layout.assign(&categorized, self.max_samples);
        if assigned.iter().all(Option::is_none) {
            return Err(AdgError::NoSamples(dir.to_path_buf()));
        }
        debug!(%layout, slots = assigned.len(), "laid out categorized samples");
        let slots = to_slots(assigned.into_iter())?;
        self.from_samples(&slots)
    }

    /// Build one pad per note from Live's "Auto Sampled" velocity layers.
    ///
    /// The template's first pad (which must hold a `MultiSampler`) is cloned
    /// for every note; notes ascend from pad 1, and each pad's sampler gets one
    /// zone per velocity layer.
    pub fn multivelocity(&self, dir: &Path) -> Result<Built, AdgError> {
        let groups = group_velocity_layers(
            scan_audio_files(dir, false)?
                .iter()
                .filter_map(|path| parse_auto_sampled(path)),
        );
        if groups.is_empty() {
            return Err(AdgError::NoSamples(dir.to_path_buf()));
        }

        let mut device = self.template.clone();
        let doc = device.document_mut();
        let (container, template) = pad_template(doc)?;
        doc.clear_children(container);

        let mut pads = 0;
        let mut samples = 0;
        for (index, (note, layers)) in groups.iter().enumerate() {
            let Some(pad_note) = u8::try_from(index + 1).ok().and_then(pad_to_note) else {
                warn!(notes = groups.len(), "more notes than drum pads, ignoring the rest");
                break;
            };
            let velocities: Vec<u8> = layers.iter().map(|layer| layer.velocity).collect();
            let ranges = velocity_ranges(&velocities)?;
            let parts = layers
                .iter()
                .zip(ranges)
                .map(|(layer, velocity)| {
                    let sample = SamplePath::from_path(&layer.path)?;
                    Ok(PartSpec {
                        name: sample.stem().to_string(),
                        sample,
                        keys: ZoneRange::FULL,
                        root_key: *note,
                        velocity,
                    })
                })
                .collect::<Result<Vec<_>, PatchError>>()?;

            let pad = doc.deep_clone(template);
            doc.append_indented(container, pad)?;
            doc.set_attribute(pad, ID, &index.to_string())?;
            if let Some(name) = doc.child_element(pad, NAME) {
                doc.set_value(name, &layers[0].note_name)?;
            }
            set_pad_routing(doc, pad, pad_note, SAMPLER_SENDING_NOTE)?;
            let sampler = first(doc, pad, MULTI_SAMPLER)?;
            samples += rebuild_sample_parts(doc, sampler, &parts)?;
            pads += 1;
            debug!(pad = index + 1, note = %layers[0].note_name, layers = parts.len(), "built velocity pad");
        }
        info!(pads, samples, "built multi-velocity drum rack");
        Ok(Built {
            device,
            pads,
            samples,
        })
    }
}

fn to_slots(paths: impl Iterator<Item = Option<PathBuf>>) -> Result<Vec<Option<SamplePath>>, AdgError> {
    paths
        .map(|path| path.map(|path| SamplePath::from_path(&path)).transpose())
        .collect::<Result<_, PatchError>>()
        .map_err(AdgError::from)
}

fn first(doc: &Document, from: NodeId, name: &str) -> Result<NodeId, PatchError> {
    doc.select_first(from, &format!(".//{name}"))?.ok_or_else(|| {
        PatchError::Structure(format!("{} has no {name}", doc.describe(from)))
    })
}

/// First `BranchPresets` container and its first pad, detached from the tree.
fn pad_template(doc: &mut Document) -> Result<(NodeId, NodeId), PatchError> {
    let root = doc.root();
    let container = first(doc, root, BRANCH_PRESETS)?;
    let pad = doc
        .child_element(container, DRUM_BRANCH_PRESET)
        .ok_or_else(|| PatchError::Structure(format!("{} has no {DRUM_BRANCH_PRESET}", doc.describe(container))))?;
    first(doc, pad, MULTI_SAMPLER)?;
    doc.detach(pad);
    Ok((container, pad))
}
