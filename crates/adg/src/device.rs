//! A decoded, parsed device document.

use std::path::{Path, PathBuf};

use adg_vocab::{CREATOR, DRUM_BRANCH_PRESET, FILE_REF, MULTI_SAMPLE_PART, PATH, SAMPLE_REF};
use adg_xml::Document;
use serde::Serialize;
use tracing::info;

use crate::AdgError;

/// An `.adg`/`.adv` preset held in memory as an editable tree.
#[derive(Debug, Clone)]
pub struct Device {
    doc: Document,
    source: Option<PathBuf>,
}

/// Overview of a device, as printed by `adgctl info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSummary {
    /// Name of the first element below the root, e.g. `GroupDevicePreset`.
    pub kind: Option<String>,
    /// Live version that wrote the file.
    pub creator: Option<String>,
    pub pads: usize,
    pub sample_parts: usize,
    /// Non-empty absolute sample paths, in document order.
    pub samples: Vec<String>,
}

impl Device {
    /// Decode and parse a device file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AdgError> {
        let path = path.as_ref();
        let xml = adg_codec::decode(path)?;
        let doc = Document::parse(&xml)?;
        info!(path = %path.display(), "opened device");
        Ok(Device {
            doc,
            source: Some(path.to_path_buf()),
        })
    }

    pub fn from_xml(xml: &str) -> Result<Self, AdgError> {
        Ok(Device {
            doc: Document::parse(xml)?,
            source: None,
        })
    }

    /// File the device was opened from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn to_xml(&self) -> String {
        self.doc.to_xml()
    }

    /// Encode the device to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf, AdgError> {
        let written = adg_codec::encode(&self.to_xml(), path)?;
        info!(path = %written.display(), "saved device");
        Ok(written)
    }

    pub fn kind(&self) -> Option<&str> {
        let root = self.doc.root();
        self.doc
            .child_elements(root)
            .next()
            .and_then(|first| self.doc.name(first))
    }

    pub fn summary(&self) -> Result<DeviceSummary, AdgError> {
        let doc = &self.doc;
        let root = doc.root();
        let samples = doc
            .select(root, &format!(".//{SAMPLE_REF}/{FILE_REF}/{PATH}"))?
            .into_iter()
            .filter_map(|id| doc.value(id))
            .filter(|path| !path.is_empty())
            .collect();
        Ok(DeviceSummary {
            kind: self.kind().map(str::to_string),
            creator: doc.attribute(root, CREATOR),
            pads: doc.select(root, &format!(".//{DRUM_BRANCH_PRESET}"))?.len(),
            sample_parts: doc.select(root, &format!(".//{MULTI_SAMPLE_PART}"))?.len(),
            samples,
        })
    }
}
