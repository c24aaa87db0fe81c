//! Samplers built from a template `MultiSampler` preset.

use std::path::Path;

use adg_library::scan_audio_files;
use adg_patch::{layout_parts, rebuild_sample_parts, KeyLayout, PatchError, SamplePath};
use adg_vocab::MULTI_SAMPLER;
use tracing::info;

use crate::{AdgError, Built, Device};

/// Replaces the zones of a template sampler with one zone per sample.
#[derive(Debug, Clone)]
pub struct SamplerBuilder {
    template: Device,
    layout: KeyLayout,
    max_samples: Option<usize>,
}

impl SamplerBuilder {
    pub fn new(template: Device) -> Self {
        Self {
            template,
            layout: KeyLayout::default(),
            max_samples: None,
        }
    }

    pub fn layout(mut self, layout: KeyLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn max_samples(mut self, max: Option<usize>) -> Self {
        self.max_samples = max;
        self
    }

    pub fn from_samples(&self, samples: &[SamplePath]) -> Result<Built, AdgError> {
        let limit = self.max_samples.unwrap_or(samples.len()).min(samples.len());
        let parts = layout_parts(&samples[..limit], self.layout);

        let mut device = self.template.clone();
        let doc = device.document_mut();
        let root = doc.root();
        let sampler = doc
            .select_first(root, &format!(".//{MULTI_SAMPLER}"))?
            .ok_or_else(|| PatchError::Structure(format!("template has no {MULTI_SAMPLER}")))?;
        let pads = rebuild_sample_parts(doc, sampler, &parts)?;
        info!(zones = parts.len(), layout = %self.layout, "built sampler");
        Ok(Built {
            device,
            pads,
            samples: parts.len(),
        })
    }

    /// Build from the audio files below `dir`, naturally sorted.
    pub fn from_folder(&self, dir: &Path, recursive: bool) -> Result<Built, AdgError> {
        let samples = scan_audio_files(dir, recursive)?
            .iter()
            .map(|path| SamplePath::from_path(path))
            .collect::<Result<Vec<_>, _>>()?;
        if samples.is_empty() {
            return Err(AdgError::NoSamples(dir.to_path_buf()));
        }
        self.from_samples(&samples)
    }
}
