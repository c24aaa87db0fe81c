#![cfg_attr(docsrs, feature(doc_cfg))]
//! High level facade over the device crates: open a preset, build racks and
//! samplers from sample folders, and batch-process whole libraries.
//!
//! ```rust,no_run
//! use adg::{Device, DrumRackBuilder};
//! use std::path::Path;
//!
//! # fn run() -> Result<(), adg::AdgError> {
//! let template = Device::open("Templates/Drum Rack.adg")?;
//! let built = DrumRackBuilder::new(template)
//!     .categorize(true)
//!     .from_folder(Path::new("Samples/909"))?;
//! println!("{} pads assigned", built.pads);
//! built.device.save("out/909 Kit.adg")?;
//! # Ok(())
//! # }
//! ```

pub use adg_codec as codec;
pub use adg_library as library;
pub use adg_patch as patch;
pub use adg_vocab as vocab;
pub use adg_xml as xml;

pub mod batch;
pub mod config;
pub mod device;
pub mod drum_rack;
pub mod sampler;

use std::path::PathBuf;

use adg_codec::CodecError;
use adg_library::LibraryError;
use adg_patch::PatchError;
use adg_xml::XmlError;
use thiserror::Error;

pub use batch::{find_device_files, mirror_output_path, run_batch, BatchFailure, BatchReport};
pub use config::ToolConfig;
pub use device::{Device, DeviceSummary};
pub use drum_rack::DrumRackBuilder;
pub use sampler::SamplerBuilder;

/// Error type produced by the facade.
#[derive(Debug, Error)]
pub enum AdgError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Xml(#[from] XmlError),
    #[error(transparent)]
    Patch(#[from] PatchError),
    #[error(transparent)]
    Library(#[from] LibraryError),
    /// A sample folder yielded nothing to build from.
    #[error("no usable samples in {}", .0.display())]
    NoSamples(PathBuf),
    /// The tool configuration file could not be read or parsed.
    #[error("config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

/// A device produced by one of the builders.
#[derive(Debug, Clone)]
pub struct Built {
    pub device: Device,
    /// Pads or zones that received a sample.
    pub pads: usize,
    /// Samples placed into the device.
    pub samples: usize,
}
