#![cfg_attr(docsrs, feature(doc_cfg))]
//! Sample library helpers shared by the device builders.
//!
//! Everything here works on file names and directory trees only; no audio is
//! ever read.

pub mod category;
pub mod colors;
pub mod layout;
pub mod notes;
pub mod scan;

use std::path::PathBuf;

use thiserror::Error;

pub use category::DrumCategory;
pub use colors::{ColorCategory, ColorScheme};
pub use layout::{flatten_by_priority, NoteLayout, LAYOUT_BASE_NOTE};
pub use notes::{
    group_velocity_layers, midi_to_note_name, note_name_to_midi, parse_auto_sampled,
    AutoSampledFile,
};
pub use scan::{
    categorize_by_folder, categorize_samples, is_audio_file, natural_sort, scan_audio_files,
    Categorized, AUDIO_EXTENSIONS,
};

/// Errors raised while inspecting a sample library.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The folder or file does not exist.
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),
    /// A folder was expected.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    /// A note name such as `C#3` could not be parsed or is outside 0..=127.
    #[error("invalid note name '{0}'")]
    InvalidNote(String),
    /// Unknown note layout name.
    #[error("unknown layout '{0}'")]
    UnknownLayout(String),
    /// Walking the directory tree failed.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
