//! Drum note layouts for racks built from categorized folders.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Categorized, DrumCategory, LibraryError};

/// Lowest note of a drum layout; slot 0 of the sample list plays it.
pub const LAYOUT_BASE_NOTE: u8 = 36;

/// Samples taken from each category.
const SAMPLES_PER_CATEGORY: usize = 4;

/// Where each drum category starts on the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteLayout {
    /// General MIDI style drum map.
    #[default]
    Standard,
    /// TR-808 style map.
    #[serde(rename = "808")]
    Tr808,
    /// Hand percussion first.
    Percussion,
}

impl NoteLayout {
    /// First note assigned to `category`, if the layout places it at all.
    pub const fn start_note(self, category: DrumCategory) -> Option<u8> {
        use DrumCategory::*;
        match (self, category) {
            (NoteLayout::Standard, Kick) => Some(36),
            (NoteLayout::Standard, Clap) => Some(39),
            (NoteLayout::Standard, Snare) => Some(40),
            (NoteLayout::Standard, Hat) => Some(42),
            (NoteLayout::Standard, OpenHat) => Some(46),
            (NoteLayout::Standard, Tom) => Some(48),
            (NoteLayout::Standard, Cymbal) => Some(49),
            (NoteLayout::Standard, Perc) => Some(56),
            (NoteLayout::Standard, Shaker) => Some(60),
            (NoteLayout::Tr808, Kick) => Some(36),
            (NoteLayout::Tr808, Snare) => Some(38),
            (NoteLayout::Tr808, Clap) => Some(39),
            (NoteLayout::Tr808, Hat) => Some(42),
            (NoteLayout::Tr808, Tom) => Some(45),
            (NoteLayout::Tr808, OpenHat) => Some(46),
            (NoteLayout::Tr808, Cymbal) => Some(51),
            (NoteLayout::Tr808, Perc) => Some(60),
            (NoteLayout::Percussion, Perc) => Some(36),
            (NoteLayout::Percussion, Shaker) => Some(44),
            (NoteLayout::Percussion, Tom) => Some(48),
            (NoteLayout::Percussion, Cymbal) => Some(52),
            _ => None,
        }
    }

    /// Place up to four samples per category at `start_note - 36`, limited to
    /// `slots` pads. Later categories overwrite earlier ones on collisions;
    /// trailing empty slots are dropped.
    pub fn assign(self, categorized: &Categorized, slots: usize) -> Vec<Option<PathBuf>> {
        let mut assigned: Vec<Option<PathBuf>> = vec![None; slots];
        for category in DrumCategory::ALL {
            let Some(start) = self.start_note(category) else {
                continue;
            };
            let first = usize::from(start - LAYOUT_BASE_NOTE);
            for (offset, sample) in categorized
                .get(category)
                .iter()
                .take(SAMPLES_PER_CATEGORY)
                .enumerate()
            {
                if let Some(slot) = assigned.get_mut(first + offset) {
                    *slot = Some(sample.clone());
                }
            }
        }
        while matches!(assigned.last(), Some(None)) {
            assigned.pop();
        }
        assigned
    }

    pub const fn name(self) -> &'static str {
        match self {
            NoteLayout::Standard => "standard",
            NoteLayout::Tr808 => "808",
            NoteLayout::Percussion => "percussion",
        }
    }
}

impl fmt::Display for NoteLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NoteLayout {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(NoteLayout::Standard),
            "808" => Ok(NoteLayout::Tr808),
            "percussion" => Ok(NoteLayout::Percussion),
            _ => Err(LibraryError::UnknownLayout(s.to_string())),
        }
    }
}

/// Flatten categorized samples: priority categories first, then the
/// remaining categories, then uncategorized files.
pub fn flatten_by_priority(categorized: &Categorized) -> Vec<PathBuf> {
    let mut flat = Vec::with_capacity(categorized.total());
    for category in DrumCategory::PRIORITY {
        flat.extend(categorized.get(category).iter().cloned());
    }
    for (category, samples) in &categorized.by_category {
        if !DrumCategory::PRIORITY.contains(category) {
            flat.extend(samples.iter().cloned());
        }
    }
    flat.extend(categorized.uncategorized.iter().cloned());
    flat
}
