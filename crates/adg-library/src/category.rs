//! Drum sample categories derived from file and folder names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Instrument family of a drum sample.
///
/// Matching is a lowercase substring test against [`DrumCategory::keywords`],
/// tried in [`DrumCategory::ALL`] order; the first hit wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrumCategory {
    Kick,
    Snare,
    Hat,
    Clap,
    Tom,
    Cymbal,
    Perc,
    Shaker,
    OpenHat,
}

impl DrumCategory {
    /// Matching order.
    pub const ALL: [DrumCategory; 9] = [
        DrumCategory::Kick,
        DrumCategory::Snare,
        DrumCategory::Hat,
        DrumCategory::Clap,
        DrumCategory::Tom,
        DrumCategory::Cymbal,
        DrumCategory::Perc,
        DrumCategory::Shaker,
        DrumCategory::OpenHat,
    ];

    /// Order in which categorized samples fill a rack's pads.
    pub const PRIORITY: [DrumCategory; 8] = [
        DrumCategory::Kick,
        DrumCategory::Snare,
        DrumCategory::Hat,
        DrumCategory::Clap,
        DrumCategory::Tom,
        DrumCategory::Cymbal,
        DrumCategory::Perc,
        DrumCategory::Shaker,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            DrumCategory::Kick => "kick",
            DrumCategory::Snare => "snare",
            DrumCategory::Hat => "hat",
            DrumCategory::Clap => "clap",
            DrumCategory::Tom => "tom",
            DrumCategory::Cymbal => "cymbal",
            DrumCategory::Perc => "perc",
            DrumCategory::Shaker => "shaker",
            DrumCategory::OpenHat => "open_hat",
        }
    }

    /// Substrings recognised in file names.
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            DrumCategory::Kick => &["kick", "bd", "bassdrum", "bass drum", "kck", "bass_drum"],
            DrumCategory::Snare => &["snare", "sd", "snr", "snare_drum"],
            DrumCategory::Hat => &[
                "hat", "hh", "hihat", "hi-hat", "hi hat", "hi_hat", "closedhat", "closedhh",
            ],
            DrumCategory::Clap => &["clap", "cp", "handclap", "hand_clap"],
            DrumCategory::Tom => &[
                "tom", "tm", "lowtom", "midtom", "hightom", "low_tom", "mid_tom", "high_tom",
            ],
            DrumCategory::Cymbal => &["cymbal", "cym", "crash", "ride", "splash"],
            DrumCategory::Perc => &[
                "perc", "percussion", "shaker", "conga", "bongo", "cowbell", "tambourine", "wood",
            ],
            DrumCategory::Shaker => &["shaker", "shake", "maracas"],
            DrumCategory::OpenHat => &["openhh", "open_hh", "openhat", "open_hat", "open hat", "oh"],
        }
    }

    /// Extra plural forms accepted for folder names.
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            DrumCategory::Kick => &["kicks", "kick_drum"],
            DrumCategory::Snare => &["snares"],
            DrumCategory::Hat => &["hats", "hihat"],
            DrumCategory::Clap => &["claps"],
            DrumCategory::Tom => &["toms"],
            DrumCategory::Cymbal => &["cymbals"],
            DrumCategory::Perc => &["percussion", "percs"],
            DrumCategory::Shaker => &["shakers"],
            DrumCategory::OpenHat => &["open_hats"],
        }
    }

    /// Categorize a file stem (or any display name).
    pub fn from_filename(stem: &str) -> Option<DrumCategory> {
        let lower = stem.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.keywords().iter().any(|kw| lower.contains(kw)))
    }

    /// Categorize a folder name, also accepting aliases and the category name.
    pub fn from_folder_name(name: &str) -> Option<DrumCategory> {
        let lower = name.to_lowercase();
        Self::ALL.into_iter().find(|category| {
            category
                .keywords()
                .iter()
                .chain(category.aliases())
                .chain(std::iter::once(&category.name()))
                .any(|term| lower.contains(term))
        })
    }
}

impl fmt::Display for DrumCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DrumCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown drum category '{s}'"))
    }
}
