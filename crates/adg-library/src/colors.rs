//! Pad color categories and Live's `DocumentColorIndex` palette.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Color family of a drum pad, decided from its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorCategory {
    Kick,
    Snare,
    Rim,
    Clap,
    ClosedHihat,
    OpenHihat,
    Tom,
    Shaker,
    Cymbal,
    Percussion,
    Default,
}

impl ColorCategory {
    pub const fn key(self) -> &'static str {
        match self {
            ColorCategory::Kick => "kick",
            ColorCategory::Snare => "snare",
            ColorCategory::Rim => "rim",
            ColorCategory::Clap => "clap",
            ColorCategory::ClosedHihat => "closed_hihat",
            ColorCategory::OpenHihat => "open_hihat",
            ColorCategory::Tom => "tom",
            ColorCategory::Shaker => "shaker",
            ColorCategory::Cymbal => "cymbal",
            ColorCategory::Percussion => "percussion",
            ColorCategory::Default => "default",
        }
    }

    /// Categorize a sample path or pad name by its lowercase file stem.
    pub fn from_name(name: &str) -> ColorCategory {
        let stem = Path::new(name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(name)
            .to_lowercase();
        let has = |needle: &str| stem.contains(needle);
        let hat = has("hh") || has("hat");

        if stem.is_empty() {
            ColorCategory::Default
        } else if has("kick") {
            ColorCategory::Kick
        } else if has("snare") {
            ColorCategory::Snare
        } else if has("rim") || has("sidestick") || has("stick") {
            ColorCategory::Rim
        } else if has("clap") || has("snap") {
            ColorCategory::Clap
        } else if has("closedhh") || (has("closed") && hat) {
            ColorCategory::ClosedHihat
        } else if has("openhh") || (has("open") && hat) {
            ColorCategory::OpenHihat
        } else if has("pedal") {
            ColorCategory::ClosedHihat
        } else if has("tom") {
            ColorCategory::Tom
        } else if has("shaker") || has("cabasa") {
            ColorCategory::Shaker
        } else if has("cymbal") || has("crash") || has("ride") {
            ColorCategory::Cymbal
        } else if ["perc", "cowbell", "bell", "cuica", "conga"].iter().any(|kw| has(kw)) {
            ColorCategory::Percussion
        } else {
            ColorCategory::Default
        }
    }
}

/// Mapping from category key to Live color index.
///
/// Keys are the [`ColorCategory::key`] strings plus a few synonyms
/// (`snap`, `perc`, `crash`, ...). Lookups fall back to `default`, then 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorScheme {
    colors: BTreeMap<String, u8>,
}

const DRUM_COLORS: &[(&str, u8)] = &[
    ("kick", 60),
    ("snare", 13),
    ("rim", 13),
    ("clap", 13),
    ("snap", 13),
    ("tom", 9),
    ("shaker", 26),
    ("cabasa", 26),
    ("percussion", 26),
    ("perc", 26),
    ("cowbell", 26),
    ("conga", 26),
    ("closed_hihat", 41),
    ("closedhh", 41),
    ("closed", 41),
    ("pedalhh", 41),
    ("cymbal", 45),
    ("crash", 45),
    ("ride", 45),
    ("open_hihat", 43),
    ("openhh", 43),
    ("open", 43),
    ("default", 0),
];

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme {
            colors: DRUM_COLORS
                .iter()
                .map(|(key, color)| (key.to_string(), *color))
                .collect(),
        }
    }
}

impl ColorScheme {
    pub fn color(&self, category: ColorCategory) -> u8 {
        self.colors
            .get(category.key())
            .or_else(|| self.colors.get(ColorCategory::Default.key()))
            .copied()
            .unwrap_or(0)
    }

    /// Override or add one entry.
    pub fn set(&mut self, key: impl Into<String>, color: u8) {
        self.colors.insert(key.into(), color);
    }

    /// Overlay `other` on top of this scheme.
    pub fn merge(&mut self, other: &ColorScheme) {
        for (key, color) in &other.colors {
            self.colors.insert(key.clone(), *color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_follows_keyword_order() {
        assert_eq!(ColorCategory::from_name("/x/Kick Snare Combo.wav"), ColorCategory::Kick);
        assert_eq!(ColorCategory::from_name("Rimshot 2"), ColorCategory::Rim);
        assert_eq!(ColorCategory::from_name("Finger Snap"), ColorCategory::Clap);
        assert_eq!(ColorCategory::from_name("Closed HH 1"), ColorCategory::ClosedHihat);
        assert_eq!(ColorCategory::from_name("Open Hat"), ColorCategory::OpenHihat);
        assert_eq!(ColorCategory::from_name("Pedal"), ColorCategory::ClosedHihat);
        assert_eq!(ColorCategory::from_name("Low Tom"), ColorCategory::Tom);
        assert_eq!(ColorCategory::from_name("Cabasa"), ColorCategory::Shaker);
        assert_eq!(ColorCategory::from_name("Ride Bell"), ColorCategory::Cymbal);
        assert_eq!(ColorCategory::from_name("Cowbell"), ColorCategory::Percussion);
        assert_eq!(ColorCategory::from_name("Vox"), ColorCategory::Default);
        assert_eq!(ColorCategory::from_name(""), ColorCategory::Default);
    }

    #[test]
    fn default_scheme_colors() {
        let scheme = ColorScheme::default();
        assert_eq!(scheme.color(ColorCategory::Kick), 60);
        assert_eq!(scheme.color(ColorCategory::Clap), 13);
        assert_eq!(scheme.color(ColorCategory::ClosedHihat), 41);
        assert_eq!(scheme.color(ColorCategory::OpenHihat), 43);
        assert_eq!(scheme.color(ColorCategory::Default), 0);
    }

    #[test]
    fn scheme_deserializes_as_plain_map() {
        let custom: ColorScheme = serde_json::from_str(r#"{"kick": 1, "default": 7}"#).expect("json");
        assert_eq!(custom.color(ColorCategory::Kick), 1);
        assert_eq!(custom.color(ColorCategory::Tom), 7);

        let mut scheme = ColorScheme::default();
        scheme.merge(&custom);
        assert_eq!(scheme.color(ColorCategory::Kick), 1);
        assert_eq!(scheme.color(ColorCategory::Tom), 9);
    }
}
