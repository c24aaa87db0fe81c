//! Note names and "Auto Sampled" file name parsing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::LibraryError;

const NOTE_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

static NOTE_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
static AUTO_SAMPLED_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn compiled(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

/// Convert a note name such as `C1` or `A#-1` to a MIDI note (C-1 = 0).
pub fn note_name_to_midi(name: &str) -> Result<u8, LibraryError> {
    let invalid = || LibraryError::InvalidNote(name.to_string());
    let caps = compiled(&NOTE_PATTERN, r"^([A-G]#?)(-?\d+)$")
        .and_then(|pattern| pattern.captures(name))
        .ok_or_else(invalid)?;
    let index = NOTE_NAMES
        .iter()
        .position(|candidate| *candidate == &caps[1])
        .ok_or_else(invalid)?;
    let octave: i32 = caps[2].parse().map_err(|_| invalid())?;
    let note = (octave + 1)
        .checked_mul(12)
        .and_then(|base| base.checked_add(index as i32))
        .ok_or_else(invalid)?;
    u8::try_from(note)
        .ok()
        .filter(|note| *note <= 127)
        .ok_or_else(invalid)
}

/// Inverse of [`note_name_to_midi`].
pub fn midi_to_note_name(note: u8) -> String {
    let octave = i32::from(note / 12) - 1;
    format!("{}{}", NOTE_NAMES[usize::from(note % 12)], octave)
}

/// One velocity layer rendered by Live's sampling tool, named
/// `<kit>-<note>-V<velocity>-<TAG>.<aif|wav>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoSampledFile {
    pub path: PathBuf,
    pub kit: String,
    pub note_name: String,
    pub note: u8,
    pub velocity: u8,
}

/// Parse an "Auto Sampled" file name; `None` if the name does not match or
/// carries an out-of-range note or velocity.
pub fn parse_auto_sampled(path: &Path) -> Option<AutoSampledFile> {
    let file_name = path.file_name()?.to_str()?;
    let pattern = compiled(
        &AUTO_SAMPLED_PATTERN,
        r"^(.+?)-([A-G]#?\d+)-V(\d+)-[A-Z0-9]+\.(aif|wav)$",
    )?;
    let caps = pattern.captures(file_name)?;
    let note = note_name_to_midi(&caps[2]).ok()?;
    let velocity: u8 = caps[3].parse().ok().filter(|v| *v <= 127)?;
    Some(AutoSampledFile {
        path: path.to_path_buf(),
        kit: caps[1].to_string(),
        note_name: caps[2].to_string(),
        note,
        velocity,
    })
}

/// Group layers by MIDI note; each group is sorted by ascending velocity.
pub fn group_velocity_layers(
    files: impl IntoIterator<Item = AutoSampledFile>,
) -> BTreeMap<u8, Vec<AutoSampledFile>> {
    let mut groups: BTreeMap<u8, Vec<AutoSampledFile>> = BTreeMap::new();
    for file in files {
        groups.entry(file.note).or_default().push(file);
    }
    for layers in groups.values_mut() {
        layers.sort_by_key(|layer| layer.velocity);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_names_convert_both_ways() {
        assert_eq!(note_name_to_midi("C-1").expect("note"), 0);
        assert_eq!(note_name_to_midi("C1").expect("note"), 24);
        assert_eq!(note_name_to_midi("A#2").expect("note"), 46);
        assert_eq!(note_name_to_midi("G9").expect("note"), 127);
        assert_eq!(midi_to_note_name(36), "C2");
        assert_eq!(midi_to_note_name(0), "C-1");
        assert_eq!(midi_to_note_name(61), "C#4");
    }

    #[test]
    fn rejects_bad_note_names() {
        for bad in ["H2", "C", "Cb2", "G#9", "c1", "C#10"] {
            assert!(note_name_to_midi(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn parses_auto_sampled_names() {
        let parsed = parse_auto_sampled(Path::new("/kits/808 Kit-C#1-V40-9X2A.aif")).expect("parse");
        assert_eq!(parsed.kit, "808 Kit");
        assert_eq!(parsed.note_name, "C#1");
        assert_eq!(parsed.note, 25);
        assert_eq!(parsed.velocity, 40);
        assert!(parse_auto_sampled(Path::new("Kit-C1-V40-9X2A.flac")).is_none());
        assert!(parse_auto_sampled(Path::new("Kick.wav")).is_none());
    }

    #[test]
    fn groups_sort_layers_by_velocity() {
        let names = ["K-D1-V127-AB.wav", "K-C1-V80-AB.wav", "K-C1-V40-AB.wav", "K-C1-V120-AB.wav"];
        let groups = group_velocity_layers(names.iter().filter_map(|name| parse_auto_sampled(Path::new(name))));
        let notes: Vec<u8> = groups.keys().copied().collect();
        assert_eq!(notes, vec![24, 26]);
        let velocities: Vec<u8> = groups[&24].iter().map(|layer| layer.velocity).collect();
        assert_eq!(velocities, vec![40, 80, 120]);
    }
}
