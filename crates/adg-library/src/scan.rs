//! Finding and ordering audio files on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::{DrumCategory, LibraryError};

/// Audio file extensions accepted as samples (compared case-insensitively).
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "aif", "aiff", "flac", "mp3"];

/// Samples grouped by category, plus the ones no category matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Categorized {
    pub by_category: BTreeMap<DrumCategory, Vec<PathBuf>>,
    pub uncategorized: Vec<PathBuf>,
}

impl Categorized {
    pub fn get(&self, category: DrumCategory) -> &[PathBuf] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn total(&self) -> usize {
        self.by_category.values().map(Vec::len).sum::<usize>() + self.uncategorized.len()
    }

    fn push(&mut self, category: Option<DrumCategory>, path: PathBuf) {
        match category {
            Some(category) => self.by_category.entry(category).or_default().push(path),
            None => self.uncategorized.push(path),
        }
    }
}

pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

fn require_dir(dir: &Path) -> Result<(), LibraryError> {
    if !dir.exists() {
        return Err(LibraryError::NotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(LibraryError::NotADirectory(dir.to_path_buf()));
    }
    Ok(())
}

/// Collect the audio files below `dir`, naturally sorted by file stem.
pub fn scan_audio_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, LibraryError> {
    require_dir(dir)?;
    let walker = WalkDir::new(dir).min_depth(1).max_depth(if recursive { usize::MAX } else { 1 });
    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|err| LibraryError::Io {
            path: err.path().unwrap_or(dir).to_path_buf(),
            source: err.into(),
        })?;
        if entry.file_type().is_file() && is_audio_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    natural_sort(&mut files);
    debug!(dir = %dir.display(), count = files.len(), recursive, "scanned samples");
    Ok(files)
}

/// Categorize the audio files below `dir` by file name.
pub fn categorize_samples(dir: &Path, recursive: bool) -> Result<Categorized, LibraryError> {
    let mut result = Categorized::default();
    for path in scan_audio_files(dir, recursive)? {
        let category = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(DrumCategory::from_filename);
        result.push(category, path);
    }
    Ok(result)
}

/// Categorize the audio files of each direct subfolder of `dir` by the
/// subfolder's name (`Kicks/`, `Snare/`, ...).
pub fn categorize_by_folder(dir: &Path) -> Result<Categorized, LibraryError> {
    require_dir(dir)?;
    let mut result = Categorized::default();
    let mut folders: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|err| LibraryError::Io {
            path: err.path().unwrap_or(dir).to_path_buf(),
            source: err.into(),
        })?;
        if entry.file_type().is_dir() {
            folders.push(entry.into_path());
        }
    }
    folders.sort();
    for folder in folders {
        let category = folder
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(DrumCategory::from_folder_name);
        for path in scan_audio_files(&folder, false)? {
            result.push(category, path);
        }
    }
    Ok(result)
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Chunk {
    Text(String),
    Number(u64),
}

fn natural_key(path: &Path) -> Vec<Chunk> {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut digits = false;
    for ch in stem.chars() {
        if ch.is_ascii_digit() != digits && !current.is_empty() {
            chunks.push(make_chunk(std::mem::take(&mut current), digits));
        }
        digits = ch.is_ascii_digit();
        current.push(ch);
    }
    if !current.is_empty() {
        chunks.push(make_chunk(current, digits));
    }
    chunks
}

fn make_chunk(text: String, digits: bool) -> Chunk {
    match (digits, text.parse::<u64>()) {
        (true, Ok(number)) => Chunk::Number(number),
        _ => Chunk::Text(text),
    }
}

/// Sort so that `kick_2` precedes `kick_10`; ties fall back to the full path.
pub fn natural_sort(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| natural_key(a).cmp(&natural_key(b)).then_with(|| a.cmp(b)));
}
