#![cfg_attr(docsrs, feature(doc_cfg))]
//! Codec for Ableton Live device files.
//!
//! `.adg` (racks) and `.adv` (single devices and presets) are a single gzip
//! member wrapping a UTF-8 XML document. Live reads back only what it would
//! have written itself: no stored file name and a zero modification time in
//! the gzip header.
//!
//! ```rust,no_run
//! # fn run() -> Result<(), adg_codec::CodecError> {
//! let xml = adg_codec::decode("Kit.adg")?;
//! let patched = xml.replace("Kick 01", "Kick 02");
//! adg_codec::encode(&patched, "out/Kit.adg")?;
//! # Ok(())
//! # }
//! ```

pub mod header;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::{Compression, GzBuilder};
use thiserror::Error;
use tracing::debug;

pub use header::{GzipFlags, GzipHeader, HeaderError, GZIP_MAGIC, HEADER_SIZE};

/// Every device payload starts with an XML declaration.
pub const XML_DECLARATION_PREFIX: &str = "<?xml";

/// File extensions (lowercase, without dot) of gzip-wrapped device files.
pub const DEVICE_EXTENSIONS: &[&str] = &["adg", "adv"];

const MEMORY_SOURCE: &str = "<memory>";

/// Errors produced while reading or writing device files.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The source file does not exist.
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },
    /// The file is not a readable gzip member.
    #[error("{}: not a valid gzip stream ({reason})", path.display())]
    Format { path: PathBuf, reason: String },
    /// The inflated payload is not UTF-8.
    #[error("{}: payload is not valid UTF-8", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },
    /// The text handed to the encoder does not look like XML.
    #[error("validation: {0}")]
    Validation(String),
    /// Reading or writing the file failed.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CodecError {
    fn io(path: &Path, source: io::Error) -> Self {
        CodecError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn format<S: Into<String>>(path: &Path, reason: S) -> Self {
        CodecError::Format {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// Decode a device file into its XML text.
pub fn decode(path: impl AsRef<Path>) -> Result<String, CodecError> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => CodecError::NotFound {
            path: path.to_path_buf(),
        },
        _ => CodecError::io(path, err),
    })?;
    let xml = inflate(path, &data)?;
    debug!(path = %path.display(), compressed = data.len(), inflated = xml.len(), "decoded device");
    Ok(xml)
}

/// Decode an in-memory gzip member into XML text.
pub fn decode_bytes(data: &[u8]) -> Result<String, CodecError> {
    inflate(Path::new(MEMORY_SOURCE), data)
}

fn inflate(path: &Path, data: &[u8]) -> Result<String, CodecError> {
    GzipHeader::parse(data).map_err(|err| CodecError::format(path, err.to_string()))?;
    let mut payload = Vec::new();
    GzDecoder::new(data)
        .read_to_end(&mut payload)
        .map_err(|err| CodecError::format(path, format!("corrupt deflate stream: {err}")))?;
    String::from_utf8(payload).map_err(|source| CodecError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Compress XML text into a gzip member with Live's header conventions.
///
/// The header carries no file name, a zero modification time and the
/// "unknown" OS byte; the payload is deflated at maximum compression.
pub fn encode_bytes(xml: &str) -> Result<Vec<u8>, CodecError> {
    if !xml.trim_start().starts_with(XML_DECLARATION_PREFIX) {
        return Err(CodecError::Validation(
            "content must start with an <?xml declaration".into(),
        ));
    }
    let memory = Path::new(MEMORY_SOURCE);
    let mut encoder = GzBuilder::new()
        .mtime(0)
        .write(Vec::with_capacity(xml.len() / 4), Compression::best());
    encoder
        .write_all(xml.as_bytes())
        .map_err(|err| CodecError::io(memory, err))?;
    encoder.finish().map_err(|err| CodecError::io(memory, err))
}

/// Encode XML text to `output`, creating parent directories as needed.
///
/// The member is written to a temporary file next to `output` and renamed
/// into place, so a failure never leaves a truncated device behind.
pub fn encode(xml: &str, output: impl AsRef<Path>) -> Result<PathBuf, CodecError> {
    let output = output.as_ref();
    let bytes = encode_bytes(xml)?;
    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|err| CodecError::io(parent, err))?;

    let mut staged = tempfile::NamedTempFile::new_in(parent).map_err(|err| CodecError::io(parent, err))?;
    staged
        .write_all(&bytes)
        .and_then(|_| staged.as_file().sync_all())
        .map_err(|err| CodecError::io(output, err))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        staged
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(|err| CodecError::io(output, err))?;
    }
    staged
        .persist(output)
        .map_err(|err| CodecError::io(output, err.error))?;

    debug!(path = %output.display(), bytes = bytes.len(), "encoded device");
    Ok(output.to_path_buf())
}

/// Whether `path` carries one of the [`DEVICE_EXTENSIONS`] (any case).
pub fn is_device_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            DEVICE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
