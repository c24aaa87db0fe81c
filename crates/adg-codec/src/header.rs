//! Gzip member header inspection (RFC 1952).

use bitflags::bitflags;
use bytes::Buf;
use thiserror::Error;

/// Size of the fixed gzip member header (in bytes).
pub const HEADER_SIZE: usize = 10;

/// The two identification bytes every gzip member starts with.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// `CM` value for deflate, the only method defined by RFC 1952.
pub const METHOD_DEFLATE: u8 = 8;

bitflags! {
    /// Flags stored in the `FLG` byte of a gzip header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GzipFlags: u8 {
        /// Payload is probably ASCII text.
        const TEXT = 0x01;
        /// A CRC16 of the header follows the optional fields.
        const HCRC = 0x02;
        /// An extra field is present.
        const EXTRA = 0x04;
        /// A zero-terminated original file name follows the fixed header.
        const NAME = 0x08;
        /// A zero-terminated comment is present.
        const COMMENT = 0x10;
    }
}

/// Errors raised while reading the fixed header.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("header too short ({0} bytes)")]
    TooShort(usize),
    #[error("bad magic bytes {0:#04x} {1:#04x}")]
    BadMagic(u8, u8),
    #[error("unsupported compression method {0}")]
    UnsupportedMethod(u8),
    #[error("reserved flag bits set in {0:#04x}")]
    ReservedFlags(u8),
}

/// Fixed part of a gzip member header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GzipHeader {
    /// Compression method (`CM`).
    pub method: u8,
    /// Header flags (`FLG`).
    pub flags: GzipFlags,
    /// Modification time in seconds since the epoch, `0` when unset.
    pub mtime: u32,
    /// Compression level hint (`XFL`).
    pub extra_flags: u8,
    /// Operating system that wrote the member (`OS`).
    pub os: u8,
}

impl GzipHeader {
    /// Parse the fixed header from the start of `buf`.
    pub fn parse(buf: &[u8]) -> Result<Self, HeaderError> {
        if buf.len() < HEADER_SIZE {
            return Err(HeaderError::TooShort(buf.len()));
        }
        let mut cursor = buf;
        let id1 = cursor.get_u8();
        let id2 = cursor.get_u8();
        if [id1, id2] != GZIP_MAGIC {
            return Err(HeaderError::BadMagic(id1, id2));
        }
        let method = cursor.get_u8();
        if method != METHOD_DEFLATE {
            return Err(HeaderError::UnsupportedMethod(method));
        }
        let raw_flags = cursor.get_u8();
        let flags = GzipFlags::from_bits(raw_flags).ok_or(HeaderError::ReservedFlags(raw_flags))?;
        let mtime = cursor.get_u32_le();
        let extra_flags = cursor.get_u8();
        let os = cursor.get_u8();
        Ok(GzipHeader {
            method,
            flags,
            mtime,
            extra_flags,
            os,
        })
    }

    /// Whether the header follows the conventions Live uses for its own
    /// device files: no stored file name and a zero modification time.
    pub fn is_host_compatible(&self) -> bool {
        self.mtime == 0 && !self.flags.contains(GzipFlags::NAME)
    }
}
