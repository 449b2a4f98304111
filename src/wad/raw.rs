//! # Doom WAD archive
//!
//! * Reads the entire archive into RAM in one pass.
//! * Parses the header and the lump directory (file order is kept, map
//!   lookups depend on it).
//! * Provides zero-copy access to individual lumps.
//!
//! Both `IWAD` and `PWAD` tags are accepted.

use log::{debug, info, warn};
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::wad::decode::{self, DIR_ENTRY_SIZE, DecodeError, HEADER_SIZE};

/// Decoded master header (12 bytes on disk).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub tag: [u8; 4],
    pub dir_count: i32,
    pub dir_offset: i32,
}

/// Full game data or a patch on top of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WadKind {
    Iwad,
    Pwad,
}

impl WadKind {
    fn from_tag(tag: &[u8; 4]) -> Option<Self> {
        match tag {
            b"IWAD" => Some(Self::Iwad),
            b"PWAD" => Some(Self::Pwad),
            _ => None,
        }
    }
}

/// One entry in the lump directory (16 bytes on disk).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LumpInfo {
    pub name: [u8; 8],
    pub offset: u32,
    pub size: u32,
}

/// Entire WAD in memory (raw bytes + parsed directory).
#[derive(Debug)]
pub struct Wad {
    kind: WadKind,
    lumps: Vec<LumpInfo>,
    bytes: Vec<u8>,
    by_name: HashMap<String, usize>,
}

/// Loader / decoding errors.
#[derive(Error, Debug)]
pub enum WadError {
    #[error("cannot open {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("cannot read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("unknown archive tag {0:?} (expected IWAD or PWAD)")]
    BadMagic([u8; 4]),

    #[error("corrupt WAD: {len} bytes is too short for the header")]
    TruncatedHeader { len: usize },

    #[error("corrupt WAD: directory of {count} entries at {offset} exceeds file size {file_size}")]
    DirectoryOutOfBounds {
        count: i64,
        offset: i64,
        file_size: usize,
    },

    #[error("lump index {0} out of range")]
    BadIndex(usize),

    #[error("corrupt WAD: lump {name} (# {index}) slice {offset}+{size} past EOF ({file_size})")]
    BadOffset {
        index: usize,
        name: String,
        offset: u32,
        size: u32,
        file_size: usize,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl WadError {
    /// True for every header/directory consistency failure.
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            Self::TruncatedHeader { .. }
                | Self::DirectoryOutOfBounds { .. }
                | Self::BadOffset { .. }
                | Self::Decode(_)
        )
    }
}

impl Wad {
    // ------------------------------------------------------------------ //
    // Low-level helpers
    // ------------------------------------------------------------------ //

    pub fn kind(&self) -> WadKind {
        self.kind
    }

    /// Expose directory as a read-only slice
    pub fn lumps(&self) -> &[LumpInfo] {
        &self.lumps
    }

    /// Name of a lump up to its first NUL; non-ASCII names read as `?`.
    pub fn lump_name(name: &[u8; 8]) -> &str {
        let raw = name.split(|&b| b == 0).next().unwrap_or_default();
        std::str::from_utf8(raw).unwrap_or("?")
    }

    /// Raw bytes of lump `idx` (slice into `self.bytes`).
    pub fn lump_bytes(&self, idx: usize) -> Result<&[u8], WadError> {
        let l = self.lumps.get(idx).ok_or(WadError::BadIndex(idx))?;
        let start = l.offset as usize;
        let end = start + l.size as usize;
        // bounds were checked at load time
        Ok(&self.bytes[start..end])
    }

    /// Find the last lump with `name` (case-sensitive like vanilla Doom).
    pub fn find_lump(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    // ------------------------------------------------------------------ //
    // Loading
    // ------------------------------------------------------------------ //

    /// Read `path` into memory and parse its directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WadError> {
        let path = path.as_ref();
        info!("loading WAD {}", path.display());

        // the handle lives only inside `read_all`
        let bytes = read_all(path)?;
        let wad = Self::from_bytes(bytes)?;

        info!(
            "{}: {:?}, {} lumps, {} bytes",
            path.display(),
            wad.kind,
            wad.lumps.len(),
            wad.bytes.len()
        );
        Ok(wad)
    }

    /// Replace this archive with the one at `path`.
    ///
    /// On failure `self` is left untouched.
    pub fn reload<P: AsRef<Path>>(&mut self, path: P) -> Result<(), WadError> {
        *self = Self::from_file(path)?;
        Ok(())
    }

    /// Parse an archive that is already in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, WadError> {
        if bytes.len() < HEADER_SIZE {
            return Err(WadError::TruncatedHeader { len: bytes.len() });
        }

        let header = decode::header(&bytes)?;
        let kind = WadKind::from_tag(&header.tag).ok_or(WadError::BadMagic(header.tag))?;
        if kind == WadKind::Pwad {
            warn!("archive is a PWAD; maps may be incomplete without an IWAD");
        }

        // directory bounds check
        let count = i64::from(header.dir_count);
        let offset = i64::from(header.dir_offset);
        let dir_end = offset + count * DIR_ENTRY_SIZE as i64;
        if count < 0 || offset < 0 || dir_end > bytes.len() as i64 {
            return Err(WadError::DirectoryOutOfBounds {
                count,
                offset,
                file_size: bytes.len(),
            });
        }

        // parse directory, entry `i` lives at dir_offset + i * 16
        let lumps = (0..count as usize)
            .map(|i| decode::directory_entry(&bytes, offset as usize + i * DIR_ENTRY_SIZE))
            .collect::<Result<Vec<_>, _>>()?;

        // validate each lump slice
        for (i, l) in lumps.iter().enumerate() {
            let end = u64::from(l.offset) + u64::from(l.size);
            if end > bytes.len() as u64 {
                return Err(WadError::BadOffset {
                    index: i,
                    name: Self::lump_name(&l.name).into(),
                    offset: l.offset,
                    size: l.size,
                    file_size: bytes.len(),
                });
            }
        }
        debug!("directory: {} entries at offset {}", lumps.len(), offset);

        // a PWAD may repeat names; the entry nearest the end wins
        let by_name: HashMap<String, usize> = lumps
            .iter()
            .enumerate()
            .map(|(i, l)| (Self::lump_name(&l.name).to_owned(), i))
            .collect();

        Ok(Self {
            kind,
            lumps,
            bytes,
            by_name,
        })
    }
}

fn read_all(path: &Path) -> Result<Vec<u8>, WadError> {
    use std::io::Read;

    let mut file = fs::File::open(path).map_err(|source| WadError::Open {
        path: path.to_owned(),
        source,
    })?;
    let len = file.metadata().map(|m| m.len() as usize).unwrap_or(0);
    let mut bytes = Vec::with_capacity(len);
    file.read_to_end(&mut bytes)
        .map_err(|source| WadError::Read {
            path: path.to_owned(),
            source,
        })?;
    Ok(bytes)
}

// ==========================================================================
// Tests
// ==========================================================================
