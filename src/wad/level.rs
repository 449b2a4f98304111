use crate::wad::decode::{self, DecodeError, Record};
use crate::wad::raw::{Wad, WadError};
use bincode::{Decode, Encode};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/*=======================================================================*/
/*                         Raw binary structs                            */
/*=======================================================================*/

#[derive(Clone, Copy, Decode, Encode, Debug, PartialEq, Eq)]
pub struct RawThing {
    pub x: i16,
    pub y: i16,
    pub angle: u16,
    pub type_: u16,
    pub options: u16,
}

#[derive(Clone, Copy, Decode, Encode, Debug, PartialEq, Eq)]
pub struct RawLinedef {
    pub v1: u16,
    pub v2: u16,
    pub flags: u16,
    pub special: u16,
    pub tag: u16,
    /// right, left; `0xFFFF` = none
    pub sidenum: [u16; 2],
}

#[derive(Clone, Copy, Decode, Encode, Debug, PartialEq, Eq)]
pub struct RawSidedef {
    pub x_off: i16,
    pub y_off: i16,
    pub top_tex: [u8; 8],
    pub bottom_tex: [u8; 8],
    pub mid_tex: [u8; 8],
    pub sector: u16,
}

#[derive(Clone, Copy, Decode, Encode, Debug, PartialEq, Eq)]
pub struct RawVertex {
    pub x: i16,
    pub y: i16,
}

#[derive(Clone, Copy, Decode, Encode, Debug, PartialEq, Eq)]
pub struct RawSeg {
    pub v1: u16,
    pub v2: u16,
    pub angle: u16,
    pub linedef: u16,
    pub side: u16,
    pub offset: i16,
}

#[derive(Clone, Copy, Decode, Encode, Debug, PartialEq, Eq)]
pub struct RawSubsector {
    pub seg_count: u16,
    pub first_seg: u16,
}

#[derive(Clone, Copy, Decode, Encode, Debug, PartialEq, Eq)]
pub struct RawNode {
    pub x: i16,
    pub y: i16,
    pub dx: i16,
    pub dy: i16,
    /// right box, left box; each top, bottom, left, right
    pub bbox: [[i16; 4]; 2],
    /// right, left; bit 15 marks a subsector
    pub child: [u16; 2],
}

#[derive(Clone, Copy, Decode, Encode, Debug, PartialEq, Eq)]
pub struct RawSector {
    pub floor_h: i16,
    pub ceil_h: i16,
    pub floor_tex: [u8; 8],
    pub ceil_tex: [u8; 8],
    pub light: i16,
    pub special: u16,
    pub tag: u16,
}

impl Record for RawThing {
    const SIZE: usize = 10;
}
impl Record for RawLinedef {
    const SIZE: usize = 14;
}
impl Record for RawSidedef {
    const SIZE: usize = 30;
}
impl Record for RawVertex {
    const SIZE: usize = 4;
}
impl Record for RawSeg {
    const SIZE: usize = 12;
}
impl Record for RawSubsector {
    const SIZE: usize = 4;
}
impl Record for RawNode {
    const SIZE: usize = 28;
}
impl Record for RawSector {
    const SIZE: usize = 26;
}

/*=======================================================================*/
/*                     Positional lump slots of a map                    */
/*=======================================================================*/

/// Lumps that follow a map marker, in their mandatory order. The
/// discriminant is the distance from the marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LumpKind {
    /// Spawn positions for players, monsters and items
    Things = 1,
    /// Walls: two vertices plus one or two sidedefs
    Linedefs,
    /// Texture and sector binding for each side of a linedef
    Sidedefs,
    /// Signed X, Y pairs; every other lump indexes into these
    Vertexes,
    /// Linedef pieces cut by the BSP builder
    Segs,
    /// Convex BSP leaves, each a run of segs
    Subsectors,
    /// BSP tree
    Nodes,
    /// Floor/ceiling regions
    Sectors,
    /// Sector-to-sector visibility matrix
    Reject,
    /// Collision grid
    Blockmap,
}

impl LumpKind {
    pub const ALL: [LumpKind; 10] = [
        Self::Things,
        Self::Linedefs,
        Self::Sidedefs,
        Self::Vertexes,
        Self::Segs,
        Self::Subsectors,
        Self::Nodes,
        Self::Sectors,
        Self::Reject,
        Self::Blockmap,
    ];

    /// Directory distance from the marker.
    pub fn offset(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Things => "THINGS",
            Self::Linedefs => "LINEDEFS",
            Self::Sidedefs => "SIDEDEFS",
            Self::Vertexes => "VERTEXES",
            Self::Segs => "SEGS",
            Self::Subsectors => "SSECTORS",
            Self::Nodes => "NODES",
            Self::Sectors => "SECTORS",
            Self::Reject => "REJECT",
            Self::Blockmap => "BLOCKMAP",
        }
    }
}

/*=======================================================================*/
/*                                Errors                                 */
/*=======================================================================*/

#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("map {0} not found in WAD directory")]
    MapNotFound(String),

    #[error("marker index {0} out of bounds")]
    MarkerOob(usize),

    #[error("map {map}: expected lump `{expected}` at # {index}, directory ends first")]
    MissingLump {
        map: String,
        expected: &'static str,
        index: usize,
    },

    #[error("map {map}: expected lump `{expected}` at # {index}, found `{found}`")]
    SchemaMismatch {
        map: String,
        expected: &'static str,
        found: String,
        index: usize,
    },

    #[error("map {map}: lump {lump} size {size} not multiple of record size {record_size}")]
    TruncatedLump {
        map: String,
        lump: &'static str,
        size: usize,
        record_size: usize,
    },

    #[error("map {map}: lump {lump}: {source}")]
    BadRecord {
        map: String,
        lump: &'static str,
        source: DecodeError,
    },

    #[error("map {map}: {lump} # {index} refers to {target} {value}, only {limit} exist")]
    BadReference {
        map: String,
        lump: &'static str,
        index: usize,
        target: &'static str,
        value: usize,
        limit: usize,
    },

    #[error(transparent)]
    Wad(#[from] WadError),
}

/*=======================================================================*/
/*                     Convenience helpers on `Wad`                      */
/*=======================================================================*/
impl Wad {
    /// Return directory indices of every map marker (`E#M#`, `MAP##`).
    pub fn level_indices(&self) -> Vec<usize> {
        static RE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"^(E[1-9]M[1-9]|MAP[0-9][0-9])$").expect("static regex")
        });

        self.lumps()
            .iter()
            .enumerate()
            .filter(|(_, l)| l.size == 0 && RE.is_match(Self::lump_name(&l.name)))
            .map(|(i, _)| i)
            .collect()
    }

    /// First directory entry named exactly `map`.
    pub fn find_map_index(&self, map: &str) -> Result<usize, LevelError> {
        self.lumps()
            .iter()
            .position(|l| Self::lump_name(&l.name) == map)
            .ok_or_else(|| LevelError::MapNotFound(map.to_owned()))
    }

    fn map_name(&self, marker: usize) -> String {
        self.lumps()
            .get(marker)
            .map(|l| Self::lump_name(&l.name).to_owned())
            .unwrap_or_default()
    }

    /// Directory index of `kind` for the map at `marker`, after checking the
    /// entry there carries the expected name.
    pub fn check_slot(&self, marker: usize, kind: LumpKind) -> Result<usize, LevelError> {
        if marker >= self.lumps().len() {
            return Err(LevelError::MarkerOob(marker));
        }
        let index = marker + kind.offset();
        let l = self.lumps().get(index).ok_or_else(|| LevelError::MissingLump {
            map: self.map_name(marker),
            expected: kind.name(),
            index,
        })?;

        let found = Self::lump_name(&l.name);
        if found != kind.name() {
            return Err(LevelError::SchemaMismatch {
                map: self.map_name(marker),
                expected: kind.name(),
                found: found.to_owned(),
                index,
            });
        }
        Ok(index)
    }

    /// Decode the `kind` lump of the map at `marker` into records.
    pub fn read_lump<T: Record>(
        &self,
        marker: usize,
        kind: LumpKind,
    ) -> Result<Vec<T>, LevelError> {
        let index = self.check_slot(marker, kind)?;
        let bytes = self.lump_bytes(index)?;

        decode::record_count::<T>(bytes.len()).map_err(|_| LevelError::TruncatedLump {
            map: self.map_name(marker),
            lump: kind.name(),
            size: bytes.len(),
            record_size: T::SIZE,
        })?;

        let records = decode::decode_lump::<T>(bytes).map_err(|source| LevelError::BadRecord {
            map: self.map_name(marker),
            lump: kind.name(),
            source,
        })?;
        debug!(
            "{} {}: {} records",
            self.map_name(marker),
            kind.name(),
            records.len()
        );
        Ok(records)
    }
}

/*=======================================================================*/
/*                                Tests                                  */
/*=======================================================================*/
