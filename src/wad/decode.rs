//! Stateless little-endian field and record decoding.
//!
//! Every routine takes a borrowed buffer plus an **explicit** byte offset.
//! Nothing here keeps a cursor; callers compute
//! `lump_base + index * RECORD_SIZE` themselves.

use bincode::{Decode, config, decode_from_slice};
use byteorder::{ByteOrder, LittleEndian as LE};
use thiserror::Error;

use crate::wad::raw::{Header, LumpInfo};

/// Size of the master header at offset 0.
pub const HEADER_SIZE: usize = 12;

/// Size (in bytes) of one directory entry.
pub const DIR_ENTRY_SIZE: usize = 16;

/// Field / record decoding failures.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{width}-byte read at offset {offset} runs past end of buffer ({len} bytes)")]
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },

    #[error("{len} bytes is not a whole number of {size}-byte records ({remainder} left over)")]
    Truncated {
        len: usize,
        size: usize,
        remainder: usize,
    },

    #[error("record at offset {offset}: {source}")]
    Record {
        offset: usize,
        source: bincode::error::DecodeError,
    },
}

/// A fixed-size record stored back to back inside a lump.
///
/// `SIZE` is the exact on-disk width; it must match what the `Decode`
/// derive consumes.
pub trait Record: Decode<()> {
    const SIZE: usize;
}

/// bincode configuration matching the WAD layout: no varints, LE.
#[inline]
pub fn wad_config() -> impl config::Config {
    config::standard()
        .with_fixed_int_encoding()
        .with_little_endian()
}

/*=======================================================================*/
/*                             Scalar fields                             */
/*=======================================================================*/

#[inline]
fn field(buf: &[u8], offset: usize, width: usize) -> Result<&[u8], DecodeError> {
    offset
        .checked_add(width)
        .filter(|&end| end <= buf.len())
        .map(|end| &buf[offset..end])
        .ok_or(DecodeError::OutOfBounds {
            offset,
            width,
            len: buf.len(),
        })
}

pub fn read_u16(buf: &[u8], offset: usize) -> Result<u16, DecodeError> {
    field(buf, offset, 2).map(LE::read_u16)
}

pub fn read_i16(buf: &[u8], offset: usize) -> Result<i16, DecodeError> {
    field(buf, offset, 2).map(LE::read_i16)
}

pub fn read_u32(buf: &[u8], offset: usize) -> Result<u32, DecodeError> {
    field(buf, offset, 4).map(LE::read_u32)
}

pub fn read_i32(buf: &[u8], offset: usize) -> Result<i32, DecodeError> {
    field(buf, offset, 4).map(LE::read_i32)
}

/// Eight raw name bytes (NUL padding kept).
pub fn read_name(buf: &[u8], offset: usize) -> Result<[u8; 8], DecodeError> {
    let mut name = [0u8; 8];
    name.copy_from_slice(field(buf, offset, 8)?);
    Ok(name)
}

/*=======================================================================*/
/*                        Header / directory entry                       */
/*=======================================================================*/

/// ```text
/// 0x00..0x04  type tag  ("IWAD" / "PWAD")
/// 0x04..0x08  directory entry count
/// 0x08..0x0C  directory offset
/// ```
pub fn header(buf: &[u8]) -> Result<Header, DecodeError> {
    let mut tag = [0u8; 4];
    tag.copy_from_slice(field(buf, 0, 4)?);
    Ok(Header {
        tag,
        dir_count: read_i32(buf, 4)?,
        dir_offset: read_i32(buf, 8)?,
    })
}

/// ```text
/// 0x00..0x04  lump offset
/// 0x04..0x08  lump size
/// 0x08..0x10  name, NUL padded
/// ```
pub fn directory_entry(buf: &[u8], offset: usize) -> Result<LumpInfo, DecodeError> {
    Ok(LumpInfo {
        offset: read_u32(buf, offset)?,
        size: read_u32(buf, offset + 4)?,
        name: read_name(buf, offset + 8)?,
    })
}

/*=======================================================================*/
/*                              Lump records                             */
/*=======================================================================*/

/// Decode one `T` whose first byte is at `offset`.
pub fn decode_at<T: Record>(buf: &[u8], offset: usize) -> Result<T, DecodeError> {
    let bytes = field(buf, offset, T::SIZE)?;
    let (val, read) = decode_from_slice::<T, _>(bytes, wad_config())
        .map_err(|source| DecodeError::Record { offset, source })?;
    debug_assert_eq!(read, T::SIZE, "Record::SIZE disagrees with Decode impl");
    Ok(val)
}

/// Number of whole `T` records in a lump of `len` bytes.
pub fn record_count<T: Record>(len: usize) -> Result<usize, DecodeError> {
    match len % T::SIZE {
        0 => Ok(len / T::SIZE),
        remainder => Err(DecodeError::Truncated {
            len,
            size: T::SIZE,
            remainder,
        }),
    }
}

/// Decode every record of a lump in file order. An empty lump is fine.
pub fn decode_lump<T: Record>(lump: &[u8]) -> Result<Vec<T>, DecodeError> {
    let count = record_count::<T>(lump.len())?;
    (0..count).map(|i| decode_at(lump, i * T::SIZE)).collect()
}

/*=======================================================================*/
/*                                 Tests                                 */
/*=======================================================================*/
