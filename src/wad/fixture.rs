//! Test-only WAD fabrication.

use bincode::{Encode, encode_to_vec};
use std::io::Write;
use tempfile::NamedTempFile;

use crate::wad::decode::wad_config;
use crate::wad::level::{
    RawLinedef, RawNode, RawSector, RawSeg, RawSidedef, RawSubsector, RawThing, RawVertex,
};

pub fn encode<T: Encode + Copy>(records: &[T]) -> Vec<u8> {
    records
        .iter()
        .flat_map(|r| encode_to_vec(*r, wad_config()).unwrap())
        .collect()
}

fn tex(name: &str) -> [u8; 8] {
    let mut raw = [0u8; 8];
    raw[..name.len()].copy_from_slice(name.as_bytes());
    raw
}

/// The eight decoded lumps of one map.
#[derive(Clone, Debug, Default)]
pub struct MapLumps {
    pub things: Vec<RawThing>,
    pub linedefs: Vec<RawLinedef>,
    pub sidedefs: Vec<RawSidedef>,
    pub vertices: Vec<RawVertex>,
    pub segs: Vec<RawSeg>,
    pub subsectors: Vec<RawSubsector>,
    pub nodes: Vec<RawNode>,
    pub sectors: Vec<RawSector>,
}

impl MapLumps {
    /// A 128×128 room split down x = 64 by a single node.
    ///
    /// ```text
    ///  3 ────── 5 ────── 2      (0,128)   (64,128)   (128,128)
    ///  │  ss 1  │  ss 0  │
    ///  0 ────── 4 ────── 1      (0,0)     (64,0)     (128,0)
    /// ```
    pub fn square() -> Self {
        let vertices = [(0, 0), (128, 0), (128, 128), (0, 128), (64, 0), (64, 128)]
            .map(|(x, y)| RawVertex { x, y })
            .to_vec();

        let linedefs = [(0u16, 1u16), (1, 2), (2, 3), (3, 0)]
            .iter()
            .enumerate()
            .map(|(i, &(v1, v2))| RawLinedef {
                v1,
                v2,
                flags: 0x0001,
                special: 0,
                tag: 0,
                sidenum: [i as u16, 0xFFFF],
            })
            .collect();

        let sidedefs = (0..4)
            .map(|_| RawSidedef {
                x_off: 0,
                y_off: 0,
                top_tex: tex("-"),
                bottom_tex: tex("-"),
                mid_tex: tex("STARTAN3"),
                sector: 0,
            })
            .collect();

        // (v1, v2, angle, linedef)
        let segs = [
            (4, 1, 0x0000, 0),
            (1, 2, 0x4000, 1),
            (2, 5, 0x8000, 2),
            (5, 3, 0x8000, 2),
            (3, 0, 0xC000, 3),
            (0, 4, 0x0000, 0),
        ]
        .map(|(v1, v2, angle, linedef)| RawSeg {
            v1,
            v2,
            angle,
            linedef,
            side: 0,
            offset: 0,
        })
        .to_vec();

        let subsectors = vec![
            RawSubsector {
                seg_count: 3,
                first_seg: 0,
            },
            RawSubsector {
                seg_count: 3,
                first_seg: 3,
            },
        ];

        let nodes = vec![RawNode {
            x: 64,
            y: 0,
            dx: 0,
            dy: 128,
            bbox: [[128, 0, 64, 128], [128, 0, 0, 64]],
            child: [0x8000, 0x8001],
        }];

        let sectors = vec![RawSector {
            floor_h: 0,
            ceil_h: 128,
            floor_tex: tex("FLOOR4_8"),
            ceil_tex: tex("CEIL3_5"),
            light: 160,
            special: 0,
            tag: 0,
        }];

        let things = vec![
            RawThing {
                x: 32,
                y: 64,
                angle: 90,
                type_: 1,
                options: 0x0007,
            },
            RawThing {
                x: 96,
                y: 96,
                angle: 180,
                type_: 3004,
                options: 0x000C,
            },
        ];

        Self {
            things,
            linedefs,
            sidedefs,
            vertices,
            segs,
            subsectors,
            nodes,
            sectors,
        }
    }
}

/// Assembles header + payloads + trailing directory.
#[derive(Clone, Debug)]
pub struct WadBuilder {
    tag: [u8; 4],
    lumps: Vec<(String, Vec<u8>)>,
}

impl WadBuilder {
    pub fn iwad() -> Self {
        Self {
            tag: *b"IWAD",
            lumps: Vec::new(),
        }
    }

    pub fn pwad() -> Self {
        Self {
            tag: *b"PWAD",
            lumps: Vec::new(),
        }
    }

    pub fn lump(mut self, name: &str, data: Vec<u8>) -> Self {
        assert!(name.len() <= 8);
        self.lumps.push((name.to_owned(), data));
        self
    }

    pub fn marker(self, name: &str) -> Self {
        self.lump(name, Vec::new())
    }

    /// Marker followed by all ten map lumps.
    pub fn map(self, name: &str, m: &MapLumps) -> Self {
        self.marker(name)
            .lump("THINGS", encode(&m.things))
            .lump("LINEDEFS", encode(&m.linedefs))
            .lump("SIDEDEFS", encode(&m.sidedefs))
            .lump("VERTEXES", encode(&m.vertices))
            .lump("SEGS", encode(&m.segs))
            .lump("SSECTORS", encode(&m.subsectors))
            .lump("NODES", encode(&m.nodes))
            .lump("SECTORS", encode(&m.sectors))
            .lump("REJECT", vec![0; 1])
            .lump("BLOCKMAP", vec![0; 8])
    }

    /// Overwrite the payload of the last lump called `name`.
    pub fn replace(&mut self, name: &str, data: Vec<u8>) {
        let slot = self
            .lumps
            .iter_mut()
            .rev()
            .find(|(n, _)| n == name)
            .expect("no such lump");
        slot.1 = data;
    }

    /// Rename the last lump called `from`.
    pub fn rename(&mut self, from: &str, to: &str) {
        let slot = self
            .lumps
            .iter_mut()
            .rev()
            .find(|(n, _)| n == from)
            .expect("no such lump");
        slot.0 = to.to_owned();
    }

    pub fn build(&self) -> Vec<u8> {
        let payload: usize = self.lumps.iter().map(|(_, d)| d.len()).sum();
        let dir_offset = 12 + payload;

        let mut out = Vec::with_capacity(dir_offset + self.lumps.len() * 16);
        out.extend(self.tag);
        out.extend((self.lumps.len() as i32).to_le_bytes());
        out.extend((dir_offset as i32).to_le_bytes());

        let mut entries = Vec::with_capacity(self.lumps.len());
        for (name, data) in &self.lumps {
            entries.push((out.len() as u32, data.len() as u32, tex(name)));
            out.extend(data);
        }
        for (offset, size, name) in entries {
            out.extend(offset.to_le_bytes());
            out.extend(size.to_le_bytes());
            out.extend(name);
        }
        out
    }

    pub fn write_temp(&self) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("tempfile");
        file.write_all(&self.build()).unwrap();
        file.flush().unwrap();
        file
    }
}
