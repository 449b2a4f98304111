// ──────────────────────────────────────────────────────────────────────────
// wad/loader.rs
//
//  *   Wad + map name                      ──╮
//  *   RawVertex / RawLinedef / ...          │   --->  world::Level
//  *   MapConfig                             │
//                                            ╯
// ──────────────────────────────────────────────────────────────────────────

use crate::{
    config::MapConfig,
    wad::level::{self as raw_level, LevelError, LumpKind},
    wad::raw::Wad,
    world as geo,
};
use log::{info, warn};

/*====================================================================*/
/*                       Public API                                   */
/*====================================================================*/

/// Locate map `name` in `wad` and decode it into a `world::Level`.
///
/// Nothing is read if the map marker is missing.
pub fn load_map(wad: &Wad, name: &str, config: MapConfig) -> Result<geo::Level, LevelError> {
    let marker = wad.find_map_index(name)?;
    load_level(wad, marker, config)
}

/// Decode the map whose marker sits at directory index `marker`.
///
/// Lumps are read in a fixed order and the first failure aborts the load;
/// a partly filled `Level` never escapes.
pub fn load_level(wad: &Wad, marker: usize, config: MapConfig) -> Result<geo::Level, LevelError> {
    let marker_info = wad.lumps().get(marker).ok_or(LevelError::MarkerOob(marker))?;
    let name = Wad::lump_name(&marker_info.name).to_owned();
    info!("loading map {name} (lump # {marker})");

    let mut lvl = geo::Level::new(name, config);
    lvl.set_lump_index(marker);

    /*----- 1. Geometry, vertices first ------------------------------*/
    for r in wad.read_lump::<raw_level::RawVertex>(marker, LumpKind::Vertexes)? {
        lvl.add_vertex(raw_to_geo::vertex_from(r));
    }
    for r in wad.read_lump::<raw_level::RawLinedef>(marker, LumpKind::Linedefs)? {
        lvl.add_linedef(raw_to_geo::linedef_from(r));
    }
    for r in wad.read_lump::<raw_level::RawThing>(marker, LumpKind::Things)? {
        lvl.add_thing(raw_to_geo::thing_from(r));
    }

    /*----- 2. BSP ----------------------------------------------------*/
    for r in wad.read_lump::<raw_level::RawNode>(marker, LumpKind::Nodes)? {
        lvl.add_node(raw_to_geo::node_from(r));
    }
    for r in wad.read_lump::<raw_level::RawSubsector>(marker, LumpKind::Subsectors)? {
        lvl.add_subsector(raw_to_geo::subsector_from(r));
    }
    for r in wad.read_lump::<raw_level::RawSeg>(marker, LumpKind::Segs)? {
        lvl.add_seg(raw_to_geo::seg_from(r));
    }

    /*----- 3. Sides and sectors -------------------------------------*/
    for r in wad.read_lump::<raw_level::RawSidedef>(marker, LumpKind::Sidedefs)? {
        lvl.add_sidedef(raw_to_geo::sidedef_from(r));
    }
    for r in wad.read_lump::<raw_level::RawSector>(marker, LumpKind::Sectors)? {
        lvl.add_sector(raw_to_geo::sector_from(r));
    }

    /*----- 4. Slots we keep but do not decode ------------------------*/
    wad.check_slot(marker, LumpKind::Reject)?;
    wad.check_slot(marker, LumpKind::Blockmap)?;

    /*----- 5. Cross references ---------------------------------------*/
    validate::references(&lvl)?;

    if lvl.player_start().is_none() {
        warn!(
            "{}: no player start (thing type {})",
            lvl.name(),
            config.player_thing_type
        );
    }
    info!(
        "{}: {} vertices, {} linedefs, {} things, {} nodes, {} subsectors, {} segs",
        lvl.name(),
        lvl.vertices().len(),
        lvl.linedefs().len(),
        lvl.things().len(),
        lvl.nodes().len(),
        lvl.subsectors().len(),
        lvl.segs().len()
    );
    Ok(lvl)
}

/*====================================================================*/
/*                  Raw → Geo helpers (local)                         */
/*====================================================================*/
mod raw_to_geo {
    use super::*;
    use glam::ivec2;

    const NO_SIDEDEF: u16 = 0xFFFF;

    pub fn vertex_from(r: raw_level::RawVertex) -> geo::Vertex {
        geo::Vertex { x: r.x, y: r.y }
    }

    pub fn linedef_from(r: raw_level::RawLinedef) -> geo::Linedef {
        let side = |s: u16| (s != NO_SIDEDEF).then_some(s);
        geo::Linedef {
            v1: r.v1,
            v2: r.v2,
            flags: geo::LinedefFlags::from_bits_retain(r.flags),
            special: r.special,
            tag: r.tag,
            right_sidedef: side(r.sidenum[0]),
            left_sidedef: side(r.sidenum[1]),
        }
    }

    pub fn thing_from(r: raw_level::RawThing) -> geo::Thing {
        geo::Thing {
            pos: ivec2(r.x.into(), r.y.into()),
            angle: r.angle,
            type_id: r.type_,
            flags: geo::ThingFlags::from_bits_retain(r.options),
        }
    }

    const BOXTOP: usize = 0;
    const BOXBOTTOM: usize = 1;
    const BOXLEFT: usize = 2;
    const BOXRIGHT: usize = 3;

    #[inline]
    fn raw_bbox_to_aabb(raw: &[i16; 4]) -> geo::Aabb {
        geo::Aabb {
            top: raw[BOXTOP],
            bottom: raw[BOXBOTTOM],
            left: raw[BOXLEFT],
            right: raw[BOXRIGHT],
        }
    }

    pub fn node_from(r: raw_level::RawNode) -> geo::Node {
        geo::Node {
            x: r.x,
            y: r.y,
            dx: r.dx,
            dy: r.dy,
            bbox: [raw_bbox_to_aabb(&r.bbox[0]), raw_bbox_to_aabb(&r.bbox[1])],
            child: r.child.map(geo::Child::from_raw),
        }
    }

    pub fn subsector_from(r: raw_level::RawSubsector) -> geo::Subsector {
        geo::Subsector {
            seg_count: r.seg_count,
            first_seg: r.first_seg,
        }
    }

    pub fn seg_from(r: raw_level::RawSeg) -> geo::Seg {
        geo::Seg {
            v1: r.v1,
            v2: r.v2,
            angle: r.angle,
            linedef: r.linedef,
            side: match r.side {
                0 => geo::SegSide::Front,
                _ => geo::SegSide::Back,
            },
            offset: r.offset,
        }
    }

    fn texture_name(raw: &[u8; 8]) -> String {
        Wad::lump_name(raw).to_ascii_uppercase()
    }

    pub fn sidedef_from(r: raw_level::RawSidedef) -> geo::Sidedef {
        geo::Sidedef {
            x_off: r.x_off,
            y_off: r.y_off,
            upper: texture_name(&r.top_tex),
            lower: texture_name(&r.bottom_tex),
            middle: texture_name(&r.mid_tex),
            sector: r.sector,
        }
    }

    pub fn sector_from(r: raw_level::RawSector) -> geo::Sector {
        geo::Sector {
            floor_h: r.floor_h,
            ceil_h: r.ceil_h,
            floor_tex: texture_name(&r.floor_tex),
            ceil_tex: texture_name(&r.ceil_tex),
            light: r.light,
            special: r.special,
            tag: r.tag,
        }
    }
}

/*====================================================================*/
/*                  Index validation                                  */
/*====================================================================*/
mod validate {
    use super::*;

    fn check(
        lvl: &geo::Level,
        lump: &'static str,
        index: usize,
        target: &'static str,
        value: usize,
        limit: usize,
    ) -> Result<(), LevelError> {
        if value < limit {
            return Ok(());
        }
        Err(LevelError::BadReference {
            map: lvl.name().to_owned(),
            lump,
            index,
            target,
            value,
            limit,
        })
    }

    /// Every index stored in one collection must point inside another.
    pub fn references(lvl: &geo::Level) -> Result<(), LevelError> {
        let n_vert = lvl.vertices().len();
        let n_line = lvl.linedefs().len();
        let n_side = lvl.sidedefs().len();
        let n_sect = lvl.sectors().len();
        let n_seg = lvl.segs().len();
        let n_ss = lvl.subsectors().len();
        let n_node = lvl.nodes().len();

        for (i, l) in lvl.linedefs().iter().enumerate() {
            check(lvl, "LINEDEFS", i, "vertex", l.v1 as usize, n_vert)?;
            check(lvl, "LINEDEFS", i, "vertex", l.v2 as usize, n_vert)?;
            for s in [l.right_sidedef, l.left_sidedef].into_iter().flatten() {
                check(lvl, "LINEDEFS", i, "sidedef", s as usize, n_side)?;
            }
        }
        for (i, s) in lvl.sidedefs().iter().enumerate() {
            check(lvl, "SIDEDEFS", i, "sector", s.sector as usize, n_sect)?;
        }
        for (i, s) in lvl.segs().iter().enumerate() {
            check(lvl, "SEGS", i, "vertex", s.v1 as usize, n_vert)?;
            check(lvl, "SEGS", i, "vertex", s.v2 as usize, n_vert)?;
            check(lvl, "SEGS", i, "linedef", s.linedef as usize, n_line)?;
        }
        for (i, ss) in lvl.subsectors().iter().enumerate() {
            // one past the last seg of the run
            let end = ss.first_seg as usize + ss.seg_count as usize;
            if end > n_seg {
                check(lvl, "SSECTORS", i, "seg", end - 1, n_seg)?;
            }
        }
        for (i, n) in lvl.nodes().iter().enumerate() {
            for c in n.child {
                match c {
                    geo::Child::Node(id) => check(lvl, "NODES", i, "node", id as usize, n_node)?,
                    geo::Child::Subsector(id) => {
                        check(lvl, "NODES", i, "subsector", id as usize, n_ss)?
                    }
                }
            }
        }
        if n_node == 0 {
            // without nodes the root is subsector 0
            check(lvl, "NODES", 0, "subsector", 0, n_ss)?;
        }
        Ok(())
    }
}

/*====================================================================*/
/*                               Tests                                */
/*====================================================================*/
