use bitflags::bitflags;
use glam::{IVec2, ivec2};
use log::warn;

use crate::config::MapConfig;

pub type SubsectorId = u16;
pub type LinedefId = u16;
pub type SegmentId = u16;
pub type VertexId = u16;
pub type SidedefId = u16;
pub type SectorId = u16;
pub type NodeId = u16;
pub type ThingId = u16;

/// Running min/max over every vertex added so far.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub min: IVec2,
    pub max: IVec2,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: IVec2::splat(i32::MAX),
            max: IVec2::splat(i32::MIN),
        }
    }
}

impl Bounds {
    /// Min and max are checked independently for each axis, so the very
    /// first point sets both.
    #[inline]
    pub fn extend(&mut self, p: IVec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn contains(&self, p: IVec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    pub fn size(&self) -> IVec2 {
        if self.is_empty() {
            IVec2::ZERO
        } else {
            self.max - self.min
        }
    }
}

/// Runtime snapshot of one map (immutable after load).
#[derive(Debug)]
pub struct Level {
    pub(crate) name: String,
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) linedefs: Vec<Linedef>,
    pub(crate) things: Vec<Thing>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) subsectors: Vec<Subsector>,
    pub(crate) segs: Vec<Seg>,
    pub(crate) sidedefs: Vec<Sidedef>,
    pub(crate) sectors: Vec<Sector>,
    pub(crate) bounds: Bounds,
    pub(crate) config: MapConfig,
    /// directory index of the map marker, once known
    pub(crate) lump_index: Option<usize>,
    pub(crate) player_start: Option<PlayerStart>,
}

/*------------------------- game objects -----------------------------*/

bitflags! {
    /// Skill / mode gating from the THINGS lump.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ThingFlags: u16 {
        const EASY        = 0x0001;
        const NORMAL      = 0x0002;
        const HARD        = 0x0004;
        const AMBUSH      = 0x0008;
        const MULTIPLAYER = 0x0010;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Thing {
    pub pos: IVec2,
    pub angle: u16, // degrees
    pub type_id: u16,
    pub flags: ThingFlags,
}

/// Where the player spawns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerStart {
    pub pos: IVec2,
    pub angle: u16,
}

/*--------------------------- linedefs -------------------------------*/

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LinedefFlags: u16 {
        const IMPASSABLE      = 0x0001;
        const BLOCK_MONSTERS  = 0x0002;
        const TWO_SIDED       = 0x0004;
        const UPPER_UNPEGGED  = 0x0008;
        const LOWER_UNPEGGED  = 0x0010;
        const SECRET          = 0x0020;
        const BLOCK_SOUND     = 0x0040;
        const NOT_ON_MAP      = 0x0080;
        const ALREADY_ON_MAP  = 0x0100;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Linedef {
    pub v1: VertexId,
    pub v2: VertexId,
    pub flags: LinedefFlags,
    pub special: u16,
    pub tag: u16,
    pub right_sidedef: Option<SidedefId>,
    pub left_sidedef: Option<SidedefId>,
}

impl Linedef {
    pub fn is_one_sided(&self) -> bool {
        self.left_sidedef.is_none()
    }
}

/*--------------------------- sidedefs -------------------------------*/

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sidedef {
    pub x_off: i16,
    pub y_off: i16,
    pub upper: String,
    pub lower: String,
    pub middle: String,
    pub sector: SectorId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sector {
    pub floor_h: i16,
    pub ceil_h: i16,
    pub floor_tex: String,
    pub ceil_tex: String,
    pub light: i16,
    pub special: u16,
    pub tag: u16,
}

/*----------------------- simple primitives --------------------------*/

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Vertex {
    pub x: i16,
    pub y: i16,
}

impl Vertex {
    #[inline]
    pub fn pos(&self) -> IVec2 {
        ivec2(self.x.into(), self.y.into())
    }
}

/// Which way a seg runs relative to its linedef.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegSide {
    /// same direction as the linedef (its right side)
    Front,
    /// against the linedef (its left side)
    Back,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Seg {
    pub v1: VertexId,
    pub v2: VertexId,
    pub angle: u16, // BAM, 0x10000 per turn
    pub linedef: LinedefId,
    pub side: SegSide,
    pub offset: i16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subsector {
    pub seg_count: u16,
    pub first_seg: SegmentId,
}

/// Axis-aligned box as stored in a node (map units, Y up).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aabb {
    pub top: i16,
    pub bottom: i16,
    pub left: i16,
    pub right: i16,
}

/// Node child reference, bit 15 already decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Child {
    Node(NodeId),
    Subsector(SubsectorId),
}

impl Child {
    pub const SUBSECTOR_BIT: u16 = 0x8000;
    pub const INDEX_MASK: u16 = 0x7FFF;

    #[inline]
    pub fn from_raw(raw: u16) -> Self {
        if raw & Self::SUBSECTOR_BIT != 0 {
            Self::Subsector(raw & Self::INDEX_MASK)
        } else {
            Self::Node(raw)
        }
    }

    #[inline]
    pub fn to_raw(self) -> u16 {
        match self {
            Self::Node(id) => id,
            Self::Subsector(id) => id | Self::SUBSECTOR_BIT,
        }
    }
}

/// Which side of a partition line a point lies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// front
    Right = 0,
    /// back
    Left = 1,
}

impl Side {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Left => Self::Right,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Node {
    /// partition origin
    pub x: i16,
    pub y: i16,
    /// partition direction
    pub dx: i16,
    pub dy: i16,
    /// indexed by `Side`
    pub bbox: [Aabb; 2],
    /// indexed by `Side`
    pub child: [Child; 2],
}

// ──────────────────────────────────────────────────────────────────────────
//                       Level – construction
// ──────────────────────────────────────────────────────────────────────────
impl Level {
    /// Empty store for map `name`.
    pub fn new(name: impl Into<String>, config: MapConfig) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            linedefs: Vec::new(),
            things: Vec::new(),
            nodes: Vec::new(),
            subsectors: Vec::new(),
            segs: Vec::new(),
            sidedefs: Vec::new(),
            sectors: Vec::new(),
            bounds: Bounds::default(),
            config,
            lump_index: None,
            player_start: None,
        }
    }

    /// The only place bounds change.
    pub fn add_vertex(&mut self, v: Vertex) {
        self.bounds.extend(v.pos());
        self.vertices.push(v);
    }

    pub fn add_linedef(&mut self, l: Linedef) {
        self.linedefs.push(l);
    }

    /// Append a thing; a player start also seeds `player_start` (last wins).
    pub fn add_thing(&mut self, t: Thing) {
        if t.type_id == self.config.player_thing_type {
            if self.player_start.is_some() {
                warn!("{}: more than one player start, using the last", self.name);
            }
            self.player_start = Some(PlayerStart {
                pos: t.pos,
                angle: t.angle,
            });
        }
        self.things.push(t);
    }

    pub fn add_node(&mut self, n: Node) {
        self.nodes.push(n);
    }

    pub fn add_subsector(&mut self, s: Subsector) {
        self.subsectors.push(s);
    }

    pub fn add_seg(&mut self, s: Seg) {
        self.segs.push(s);
    }

    pub fn add_sidedef(&mut self, s: Sidedef) {
        self.sidedefs.push(s);
    }

    pub fn add_sector(&mut self, s: Sector) {
        self.sectors.push(s);
    }

    pub fn set_lump_index(&mut self, index: usize) {
        self.lump_index = Some(index);
    }

    /// Swap the projection settings (surface size, scale).
    pub fn set_config(&mut self, config: MapConfig) {
        self.config = config;
    }
}

// ──────────────────────────────────────────────────────────────────────────
//                       Level – read access
// ──────────────────────────────────────────────────────────────────────────
impl Level {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn linedefs(&self) -> &[Linedef] {
        &self.linedefs
    }

    pub fn things(&self) -> &[Thing] {
        &self.things
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn subsectors(&self) -> &[Subsector] {
        &self.subsectors
    }

    pub fn segs(&self) -> &[Seg] {
        &self.segs
    }

    pub fn sidedefs(&self) -> &[Sidedef] {
        &self.sidedefs
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn lump_index(&self) -> Option<usize> {
        self.lump_index
    }

    pub fn player_start(&self) -> Option<PlayerStart> {
        self.player_start
    }

    /// Segments making up subsector `id`.
    pub fn subsector_segs(&self, id: SubsectorId) -> &[Seg] {
        self.subsectors
            .get(id as usize)
            .and_then(|ss| {
                let first = ss.first_seg as usize;
                self.segs.get(first..first + ss.seg_count as usize)
            })
            .unwrap_or(&[])
    }
}
