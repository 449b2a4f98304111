mod automap;
mod bsp;
mod geometry;

pub use geometry::{
    Aabb, Bounds, Child, Level, Linedef, LinedefFlags, LinedefId, Node, NodeId, PlayerStart, Sector,
    SectorId, Seg, SegSide, SegmentId, Side, Sidedef, SidedefId, Subsector, SubsectorId, Thing,
    ThingFlags, ThingId, Vertex, VertexId,
};

pub use automap::{NodeOverlay, ScreenLine, ScreenRect};

pub use bsp::BspError;
