//! Map-space → automap screen-space projection.
//!
//! The core never draws; it hands screen-space lines and rectangles to
//! whatever owns the render surface.

use glam::{IVec2, ivec2};

use crate::world::geometry::{Aabb, Level, NodeId};

/// Screen-space line, endpoints in pixels (Y down).
pub type ScreenLine = (IVec2, IVec2);

/// Screen-space rectangle: top-left corner plus size, both inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenRect {
    pub origin: IVec2,
    pub size: IVec2,
}

/// Debug overlay for one BSP node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeOverlay {
    pub right_box: ScreenRect,
    pub left_box: ScreenRect,
    pub partition: ScreenLine,
}

impl Level {
    /// Project a map point onto the automap surface.
    ///
    /// Translate so the bounding-box minimum lands on 0, divide by the
    /// scale, then flip Y around the last screen row. Always computed from
    /// the current bounds; before any vertex exists the origin is 0.
    pub fn to_screen(&self, p: IVec2) -> IVec2 {
        let scale = self.config.scale.max(1);
        let origin = if self.bounds.is_empty() {
            IVec2::ZERO
        } else {
            self.bounds.min
        };
        let rel = p - origin;
        ivec2(
            rel.x.div_euclid(scale),
            self.config.max_y() - rel.y.div_euclid(scale),
        )
    }

    /// Every linedef as a screen-space line, in linedef order.
    ///
    /// Linedefs with a vertex index out of range are skipped.
    pub fn automap_walls(&self) -> impl Iterator<Item = ScreenLine> + '_ {
        self.linedefs.iter().filter_map(|l| {
            let v1 = self.vertices.get(l.v1 as usize)?;
            let v2 = self.vertices.get(l.v2 as usize)?;
            Some((self.to_screen(v1.pos()), self.to_screen(v2.pos())))
        })
    }

    /// Player start on the automap.
    pub fn player_marker(&self) -> Option<IVec2> {
        self.player_start.map(|s| self.to_screen(s.pos))
    }

    fn screen_rect(&self, b: &Aabb) -> ScreenRect {
        let top_left = self.to_screen(ivec2(b.left.into(), b.top.into()));
        let bottom_right = self.to_screen(ivec2(b.right.into(), b.bottom.into()));
        ScreenRect {
            origin: top_left,
            size: bottom_right - top_left + IVec2::ONE,
        }
    }

    /// Both child boxes and the partition line of `node`, projected.
    pub fn node_overlay(&self, node: NodeId) -> Option<NodeOverlay> {
        let n = self.nodes.get(node as usize)?;
        let start = ivec2(n.x.into(), n.y.into());
        let end = start + ivec2(n.dx.into(), n.dy.into());
        Some(NodeOverlay {
            right_box: self.screen_rect(&n.bbox[0]),
            left_box: self.screen_rect(&n.bbox[1]),
            partition: (self.to_screen(start), self.to_screen(end)),
        })
    }
}
