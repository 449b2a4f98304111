use crate::world::geometry::{Child, Level, Node, NodeId, Side, SubsectorId};
use glam::IVec2;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BspError {
    #[error("BSP walk did not reach a subsector within {steps} steps")]
    Cycle { steps: usize },

    #[error("node {0} does not exist")]
    BadNode(NodeId),

    #[error("subsector {0} does not exist")]
    BadSubsector(SubsectorId),
}

// ──────────────────────────────────────────────────────────────────────────
//                       Node geometry helpers
// ──────────────────────────────────────────────────────────────────────────
impl Node {
    /// Cross product of (p − origin) with the partition direction.
    /// Positive is the right (front) side.
    #[inline(always)]
    pub fn cross(&self, p: IVec2) -> i64 {
        let dx = i64::from(p.x) - i64::from(self.x);
        let dy = i64::from(p.y) - i64::from(self.y);
        dx * i64::from(self.dy) - dy * i64::from(self.dx)
    }

    /// A point exactly on the partition is on the left.
    #[inline(always)]
    pub fn point_side(&self, p: IVec2) -> Side {
        if self.cross(p) > 0 {
            Side::Right
        } else {
            Side::Left
        }
    }

    #[inline]
    pub fn child_on(&self, side: Side) -> Child {
        self.child[side.index()]
    }
}

// ──────────────────────────────────────────────────────────────────────────
//                       Level – public helpers
// ──────────────────────────────────────────────────────────────────────────
impl Level {
    /// The BSP root: the last node, or subsector 0 when the map has no
    /// nodes at all.
    #[inline]
    pub fn root(&self) -> Child {
        match self.nodes.len() {
            0 => Child::Subsector(0),
            n => Child::Node((n - 1) as NodeId),
        }
    }

    /// Index of the root node, if there is one.
    pub fn root_node_id(&self) -> Option<NodeId> {
        match self.root() {
            Child::Node(id) => Some(id),
            Child::Subsector(_) => None,
        }
    }

    fn leaf(&self, id: SubsectorId) -> Result<SubsectorId, BspError> {
        if (id as usize) < self.subsectors.len() {
            Ok(id)
        } else {
            Err(BspError::BadSubsector(id))
        }
    }

    /// Side of node `node`'s partition that `p` lies on.
    pub fn point_side(&self, p: IVec2, node: NodeId) -> Result<Side, BspError> {
        self.nodes
            .get(node as usize)
            .map(|n| n.point_side(p))
            .ok_or(BspError::BadNode(node))
    }

    /// Walk the BSP from the root and return the subsector containing `p`.
    ///
    /// Each step visits a distinct node in a well-formed tree, so more than
    /// `nodes.len()` steps means the node array loops.
    pub fn locate_subsector(&self, p: IVec2) -> Result<SubsectorId, BspError> {
        let mut child = self.root();
        for _ in 0..=self.nodes.len() {
            match child {
                Child::Subsector(id) => return self.leaf(id),
                Child::Node(id) => {
                    let node = self.nodes.get(id as usize).ok_or(BspError::BadNode(id))?;
                    child = node.child_on(node.point_side(p));
                }
            }
        }
        Err(BspError::Cycle {
            steps: self.nodes.len(),
        })
    }

    /// Every subsector, nearest to `p` first.
    ///
    /// At each node the side containing `p` is visited before the other.
    pub fn subsectors_front_to_back(&self, p: IVec2) -> Result<Vec<SubsectorId>, BspError> {
        let mut out = Vec::with_capacity(self.subsectors.len());
        let mut stack = vec![self.root()];
        // every node is pushed at most once per parent in a tree
        let budget = 2 * self.nodes.len() + 1;
        let mut visited = 0usize;

        while let Some(child) = stack.pop() {
            visited += 1;
            if visited > budget {
                return Err(BspError::Cycle { steps: budget });
            }
            match child {
                Child::Subsector(id) => out.push(self.leaf(id)?),
                Child::Node(id) => {
                    let node = self.nodes.get(id as usize).ok_or(BspError::BadNode(id))?;
                    let near = node.point_side(p);
                    // far pushed first so near pops first
                    stack.push(node.child_on(near.opposite()));
                    stack.push(node.child_on(near));
                }
            }
        }
        Ok(out)
    }
}

// ──────────────────────────────────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use crate::world::geometry::{Aabb, Subsector};
    use glam::ivec2;

    const BOX: Aabb = Aabb {
        top: 0,
        bottom: 0,
        left: 0,
        right: 0,
    };

    fn node(x: i16, y: i16, dx: i16, dy: i16, right: Child, left: Child) -> Node {
        Node {
            x,
            y,
            dx,
            dy,
            bbox: [BOX; 2],
            child: [right, left],
        }
    }

    /// Four quadrants around the origin:
    ///
    /// ```text
    ///        ss1 │ ss0
    ///      ──────┼──────  y = 0   (node 0 splits the east half, node 1 the west)
    ///        ss3 │ ss2
    ///          x = 0  (root, node 2)
    /// ```
    fn quadrants() -> Level {
        let mut lvl = Level::new("TEST", MapConfig::default());
        // horizontal splitter pointing west: north is on its right
        lvl.add_node(node(
            0,
            0,
            -64,
            0,
            Child::Subsector(0),
            Child::Subsector(2),
        ));
        lvl.add_node(node(
            0,
            0,
            -64,
            0,
            Child::Subsector(1),
            Child::Subsector(3),
        ));
        // vertical splitter pointing north: east is on its right
        lvl.add_node(node(0, 0, 0, 64, Child::Node(0), Child::Node(1)));
        for _ in 0..4 {
            lvl.add_subsector(Subsector {
                seg_count: 0,
                first_seg: 0,
            });
        }
        lvl
    }

    #[test]
    fn point_side_sign() {
        let n = node(0, 0, 0, 64, Child::Subsector(0), Child::Subsector(1));
        assert_eq!(n.point_side(ivec2(10, 5)), Side::Right);
        assert_eq!(n.point_side(ivec2(-10, 5)), Side::Left);
    }

    #[test]
    fn point_side_is_antisymmetric() {
        let n = node(100, -50, 37, 91, Child::Subsector(0), Child::Subsector(1));
        for p in [ivec2(0, 0), ivec2(500, 20), ivec2(-300, 999), ivec2(137, 41)] {
            // mirror p through the partition origin
            let mirrored = ivec2(2 * 100 - p.x, 2 * -50 - p.y);
            assert_eq!(n.cross(p), -n.cross(mirrored));
            if n.cross(p) != 0 {
                assert_eq!(n.point_side(p), n.point_side(mirrored).opposite());
            }
        }
    }

    #[test]
    fn point_on_line_is_left_and_stable() {
        let n = node(10, 10, 20, 20, Child::Subsector(0), Child::Subsector(1));
        for t in -3..=3 {
            let p = ivec2(10 + 20 * t, 10 + 20 * t);
            assert_eq!(n.cross(p), 0);
            assert_eq!(n.point_side(p), Side::Left);
        }
    }

    #[test]
    fn extreme_coordinates_do_not_overflow() {
        let n = node(i16::MIN, i16::MIN, i16::MAX, i16::MIN, Child::Subsector(0), Child::Subsector(1));
        let p = ivec2(i16::MAX.into(), i16::MAX.into());
        // would overflow i32
        assert!(n.cross(p).abs() > i64::from(i32::MAX));
    }

    #[test]
    fn root_is_last_node() {
        let lvl = quadrants();
        assert_eq!(lvl.root(), Child::Node(2));
        assert_eq!(lvl.root_node_id(), Some(2));
    }

    #[test]
    fn no_nodes_means_single_subsector() {
        let mut lvl = Level::new("TINY", MapConfig::default());
        lvl.add_subsector(Subsector {
            seg_count: 0,
            first_seg: 0,
        });
        assert_eq!(lvl.root(), Child::Subsector(0));
        assert_eq!(lvl.root_node_id(), None);
        assert_eq!(lvl.locate_subsector(ivec2(5, 5)), Ok(0));
        assert_eq!(lvl.subsectors_front_to_back(ivec2(5, 5)), Ok(vec![0]));
    }

    #[test]
    fn empty_level_has_no_leaf() {
        let lvl = Level::new("EMPTY", MapConfig::default());
        assert_eq!(lvl.root(), Child::Subsector(0));
        assert_eq!(
            lvl.locate_subsector(ivec2(5, 5)),
            Err(BspError::BadSubsector(0))
        );
        assert_eq!(
            lvl.subsectors_front_to_back(ivec2(5, 5)),
            Err(BspError::BadSubsector(0))
        );
    }

    #[test]
    fn dangling_leaf_is_reported() {
        let mut lvl = quadrants();
        lvl.nodes[0].child[0] = Child::Subsector(9);
        assert_eq!(
            lvl.locate_subsector(ivec2(10, 10)),
            Err(BspError::BadSubsector(9))
        );
        assert_eq!(lvl.locate_subsector(ivec2(10, -10)), Ok(2));
    }

    #[test]
    fn locate_each_quadrant() {
        let lvl = quadrants();
        assert_eq!(lvl.locate_subsector(ivec2(10, 10)), Ok(0));
        assert_eq!(lvl.locate_subsector(ivec2(-10, 10)), Ok(1));
        assert_eq!(lvl.locate_subsector(ivec2(10, -10)), Ok(2));
        assert_eq!(lvl.locate_subsector(ivec2(-10, -10)), Ok(3));
    }

    #[test]
    fn point_side_by_id() {
        let lvl = quadrants();
        assert_eq!(lvl.point_side(ivec2(10, 0), 2), Ok(Side::Right));
        assert_eq!(lvl.point_side(ivec2(0, 0), 9), Err(BspError::BadNode(9)));
    }

    #[test]
    fn walk_terminates_within_node_count() {
        let lvl = quadrants();
        for x in (-100..=100).step_by(25) {
            for y in (-100..=100).step_by(25) {
                let ss = lvl.locate_subsector(ivec2(x, y)).unwrap();
                assert!((ss as usize) < lvl.subsectors().len());
            }
        }
    }

    #[test]
    fn front_to_back_orders_by_nearness() {
        let lvl = quadrants();
        let order = lvl.subsectors_front_to_back(ivec2(-10, -10)).unwrap();
        assert_eq!(order.len(), 4);
        assert_eq!(order[0], 3);
        // west half before east half
        assert_eq!(&order[..2], &[3, 1]);
        assert_eq!(&order[2..], &[2, 0]);
    }

    #[test]
    fn looping_tree_is_reported() {
        let mut lvl = Level::new("LOOP", MapConfig::default());
        lvl.add_node(node(0, 0, 0, 64, Child::Node(1), Child::Node(1)));
        lvl.add_node(node(0, 0, 0, 64, Child::Node(0), Child::Node(0)));
        assert_eq!(
            lvl.locate_subsector(ivec2(1, 1)),
            Err(BspError::Cycle { steps: 2 })
        );
        assert!(matches!(
            lvl.subsectors_front_to_back(ivec2(1, 1)),
            Err(BspError::Cycle { .. })
        ));
    }

    #[test]
    fn dangling_child_is_reported() {
        let mut lvl = Level::new("BAD", MapConfig::default());
        lvl.add_node(node(0, 0, 0, 64, Child::Node(7), Child::Subsector(0)));
        assert_eq!(lvl.locate_subsector(ivec2(1, 1)), Err(BspError::BadNode(7)));
    }
}
