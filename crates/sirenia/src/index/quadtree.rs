//! Point-region quadtree with per-node aggregates.
//!
//! Nodes live in a flat arena owned by the tree and refer to their children by index. A node
//! starts as a leaf and turns into an internal node exactly once, when a second distinguishable
//! point arrives. Internal nodes keep the number of points below them and their centroid, both
//! maintained incrementally while inserting, so the Barnes-Hut walk never recomputes them.
//!
//! The tree is meant to be built, queried and dropped within one layout iteration. It has no
//! removal and no re-balancing.

use crate::error::{Error, Result};
use crate::geometry::{Box2D, Point};

/// Depth at which leaves stop splitting and stack further points instead.
///
/// Two points this close are indistinguishable for force evaluation, and the cap keeps
/// insertion finite for values that differ only in the last few bits.
pub const MAX_DEPTH: u32 = 64;

const NW: usize = 0;
const NE: usize = 1;
const SW: usize = 2;
const SE: usize = 3;

#[derive(Debug, Clone)]
enum NodeKind {
    /// `multiplicity` copies of `point`, plus the distinct points that reached this leaf at
    /// `MAX_DEPTH`. `stacked` stays empty above that depth.
    Leaf {
        point: Option<Point>,
        multiplicity: usize,
        stacked: Vec<Point>,
    },
    Internal {
        children: [usize; 4],
        count: usize,
        centroid: Point,
    },
}

#[derive(Debug, Clone)]
struct Node {
    bounds: Box2D,
    depth: u32,
    kind: NodeKind,
}

impl Node {
    fn empty_leaf(bounds: Box2D, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            kind: NodeKind::Leaf {
                point: None,
                multiplicity: 0,
                stacked: Vec::new(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuadTree {
    region: Box2D,
    nodes: Vec<Node>,
    len: usize,
    depth: u32,
}

impl QuadTree {
    pub fn new(region: Box2D) -> Result<Self> {
        region.validate()?;
        Ok(Self {
            region,
            nodes: vec![Node::empty_leaf(region, 0)],
            len: 0,
            depth: 0,
        })
    }

    /// Builds a tree over `region` and inserts every point in order.
    pub fn from_points(region: Box2D, points: impl IntoIterator<Item = Point>) -> Result<Self> {
        let mut tree = Self::new(region)?;
        for p in points {
            tree.insert(p)?;
        }
        Ok(tree)
    }

    pub fn region(&self) -> Box2D {
        self.region
    }

    /// Number of inserted points, duplicates included.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Depth of the deepest node; a tree that never split has depth 0.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of arena nodes, internal and leaf.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            index: 0,
        }
    }

    /// Inserts `p`, splitting leaves along the way.
    ///
    /// Points outside the region are rejected before anything is touched, so a failed insert
    /// leaves the tree exactly as it was.
    pub fn insert(&mut self, p: Point) -> Result<()> {
        if !p.is_finite() || !self.region.contains(p) {
            return Err(Error::PointOutsideRegion { x: p.x, y: p.y });
        }

        let mut ix = 0usize;
        loop {
            let (bounds, depth) = (self.nodes[ix].bounds, self.nodes[ix].depth);
            match &mut self.nodes[ix].kind {
                NodeKind::Leaf {
                    point: point @ None,
                    multiplicity,
                    ..
                } => {
                    *point = Some(p);
                    *multiplicity = 1;
                    break;
                }
                NodeKind::Leaf {
                    point: Some(q),
                    multiplicity,
                    ..
                } if *q == p => {
                    *multiplicity += 1;
                    break;
                }
                NodeKind::Leaf { stacked, .. } if depth >= MAX_DEPTH => {
                    stacked.push(p);
                    break;
                }
                NodeKind::Leaf { .. } => self.split(ix),
                NodeKind::Internal {
                    children,
                    count,
                    centroid,
                } => {
                    let old = *count as f64;
                    *count += 1;
                    *centroid = (*centroid * old + p) * (1.0 / *count as f64);
                    ix = children[quadrant_of(&bounds, p)];
                }
            }
        }

        self.len += 1;
        Ok(())
    }

    /// Converts the occupied leaf at `ix` into an internal node and moves its point down.
    fn split(&mut self, ix: usize) {
        let (bounds, depth) = (self.nodes[ix].bounds, self.nodes[ix].depth);
        let NodeKind::Leaf {
            point: Some(q),
            multiplicity,
            ..
        } = self.nodes[ix].kind
        else {
            return;
        };

        let first = self.nodes.len();
        let children = [first, first + 1, first + 2, first + 3];
        for quadrant in bounds.quadrants() {
            self.nodes.push(Node::empty_leaf(quadrant, depth + 1));
        }
        self.nodes[children[quadrant_of(&bounds, q)]].kind = NodeKind::Leaf {
            point: Some(q),
            multiplicity,
            stacked: Vec::new(),
        };
        self.nodes[ix].kind = NodeKind::Internal {
            children,
            count: multiplicity,
            centroid: q,
        };
        self.depth = self.depth.max(depth + 1);
    }
}

/// Child slot for a point inside `bounds`.
///
/// Sibling boxes share their edges, so a point on the split line belongs to several of them; it
/// goes to the first one in NW, NE, SW, SE order, i.e. west and north win ties. The comparison is
/// against the same center the quadrants are cut at, so the chosen child always contains `p`.
fn quadrant_of(bounds: &Box2D, p: Point) -> usize {
    let mid = bounds.center();
    match (p.y >= mid.y, p.x <= mid.x) {
        (true, true) => NW,
        (true, false) => NE,
        (false, true) => SW,
        (false, false) => SE,
    }
}

/// Borrowed view of one node of a [`QuadTree`].
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a QuadTree,
    index: usize,
}

impl<'a> NodeRef<'a> {
    fn node(&self) -> &'a Node {
        &self.tree.nodes[self.index]
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.node().kind, NodeKind::Leaf { .. })
    }

    pub fn bounds(&self) -> Box2D {
        self.node().bounds
    }

    pub fn depth(&self) -> u32 {
        self.node().depth
    }

    /// Number of points in the subtree. O(1) for both node kinds.
    pub fn count(&self) -> usize {
        match &self.node().kind {
            NodeKind::Leaf {
                multiplicity,
                stacked,
                ..
            } => multiplicity + stacked.len(),
            NodeKind::Internal { count, .. } => *count,
        }
    }

    pub fn has_points(&self) -> bool {
        self.count() > 0
    }

    /// The point stored in a leaf. `None` for empty leaves and internal nodes.
    pub fn point(&self) -> Option<Point> {
        match self.node().kind {
            NodeKind::Leaf { point, .. } => point,
            NodeKind::Internal { .. } => None,
        }
    }

    /// Count-weighted mean of the subtree's points, `None` for an empty leaf.
    pub fn centroid(&self) -> Option<Point> {
        match &self.node().kind {
            NodeKind::Leaf {
                point,
                multiplicity,
                stacked,
            } => point.map(|q| {
                if stacked.is_empty() {
                    return q;
                }
                // Offsets from `q` keep plain duplicates exact.
                let offset = stacked.iter().fold(Point::ORIGIN, |acc, &s| acc + (s - q));
                q + offset * (1.0 / (multiplicity + stacked.len()) as f64)
            }),
            NodeKind::Internal { centroid, .. } => Some(*centroid),
        }
    }

    /// Children in NW, NE, SW, SE order, or `None` for a leaf.
    pub fn children(&self) -> Option<[NodeRef<'a>; 4]> {
        match self.node().kind {
            NodeKind::Leaf { .. } => None,
            NodeKind::Internal { children, .. } => Some(children.map(|index| NodeRef {
                tree: self.tree,
                index,
            })),
        }
    }

    /// Every point in the subtree, duplicates repeated. Allocates; meant for diagnostics and
    /// tests rather than the force loop.
    pub fn points(&self) -> Vec<Point> {
        let mut out = Vec::with_capacity(self.count());
        let mut stack = vec![*self];
        while let Some(n) = stack.pop() {
            match &n.node().kind {
                NodeKind::Leaf {
                    point: Some(p),
                    multiplicity,
                    stacked,
                } => {
                    out.extend(std::iter::repeat_n(*p, *multiplicity));
                    out.extend_from_slice(stacked);
                }
                NodeKind::Leaf { point: None, .. } => {}
                NodeKind::Internal { .. } => {
                    if let Some(children) = n.children() {
                        stack.extend(children.into_iter().rev());
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_point_splits_the_root() {
        let mut t = QuadTree::new(Box2D::of_size(4.0, 4.0)).unwrap();
        t.insert(Point::new(1.0, 3.0)).unwrap();
        assert!(t.root().is_leaf());
        t.insert(Point::new(3.0, 1.0)).unwrap();

        let root = t.root();
        assert!(!root.is_leaf());
        assert_eq!(root.count(), 2);
        assert_eq!(root.centroid(), Some(Point::new(2.0, 2.0)));
        let [nw, ne, sw, se] = root.children().unwrap();
        assert_eq!(nw.point(), Some(Point::new(1.0, 3.0)));
        assert_eq!(se.point(), Some(Point::new(3.0, 1.0)));
        assert!(!ne.has_points());
        assert!(!sw.has_points());
        assert_eq!(t.depth(), 1);
    }

    #[test]
    fn split_line_ties_go_west_and_north() {
        let b = Box2D::of_size(2.0, 2.0);
        assert_eq!(quadrant_of(&b, Point::new(1.0, 1.0)), NW);
        assert_eq!(quadrant_of(&b, Point::new(1.5, 1.0)), NE);
        assert_eq!(quadrant_of(&b, Point::new(1.0, 0.5)), SW);
        assert_eq!(quadrant_of(&b, Point::new(2.0, 0.0)), SE);
    }

    #[test]
    fn empty_leaf_has_no_centroid() {
        let t = QuadTree::new(Box2D::of_size(1.0, 1.0)).unwrap();
        assert_eq!(t.root().centroid(), None);
        assert_eq!(t.root().count(), 0);
        assert!(t.root().points().is_empty());
    }

    #[test]
    fn near_duplicates_stop_splitting_at_max_depth() {
        let mut t = QuadTree::new(Box2D::of_size(1.0, 1.0)).unwrap();
        let a = Point::new(0.3, 0.3);
        let b = Point::new(f64::from_bits(0.3f64.to_bits() + 1), 0.3);
        t.insert(a).unwrap();
        t.insert(b).unwrap();
        assert_eq!(t.root().count(), 2);
        assert!(t.depth() <= MAX_DEPTH);
    }

    #[test]
    fn distinct_points_at_max_depth_are_kept_verbatim() {
        let mut t = QuadTree::new(Box2D::of_size(1.0, 1.0)).unwrap();
        let a = Point::new(1e-20, 0.0);
        let b = Point::new(2e-20, 0.0);
        t.insert(a).unwrap();
        t.insert(b).unwrap();
        t.insert(b).unwrap();
        assert_eq!(t.depth(), MAX_DEPTH);

        let mut node = t.root();
        while let Some(children) = node.children() {
            node = children.into_iter().find(|c| c.has_points()).unwrap();
        }
        assert_eq!(node.depth(), MAX_DEPTH);
        assert_eq!(node.count(), 3);
        assert_eq!(node.point(), Some(a));
        let mut points = node.points();
        points.sort_by(|p, q| p.x.total_cmp(&q.x));
        assert_eq!(points, vec![a, b, b]);
        let expected = Point::new(5e-20 / 3.0, 0.0);
        assert!(node.centroid().unwrap().approx_eq(expected, 1e-30));
        assert!(t.root().centroid().unwrap().approx_eq(expected, 1e-30));
    }
}
