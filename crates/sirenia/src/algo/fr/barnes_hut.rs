//! Barnes-Hut approximation of the all-pairs repulsion.
//!
//! The walk visits the [`QuadTree`] breadth-first. A subtree whose box looks small from the query
//! point (`width / distance < theta`) is replaced by a single source at its centroid, everything
//! else is opened. A box containing the query point is always opened, so the query never ends up
//! inside an aggregate. `theta = 0` never accepts a subtree and degenerates to the exact sum.

use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::index::{NodeRef, QuadTree};
use std::collections::VecDeque;

pub const DEFAULT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarnesHut {
    theta: f64,
    tolerance: f64,
}

/// Result of one query against the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Repulsion {
    pub displacement: Point,
    /// Pairwise force evaluations actually performed.
    pub performed: u64,
    /// Pairwise evaluations avoided by accepting or skipping whole subtrees.
    pub saved: u64,
}

impl BarnesHut {
    pub fn new(theta: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&theta) {
            return Err(Error::InvalidTheta { theta });
        }
        Ok(Self {
            theta,
            tolerance: DEFAULT_TOLERANCE,
        })
    }

    /// Distance below which two points are treated as the same point.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Sums the repulsion felt at `v` from every point in `tree`.
    ///
    /// `force` maps a separation to a force magnitude; each source contributes
    /// `delta * force(|delta|) / |delta|` with `delta = v - source`. `v` is expected to be one of
    /// the indexed points: a leaf at `v` is the query itself and is skipped.
    pub fn evaluate(&self, tree: &QuadTree, v: Point, force: impl Fn(f64) -> f64) -> Repulsion {
        let mut out = Repulsion::default();
        let mut queue: VecDeque<NodeRef<'_>> = VecDeque::new();
        queue.push_back(tree.root());

        while let Some(node) = queue.pop_front() {
            let count = node.count() as u64;
            let Some(children) = node.children() else {
                let Some(u) = node.centroid() else {
                    continue;
                };
                if v.approx_eq(u, self.tolerance) {
                    out.saved += count.saturating_sub(1);
                    continue;
                }
                // A leaf's points are indistinguishable from here: one evaluation, scaled.
                let delta = v - u;
                let d = delta.length();
                out.displacement += delta * (count as f64 * force(d) / d);
                out.performed += 1;
                out.saved += count - 1;
                continue;
            };

            let bounds = node.bounds();
            if !bounds.contains(v) {
                if let Some(centroid) = node.centroid() {
                    let delta = v - centroid;
                    let d = delta.length();
                    if d >= self.tolerance && bounds.width() / d < self.theta {
                        out.displacement += delta * (force(d) / d);
                        out.performed += 1;
                        out.saved += count - 1;
                        continue;
                    }
                }
            }
            queue.extend(children);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Box2D;

    #[test]
    fn theta_outside_unit_interval_is_rejected() {
        assert!(BarnesHut::new(0.0).is_ok());
        assert!(BarnesHut::new(1.0).is_ok());
        assert!(matches!(
            BarnesHut::new(1.5),
            Err(Error::InvalidTheta { theta }) if theta == 1.5
        ));
        assert!(BarnesHut::new(-0.1).is_err());
        assert!(BarnesHut::new(f64::NAN).is_err());
    }

    #[test]
    fn single_neighbour_pushes_away() {
        let tree = QuadTree::from_points(
            Box2D::of_size(10.0, 10.0),
            [Point::new(2.0, 5.0), Point::new(4.0, 5.0)],
        )
        .unwrap();
        let r = BarnesHut::new(0.5)
            .unwrap()
            .evaluate(&tree, Point::new(2.0, 5.0), |d| 1.0 / d);
        assert!((r.displacement.x + 0.5).abs() < 1e-12);
        assert_eq!(r.displacement.y, 0.0);
        assert_eq!(r.performed, 1);
        assert_eq!(r.saved, 0);
    }

    #[test]
    fn stacked_duplicates_count_once_per_copy() {
        let tree = QuadTree::from_points(
            Box2D::of_size(10.0, 10.0),
            [Point::new(1.0, 1.0), Point::new(3.0, 1.0), Point::new(3.0, 1.0)],
        )
        .unwrap();
        let r = BarnesHut::new(0.0)
            .unwrap()
            .evaluate(&tree, Point::new(1.0, 1.0), |_| 1.0);
        assert!((r.displacement.x + 2.0).abs() < 1e-12);
        assert_eq!(r.performed + r.saved, 2);
    }

    #[test]
    fn box_holding_the_query_is_never_accepted() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(99.0, 99.0),
            Point::new(99.5, 99.5),
            Point::new(99.0, 99.5),
        ];
        let tree = QuadTree::from_points(Box2D::of_size(100.0, 100.0), points).unwrap();
        let r = BarnesHut::new(1.0)
            .unwrap()
            .evaluate(&tree, points[0], |_| 1.0);
        assert_eq!(r.performed + r.saved, 3);
        // All three sources sit up and to the right, so the push is down and to the left.
        assert!(r.displacement.x < 0.0 && r.displacement.y < 0.0);
    }
}
