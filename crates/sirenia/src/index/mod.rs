//! Spatial indexing for approximate force evaluation.

mod quadtree;

pub use quadtree::{MAX_DEPTH, NodeRef, QuadTree};
