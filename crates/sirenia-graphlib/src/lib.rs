//! Graph container APIs used by `sirenia`.
//!
//! The layouts only need vertex/edge enumeration and adjacency, so this crate keeps a small,
//! insertion-ordered, string-keyed graph plus the hop-distance helper in [`alg`].

pub mod graph;

pub use graph::{EdgeKey, Graph, GraphOptions, alg};
