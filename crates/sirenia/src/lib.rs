#![forbid(unsafe_code)]

//! Headless force-directed graph layout.
//!
//! The centerpiece is a Fruchterman-Reingold driver whose all-pairs repulsion is approximated
//! with a Barnes-Hut walk over a quadtree rebuilt every iteration. Random, circular and
//! Kamada-Kawai layouts share the same position model and entry point.
//!
//! Randomness is always passed in by the caller, so a seeded RNG makes every run repeatable.

pub mod algo;
pub mod error;
pub mod geometry;
pub mod index;
pub mod model;

pub use algo::{
    Algorithm, CircularLayout, CircularOptions, FrLayout, FrOptions, KamadaKawaiLayout,
    KamadaKawaiOptions, LayoutStats, RandomLayout, RepulsionStrategy,
};
pub use error::{Error, Result};
pub use geometry::{Box2D, Point};
pub use index::QuadTree;
pub use model::{LayoutModel, ListenableLayoutModel, MapLayoutModel};
pub use sirenia_graphlib as graphlib;

use rand::Rng;
use sirenia_graphlib::Graph;

/// Headless layout entry point.
///
/// Reads the drawable area, fixed flags and initializer from `model` and writes the final
/// positions back into it.
pub fn layout<N, E, M, R>(
    graph: &Graph<N, E>,
    model: &mut M,
    algorithm: &Algorithm,
    rng: &mut R,
) -> Result<LayoutStats>
where
    M: LayoutModel + ?Sized,
    R: Rng + ?Sized,
{
    match algorithm {
        Algorithm::Random => {
            RandomLayout.layout(graph, model, rng)?;
            Ok(LayoutStats::default())
        }
        Algorithm::Circular(opts) => {
            CircularLayout::from_options(opts)?.layout(graph, model)?;
            Ok(LayoutStats::default())
        }
        Algorithm::FruchtermanReingold(opts) => {
            FrLayout::new(opts.clone())?.layout(graph, model, rng)
        }
        Algorithm::KamadaKawai(opts) => {
            KamadaKawaiLayout::new(opts.clone())?.layout(graph, model, rng)
        }
    }
}
