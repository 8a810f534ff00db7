pub mod circular;
pub mod fr;
pub mod kamada_kawai;
pub mod random;

use crate::geometry::{Box2D, Point};
use crate::model::LayoutModel;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub use circular::{CircularLayout, CircularOptions};
pub use fr::{FrLayout, FrOptions, RepulsionStrategy};
pub use kamada_kawai::{KamadaKawaiLayout, KamadaKawaiOptions};
pub use random::RandomLayout;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Algorithm {
    /// Uniform scatter over the drawable area.
    Random,
    /// Vertices evenly spaced on a circle around the area's center.
    Circular(CircularOptions),
    /// Fruchterman-Reingold spring embedder, Barnes-Hut accelerated by default.
    FruchtermanReingold(FrOptions),
    /// Kamada-Kawai stress minimization over graph distances.
    KamadaKawai(KamadaKawaiOptions),
}

impl Default for Algorithm {
    fn default() -> Self {
        Self::FruchtermanReingold(FrOptions::default())
    }
}

/// Bookkeeping returned by a layout run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutStats {
    pub iterations: usize,
    /// Pairwise repulsion evaluations that were computed.
    pub performed_comparisons: u64,
    /// Pairwise repulsion evaluations avoided through the spatial index.
    pub saved_comparisons: u64,
}

/// Starting positions for `ids`, in the same order.
///
/// Fixed vertices keep their stored position. Free vertices take the model's initializer,
/// clamped into `area`, or the area's min corner when it has no opinion. Without an initializer
/// free vertices are scattered uniformly using `rng`.
pub(crate) fn initial_positions<M, R>(
    ids: &[&str],
    fixed: &[bool],
    model: &M,
    area: Box2D,
    rng: &mut R,
) -> Vec<Point>
where
    M: LayoutModel + ?Sized,
    R: Rng + ?Sized,
{
    let initializer = model.initializer();
    ids.iter()
        .zip(fixed)
        .map(|(&v, &is_fixed)| {
            if is_fixed {
                return model.get(v).unwrap_or_else(|| area.min());
            }
            match initializer {
                Some(init) => area.clamp(init(v).unwrap_or_else(|| area.min())),
                None => random::random_point(area, rng),
            }
        })
        .collect()
}
