//! Fruchterman-Reingold force-directed layout.
//!
//! Each iteration snapshots the current positions, indexes them in a [`QuadTree`], computes a
//! displacement for every free vertex from that snapshot only, and then applies all moves at
//! once. Repulsion follows `k^2 / d` and attraction along edges follows `d^2 / k`, where `k` is
//! the optimal distance. Moves are capped by the temperature of the cooling schedule and clamped
//! into the drawable area.

use crate::algo::{LayoutStats, initial_positions};
use crate::error::{Error, Result};
use crate::geometry::{Box2D, Point};
use crate::index::QuadTree;
use crate::model::LayoutModel;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sirenia_graphlib::Graph;
use tracing::{debug, trace};

mod barnes_hut;
mod temperature;

pub use barnes_hut::{BarnesHut, DEFAULT_TOLERANCE, Repulsion};
pub use temperature::{InverseLinearTemperature, TemperatureModel};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RepulsionStrategy {
    /// All-pairs reference evaluation, O(n^2) per iteration.
    Exact,
    /// Quadtree walk with the Barnes-Hut acceptance threshold `theta` in `[0, 1]`.
    BarnesHut { theta: f64 },
}

impl Default for RepulsionStrategy {
    fn default() -> Self {
        Self::BarnesHut { theta: 0.5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrOptions {
    pub iterations: usize,
    /// Scales the derived optimal distance `sqrt(area / n)`.
    pub normalization_factor: f64,
    /// Overrides the derived optimal distance when set.
    pub optimal_distance: Option<f64>,
    pub repulsion: RepulsionStrategy,
    /// Separations below this are treated as coincident.
    pub tolerance: f64,
}

impl Default for FrOptions {
    fn default() -> Self {
        Self {
            iterations: 100,
            normalization_factor: 0.5,
            optimal_distance: None,
            repulsion: RepulsionStrategy::default(),
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl FrOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.normalization_factor.is_finite() && self.normalization_factor > 0.0) {
            return Err(Error::InvalidOption {
                name: "normalization_factor",
                value: self.normalization_factor,
            });
        }
        if let Some(k) = self.optimal_distance {
            if !(k.is_finite() && k > 0.0) {
                return Err(Error::InvalidOption {
                    name: "optimal_distance",
                    value: k,
                });
            }
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(Error::InvalidOption {
                name: "tolerance",
                value: self.tolerance,
            });
        }
        if let RepulsionStrategy::BarnesHut { theta } = self.repulsion {
            BarnesHut::new(theta)?;
        }
        Ok(())
    }
}

pub struct FrLayout {
    options: FrOptions,
    evaluator: Option<BarnesHut>,
    temperature: Box<dyn TemperatureModel + Send + Sync>,
    saved_comparisons: u64,
}

impl std::fmt::Debug for FrLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrLayout")
            .field("options", &self.options)
            .field("evaluator", &self.evaluator)
            .field("saved_comparisons", &self.saved_comparisons)
            .finish_non_exhaustive()
    }
}

impl FrLayout {
    pub fn new(options: FrOptions) -> Result<Self> {
        options.validate()?;
        let evaluator = match options.repulsion {
            RepulsionStrategy::Exact => None,
            RepulsionStrategy::BarnesHut { theta } => {
                Some(BarnesHut::new(theta)?.with_tolerance(options.tolerance))
            }
        };
        Ok(Self {
            options,
            evaluator,
            temperature: Box::new(InverseLinearTemperature),
            saved_comparisons: 0,
        })
    }

    pub fn with_temperature_model(
        mut self,
        model: impl TemperatureModel + Send + Sync + 'static,
    ) -> Self {
        self.temperature = Box::new(model);
        self
    }

    pub fn options(&self) -> &FrOptions {
        &self.options
    }

    /// Comparisons avoided by the spatial index during the last run.
    pub fn saved_comparisons(&self) -> u64 {
        self.saved_comparisons
    }

    /// `k` for `n` vertices in `area`.
    pub fn optimal_distance(&self, area: Box2D, n: usize) -> f64 {
        self.options.optimal_distance.unwrap_or_else(|| {
            let per_vertex = area.width() * area.height() / n.max(1) as f64;
            self.options.normalization_factor * per_vertex.sqrt()
        })
    }

    pub fn layout<N, E, M, R>(
        &mut self,
        graph: &Graph<N, E>,
        model: &mut M,
        rng: &mut R,
    ) -> Result<LayoutStats>
    where
        M: LayoutModel + ?Sized,
        R: Rng + ?Sized,
    {
        self.saved_comparisons = 0;
        let ids: Vec<&str> = graph.nodes().collect();
        let n = ids.len();
        if n == 0 || self.options.iterations == 0 {
            debug!(
                vertices = n,
                iterations = self.options.iterations,
                "fruchterman-reingold: nothing to do"
            );
            return Ok(LayoutStats::default());
        }

        let area = model.drawable_area();
        area.validate()?;
        let k = self.optimal_distance(area, n);
        let local = Box2D::of_size(area.width(), area.height());
        let origin = area.min();

        let fixed: Vec<bool> = ids.iter().map(|v| model.is_fixed(v)).collect();
        let adjacency: Vec<Vec<usize>> = ids
            .iter()
            .map(|v| {
                graph
                    .neighbors(v)
                    .into_iter()
                    .filter_map(|w| graph.node_position(w))
                    .collect()
            })
            .collect();
        let mut positions = initial_positions(&ids, &fixed, model, area, rng);

        debug!(
            vertices = n,
            edges = graph.edge_count(),
            fixed = fixed.iter().filter(|f| **f).count(),
            theta = self.evaluator.map(|e| e.theta()),
            optimal_distance = k,
            iterations = self.options.iterations,
            "fruchterman-reingold: start"
        );

        let mut stats = LayoutStats::default();
        for iteration in 0..self.options.iterations {
            let temperature = self
                .temperature
                .temperature(iteration, self.options.iterations, area);

            // Read phase: every force comes from this snapshot.
            let snapshot: Vec<Point> = positions
                .iter()
                .map(|&p| local.clamp(p - origin))
                .collect();
            let tree = match self.evaluator {
                Some(_) => Some(QuadTree::from_points(local, snapshot.iter().copied())?),
                None => None,
            };
            let pass = ForcePass {
                snapshot: &snapshot,
                fixed: &fixed,
                adjacency: &adjacency,
                tree: tree.as_ref(),
                evaluator: self.evaluator.as_ref(),
                k,
                tolerance: self.options.tolerance,
            };
            let forces = pass.run();

            // Write phase.
            let mut moved = 0.0;
            for (i, force) in forces.iter().enumerate() {
                stats.performed_comparisons += force.performed;
                stats.saved_comparisons += force.saved;
                if fixed[i] {
                    continue;
                }
                let len = force.displacement.length();
                if len <= self.options.tolerance || !len.is_finite() {
                    continue;
                }
                let step = len.min(temperature);
                positions[i] = area.clamp(positions[i] + force.displacement * (step / len));
                moved += step;
            }
            stats.iterations += 1;
            trace!(iteration, temperature, moved, "fruchterman-reingold: iteration");
        }

        for (i, v) in ids.iter().enumerate() {
            if !fixed[i] {
                model.put(v, positions[i]);
            }
        }

        self.saved_comparisons = stats.saved_comparisons;
        debug!(
            iterations = stats.iterations,
            performed = stats.performed_comparisons,
            saved = stats.saved_comparisons,
            "fruchterman-reingold: done"
        );
        Ok(stats)
    }
}

/// `k^2 / d`
pub fn repulsive_force(d: f64, k: f64) -> f64 {
    k * k / d
}

/// `d^2 / k`
pub fn attractive_force(d: f64, k: f64) -> f64 {
    d * d / k
}

/// Read-only state of one iteration.
struct ForcePass<'a> {
    snapshot: &'a [Point],
    fixed: &'a [bool],
    adjacency: &'a [Vec<usize>],
    tree: Option<&'a QuadTree>,
    evaluator: Option<&'a BarnesHut>,
    k: f64,
    tolerance: f64,
}

impl ForcePass<'_> {
    #[cfg(not(feature = "parallel"))]
    fn run(&self) -> Vec<Repulsion> {
        (0..self.snapshot.len()).map(|i| self.force_on(i)).collect()
    }

    #[cfg(feature = "parallel")]
    fn run(&self) -> Vec<Repulsion> {
        use rayon::prelude::*;
        (0..self.snapshot.len())
            .into_par_iter()
            .map(|i| self.force_on(i))
            .collect()
    }

    /// Net displacement of vertex `i`, with the comparison counts of its repulsion term.
    fn force_on(&self, i: usize) -> Repulsion {
        if self.fixed[i] {
            return Repulsion::default();
        }
        let v = self.snapshot[i];
        let k = self.k;

        let mut out = match (self.evaluator, self.tree) {
            (Some(bh), Some(tree)) => bh.evaluate(tree, v, |d| repulsive_force(d, k)),
            _ => self.exact_repulsion(i),
        };

        for &j in &self.adjacency[i] {
            let delta = v - self.snapshot[j];
            let d = delta.length();
            if d < self.tolerance {
                continue;
            }
            out.displacement += -delta * (attractive_force(d, k) / d);
        }
        out
    }

    fn exact_repulsion(&self, i: usize) -> Repulsion {
        let v = self.snapshot[i];
        let mut out = Repulsion::default();
        for (j, &u) in self.snapshot.iter().enumerate() {
            if j == i || v.approx_eq(u, self.tolerance) {
                continue;
            }
            let delta = v - u;
            let d = delta.length();
            out.displacement += delta * (repulsive_force(d, self.k) / d);
            out.performed += 1;
        }
        out
    }
}
