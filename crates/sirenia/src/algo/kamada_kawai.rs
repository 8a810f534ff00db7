//! Kamada-Kawai spring layout.
//!
//! Every vertex pair is joined by a spring whose rest length grows with the graph distance
//! `d_ij` and whose stiffness falls with `d_ij^2`. The energy
//!
//! ```text
//! E = sum_{i<j} 1/2 * k_ij * (|p_i - p_j| - l_ij)^2
//! ```
//!
//! is lowered one vertex at a time: the free vertex with the steepest gradient is moved by
//! Newton steps on its 2x2 Hessian until its gradient drops below `epsilon`.

use crate::algo::{LayoutStats, initial_positions};
use crate::error::{Error, Result};
use crate::geometry::{Box2D, Point};
use crate::model::LayoutModel;
use nalgebra as na;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sirenia_graphlib::{Graph, alg};
use tracing::{debug, trace};

/// Pairs closer than this are skipped when summing derivatives.
const COINCIDENT: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KamadaKawaiOptions {
    /// Spring constant `K` in `k_ij = K / d_ij^2`.
    pub stiffness: f64,
    /// Gradient norm at which a vertex counts as settled.
    pub epsilon: f64,
    /// Fraction of the area's smaller side used by the longest graph distance.
    pub length_factor: f64,
    pub max_iterations: usize,
    /// Newton steps per selected vertex.
    pub max_inner_iterations: usize,
}

impl Default for KamadaKawaiOptions {
    fn default() -> Self {
        Self {
            stiffness: 1.0,
            epsilon: 0.01,
            length_factor: 0.9,
            max_iterations: 1000,
            max_inner_iterations: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KamadaKawaiLayout {
    options: KamadaKawaiOptions,
}

impl KamadaKawaiLayout {
    pub fn new(options: KamadaKawaiOptions) -> Result<Self> {
        for (name, value) in [
            ("stiffness", options.stiffness),
            ("epsilon", options.epsilon),
            ("length_factor", options.length_factor),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidOption { name, value });
            }
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &KamadaKawaiOptions {
        &self.options
    }

    /// Spring energy of the positions currently stored in `model`. Vertices without a position
    /// count as sitting at the area's min corner.
    pub fn energy<N, E, M>(&self, graph: &Graph<N, E>, model: &M) -> Result<f64>
    where
        M: LayoutModel + ?Sized,
    {
        let area = model.drawable_area();
        area.validate()?;
        let springs = Springs::new(graph, area, &self.options);
        let positions: Vec<Point> = graph
            .nodes()
            .map(|v| model.get(v).unwrap_or_else(|| area.min()))
            .collect();
        Ok(springs.energy(&positions))
    }

    pub fn layout<N, E, M, R>(
        &self,
        graph: &Graph<N, E>,
        model: &mut M,
        rng: &mut R,
    ) -> Result<LayoutStats>
    where
        M: LayoutModel + ?Sized,
        R: Rng + ?Sized,
    {
        let ids: Vec<&str> = graph.nodes().collect();
        if ids.is_empty() {
            debug!("kamada-kawai: empty graph");
            return Ok(LayoutStats::default());
        }
        let area = model.drawable_area();
        area.validate()?;

        let fixed: Vec<bool> = ids.iter().map(|v| model.is_fixed(v)).collect();
        let mut positions = initial_positions(&ids, &fixed, model, area, rng);
        let springs = Springs::new(graph, area, &self.options);
        debug!(
            vertices = ids.len(),
            edges = graph.edge_count(),
            unit_length = springs.unit_length,
            "kamada-kawai: start"
        );

        let eps = self.options.epsilon;
        let mut stats = LayoutStats::default();
        while stats.iterations < self.options.max_iterations {
            let Some((m, delta)) = (0..ids.len())
                .filter(|&i| !fixed[i])
                .map(|i| (i, springs.derivatives(&positions, i).gradient_norm()))
                .max_by(|a, b| a.1.total_cmp(&b.1))
            else {
                break;
            };
            if delta <= eps {
                break;
            }
            stats.iterations += 1;

            for _ in 0..self.options.max_inner_iterations {
                let d = springs.derivatives(&positions, m);
                if d.gradient_norm() <= eps {
                    break;
                }
                let Some(step) = d.newton_step() else {
                    trace!(vertex = ids[m], "kamada-kawai: singular hessian");
                    break;
                };
                positions[m] += step;
            }
        }

        if !fixed.iter().any(|&f| f) {
            let n = positions.len() as f64;
            let centroid = positions
                .iter()
                .fold(Point::ORIGIN, |acc, &p| acc + p)
                * (1.0 / n);
            let shift = area.center() - centroid;
            for p in &mut positions {
                *p += shift;
            }
        }

        for (i, v) in ids.iter().enumerate() {
            if !fixed[i] {
                model.put(v, area.clamp(positions[i]));
            }
        }
        debug!(
            iterations = stats.iterations,
            energy = springs.energy(&positions),
            "kamada-kawai: done"
        );
        Ok(stats)
    }
}

/// Rest lengths and stiffnesses of all pairs, row-major `n * n`.
struct Springs {
    n: usize,
    unit_length: f64,
    length: Vec<f64>,
    stiffness: Vec<f64>,
}

impl Springs {
    fn new<N, E>(graph: &Graph<N, E>, area: Box2D, opts: &KamadaKawaiOptions) -> Self {
        let hops = alg::shortest_path_lengths(graph);
        let n = hops.len();
        let max_finite = hops.iter().flatten().flatten().copied().max().unwrap_or(0);
        // Different components sit one hop further apart than the widest component.
        let disconnected = max_finite + 1;

        let mut dist = vec![0.0; n * n];
        let mut longest = 0usize;
        for (i, row) in hops.iter().enumerate() {
            for (j, h) in row.iter().enumerate() {
                let h = h.unwrap_or(disconnected);
                longest = longest.max(h);
                dist[i * n + j] = h as f64;
            }
        }

        let side = area.width().min(area.height());
        let unit_length = side * opts.length_factor / longest.max(1) as f64;
        let length = dist.iter().map(|d| unit_length * d).collect();
        let stiffness = dist
            .iter()
            .map(|&d| if d > 0.0 { opts.stiffness / (d * d) } else { 0.0 })
            .collect();
        Self {
            n,
            unit_length,
            length,
            stiffness,
        }
    }

    fn energy(&self, positions: &[Point]) -> f64 {
        let mut e = 0.0;
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                let ix = i * self.n + j;
                let stretch = positions[i].distance(positions[j]) - self.length[ix];
                e += 0.5 * self.stiffness[ix] * stretch * stretch;
            }
        }
        e
    }

    fn derivatives(&self, positions: &[Point], m: usize) -> Derivatives {
        let pm = positions[m];
        let mut out = Derivatives::default();
        for (i, &pi) in positions.iter().enumerate() {
            if i == m {
                continue;
            }
            let ix = m * self.n + i;
            let (k, l) = (self.stiffness[ix], self.length[ix]);
            let dx = pm.x - pi.x;
            let dy = pm.y - pi.y;
            let d = dx.hypot(dy);
            if d < COINCIDENT {
                continue;
            }
            let d3 = d * d * d;
            out.ex += k * (dx - l * dx / d);
            out.ey += k * (dy - l * dy / d);
            out.exx += k * (1.0 - l * dy * dy / d3);
            out.eyy += k * (1.0 - l * dx * dx / d3);
            out.exy += k * l * dx * dy / d3;
        }
        out
    }
}

/// Gradient and Hessian of the energy with respect to one vertex.
#[derive(Debug, Default, Clone, Copy)]
struct Derivatives {
    ex: f64,
    ey: f64,
    exx: f64,
    exy: f64,
    eyy: f64,
}

impl Derivatives {
    fn gradient_norm(&self) -> f64 {
        self.ex.hypot(self.ey)
    }

    /// Solves `H * step = -grad`; `None` when the Hessian is singular.
    fn newton_step(&self) -> Option<Point> {
        let hessian = na::Matrix2::new(self.exx, self.exy, self.exy, self.eyy);
        let gradient = na::Vector2::new(self.ex, self.ey);
        let step = -(hessian.try_inverse()? * gradient);
        (step.x.is_finite() && step.y.is_finite()).then(|| Point::new(step.x, step.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newton_step_matches_closed_form() {
        let d = Derivatives {
            ex: 1.0,
            ey: -2.0,
            exx: 3.0,
            exy: 0.5,
            eyy: 2.0,
        };
        let det = d.exx * d.eyy - d.exy * d.exy;
        let expected = Point::new(
            (d.exy * d.ey - d.eyy * d.ex) / det,
            (d.exy * d.ex - d.exx * d.ey) / det,
        );
        let step = d.newton_step().unwrap();
        assert!(step.approx_eq(expected, 1e-12));
    }

    #[test]
    fn singular_hessian_has_no_step() {
        let d = Derivatives {
            ex: 1.0,
            ey: 1.0,
            exx: 1.0,
            exy: 1.0,
            eyy: 1.0,
        };
        assert!(d.newton_step().is_none());
    }

    #[test]
    fn rest_lengths_scale_with_hops() {
        let mut g: Graph = Graph::undirected();
        g.set_path(&["a", "b", "c"]);
        let opts = KamadaKawaiOptions::default();
        let springs = Springs::new(&g, Box2D::of_size(10.0, 20.0), &opts);
        assert!((springs.unit_length - 4.5).abs() < 1e-12);
        assert!((springs.length[2] - 9.0).abs() < 1e-12);
        assert!((springs.stiffness[2] - 0.25).abs() < 1e-12);
        assert_eq!(springs.stiffness[0], 0.0);
    }
}
