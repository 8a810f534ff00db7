use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::model::LayoutModel;
use serde::{Deserialize, Serialize};
use sirenia_graphlib::Graph;
use std::cmp::Ordering;
use std::f64::consts::TAU;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CircularOptions {
    /// Circle radius. Defaults to half of the drawable area's smaller side.
    pub radius: Option<f64>,
}

type VertexOrder = Box<dyn Fn(&str, &str) -> Ordering + Send + Sync>;

/// Places vertices evenly on a circle centred in the drawable area.
///
/// Vertex `i` of `n` goes to angle `2 * pi * i / n`, counter-clockwise from the positive x axis,
/// in graph enumeration order unless a comparator is given.
pub struct CircularLayout {
    radius: Option<f64>,
    order: Option<VertexOrder>,
}

impl std::fmt::Debug for CircularLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircularLayout")
            .field("radius", &self.radius)
            .field("ordered", &self.order.is_some())
            .finish()
    }
}

impl CircularLayout {
    pub fn new(radius: f64) -> Result<Self> {
        Self::from_options(&CircularOptions {
            radius: Some(radius),
        })
    }

    pub fn from_options(options: &CircularOptions) -> Result<Self> {
        if let Some(r) = options.radius {
            if !(r.is_finite() && r > 0.0) {
                return Err(Error::InvalidOption {
                    name: "radius",
                    value: r,
                });
            }
        }
        Ok(Self {
            radius: options.radius,
            order: None,
        })
    }

    pub fn with_order(
        mut self,
        order: impl Fn(&str, &str) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        self.order = Some(Box::new(order));
        self
    }

    pub fn layout<N, E, M>(&self, graph: &Graph<N, E>, model: &mut M) -> Result<()>
    where
        M: LayoutModel + ?Sized,
    {
        let area = model.drawable_area();
        area.validate()?;
        let radius = self
            .radius
            .unwrap_or_else(|| area.width().min(area.height()) / 2.0);

        let mut ids: Vec<&str> = graph.nodes().collect();
        if let Some(order) = &self.order {
            ids.sort_by(|a, b| order(*a, *b));
        }
        debug!(vertices = ids.len(), radius, "circular layout");

        let center = area.center();
        let n = ids.len() as f64;
        for (i, v) in ids.iter().enumerate() {
            let angle = TAU * i as f64 / n;
            let p = center + Point::new(angle.cos(), angle.sin()) * radius;
            model.put(v, p);
        }
        Ok(())
    }
}
