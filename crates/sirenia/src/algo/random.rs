use crate::error::Result;
use crate::geometry::{Box2D, Point};
use crate::model::LayoutModel;
use rand::Rng;
use sirenia_graphlib::Graph;
use tracing::debug;

/// Scatters every vertex uniformly over the drawable area.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomLayout;

impl RandomLayout {
    pub fn layout<N, E, M, R>(&self, graph: &Graph<N, E>, model: &mut M, rng: &mut R) -> Result<()>
    where
        M: LayoutModel + ?Sized,
        R: Rng + ?Sized,
    {
        let area = model.drawable_area();
        area.validate()?;
        debug!(vertices = graph.node_count(), "random layout");
        for v in graph.nodes() {
            let p = random_point(area, rng);
            model.put(v, p);
        }
        Ok(())
    }
}

pub(crate) fn random_point<R: Rng + ?Sized>(area: Box2D, rng: &mut R) -> Point {
    area.clamp(Point::new(
        area.min_x() + rng.random::<f64>() * area.width(),
        area.min_y() + rng.random::<f64>() * area.height(),
    ))
}
