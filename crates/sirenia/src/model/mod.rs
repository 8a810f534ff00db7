//! Vertex position stores consumed and updated by the layouts.
//!
//! A layout reads the drawable area, the fixed flags and the optional initializer from the
//! model, works on its own position vector, and writes the final positions back with
//! [`LayoutModel::put`]. Fixed vertices are protected by the model itself: `put` on a fixed
//! vertex is a no-op that reports the current position.

use crate::geometry::{Box2D, Point};
use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashSet};

mod listenable;

pub use listenable::{ListenableLayoutModel, Listener, ListenerId};

/// Supplies starting positions; `None` means "no opinion" and the layout picks a default.
pub type Initializer = Box<dyn Fn(&str) -> Option<Point> + Send + Sync>;

pub trait LayoutModel {
    fn drawable_area(&self) -> Box2D;

    fn set_drawable_area(&mut self, area: Box2D);

    fn get(&self, v: &str) -> Option<Point>;

    /// Stores `p` for `v` and returns the previous position. Fixed vertices keep their position
    /// and the current value is returned instead.
    fn put(&mut self, v: &str, p: Point) -> Option<Point>;

    fn is_fixed(&self, v: &str) -> bool;

    fn set_fixed(&mut self, v: &str, fixed: bool);

    fn initializer(&self) -> Option<&Initializer>;

    /// Snapshot of every stored position in insertion order.
    fn collect(&self) -> IndexMap<String, Point>;
}

pub struct MapLayoutModel {
    area: Box2D,
    positions: IndexMap<String, Point, FxBuildHasher>,
    fixed: FxHashSet<String>,
    initializer: Option<Initializer>,
}

impl std::fmt::Debug for MapLayoutModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapLayoutModel")
            .field("area", &self.area)
            .field("positions", &self.positions)
            .field("fixed", &self.fixed)
            .field("initializer", &self.initializer.is_some())
            .finish()
    }
}

impl MapLayoutModel {
    pub fn new(area: Box2D) -> Self {
        Self {
            area,
            positions: IndexMap::default(),
            fixed: FxHashSet::default(),
            initializer: None,
        }
    }

    pub fn with_initializer(
        mut self,
        initializer: impl Fn(&str) -> Option<Point> + Send + Sync + 'static,
    ) -> Self {
        self.initializer = Some(Box::new(initializer));
        self
    }

    /// Uses `positions` as the initializer. Ids that are not vertices of the laid-out graph
    /// are never asked for and are therefore ignored.
    pub fn with_initial_positions<I, S>(self, positions: I) -> Self
    where
        I: IntoIterator<Item = (S, Point)>,
        S: Into<String>,
    {
        let map: IndexMap<String, Point, FxBuildHasher> = positions
            .into_iter()
            .map(|(id, p)| (id.into(), p))
            .collect();
        self.with_initializer(move |v| map.get(v).copied())
    }

    pub fn clear_initializer(&mut self) {
        self.initializer = None;
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl LayoutModel for MapLayoutModel {
    fn drawable_area(&self) -> Box2D {
        self.area
    }

    fn set_drawable_area(&mut self, area: Box2D) {
        self.area = area;
    }

    fn get(&self, v: &str) -> Option<Point> {
        self.positions.get(v).copied()
    }

    fn put(&mut self, v: &str, p: Point) -> Option<Point> {
        if self.fixed.contains(v) {
            return self.get(v);
        }
        match self.positions.get_mut(v) {
            Some(slot) => Some(std::mem::replace(slot, p)),
            None => self.positions.insert(v.to_string(), p),
        }
    }

    fn is_fixed(&self, v: &str) -> bool {
        self.fixed.contains(v)
    }

    fn set_fixed(&mut self, v: &str, fixed: bool) {
        if fixed {
            self.fixed.insert(v.to_string());
        } else {
            self.fixed.remove(v);
        }
    }

    fn initializer(&self) -> Option<&Initializer> {
        self.initializer.as_ref()
    }

    fn collect(&self) -> IndexMap<String, Point> {
        self.positions
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_returns_the_previous_position() {
        let mut m = MapLayoutModel::new(Box2D::of_size(10.0, 10.0));
        assert_eq!(m.put("a", Point::new(1.0, 1.0)), None);
        assert_eq!(m.put("a", Point::new(2.0, 2.0)), Some(Point::new(1.0, 1.0)));
        assert_eq!(m.get("a"), Some(Point::new(2.0, 2.0)));
    }

    #[test]
    fn fixed_vertices_ignore_put() {
        let mut m = MapLayoutModel::new(Box2D::of_size(10.0, 10.0));
        m.put("a", Point::new(1.0, 1.0));
        m.set_fixed("a", true);
        assert_eq!(m.put("a", Point::new(5.0, 5.0)), Some(Point::new(1.0, 1.0)));
        assert_eq!(m.get("a"), Some(Point::new(1.0, 1.0)));

        m.set_fixed("a", false);
        m.put("a", Point::new(5.0, 5.0));
        assert_eq!(m.get("a"), Some(Point::new(5.0, 5.0)));
    }
}
