use super::{Initializer, LayoutModel};
use crate::geometry::{Box2D, Point};
use indexmap::IndexMap;

pub type Listener = Box<dyn FnMut(&str, Point) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Wraps a model and reports every committed move to registered listeners.
///
/// Only `put` calls that actually change a vertex are reported; writes to fixed vertices are
/// dropped by the inner model and stay silent.
pub struct ListenableLayoutModel<M> {
    inner: M,
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl<M: std::fmt::Debug> std::fmt::Debug for ListenableLayoutModel<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenableLayoutModel")
            .field("inner", &self.inner)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<M: LayoutModel> ListenableLayoutModel<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn add_listener(
        &mut self,
        listener: impl FnMut(&str, Point) + Send + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn into_inner(self) -> M {
        self.inner
    }
}

impl<M: LayoutModel> LayoutModel for ListenableLayoutModel<M> {
    fn drawable_area(&self) -> Box2D {
        self.inner.drawable_area()
    }

    fn set_drawable_area(&mut self, area: Box2D) {
        self.inner.set_drawable_area(area);
    }

    fn get(&self, v: &str) -> Option<Point> {
        self.inner.get(v)
    }

    fn put(&mut self, v: &str, p: Point) -> Option<Point> {
        if self.inner.is_fixed(v) {
            return self.inner.get(v);
        }
        let previous = self.inner.put(v, p);
        for (_, listener) in &mut self.listeners {
            listener(v, p);
        }
        previous
    }

    fn is_fixed(&self, v: &str) -> bool {
        self.inner.is_fixed(v)
    }

    fn set_fixed(&mut self, v: &str, fixed: bool) {
        self.inner.set_fixed(v, fixed);
    }

    fn initializer(&self) -> Option<&Initializer> {
        self.inner.initializer()
    }

    fn collect(&self) -> IndexMap<String, Point> {
        self.inner.collect()
    }
}
