//! Graph container APIs used by `sirenia`.
//!
//! Nodes and edges keep insertion order, which is the order the layouts enumerate them in.
//! Undirected graphs store each edge once with canonicalized (`v <= w`) endpoints.

use rustc_hash::FxBuildHasher;
use std::cell::RefCell;

mod adj_cache;
pub mod alg;

use adj_cache::AdjCache;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

#[derive(Debug, Clone, Copy)]
pub struct GraphOptions {
    pub directed: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self { directed: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub v: String,
    pub w: String,
}

impl EdgeKey {
    pub fn new(v: impl Into<String>, w: impl Into<String>) -> Self {
        Self {
            v: v.into(),
            w: w.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct NodeEntry<N> {
    id: String,
    label: N,
}

#[derive(Debug, Clone)]
struct EdgeEntry<E> {
    key: EdgeKey,
    label: E,
}

#[derive(Debug)]
pub struct Graph<N = (), E = ()> {
    options: GraphOptions,

    nodes: Vec<NodeEntry<N>>,
    node_index: HashMap<String, usize>,

    edges: Vec<EdgeEntry<E>>,
    edge_index: HashMap<EdgeKey, usize>,

    // Neighbour queries are issued once per vertex by every layout run; keep a lazily rebuilt
    // CSR cache so they are O(deg) instead of O(E).
    adj_gen: u64,
    adj_cache: RefCell<Option<AdjCache>>,
}

impl<N, E> Default for Graph<N, E> {
    fn default() -> Self {
        Self::new(GraphOptions::default())
    }
}

impl<N, E> Graph<N, E> {
    pub fn new(options: GraphOptions) -> Self {
        Self {
            options,
            nodes: Vec::new(),
            node_index: HashMap::default(),
            edges: Vec::new(),
            edge_index: HashMap::default(),
            adj_gen: 0,
            adj_cache: RefCell::new(None),
        }
    }

    pub fn undirected() -> Self {
        Self::new(GraphOptions { directed: false })
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    pub fn is_directed(&self) -> bool {
        self.options.directed
    }

    fn invalidate_adj(&mut self) {
        self.adj_gen = self.adj_gen.wrapping_add(1);
        *self.adj_cache.get_mut() = None;
    }

    fn with_adj<R>(&self, f: impl FnOnce(&AdjCache) -> R) -> R {
        let mut cache = self.adj_cache.borrow_mut();
        if cache.as_ref().is_some_and(|c| c.generation != self.adj_gen) {
            *cache = None;
        }
        let cache = cache.get_or_insert_with(|| {
            let endpoints = self.edges.iter().filter_map(|e| {
                let v = *self.node_index.get(e.key.v.as_str())?;
                let w = *self.node_index.get(e.key.w.as_str())?;
                Some((v, w))
            });
            AdjCache::build(self.adj_gen, self.nodes.len(), endpoints)
        });
        f(cache)
    }

    fn canonicalize_endpoints(&self, v: String, w: String) -> (String, String) {
        if self.options.directed || v <= w {
            (v, w)
        } else {
            (w, v)
        }
    }

    fn lookup_key(&self, v: &str, w: &str) -> EdgeKey {
        let (v, w) = if self.options.directed || v <= w {
            (v, w)
        } else {
            (w, v)
        };
        EdgeKey::new(v, w)
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn set_node(&mut self, id: impl Into<String>, label: N) -> &mut Self {
        let id = id.into();
        if let Some(&idx) = self.node_index.get(&id) {
            self.nodes[idx].label = label;
            return self;
        }
        self.invalidate_adj();
        let idx = self.nodes.len();
        self.nodes.push(NodeEntry {
            id: id.clone(),
            label,
        });
        self.node_index.insert(id, idx);
        self
    }

    pub fn node(&self, id: &str) -> Option<&N> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx].label)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut N> {
        self.node_index
            .get(id)
            .copied()
            .map(move |idx| &mut self.nodes[idx].label)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    /// Position of `id` in node enumeration order.
    pub fn node_position(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeKey> {
        self.edges.iter().map(|e| &e.key)
    }

    pub fn for_each_edge<F>(&self, mut f: F)
    where
        F: FnMut(&EdgeKey, &E),
    {
        for e in &self.edges {
            f(&e.key, &e.label);
        }
    }

    pub fn has_edge(&self, v: &str, w: &str) -> bool {
        self.edge_index.contains_key(&self.lookup_key(v, w))
    }

    pub fn edge(&self, v: &str, w: &str) -> Option<&E> {
        let idx = *self.edge_index.get(&self.lookup_key(v, w))?;
        Some(&self.edges[idx].label)
    }

    pub fn edge_mut(&mut self, v: &str, w: &str) -> Option<&mut E> {
        let idx = *self.edge_index.get(&self.lookup_key(v, w))?;
        Some(&mut self.edges[idx].label)
    }

    fn remove_edge_at_index(&mut self, idx: usize) {
        self.invalidate_adj();
        let _ = self.edge_index.remove(&self.edges[idx].key);
        self.edges.remove(idx);
        for i in idx..self.edges.len() {
            if let Some(slot) = self.edge_index.get_mut(&self.edges[i].key) {
                *slot = i;
            }
        }
    }

    pub fn remove_edge(&mut self, v: &str, w: &str) -> bool {
        let Some(&idx) = self.edge_index.get(&self.lookup_key(v, w)) else {
            return false;
        };
        self.remove_edge_at_index(idx);
        true
    }

    pub fn remove_node(&mut self, id: &str) -> bool {
        let Some(idx) = self.node_index.remove(id) else {
            return false;
        };

        self.invalidate_adj();
        self.nodes.remove(idx);
        for i in idx..self.nodes.len() {
            if let Some(slot) = self.node_index.get_mut(self.nodes[i].id.as_str()) {
                *slot = i;
            }
        }

        let before = self.edges.len();
        self.edges.retain(|e| e.key.v != id && e.key.w != id);
        if self.edges.len() != before {
            self.edge_index.clear();
            for (i, e) in self.edges.iter().enumerate() {
                self.edge_index.insert(e.key.clone(), i);
            }
        }

        true
    }

    pub fn successors(&self, v: &str) -> Vec<&str> {
        if !self.options.directed {
            return self.neighbors(v);
        }
        let Some(&v_ix) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.with_adj(|cache| {
            cache
                .out_edges(v_ix)
                .iter()
                .map(|&edge_ix| self.edges[edge_ix].key.w.as_str())
                .collect()
        })
    }

    pub fn predecessors(&self, v: &str) -> Vec<&str> {
        if !self.options.directed {
            return self.neighbors(v);
        }
        let Some(&v_ix) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.with_adj(|cache| {
            cache
                .in_edges(v_ix)
                .iter()
                .map(|&edge_ix| self.edges[edge_ix].key.v.as_str())
                .collect()
        })
    }

    /// Adjacent vertices regardless of edge direction, without duplicates and without `v`
    /// itself (self-loops are not reported).
    pub fn neighbors(&self, v: &str) -> Vec<&str> {
        let Some(&v_ix) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.with_adj(|cache| {
            let mut out: Vec<&str> = Vec::new();
            let outgoing = cache
                .out_edges(v_ix)
                .iter()
                .map(|&edge_ix| self.edges[edge_ix].key.w.as_str());
            let incoming = cache
                .in_edges(v_ix)
                .iter()
                .map(|&edge_ix| self.edges[edge_ix].key.v.as_str());
            for u in outgoing.chain(incoming) {
                if u != v && !out.contains(&u) {
                    out.push(u);
                }
            }
            out
        })
    }

    pub fn node_edges(&self, v: &str) -> Vec<EdgeKey> {
        let Some(&v_ix) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.with_adj(|cache| {
            let mut out: Vec<EdgeKey> = Vec::new();
            for &edge_ix in cache.out_edges(v_ix).iter().chain(cache.in_edges(v_ix)) {
                let key = &self.edges[edge_ix].key;
                if !out.contains(key) {
                    out.push(key.clone());
                }
            }
            out
        })
    }
}

impl<N: Default, E> Graph<N, E> {
    pub fn ensure_node(&mut self, id: impl Into<String>) -> &mut Self {
        let id = id.into();
        if self.node_index.contains_key(&id) {
            return self;
        }
        self.set_node(id, N::default())
    }
}

impl<N: Default, E: Default> Graph<N, E> {
    pub fn set_edge(&mut self, v: impl Into<String>, w: impl Into<String>) -> &mut Self {
        self.upsert_edge(v.into(), w.into(), None)
    }

    pub fn set_edge_with_label(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        label: E,
    ) -> &mut Self {
        self.upsert_edge(v.into(), w.into(), Some(label))
    }

    pub fn set_path(&mut self, nodes: &[&str]) -> &mut Self {
        for pair in nodes.windows(2) {
            self.set_edge(pair[0], pair[1]);
        }
        self
    }

    fn upsert_edge(&mut self, v: String, w: String, label: Option<E>) -> &mut Self {
        let (v, w) = self.canonicalize_endpoints(v, w);
        self.ensure_node(v.clone());
        self.ensure_node(w.clone());

        let key = EdgeKey { v, w };
        if let Some(&idx) = self.edge_index.get(&key) {
            if let Some(label) = label {
                self.edges[idx].label = label;
            }
            return self;
        }

        self.invalidate_adj();
        let idx = self.edges.len();
        self.edges.push(EdgeEntry {
            key: key.clone(),
            label: label.unwrap_or_default(),
        });
        self.edge_index.insert(key, idx);
        self
    }
}
