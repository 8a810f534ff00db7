//! Adjacency cache used by [`Graph`](super::Graph).
//!
//! Layout drivers ask for the neighbours of every vertex once per run, and scanning all edges for
//! each query is O(E). The cache stores incident edge indices in CSR form and is rebuilt lazily
//! whenever the graph generation changes.

#[derive(Debug, Clone)]
pub(in crate::graph) struct AdjCache {
    pub(in crate::graph) generation: u64,
    pub(in crate::graph) out_offsets: Vec<usize>,
    pub(in crate::graph) out_edges: Vec<usize>,
    pub(in crate::graph) in_offsets: Vec<usize>,
    pub(in crate::graph) in_edges: Vec<usize>,
}

impl AdjCache {
    pub(in crate::graph) fn build(
        generation: u64,
        node_count: usize,
        endpoints: impl Iterator<Item = (usize, usize)> + Clone,
    ) -> Self {
        let mut out_deg = vec![0usize; node_count];
        let mut in_deg = vec![0usize; node_count];
        for (v, w) in endpoints.clone() {
            out_deg[v] += 1;
            in_deg[w] += 1;
        }

        let out_offsets = prefix_offsets(&out_deg);
        let in_offsets = prefix_offsets(&in_deg);
        let mut out_edges = vec![0usize; out_offsets[node_count]];
        let mut in_edges = vec![0usize; in_offsets[node_count]];
        let mut out_fill = out_offsets.clone();
        let mut in_fill = in_offsets.clone();
        for (edge_ix, (v, w)) in endpoints.enumerate() {
            out_edges[out_fill[v]] = edge_ix;
            out_fill[v] += 1;
            in_edges[in_fill[w]] = edge_ix;
            in_fill[w] += 1;
        }

        Self {
            generation,
            out_offsets,
            out_edges,
            in_offsets,
            in_edges,
        }
    }

    pub(in crate::graph) fn out_edges(&self, v_ix: usize) -> &[usize] {
        let start = self.out_offsets[v_ix];
        let end = self.out_offsets[v_ix + 1];
        &self.out_edges[start..end]
    }

    pub(in crate::graph) fn in_edges(&self, v_ix: usize) -> &[usize] {
        let start = self.in_offsets[v_ix];
        let end = self.in_offsets[v_ix + 1];
        &self.in_edges[start..end]
    }
}

fn prefix_offsets(degrees: &[usize]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(degrees.len() + 1);
    let mut acc = 0usize;
    offsets.push(acc);
    for d in degrees {
        acc += d;
        offsets.push(acc);
    }
    offsets
}
