//! Traversal helper used by the layouts.
//!
//! Edge direction is ignored here: a drawing treats every edge as a spring between its two
//! endpoints, so "reachable" means reachable through the underlying undirected graph.

use super::Graph;
use std::collections::VecDeque;

/// Unweighted all-pairs shortest path lengths, indexed by node enumeration order.
///
/// `result[i][j]` is `None` when `j` is unreachable from `i`; the diagonal is `Some(0)`.
/// Runs one BFS per vertex, O(V·(V+E)).
pub fn shortest_path_lengths<N, E>(g: &Graph<N, E>) -> Vec<Vec<Option<usize>>> {
    let ids: Vec<&str> = g.nodes().collect();
    let n = ids.len();

    let adjacency: Vec<Vec<usize>> = ids
        .iter()
        .map(|v| {
            g.neighbors(v)
                .into_iter()
                .filter_map(|w| g.node_position(w))
                .collect()
        })
        .collect();

    let mut out: Vec<Vec<Option<usize>>> = Vec::with_capacity(n);
    let mut q: VecDeque<usize> = VecDeque::new();
    for source in 0..n {
        let mut dist: Vec<Option<usize>> = vec![None; n];
        dist[source] = Some(0);
        q.clear();
        q.push_back(source);
        while let Some(v) = q.pop_front() {
            let Some(dv) = dist[v] else {
                continue;
            };
            for &w in &adjacency[v] {
                if dist[w].is_none() {
                    dist[w] = Some(dv + 1);
                    q.push_back(w);
                }
            }
        }
        out.push(dist);
    }
    out
}
