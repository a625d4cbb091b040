//! Cliques of the symmetrized graph.
//!
//! Maximal cliques are enumerated with Bron-Kerbosch using Tomita pivoting.
//! Counting all complete `k`-subgraphs (maximal or not) uses ordered
//! extension, so each subgraph is visited exactly once.

use super::adjacency::Adjacency;
use serde::Serialize;

fn intersect(a: &[usize], b: &[usize]) -> Vec<usize> {
    let (mut i, mut j) = (0, 0);
    let mut out = Vec::new();
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

fn bron_kerbosch(
    adj: &Adjacency,
    r: &mut Vec<usize>,
    mut p: Vec<usize>,
    mut x: Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    if p.is_empty() {
        if x.is_empty() {
            out.push(r.clone());
        }
        return;
    }

    // Pivot on the vertex of P ∪ X with most neighbors in P.
    let pivot = p
        .iter()
        .chain(x.iter())
        .copied()
        .max_by_key(|&u| intersect(adj.neighbors(u), &p).len())
        .unwrap_or(p[0]);
    let candidates: Vec<usize> = p
        .iter()
        .copied()
        .filter(|v| adj.neighbors(pivot).binary_search(v).is_err())
        .collect();

    for v in candidates {
        let nv = adj.neighbors(v);
        r.push(v);
        bron_kerbosch(adj, r, intersect(&p, nv), intersect(&x, nv), out);
        let _ = r.pop();
        p.retain(|&u| u != v);
        if let Err(pos) = x.binary_search(&v) {
            x.insert(pos, v);
        }
    }
}

/// All maximal cliques, each sorted, listed in lexicographic order.
///
/// Isolated nodes are maximal cliques of size one.
pub fn maximal_cliques(adj: &Adjacency) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    if adj.node_count() == 0 {
        return out;
    }
    let p: Vec<usize> = (0..adj.node_count()).collect();
    bron_kerbosch(adj, &mut Vec::new(), p, Vec::new(), &mut out);
    for c in &mut out {
        c.sort_unstable();
    }
    out.sort();
    out
}

/// Size of the largest clique (0 for an empty graph).
pub fn clique_number(adj: &Adjacency) -> usize {
    maximal_cliques(adj).iter().map(Vec::len).max().unwrap_or(0)
}

/// Number of maximal cliques with exactly `k` members.
pub fn count_maximal_cliques_of_size(adj: &Adjacency, k: usize) -> usize {
    maximal_cliques(adj).iter().filter(|c| c.len() == k).count()
}

fn extend(adj: &Adjacency, candidates: &[usize], remaining: usize) -> usize {
    if remaining == 0 {
        return 1;
    }
    if candidates.len() < remaining {
        return 0;
    }
    let mut total = 0;
    for (idx, &v) in candidates.iter().enumerate() {
        // Only extend with higher-indexed common neighbors.
        let next = intersect(&candidates[idx + 1..], adj.neighbors(v));
        total += extend(adj, &next, remaining - 1);
    }
    total
}

/// Number of complete subgraphs on exactly `k` nodes, maximal or not.
pub fn count_cliques_of_size(adj: &Adjacency, k: usize) -> usize {
    if k == 0 {
        return 0;
    }
    let all: Vec<usize> = (0..adj.node_count()).collect();
    extend(adj, &all, k)
}

/// Clique structure at a glance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CliqueSummary {
    /// Largest clique size.
    pub clique_number: usize,
    /// Number of maximal cliques.
    pub maximal_cliques: usize,
    /// Size queried for the two counts below.
    pub target_size: usize,
    /// Maximal cliques of `target_size`.
    pub maximal_of_target_size: usize,
    /// All complete subgraphs of `target_size`.
    pub cliques_of_target_size: usize,
}

/// Summarize cliques, counting those of `target_size`.
pub fn clique_summary(adj: &Adjacency, target_size: usize) -> CliqueSummary {
    let cliques = maximal_cliques(adj);
    CliqueSummary {
        clique_number: cliques.iter().map(Vec::len).max().unwrap_or(0),
        maximal_cliques: cliques.len(),
        target_size,
        maximal_of_target_size: cliques.iter().filter(|c| c.len() == target_size).count(),
        cliques_of_target_size: count_cliques_of_size(adj, target_size),
    }
}
