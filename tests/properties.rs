//! Invariants over random directed graphs.

use proptest::prelude::*;
use rand::prelude::*;
use rand::Rng;
use troop::sbm::{BernoulliSbm, BlockModelEstimator};
use troop::stats::{
    density, edge_reciprocity, global_clustering, in_degrees, maximal_cliques, modularity,
    nominal_assortativity, out_degrees, reciprocity, transitivity, Adjacency,
};

fn graph(max_nodes: usize) -> impl Strategy<Value = Adjacency> {
    (2..=max_nodes).prop_flat_map(|n| {
        proptest::collection::vec((0..n, 0..n), 0..n * n).prop_map(move |pairs| {
            let edges: Vec<(usize, usize)> = pairs.into_iter().filter(|(i, j)| i != j).collect();
            Adjacency::from_edges(n, &edges)
        })
    })
}

fn graph_with_labels(max_nodes: usize) -> impl Strategy<Value = (Adjacency, Vec<usize>)> {
    graph(max_nodes).prop_flat_map(|adj| {
        let n = adj.node_count();
        (Just(adj), proptest::collection::vec(0..2usize, n))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn ratios_stay_in_unit_interval(adj in graph(12)) {
        for value in [
            density(&adj),
            reciprocity(&adj),
            edge_reciprocity(&adj),
            transitivity(&adj),
            global_clustering(&adj),
        ] {
            prop_assert!((0.0..=1.0).contains(&value), "{value}");
        }
    }

    #[test]
    fn degree_sums_match_edge_count(adj in graph(12)) {
        let m = adj.edge_count();
        prop_assert_eq!(in_degrees(&adj).iter().sum::<usize>(), m);
        prop_assert_eq!(out_degrees(&adj).iter().sum::<usize>(), m);
    }

    #[test]
    fn maximal_cliques_are_complete_and_cover_nodes(adj in graph(10)) {
        let cliques = maximal_cliques(&adj);
        let mut covered = vec![false; adj.node_count()];
        for c in &cliques {
            let mut pairs = 0;
            for (a, &u) in c.iter().enumerate() {
                covered[u] = true;
                for &v in &c[a + 1..] {
                    prop_assert!(adj.adjacent(u, v));
                    pairs += 1;
                }
            }
            prop_assert_eq!(pairs, c.len() * (c.len() - 1) / 2);
        }
        prop_assert!(covered.into_iter().all(|c| c));
    }

    #[test]
    fn mixing_coefficients_are_bounded((adj, labels) in graph_with_labels(12)) {
        if let Ok(q) = modularity(&adj, &labels) {
            prop_assert!((-1.0..=1.0).contains(&q), "modularity {q}");
        }
        for directed in [true, false] {
            if let Ok(r) = nominal_assortativity(&adj, &labels, directed) {
                prop_assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&r), "assortativity {r}");
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn block_memberships_are_distributions(adj in graph(10), seed in 0u64..1000) {
        let k = 2.min(adj.node_count());
        let estimator = BernoulliSbm::new().with_seed(seed).with_restarts(1).with_max_iter(100);
        let fit = estimator.estimate(&adj, k).unwrap();
        for row in &fit.memberships {
            prop_assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
        prop_assert!((fit.proportions.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        for p in fit.connectivity.iter().flatten() {
            prop_assert!((0.0..=1.0).contains(p));
        }
    }
}

fn bernoulli_graph(n: usize, p: f64, rng: &mut StdRng) -> Adjacency {
    let mut edges = Vec::new();
    for i in 0..n {
        for j in 0..n {
            if i != j && rng.random::<f64>() < p {
                edges.push((i, j));
            }
        }
    }
    Adjacency::from_edges(n, &edges)
}

fn mean_over(graphs: &[Adjacency], f: impl Fn(&Adjacency) -> f64) -> f64 {
    graphs.iter().map(f).sum::<f64>() / graphs.len() as f64
}

#[test]
fn mixing_coefficients_average_zero_under_random_grooming() {
    // Labels are fixed while edges ignore them, so every coefficient is
    // centred on zero up to an O(1/m) bias.
    let n = 40;
    let balanced: Vec<usize> = (0..n).map(|i| i % 2).collect();
    let unbalanced: Vec<usize> = (0..n).map(|i| usize::from(i < 12)).collect();
    let mut rng = StdRng::seed_from_u64(20_240_601);
    let graphs: Vec<Adjacency> = (0..200).map(|_| bernoulli_graph(n, 0.15, &mut rng)).collect();

    for labels in [&balanced, &unbalanced] {
        let q = mean_over(&graphs, |adj| modularity(adj, labels).unwrap());
        let r_directed = mean_over(&graphs, |adj| nominal_assortativity(adj, labels, true).unwrap());
        let r_undirected =
            mean_over(&graphs, |adj| nominal_assortativity(adj, labels, false).unwrap());
        assert!(q.abs() < 0.02, "mean modularity {q}");
        assert!(r_directed.abs() < 0.02, "mean directed assortativity {r_directed}");
        assert!(r_undirected.abs() < 0.02, "mean undirected assortativity {r_undirected}");
    }

    // A planted split is far outside that band.
    let planted: Vec<usize> = (0..n).map(|i| i % 2).collect();
    let mut edges = Vec::new();
    for i in 0..n {
        for j in 0..n {
            let p = if planted[i] == planted[j] { 0.3 } else { 0.03 };
            if i != j && rng.random::<f64>() < p {
                edges.push((i, j));
            }
        }
    }
    let adj = Adjacency::from_edges(n, &edges);
    assert!(modularity(&adj, &planted).unwrap() > 0.3);
    assert!(nominal_assortativity(&adj, &planted, true).unwrap() > 0.6);
}
