use rand::prelude::*;
use troop::ari;
use troop::sbm::{select_blocks, BernoulliSbm};
use troop::stats::Adjacency;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Planted three-block graph: dense within blocks, sparse between.
    // ICL should pick three blocks and recover the planted labels.
    let sizes = [8usize, 6, 6];
    let planted: Vec<usize> = sizes
        .iter()
        .enumerate()
        .flat_map(|(b, &s)| std::iter::repeat(b).take(s))
        .collect();
    let n = planted.len();

    let mut rng = StdRng::seed_from_u64(42);
    let mut edges = Vec::new();
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let p = if planted[i] == planted[j] { 0.8 } else { 0.05 };
            if rng.random::<f64>() < p {
                edges.push((i, j));
            }
        }
    }
    let adj = Adjacency::from_edges(n, &edges);
    println!("{} nodes, {} directed edges", n, adj.edge_count());

    let estimator = BernoulliSbm::new().with_seed(7);
    let selection = select_blocks(&estimator, &adj, 1..=5)?;
    for candidate in selection.candidates() {
        match candidate.icl() {
            Some(icl) => println!("  K = {}: ICL {:.2}", candidate.n_blocks, icl),
            None => println!("  K = {}: failed", candidate.n_blocks),
        }
    }

    if let Some(best) = selection.best() {
        let labels = best.hard_assignments();
        println!(
            "selected K = {}, block sizes {:?}, ARI vs planted {:.3}",
            best.n_blocks,
            best.block_sizes(),
            ari(&planted, &labels)
        );
    }
    Ok(())
}
