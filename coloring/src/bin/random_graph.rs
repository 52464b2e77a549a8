use anyhow::Result;
use clap::Parser;
use kcoloring::Graph;
use kcoloring::io::DotGraph;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Prints a random undirected graph in the DOT language.
#[derive(Debug, Parser)]
#[command(name = "kcolor-random", version)]
struct Opt {
    /// Number of vertices
    vertices: usize,
    /// Seed of the random generator. If absent, a seed is taken from the operating system.
    #[arg(long, short)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let opt = Opt::parse();
    let mut rng = match opt.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };
    let graph = Graph::random(opt.vertices, &mut rng);
    print!("{}", DotGraph::from_graph(&graph));
    Ok(())
}
