use super::{ColorCount, OneHotConfig, OneHotTable};
use crate::cnf::{BVar, Cnf, Lit};
use crate::graph::Graph;

/// Encodes the k-coloring of `graph` with one boolean indicator per (vertex, color) pair.
///
/// Three families of clauses are produced:
///  - coverage: each vertex has at least one color,
///  - uniqueness: each vertex has at most one color (with the configured at-most-one encoding),
///  - adjacency: two adjacent vertices never share a color.
pub fn encode(graph: &Graph, k: ColorCount, config: &OneHotConfig) -> (Cnf, OneHotTable) {
    let num_colors = k.get() as usize;
    let mut cnf = Cnf::new();

    let indicators: Vec<Vec<BVar>> = graph
        .vertices()
        .map(|_| (0..num_colors).map(|_| cnf.new_bvar()).collect())
        .collect();

    let mut lits: Vec<Lit> = Vec::with_capacity(num_colors);
    for vertex_vars in &indicators {
        lits.clear();
        lits.extend(vertex_vars.iter().map(|v| v.true_lit()));
        cnf.add_clause(lits.as_slice());
        config.amo.encode(&mut cnf, &lits);
    }

    for (a, b) in graph.edges() {
        let vars_a = &indicators[a.index()];
        let vars_b = &indicators[b.index()];
        for (&xa, &xb) in vars_a.iter().zip(vars_b) {
            if a == b {
                cnf.add_clause([xa.false_lit()]);
            } else {
                cnf.add_clause([xa.false_lit(), xb.false_lit()]);
            }
        }
    }

    if config.symmetry_breaking {
        if let Some(first) = indicators.first() {
            cnf.add_clause([first[0].true_lit()]);
        }
    }

    (cnf, OneHotTable { indicators })
}
