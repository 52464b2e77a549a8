use super::{ColorCount, FunctionSymbols};
use crate::fol::*;
use crate::graph::Graph;
use hashbrown::HashSet;

/// Encodes the k-coloring of `graph` with an uninterpreted function `color: Vertex -> Int`, an
/// uninterpreted predicate `edge: Vertex x Vertex -> Bool` and the axioms
///
/// ```text
///  forall x y. edge(x, y) => edge(y, x)
///  forall x.   0 <= color(x) < k
///  forall x y. edge(x, y) => color(x) != color(y)
/// ```
///
/// together with one constant per vertex, pairwise distinct, and the ground fact `edge(u, v)`
/// for every edge of the graph.
///
/// The axioms quantify over the whole `Vertex` sort while only the vertex constants are ever
/// mentioned. Whether a decision procedure is complete on this shape depends on how it
/// instantiates quantifiers.
pub fn encode(graph: &Graph, k: ColorCount) -> (Theory, FunctionSymbols) {
    let mut th = Theory::new();
    let color = th.signature.declare("color", vec![Sort::Vertex], Sort::Int);
    let edge = th.signature.declare("edge", vec![Sort::Vertex, Sort::Vertex], Sort::Bool);

    let mut used: HashSet<String> = ["color".to_string(), "edge".to_string()].into_iter().collect();
    let constants: Vec<FunId> = graph
        .vertices()
        .map(|v| {
            let mut name = graph.name(v).to_string();
            while used.contains(&name) {
                name.push('\'');
            }
            used.insert(name.clone());
            th.signature.declare(name, vec![], Sort::Vertex)
        })
        .collect();

    let x = Var(0);
    let y = Var(1);
    let color_of = |v: Var| Term::app(color, [Term::Var(v)]);
    let edge_between = |a: Term, b: Term| pred(edge, [a, b]);

    th.assert(forall(
        [(x, Sort::Vertex), (y, Sort::Vertex)],
        implies(edge_between(x.into(), y.into()), edge_between(y.into(), x.into())),
    ));
    th.assert(forall(
        [(x, Sort::Vertex)],
        and([geq(color_of(x), 0i64), lt(color_of(x), k.get() as i64)]),
    ));
    th.assert(forall(
        [(x, Sort::Vertex), (y, Sort::Vertex)],
        implies(edge_between(x.into(), y.into()), neq(color_of(x), color_of(y))),
    ));

    if constants.len() >= 2 {
        th.assert(Formula::Distinct(constants.iter().map(|&c| Term::cst(c)).collect()));
    }
    for (a, b) in graph.edges() {
        th.assert(edge_between(
            Term::cst(constants[a.index()]),
            Term::cst(constants[b.index()]),
        ));
    }

    (th, FunctionSymbols { color, edge, constants })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axioms_and_facts() {
        let mut g = Graph::new();
        g.add_edge("a", "b");
        g.add_edge("b", "c");
        g.add_vertex("d");
        let (th, symbols) = encode(&g, ColorCount::new(2).unwrap());
        // 3 axioms + distinct + 2 facts
        assert_eq!(th.num_assertions(), 6);
        assert_eq!(symbols.constants.len(), 4);
        assert_eq!(th.signature.decl(symbols.color).ret, Sort::Int);
        assert_eq!(th.signature.decl(symbols.edge).args, vec![Sort::Vertex, Sort::Vertex]);

        let script = th.to_smt2(Some((symbols.color, symbols.constants.as_slice())));
        assert!(script.contains("(assert (edge a b))"), "{script}");
        assert!(script.contains("(assert (distinct a b c d))"), "{script}");
        assert!(
            script.contains("(assert (forall ((?x0 Vertex)) (and (<= 0 (color ?x0)) (< (color ?x0) 2))))"),
            "{script}"
        );
    }

    #[test]
    fn vertex_names_do_not_clash_with_symbols() {
        let mut g = Graph::new();
        g.add_edge("color", "edge");
        g.add_vertex("color'");
        let (th, symbols) = encode(&g, ColorCount::new(3).unwrap());
        let names: Vec<&str> = symbols
            .constants
            .iter()
            .map(|&c| th.signature.decl(c).name.as_str())
            .collect();
        assert_eq!(names, vec!["color'", "edge'", "color''"]);
    }

    #[test]
    fn single_vertex_has_no_distinct_axiom() {
        let mut g = Graph::new();
        g.add_vertex("alone");
        let (th, _) = encode(&g, ColorCount::new(1).unwrap());
        assert_eq!(th.num_assertions(), 3);
    }
}
