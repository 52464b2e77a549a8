use kcoloring::decode::decode;
use kcoloring::encode::{AtMostOne, ConstraintSystem, Metadata, OneHotConfig, encode};
use kcoloring::errors::{DecodeError, SolverError};
use kcoloring::solver::{Answer, BoolModel, Interpretation, Model, SatSolver, SolverPort, Value};
use kcoloring::{ColorAssignment, ColorCount, ColoringError, Graph, Outcome, Strategy, color_graph};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::time::Instant;

fn strategies() -> Vec<Strategy> {
    let mut all: Vec<Strategy> = [AtMostOne::Pairwise, AtMostOne::Sequential, AtMostOne::Commander]
        .into_iter()
        .map(Strategy::one_hot)
        .collect();
    all.push(Strategy::OneHot(OneHotConfig {
        amo: AtMostOne::Pairwise,
        symmetry_breaking: true,
    }));
    all.push(Strategy::Quantified);
    all
}

/// Some coloring of `graph` with `k` colors, found by exhaustive search.
fn brute_force(graph: &Graph, k: u32) -> Option<Vec<u32>> {
    fn extend(graph: &Graph, k: u32, colors: &mut Vec<u32>) -> bool {
        let n = colors.len();
        if n == graph.num_vertices() {
            return true;
        }
        let v = kcoloring::VertexId::from_index(n);
        for c in 0..k {
            let compatible = graph
                .neighbors(v)
                .all(|u| u.index() > n || (u.index() < n && colors[u.index()] != c));
            if compatible {
                colors.push(c);
                if extend(graph, k, colors) {
                    return true;
                }
                colors.pop();
            }
        }
        false
    }
    let mut colors = Vec::with_capacity(graph.num_vertices());
    extend(graph, k, &mut colors).then_some(colors)
}

fn random_graphs(seed: u64, count: usize, max_vertices: usize) -> Vec<Graph> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..count)
        .map(|i| Graph::random(1 + i % max_vertices, &mut rng))
        .collect()
}

#[test]
fn sound_and_complete() {
    for graph in random_graphs(0, 40, 8) {
        for k in 1..=4 {
            let expected = brute_force(&graph, k);
            let k = ColorCount::new(k as i64).unwrap();
            for strategy in strategies() {
                let outcome = color_graph(&graph, k, &strategy, &mut SatSolver::new(), None).unwrap();
                match &outcome {
                    Outcome::Colored(assignment) => {
                        assert!(expected.is_some(), "{strategy} colored an uncolorable graph");
                        assert_eq!(assignment.len(), graph.num_vertices());
                        for (a, b) in graph.edges() {
                            assert_ne!(assignment.color_of(a), assignment.color_of(b));
                        }
                        assert!(assignment.iter().all(|(_, c)| c < k.get()));
                    }
                    Outcome::Uncolorable => {
                        assert!(expected.is_none(), "{strategy} missed a {k}-coloring {expected:?}")
                    }
                }
            }
        }
    }
}

#[test]
fn more_colors_never_hurt() {
    for graph in random_graphs(1, 30, 9) {
        for strategy in strategies() {
            let mut colorable = false;
            for k in 1..=5 {
                let k = ColorCount::new(k).unwrap();
                let outcome = color_graph(&graph, k, &strategy, &mut SatSolver::new(), None).unwrap();
                assert!(!colorable || outcome.is_colored(), "colorable with fewer than {k} colors");
                colorable = outcome.is_colored();
            }
            // a graph of maximum degree d is (d+1)-colorable
            if graph.max_degree() < 5 {
                assert!(colorable);
            }
        }
    }
}

#[test]
fn decoding_is_idempotent() {
    for graph in random_graphs(2, 20, 7) {
        let k = ColorCount::new(4).unwrap();
        for strategy in strategies() {
            let encoding = encode(&graph, k, &strategy);
            let Answer::Sat(model) = SatSolver::new().solve(&encoding.system, None).unwrap() else {
                continue;
            };
            let first = decode(&graph, &encoding, &model).unwrap();
            let second = decode(&graph, &encoding, &model).unwrap();
            assert_eq!(first, second);
        }
    }
}

/// A solver that always gives the same answer.
struct Stub {
    answer: Result<Answer, SolverError>,
    calls: usize,
}

impl Stub {
    fn new(answer: Result<Answer, SolverError>) -> Self {
        Stub { answer, calls: 0 }
    }
}

impl SolverPort for Stub {
    fn name(&self) -> &str {
        "stub"
    }

    fn solve(&mut self, _: &ConstraintSystem, _: Option<Instant>) -> Result<Answer, SolverError> {
        self.calls += 1;
        self.answer.clone()
    }
}

/// The model a solver would return for `coloring`.
fn model_of(graph: &Graph, k: ColorCount, strategy: &Strategy, coloring: &[u32]) -> Model {
    let encoding = encode(graph, k, strategy);
    match (&encoding.system, &encoding.metadata) {
        (ConstraintSystem::Cnf(cnf), Metadata::OneHot(table)) => {
            let mut values = vec![false; cnf.num_vars()];
            for v in graph.vertices() {
                values[table.var(v, coloring[v.index()]).index()] = true;
            }
            Model::Boolean(BoolModel::new(values))
        }
        (_, Metadata::Function(symbols)) => {
            let mut interpretation = Interpretation::new();
            for v in graph.vertices() {
                let c = coloring[v.index()] as i64;
                interpretation.set(symbols.color, vec![symbols.constants[v.index()]], Value::Int(c));
            }
            Model::Function(interpretation)
        }
        _ => unreachable!(),
    }
}

fn square() -> Graph {
    let mut g = Graph::new();
    g.add_edge("a", "b");
    g.add_edge("b", "c");
    g.add_edge("c", "d");
    g.add_edge("d", "a");
    g
}

#[test]
fn stub_models_are_decoded() {
    let g = square();
    let k = ColorCount::new(3).unwrap();
    for strategy in [Strategy::one_hot(AtMostOne::Pairwise), Strategy::Quantified] {
        let model = model_of(&g, k, &strategy, &[2, 0, 2, 1]);
        let mut stub = Stub::new(Ok(Answer::Sat(model)));
        let outcome = color_graph(&g, k, &strategy, &mut stub, None).unwrap();
        assert_eq!(outcome, Outcome::Colored(ColorAssignment::new(vec![2, 0, 2, 1])));
        assert_eq!(stub.calls, 1);
    }
}

#[test]
fn stub_improper_colorings_are_rejected() {
    let g = square();
    let k = ColorCount::new(3).unwrap();
    for strategy in [Strategy::one_hot(AtMostOne::Pairwise), Strategy::Quantified] {
        let model = model_of(&g, k, &strategy, &[0, 1, 1, 2]);
        let mut stub = Stub::new(Ok(Answer::Sat(model)));
        let res = color_graph(&g, k, &strategy, &mut stub, None);
        assert!(matches!(res, Err(ColoringError::Decode(DecodeError::Conflict(..)))), "{res:?}");
    }
}

#[test]
fn stub_unsat_and_failures() {
    let g = square();
    let k = ColorCount::new(2).unwrap();
    let strategy = Strategy::default();

    let mut stub = Stub::new(Ok(Answer::Unsat));
    assert_eq!(color_graph(&g, k, &strategy, &mut stub, None).unwrap(), Outcome::Uncolorable);

    for error in [
        SolverError::TimedOut,
        SolverError::WorkerLost,
        SolverError::Backend("out of memory".to_string()),
    ] {
        let mut stub = Stub::new(Err(error.clone()));
        match color_graph(&g, k, &strategy, &mut stub, None) {
            Err(ColoringError::Solver(e)) => assert_eq!(e, error),
            other => panic!("unexpected result {other:?}"),
        }
    }

    // a propositional model for a quantified encoding
    let mut stub = Stub::new(Ok(Answer::Sat(Model::Boolean(BoolModel::new(vec![true; 8])))));
    let res = color_graph(&g, k, &Strategy::Quantified, &mut stub, None);
    assert!(matches!(res, Err(ColoringError::Decode(DecodeError::ModelKind))));
}

#[test]
fn boxed_solvers() {
    let g = square();
    let mut solver: Box<dyn SolverPort> = Box::new(SatSolver::new());
    assert_eq!(solver.name(), "varisat");
    let outcome = color_graph(&g, ColorCount::new(2).unwrap(), &Strategy::default(), &mut solver, None).unwrap();
    assert!(outcome.is_colored());
}

#[test]
fn expired_deadline() {
    // pigeonhole principle: 10 pairwise adjacent vertices and 9 colors
    let mut g = Graph::new();
    for a in 0..10 {
        for b in a + 1..10 {
            g.add_edge(a.to_string(), b.to_string());
        }
    }
    let k = ColorCount::new(9).unwrap();
    let res = color_graph(&g, k, &Strategy::default(), &mut SatSolver::new(), Some(Instant::now()));
    assert!(matches!(res, Err(ColoringError::Solver(SolverError::TimedOut))), "{res:?}");
}
