//! End-to-end coloring: encode, solve, decode.

use crate::decode::{ColorAssignment, decode};
use crate::encode::{ColorCount, Encoding, Strategy, encode};
use crate::errors::ColoringError;
use crate::graph::Graph;
use crate::solver::{Answer, SolverPort};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A proper coloring with at most `k` colors.
    Colored(ColorAssignment),
    /// The solver proved that no `k`-coloring exists.
    Uncolorable,
}

impl Outcome {
    pub fn assignment(&self) -> Option<&ColorAssignment> {
        match self {
            Outcome::Colored(assignment) => Some(assignment),
            Outcome::Uncolorable => None,
        }
    }

    pub fn is_colored(&self) -> bool {
        matches!(self, Outcome::Colored(_))
    }
}

/// Searches for a `k`-coloring of `graph`.
///
/// A solver failure (including a timeout) is reported as an error and never as [`Outcome::Uncolorable`].
/// Any assignment returned has been checked against the edges of `graph`.
pub fn color_graph(
    graph: &Graph,
    k: ColorCount,
    strategy: &Strategy,
    solver: &mut impl SolverPort,
    deadline: Option<Instant>,
) -> Result<Outcome, ColoringError> {
    let encoding = encode(graph, k, strategy);
    solve_encoding(graph, &encoding, solver, deadline)
}

/// Same as [`color_graph`], on an encoding of `graph` that was already built.
pub fn solve_encoding(
    graph: &Graph,
    encoding: &Encoding,
    solver: &mut impl SolverPort,
    deadline: Option<Instant>,
) -> Result<Outcome, ColoringError> {
    let k = encoding.k;
    let _span = tracing::info_span!("color", k = k.get(), solver = solver.name()).entered();
    tracing::info!(
        "{} vertices, {} edges, max degree {}",
        graph.num_vertices(),
        graph.num_edges(),
        graph.max_degree()
    );

    let answer = {
        let _span = tracing::debug_span!("solve").entered();
        solver.solve(&encoding.system, deadline)?
    };

    match answer {
        Answer::Unsat => Ok(Outcome::Uncolorable),
        Answer::Sat(model) => {
            let _span = tracing::debug_span!("decode").entered();
            let assignment = decode(graph, encoding, &model)?;
            assignment.check(graph, k)?;
            tracing::info!("colored with {} colors", assignment.num_colors_used());
            Ok(Outcome::Colored(assignment))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{AtMostOne, ConstraintSystem};
    use crate::errors::{DecodeError, SolverError};
    use crate::solver::{BoolModel, Model, SatSolver};

    fn triangle() -> Graph {
        let mut g = Graph::new();
        g.add_edge("a", "b");
        g.add_edge("b", "c");
        g.add_edge("c", "a");
        g
    }

    struct Fixed(Result<Answer, SolverError>);

    impl SolverPort for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn solve(&mut self, _: &ConstraintSystem, _: Option<Instant>) -> Result<Answer, SolverError> {
            self.0.clone()
        }
    }

    #[test]
    fn triangle_needs_three_colors() {
        let g = triangle();
        for strategy in [Strategy::one_hot(AtMostOne::Pairwise), Strategy::Quantified] {
            let mut solver = SatSolver::new();
            let two = color_graph(&g, ColorCount::new(2).unwrap(), &strategy, &mut solver, None).unwrap();
            assert_eq!(two, Outcome::Uncolorable);
            let three = color_graph(&g, ColorCount::new(3).unwrap(), &strategy, &mut solver, None).unwrap();
            assert_eq!(three.assignment().map(|a| a.num_colors_used()), Some(3));
        }
    }

    #[test]
    fn prebuilt_encodings() {
        let g = triangle();
        let k = ColorCount::new(3).unwrap();
        for strategy in [Strategy::default(), Strategy::Quantified] {
            let encoding = encode(&g, k, &strategy);
            let outcome = solve_encoding(&g, &encoding, &mut SatSolver::new(), None).unwrap();
            assert!(outcome.assignment().is_some_and(|a| a.check(&g, k).is_ok()));
        }
    }

    #[test]
    fn solver_errors_are_not_unsat() {
        let g = triangle();
        let mut solver = Fixed(Err(SolverError::TimedOut));
        let res = color_graph(&g, ColorCount::new(3).unwrap(), &Strategy::default(), &mut solver, None);
        assert!(matches!(res, Err(ColoringError::Solver(SolverError::TimedOut))));
    }

    #[test]
    fn improper_models_are_rejected() {
        let g = triangle();
        // every indicator true: several colors for the first vertex
        let mut solver = Fixed(Ok(Answer::Sat(Model::Boolean(BoolModel::new(vec![true; 64])))));
        let strategy = Strategy::one_hot(AtMostOne::Pairwise);
        let res = color_graph(&g, ColorCount::new(3).unwrap(), &strategy, &mut solver, None);
        assert!(matches!(res, Err(ColoringError::Decode(DecodeError::SeveralColors(_)))));
    }
}
