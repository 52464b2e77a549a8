//! Adapter for the `varisat` CDCL solver.

use super::ground::Grounding;
use super::{Answer, BoolModel, Model, SolverPort};
use crate::cnf::Cnf;
use crate::encode::ConstraintSystem;
use crate::errors::SolverError;
use crossbeam_channel::RecvTimeoutError;
use std::thread;
use std::time::Instant;

/// Solves propositional systems with `varisat`, and quantified systems by expanding them over
/// their vertex constants first (see [`super::ground`]).
///
/// `varisat` cannot be interrupted: when a deadline is given, the search runs on a detached
/// worker thread which keeps running after the deadline has expired.
#[derive(Default, Debug, Clone)]
pub struct SatSolver {
    _private: (),
}

impl SatSolver {
    pub fn new() -> Self {
        Default::default()
    }
}

impl SolverPort for SatSolver {
    fn name(&self) -> &str {
        "varisat"
    }

    fn solve(&mut self, system: &ConstraintSystem, deadline: Option<Instant>) -> Result<Answer, SolverError> {
        match system {
            ConstraintSystem::Cnf(cnf) => {
                let values = run(cnf, deadline)?;
                Ok(match values {
                    Some(values) => Answer::Sat(Model::Boolean(BoolModel::new(values))),
                    None => Answer::Unsat,
                })
            }
            ConstraintSystem::Quantified(theory) => {
                let grounding = Grounding::new(theory)?;
                let values = run(grounding.cnf(), deadline)?;
                Ok(match values {
                    Some(values) => Answer::Sat(Model::Function(grounding.interpretation(&values))),
                    None => Answer::Unsat,
                })
            }
        }
    }
}

fn run(cnf: &Cnf, deadline: Option<Instant>) -> Result<Option<Vec<bool>>, SolverError> {
    let start = Instant::now();
    let result = match deadline {
        None => solve_cnf(cnf),
        Some(deadline) => {
            let (snd, rcv) = crossbeam_channel::bounded(1);
            let num_vars = cnf.num_vars();
            let formula = cnf.to_dimacs();
            thread::Builder::new()
                .name("varisat".to_string())
                .spawn(move || {
                    // the receiver is gone if the deadline expired
                    let _ = snd.send(solve_formula(&formula, num_vars));
                })
                .map_err(|e| SolverError::Backend(e.to_string()))?;
            match rcv.recv_deadline(deadline) {
                Ok(result) => result,
                Err(RecvTimeoutError::Timeout) => Err(SolverError::TimedOut),
                Err(RecvTimeoutError::Disconnected) => Err(SolverError::WorkerLost),
            }
        }
    };
    match &result {
        Ok(Some(_)) => tracing::info!("SAT after {:.3}s", start.elapsed().as_secs_f64()),
        Ok(None) => tracing::info!("UNSAT after {:.3}s", start.elapsed().as_secs_f64()),
        Err(e) => tracing::warn!("No answer after {:.3}s: {e}", start.elapsed().as_secs_f64()),
    }
    result
}

/// Solves `cnf` on the current thread, returning the value of each variable if satisfiable.
pub(crate) fn solve_cnf(cnf: &Cnf) -> Result<Option<Vec<bool>>, SolverError> {
    solve_formula(&cnf.to_dimacs(), cnf.num_vars())
}

fn solve_formula(formula: &varisat::CnfFormula, num_vars: usize) -> Result<Option<Vec<bool>>, SolverError> {
    let mut solver = varisat::Solver::new();
    solver.add_formula(formula);
    match solver.solve() {
        Ok(true) => {
            let model = solver
                .model()
                .ok_or_else(|| SolverError::Backend("no model after a satisfiable answer".to_string()))?;
            let mut values = vec![false; num_vars];
            for lit in model {
                let i = lit.var().index();
                if i < num_vars {
                    values[i] = lit.is_positive();
                }
            }
            Ok(Some(values))
        }
        Ok(false) => Ok(None),
        Err(e) => Err(SolverError::Backend(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn pigeons(n: usize) -> Cnf {
        // n + 1 pigeons in n holes
        let mut cnf = Cnf::new();
        let x: Vec<Vec<_>> = (0..=n).map(|_| (0..n).map(|_| cnf.new_bvar()).collect()).collect();
        for p in &x {
            cnf.add_clause(p.iter().map(|v| v.true_lit()).collect::<Vec<_>>());
        }
        for h in 0..n {
            for p1 in 0..=n {
                for p2 in p1 + 1..=n {
                    cnf.add_clause([x[p1][h].false_lit(), x[p2][h].false_lit()]);
                }
            }
        }
        cnf
    }

    #[test]
    fn sat_and_unsat() {
        let mut cnf = Cnf::new();
        let a = cnf.new_bvar();
        let b = cnf.new_bvar();
        cnf.add_clause([a.true_lit(), b.true_lit()]);
        cnf.add_clause([a.false_lit()]);
        let mut solver = SatSolver::new();
        match solver.solve(&ConstraintSystem::Cnf(cnf.clone()), None).unwrap() {
            Answer::Sat(Model::Boolean(m)) => {
                assert_eq!(m.value(a), Some(false));
                assert_eq!(m.value(b), Some(true));
            }
            other => panic!("unexpected answer {other:?}"),
        }
        cnf.add_clause([b.false_lit()]);
        assert_eq!(solver.solve(&ConstraintSystem::Cnf(cnf), None).unwrap(), Answer::Unsat);
    }

    #[test]
    fn answer_within_deadline() {
        let deadline = Instant::now() + Duration::from_secs(60);
        let answer = SatSolver::new()
            .solve(&ConstraintSystem::Cnf(pigeons(4)), Some(deadline))
            .unwrap();
        assert_eq!(answer, Answer::Unsat);
    }

    #[test]
    fn expired_deadline_is_a_timeout() {
        let deadline = Instant::now();
        let res = SatSolver::new().solve(&ConstraintSystem::Cnf(pigeons(10)), Some(deadline));
        assert_eq!(res, Err(SolverError::TimedOut));
    }
}
