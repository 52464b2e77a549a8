//! Interface to decision procedures.

pub mod ground;
pub mod sat;

pub use crate::errors::SolverError;
pub use sat::SatSolver;

use crate::cnf::BVar;
use crate::encode::ConstraintSystem;
use crate::fol::FunId;
use hashbrown::HashMap;
use std::time::Instant;

/// A decision procedure, queried once per constraint system.
pub trait SolverPort {
    fn name(&self) -> &str;

    /// Decides the satisfiability of `system`, blocking until an answer is found.
    ///
    /// If `deadline` is reached before an answer is found, the solver must return
    /// [`SolverError::TimedOut`] rather than an answer.
    fn solve(&mut self, system: &ConstraintSystem, deadline: Option<Instant>) -> Result<Answer, SolverError>;
}

impl<S: SolverPort + ?Sized> SolverPort for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(&mut self, system: &ConstraintSystem, deadline: Option<Instant>) -> Result<Answer, SolverError> {
        (**self).solve(system, deadline)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Sat(Model),
    Unsat,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Model {
    Boolean(BoolModel),
    Function(Interpretation),
}

/// Value of each boolean variable of a propositional formula.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoolModel {
    values: Vec<bool>,
}

impl BoolModel {
    pub fn new(values: Vec<bool>) -> Self {
        BoolModel { values }
    }

    pub fn value(&self, var: BVar) -> Option<bool> {
        self.values.get(var.index()).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    /// An individual of the `Vertex` sort, designated by one of its constants.
    Vertex(FunId),
}

/// Values of ground applications `f(c1, ..., cn)` of uninterpreted symbols to vertex constants.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Interpretation {
    values: HashMap<(FunId, Vec<FunId>), Value>,
}

impl Interpretation {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set(&mut self, f: FunId, args: Vec<FunId>, value: Value) {
        self.values.insert((f, args), value);
    }

    /// Value of `f(args)`, if the application is known to the model.
    pub fn eval(&self, f: FunId, args: &[FunId]) -> Option<Value> {
        // a borrowed key of type (FunId, &[FunId]) cannot be used for the lookup
        self.values.get(&(f, args.to_vec())).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
