//! Propositional vocabulary: boolean variables, literals and clause sets.

use std::fmt::{Debug, Display, Formatter};
use std::io;
use std::ops::Not;

/// A boolean variable, identified by a dense index.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BVar(u32);

impl BVar {
    pub fn from_index(index: usize) -> Self {
        BVar(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Literal that is true iff the variable is true.
    pub fn true_lit(self) -> Lit {
        Lit(self.0 << 1)
    }

    /// Literal that is true iff the variable is false.
    pub fn false_lit(self) -> Lit {
        Lit((self.0 << 1) | 1)
    }
}

impl Debug for BVar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "b{}", self.0)
    }
}

/// A boolean variable or its negation.
///
/// The lowest bit is set for negative literals.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lit(u32);

impl Lit {
    pub fn variable(self) -> BVar {
        BVar(self.0 >> 1)
    }

    pub fn is_positive(self) -> bool {
        self.0 & 1 == 0
    }

    /// Value of the literal, given the value of its variable.
    pub fn holds_if(self, var_value: bool) -> bool {
        var_value == self.is_positive()
    }

    fn to_varisat(self) -> varisat::Lit {
        let dimacs = self.variable().index() as isize + 1;
        varisat::Lit::from_dimacs(if self.is_positive() { dimacs } else { -dimacs })
    }
}

impl Not for Lit {
    type Output = Lit;

    fn not(self) -> Self::Output {
        Lit(self.0 ^ 1)
    }
}

impl From<BVar> for Lit {
    fn from(v: BVar) -> Self {
        v.true_lit()
    }
}

impl Debug for Lit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_positive() {
            write!(f, "{:?}", self.variable())
        } else {
            write!(f, "!{:?}", self.variable())
        }
    }
}

impl Display for Lit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A disjunction of literals.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Clause(Box<[Lit]>);

impl Clause {
    pub fn literals(&self) -> &[Lit] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Evaluates the clause under a total assignment of its variables.
    pub fn satisfied_by(&self, value: impl Fn(BVar) -> bool) -> bool {
        self.0.iter().any(|&l| l.holds_if(value(l.variable())))
    }
}

impl Debug for Clause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, l) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, " ")?;
            }
            write!(f, "{l:?}")?;
        }
        write!(f, "]")
    }
}

/// A conjunction of clauses over variables `0..num_vars`.
#[derive(Clone, Default, Debug)]
pub struct Cnf {
    num_vars: usize,
    clauses: Vec<Clause>,
}

impl Cnf {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn new_bvar(&mut self) -> BVar {
        let var = BVar::from_index(self.num_vars);
        self.num_vars += 1;
        var
    }

    pub fn add_clause(&mut self, lits: impl Into<Box<[Lit]>>) {
        let lits = lits.into();
        debug_assert!(lits.iter().all(|l| l.variable().index() < self.num_vars));
        self.clauses.push(Clause(lits));
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Returns true if every clause holds under the given assignment.
    pub fn satisfied_by(&self, value: impl Fn(BVar) -> bool) -> bool {
        self.clauses.iter().all(|c| c.satisfied_by(&value))
    }

    /// Converts the clause set into the formula representation of the `varisat` solver.
    /// Variable `i` becomes the DIMACS variable `i + 1`.
    pub fn to_dimacs(&self) -> varisat::CnfFormula {
        let mut formula = varisat::CnfFormula::new();
        formula.set_var_count(self.num_vars);
        let mut buffer = Vec::new();
        for clause in &self.clauses {
            buffer.clear();
            buffer.extend(clause.literals().iter().map(|l| l.to_varisat()));
            varisat::ExtendFormula::add_clause(&mut formula, &buffer);
        }
        formula
    }

    /// Writes the clauses in DIMACS CNF format.
    pub fn write_dimacs(&self, out: &mut impl io::Write) -> io::Result<()> {
        varisat_dimacs::write_dimacs(out, &self.to_dimacs())
    }
}
