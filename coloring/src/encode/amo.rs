use crate::cnf::{Cnf, Lit};
use crate::errors::InvalidParameter;
use crate::params::EnvParam;
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Size of the groups in the commander encoding.
static COMMANDER_GROUP: EnvParam<usize> = EnvParam::new("KCOLOR_COMMANDER_GROUP", "3");

/// Encoding of an at-most-one constraint over a set of literals.
///
/// All encodings accept exactly the same assignments of the constrained literals. They differ in
/// the number of clauses and auxiliary variables they introduce.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum AtMostOne {
    /// One binary clause per pair of literals: O(n²) clauses, no auxiliary variable.
    #[default]
    Pairwise,
    /// Sequential counter (Sinz, 2005): 3n-4 clauses and n-1 auxiliary variables.
    Sequential,
    /// Commander encoding (Klieber & Kwon, 2007): literals are split in small groups, each with
    /// a commander variable, and the constraint is applied recursively to the commanders.
    Commander,
}

impl AtMostOne {
    pub const NAMES: &'static str = "pairwise, sequential, commander";

    /// Adds clauses to `cnf` ensuring that at most one of `lits` is true.
    pub fn encode(self, cnf: &mut Cnf, lits: &[Lit]) {
        match self {
            AtMostOne::Pairwise => pairwise(cnf, lits),
            AtMostOne::Sequential => sequential(cnf, lits),
            AtMostOne::Commander => commander(cnf, lits, COMMANDER_GROUP.get().max(2)),
        }
    }
}

impl FromStr for AtMostOne {
    type Err = InvalidParameter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pairwise" => Ok(AtMostOne::Pairwise),
            "sequential" => Ok(AtMostOne::Sequential),
            "commander" => Ok(AtMostOne::Commander),
            _ => Err(InvalidParameter::UnknownValue {
                kind: "at-most-one encoding",
                value: s.to_string(),
                expected: AtMostOne::NAMES,
            }),
        }
    }
}

impl Display for AtMostOne {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AtMostOne::Pairwise => "pairwise",
            AtMostOne::Sequential => "sequential",
            AtMostOne::Commander => "commander",
        };
        write!(f, "{name}")
    }
}

fn pairwise(cnf: &mut Cnf, lits: &[Lit]) {
    for (&a, &b) in lits.iter().tuple_combinations() {
        cnf.add_clause([!a, !b]);
    }
}

fn sequential(cnf: &mut Cnf, lits: &[Lit]) {
    let n = lits.len();
    if n <= 1 {
        return;
    }
    // s[i] holds iff one of lits[0..=i] is true
    let s: Vec<Lit> = (0..n - 1).map(|_| cnf.new_bvar().true_lit()).collect();
    cnf.add_clause([!lits[0], s[0]]);
    for i in 1..n - 1 {
        cnf.add_clause([!lits[i], s[i]]);
        cnf.add_clause([!s[i - 1], s[i]]);
        cnf.add_clause([!lits[i], !s[i - 1]]);
    }
    cnf.add_clause([!lits[n - 1], !s[n - 2]]);
}

fn commander(cnf: &mut Cnf, lits: &[Lit], group_size: usize) {
    if lits.len() <= group_size.saturating_add(1) {
        pairwise(cnf, lits);
        return;
    }
    let mut commanders = Vec::with_capacity(lits.len().div_ceil(group_size));
    for group in lits.chunks(group_size) {
        let c = cnf.new_bvar().true_lit();
        pairwise(cnf, group);
        // c <=> OR(group)
        let mut clause = Vec::with_capacity(group.len() + 1);
        clause.push(!c);
        for &l in group {
            clause.push(l);
            cnf.add_clause([!l, c]);
        }
        cnf.add_clause(clause);
        commanders.push(c);
    }
    commander(cnf, &commanders, group_size);
}
