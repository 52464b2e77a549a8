//! Reduction of graph k-coloring to a constraint system.
//!
//! Two strategies are available:
//!  - [`Strategy::OneHot`] grounds the problem into a propositional formula with one indicator
//!    variable per (vertex, color) pair.
//!  - [`Strategy::Quantified`] states the problem with an uninterpreted function
//!    `color: Vertex -> Int`, an uninterpreted predicate `edge` and universally quantified axioms.

mod amo;
pub mod one_hot;
pub mod quantified;

pub use amo::AtMostOne;

use crate::cnf::{BVar, Cnf};
use crate::errors::InvalidParameter;
use crate::fol::{FunId, Theory};
use crate::graph::{Graph, VertexId};
use crate::params::EnvParam;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static AMO_ENCODING: EnvParam<AtMostOne> = EnvParam::new("KCOLOR_AMO", "pairwise");
static SYMMETRY_BREAKING: EnvParam<bool> = EnvParam::new("KCOLOR_SYMMETRY_BREAKING", "false");

/// A validated number of colors `k`, with `1 <= k <= ColorCount::MAX`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ColorCount(u32);

impl ColorCount {
    pub const MAX: u32 = 1 << 16;

    pub fn new(k: i64) -> Result<Self, InvalidParameter> {
        if k < 1 {
            Err(InvalidParameter::TooFewColors(k))
        } else if k > ColorCount::MAX as i64 {
            Err(InvalidParameter::TooManyColors {
                got: k,
                max: ColorCount::MAX,
            })
        } else {
            Ok(ColorCount(k as u32))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Display for ColorCount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OneHotConfig {
    /// Encoding of the "at most one color per vertex" constraints.
    pub amo: AtMostOne,
    /// If set, the first vertex is forced to take color 0.
    /// Satisfiability is preserved but not every coloring remains reachable.
    pub symmetry_breaking: bool,
}

impl Default for OneHotConfig {
    /// Configuration from the environment parameters `KCOLOR_AMO` and `KCOLOR_SYMMETRY_BREAKING`.
    fn default() -> Self {
        OneHotConfig {
            amo: AMO_ENCODING.get(),
            symmetry_breaking: SYMMETRY_BREAKING.get(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Strategy {
    OneHot(OneHotConfig),
    Quantified,
}

impl Strategy {
    pub const NAMES: &'static str = "one-hot, quantified";

    pub fn one_hot(amo: AtMostOne) -> Strategy {
        Strategy::OneHot(OneHotConfig {
            amo,
            ..Default::default()
        })
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::OneHot(Default::default())
    }
}

impl FromStr for Strategy {
    type Err = InvalidParameter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one-hot" | "onehot" => Ok(Strategy::default()),
            "quantified" => Ok(Strategy::Quantified),
            _ => Err(InvalidParameter::UnknownValue {
                kind: "strategy",
                value: s.to_string(),
                expected: Strategy::NAMES,
            }),
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::OneHot(cfg) => write!(f, "one-hot ({} at-most-one)", cfg.amo),
            Strategy::Quantified => write!(f, "quantified"),
        }
    }
}

/// Input of a decision procedure.
#[derive(Debug, Clone)]
pub enum ConstraintSystem {
    Cnf(Cnf),
    Quantified(Theory),
}

/// Indicator variables of the one-hot encoding: `var(v, c)` is true iff vertex `v` has color `c`.
#[derive(Debug, Clone)]
pub struct OneHotTable {
    indicators: Vec<Vec<BVar>>,
}

impl OneHotTable {
    pub fn var(&self, v: VertexId, color: u32) -> BVar {
        self.indicators[v.index()][color as usize]
    }

    /// Indicators of `v`, indexed by color.
    pub fn indicators(&self, v: VertexId) -> &[BVar] {
        &self.indicators[v.index()]
    }

    pub fn num_vertices(&self) -> usize {
        self.indicators.len()
    }
}

/// Symbols of the quantified encoding.
#[derive(Debug, Clone)]
pub struct FunctionSymbols {
    /// `color: Vertex -> Int`
    pub color: FunId,
    /// `edge: Vertex x Vertex -> Bool`
    pub edge: FunId,
    /// The constant standing for each vertex, indexed by vertex.
    pub constants: Vec<FunId>,
}

/// What the decoder needs to know about an encoding to interpret a model.
#[derive(Debug, Clone)]
pub enum Metadata {
    OneHot(OneHotTable),
    Function(FunctionSymbols),
}

#[derive(Debug, Clone)]
pub struct Encoding {
    pub k: ColorCount,
    pub system: ConstraintSystem,
    pub metadata: Metadata,
}

/// Builds the constraint system whose models are the `k`-colorings of `graph`.
pub fn encode(graph: &Graph, k: ColorCount, strategy: &Strategy) -> Encoding {
    let _span = tracing::debug_span!("encode", strategy = %strategy, k = k.get()).entered();
    let (system, metadata) = match strategy {
        Strategy::OneHot(config) => {
            let (cnf, table) = one_hot::encode(graph, k, config);
            tracing::debug!("{} variables, {} clauses", cnf.num_vars(), cnf.num_clauses());
            (ConstraintSystem::Cnf(cnf), Metadata::OneHot(table))
        }
        Strategy::Quantified => {
            let (theory, symbols) = quantified::encode(graph, k);
            tracing::debug!("{} assertions", theory.num_assertions());
            (ConstraintSystem::Quantified(theory), Metadata::Function(symbols))
        }
    };
    Encoding { k, system, metadata }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_count_bounds() {
        assert_eq!(ColorCount::new(0), Err(InvalidParameter::TooFewColors(0)));
        assert_eq!(ColorCount::new(-3), Err(InvalidParameter::TooFewColors(-3)));
        assert_eq!(ColorCount::new(1).map(ColorCount::get), Ok(1));
        assert!(ColorCount::new(ColorCount::MAX as i64).is_ok());
        assert!(matches!(
            ColorCount::new(ColorCount::MAX as i64 + 1),
            Err(InvalidParameter::TooManyColors { .. })
        ));
    }

    #[test]
    fn strategy_parsing() {
        assert_eq!("quantified".parse::<Strategy>(), Ok(Strategy::Quantified));
        assert!(matches!("one-hot".parse::<Strategy>(), Ok(Strategy::OneHot(_))));
        assert!("smt".parse::<Strategy>().is_err());
    }

    #[test]
    fn encoding_matches_strategy() {
        let mut g = Graph::new();
        g.add_edge("a", "b");
        let k = ColorCount::new(2).unwrap();
        let enc = encode(&g, k, &Strategy::one_hot(AtMostOne::Pairwise));
        assert!(matches!((&enc.system, &enc.metadata), (ConstraintSystem::Cnf(_), Metadata::OneHot(_))));
        let enc = encode(&g, k, &Strategy::Quantified);
        assert!(matches!(
            (&enc.system, &enc.metadata),
            (ConstraintSystem::Quantified(_), Metadata::Function(_))
        ));
    }
}
