//! Reduction of a quantified theory to a propositional formula, by finite-domain expansion.
//!
//! The `Vertex` universe is taken to be the set of vertex constants of the signature (assumed
//! to denote distinct individuals), or a single anonymous individual if there are none.
//! Quantifiers are expanded over this universe and every remaining ground application is turned
//! into propositional variables:
//!  - a `Bool` application gets one variable,
//!  - an `Int` application gets an order encoding `x <= c` over the window `[lo - n, hi + n]`,
//!    where `lo` and `hi` are the extreme integer literals of the theory and `n` the number of
//!    integer applications. The window is narrowed to the literal bounds the theory asserts
//!    unconditionally on the application, such as `0 <= color(v) < k`.
//!
//! Integers outside of the window are never needed: any assignment satisfying the comparisons
//! of the theory can be mapped, preserving the order between terms and the values inside
//! `[lo, hi]`, to an assignment within the window. On universal theories, in which the
//! substructure generated by the constants is a model whenever a model exists, the expansion is
//! therefore both sound and complete.

use crate::cnf::{Cnf, Lit};
use crate::errors::SolverError;
use crate::fol::{CmpOp, Formula, FunId, Sort, Term, Theory, Var};
use crate::solver::{Interpretation, Value};
use hashbrown::HashMap;
use std::ops::Not;

/// Index of an individual of the universe.
type Elem = usize;

/// Ground application of an uninterpreted symbol to individuals.
type Key = (FunId, Vec<Elem>);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
enum GTerm {
    Int(i64),
    /// Index of an integer application.
    App(usize),
    Elem(Elem),
}

enum GFormula {
    Const(bool),
    /// Index of a boolean application.
    Atom(usize),
    Not(Box<GFormula>),
    And(Vec<GFormula>),
    Or(Vec<GFormula>),
    Cmp(CmpOp, GTerm, GTerm),
}

/// Order encoding of an integer in `[lo, hi]`: `bits[i]` holds iff `x <= lo + i`.
struct OrderVar {
    lo: i64,
    hi: i64,
    bits: Vec<Lit>,
}

impl OrderVar {
    fn leq(&self, c: i64, top: Lit) -> Lit {
        if c < self.lo {
            !top
        } else if c >= self.hi {
            top
        } else {
            self.bits[(c - self.lo) as usize]
        }
    }

    fn value(&self, values: &[bool]) -> i64 {
        let holds = |l: Lit| l.holds_if(values.get(l.variable().index()).copied().unwrap_or(false));
        match self.bits.iter().position(|&l| holds(l)) {
            Some(i) => self.lo + i as i64,
            None => self.hi,
        }
    }
}

/// Largest magnitude accepted for integer literals.
const MAX_LITERAL: i64 = i32::MAX as i64;

/// A quantified theory expanded into a propositional formula.
pub struct Grounding {
    cnf: Cnf,
    top: Lit,
    /// Constant designating each individual, `None` for the anonymous individual.
    universe: Vec<Option<FunId>>,
    atoms: Vec<(Key, Lit)>,
    ints: Vec<(Key, OrderVar)>,
    cmp_cache: HashMap<(usize, usize, i64), Lit>,
}

impl Grounding {
    pub fn new(theory: &Theory) -> Result<Self, SolverError> {
        let sig = &theory.signature;
        let mut universe: Vec<Option<FunId>> = sig.constants_of(Sort::Vertex).map(Some).collect();
        if universe.is_empty() {
            universe.push(None);
        }
        let mut expander = Expander {
            theory,
            universe: &universe,
            elems: universe
                .iter()
                .enumerate()
                .filter_map(|(i, c)| c.map(|c| (c, i)))
                .collect(),
            atoms: HashMap::new(),
            ints: HashMap::new(),
            literals: Vec::new(),
        };
        let mut ground = Vec::with_capacity(theory.num_assertions());
        for assertion in theory.assertions() {
            ground.push(expander.expand(assertion, &mut Vec::new())?);
        }

        let n = expander.ints.len() as i64;
        let lo = expander.literals.iter().copied().min().unwrap_or(0) - n;
        let hi = expander.literals.iter().copied().max().unwrap_or(0) + n;

        let mut cnf = Cnf::new();
        let top = cnf.new_bvar().true_lit();
        cnf.add_clause([top]);

        let mut atom_keys: Vec<(Key, usize)> = expander.atoms.into_iter().collect();
        atom_keys.sort_by_key(|(_, i)| *i);
        let atoms: Vec<(Key, Lit)> = atom_keys
            .into_iter()
            .map(|(key, _)| (key, cnf.new_bvar().true_lit()))
            .collect();

        let mut windows = vec![(lo, hi); expander.ints.len()];
        for f in &ground {
            tighten(f, &mut windows);
        }

        let mut ints: Vec<(Key, usize)> = expander.ints.into_iter().collect();
        ints.sort_by_key(|(_, i)| *i);
        let ints = ints
            .into_iter()
            .map(|(key, i)| {
                let (lo, mut hi) = windows[i];
                if lo > hi {
                    // contradictory bounds
                    cnf.add_clause([!top]);
                    hi = lo;
                }
                let bits: Vec<Lit> = (lo..hi).map(|_| cnf.new_bvar().true_lit()).collect();
                for w in bits.windows(2) {
                    cnf.add_clause([!w[0], w[1]]);
                }
                (key, OrderVar { lo, hi, bits })
            })
            .collect();

        let mut grounding = Grounding {
            cnf,
            top,
            universe,
            atoms,
            ints,
            cmp_cache: HashMap::new(),
        };
        for f in &ground {
            grounding.assert(f);
        }
        tracing::debug!(
            "Grounded over {} individuals: {} boolean atoms, {} integer terms in [{lo}, {hi}], {} variables, {} clauses",
            grounding.universe.len(),
            grounding.atoms.len(),
            grounding.ints.len(),
            grounding.cnf.num_vars(),
            grounding.cnf.num_clauses()
        );
        Ok(grounding)
    }

    pub fn cnf(&self) -> &Cnf {
        &self.cnf
    }

    /// Reads back the ground applications whose arguments are all named individuals.
    pub fn interpretation(&self, values: &[bool]) -> Interpretation {
        let named = |args: &[Elem]| args.iter().map(|&e| self.universe[e]).collect::<Option<Vec<FunId>>>();
        let mut interpretation = Interpretation::new();
        for ((f, args), lit) in &self.atoms {
            if let Some(args) = named(args) {
                let value = lit.holds_if(values.get(lit.variable().index()).copied().unwrap_or(false));
                interpretation.set(*f, args, Value::Bool(value));
            }
        }
        for ((f, args), var) in &self.ints {
            if let Some(args) = named(args) {
                interpretation.set(*f, args, Value::Int(var.value(values)));
            }
        }
        for &c in self.universe.iter().flatten() {
            interpretation.set(c, Vec::new(), Value::Vertex(c));
        }
        interpretation
    }

    fn assert(&mut self, f: &GFormula) {
        match f {
            GFormula::And(fs) => {
                for sub in fs {
                    self.assert(sub);
                }
            }
            GFormula::Or(fs) => {
                let clause: Vec<Lit> = fs.iter().map(|sub| self.lit(sub)).collect();
                self.cnf.add_clause(clause);
            }
            _ => {
                let l = self.lit(f);
                self.cnf.add_clause([l]);
            }
        }
    }

    /// Literal equivalent to `f`.
    fn lit(&mut self, f: &GFormula) -> Lit {
        match f {
            GFormula::Const(true) => self.top,
            GFormula::Const(false) => !self.top,
            GFormula::Atom(i) => self.atoms[*i].1,
            GFormula::Not(sub) => self.lit(sub).not(),
            GFormula::And(fs) => {
                let lits: Vec<Lit> = fs.iter().map(|sub| self.lit(sub)).collect();
                self.and(lits)
            }
            GFormula::Or(fs) => {
                let lits: Vec<Lit> = fs.iter().map(|sub| self.lit(sub)).collect();
                self.or(lits)
            }
            GFormula::Cmp(op, a, b) => match op {
                CmpOp::Le => self.le(*a, *b, 0),
                CmpOp::Lt => self.le(*a, *b, -1),
                CmpOp::Eq => self.eq(*a, *b),
                CmpOp::Ne => !self.eq(*a, *b),
            },
        }
    }

    /// Fresh literal `r <=> AND(lits)`, or an existing literal when the conjunction simplifies.
    fn and(&mut self, mut lits: Vec<Lit>) -> Lit {
        lits.retain(|&l| l != self.top);
        lits.sort();
        lits.dedup();
        if lits.contains(&!self.top) || lits.windows(2).any(|w| w[0] == !w[1]) {
            return !self.top;
        }
        match lits.as_slice() {
            [] => self.top,
            [single] => *single,
            _ => {
                let r = self.cnf.new_bvar().true_lit();
                let mut long = Vec::with_capacity(lits.len() + 1);
                long.push(r);
                for &l in &lits {
                    self.cnf.add_clause([!r, l]);
                    long.push(!l);
                }
                self.cnf.add_clause(long);
                r
            }
        }
    }

    fn or(&mut self, lits: Vec<Lit>) -> Lit {
        !self.and(lits.into_iter().map(|l| !l).collect())
    }

    fn eq(&mut self, a: GTerm, b: GTerm) -> Lit {
        match (a, b) {
            (GTerm::Elem(x), GTerm::Elem(y)) => self.constant(x == y),
            _ => {
                let ab = self.le(a, b, 0);
                let ba = self.le(b, a, 0);
                self.and(vec![ab, ba])
            }
        }
    }

    /// Literal for `a <= b + offset` over integer terms.
    fn le(&mut self, a: GTerm, b: GTerm, offset: i64) -> Lit {
        let top = self.top;
        match (a, b) {
            (GTerm::Int(x), GTerm::Int(y)) => self.constant(x <= y + offset),
            (GTerm::App(i), GTerm::Int(y)) => self.ints[i].1.leq(y + offset, top),
            // x <= b + offset  <=>  !(b <= x - offset - 1)
            (GTerm::Int(x), GTerm::App(j)) => !self.ints[j].1.leq(x - offset - 1, top),
            (GTerm::App(i), GTerm::App(j)) if i == j => self.constant(0 <= offset),
            (GTerm::App(i), GTerm::App(j)) => {
                if let Some(&l) = self.cmp_cache.get(&(i, j, offset)) {
                    return l;
                }
                // forall c.  b <= c  =>  a <= c + offset
                let (lo, hi) = (self.ints[j].1.lo, self.ints[j].1.hi);
                let mut conjuncts = Vec::with_capacity((hi - lo + 1) as usize);
                for c in lo..=hi {
                    let b_le = self.ints[j].1.leq(c, top);
                    let a_le = self.ints[i].1.leq(c + offset, top);
                    conjuncts.push(self.or(vec![!b_le, a_le]));
                }
                let l = self.and(conjuncts);
                self.cmp_cache.insert((i, j, offset), l);
                l
            }
            // ill-sorted comparisons are rejected during expansion
            _ => unreachable!("comparison between a vertex and an integer"),
        }
    }

    fn constant(&self, value: bool) -> Lit {
        if value { self.top } else { !self.top }
    }
}

/// Narrows the window of each integer application to the bounds that `f` asserts
/// unconditionally, i.e. comparisons with a literal that are not under a disjunction or negation.
fn tighten(f: &GFormula, windows: &mut [(i64, i64)]) {
    let (i, lower, upper) = match f {
        GFormula::And(fs) => {
            for sub in fs {
                tighten(sub, windows);
            }
            return;
        }
        GFormula::Cmp(op, a, b) => match (op, *a, *b) {
            (CmpOp::Le, GTerm::App(i), GTerm::Int(y)) => (i, i64::MIN, y),
            (CmpOp::Lt, GTerm::App(i), GTerm::Int(y)) => (i, i64::MIN, y - 1),
            (CmpOp::Le, GTerm::Int(x), GTerm::App(i)) => (i, x, i64::MAX),
            (CmpOp::Lt, GTerm::Int(x), GTerm::App(i)) => (i, x + 1, i64::MAX),
            (CmpOp::Eq, GTerm::App(i), GTerm::Int(y)) | (CmpOp::Eq, GTerm::Int(y), GTerm::App(i)) => (i, y, y),
            _ => return,
        },
        _ => return,
    };
    let (lo, hi) = windows[i];
    windows[i] = (lo.max(lower), hi.min(upper));
}

/// Expansion of quantifiers and collection of the ground applications.
struct Expander<'a> {
    theory: &'a Theory,
    universe: &'a [Option<FunId>],
    elems: HashMap<FunId, Elem>,
    atoms: HashMap<Key, usize>,
    ints: HashMap<Key, usize>,
    literals: Vec<i64>,
}

impl Expander<'_> {
    fn unsupported(&self, what: impl ToString) -> SolverError {
        SolverError::Unsupported(what.to_string())
    }

    fn expand(&mut self, f: &Formula, env: &mut Vec<(Var, Elem)>) -> Result<GFormula, SolverError> {
        Ok(match f {
            Formula::True => GFormula::Const(true),
            Formula::False => GFormula::Const(false),
            Formula::Pred(p, args) => {
                let theory = self.theory;
                let decl = theory.signature.decl(*p);
                if decl.ret != Sort::Bool {
                    return Err(self.unsupported(format!("{} is not a predicate", decl.name)));
                }
                let key = (*p, self.elements(args, env)?);
                let next = self.atoms.len();
                GFormula::Atom(*self.atoms.entry(key).or_insert(next))
            }
            Formula::Not(sub) => GFormula::Not(Box::new(self.expand(sub, env)?)),
            Formula::And(fs) => GFormula::And(fs.iter().map(|sub| self.expand(sub, env)).collect::<Result<_, _>>()?),
            Formula::Or(fs) => GFormula::Or(fs.iter().map(|sub| self.expand(sub, env)).collect::<Result<_, _>>()?),
            Formula::Implies(a, b) => {
                GFormula::Or(vec![GFormula::Not(Box::new(self.expand(a, env)?)), self.expand(b, env)?])
            }
            Formula::Cmp(op, a, b) => {
                let a = self.term(a, env)?;
                let b = self.term(b, env)?;
                let a_is_elem = matches!(a, GTerm::Elem(_));
                let b_is_elem = matches!(b, GTerm::Elem(_));
                if a_is_elem != b_is_elem {
                    return Err(self.unsupported("comparison between a vertex and an integer"));
                }
                if a_is_elem && !matches!(op, CmpOp::Eq | CmpOp::Ne) {
                    return Err(self.unsupported("ordering of vertices"));
                }
                GFormula::Cmp(*op, a, b)
            }
            Formula::Distinct(ts) => {
                let ts = ts.iter().map(|t| self.term(t, env)).collect::<Result<Vec<_>, _>>()?;
                let mut pairs = Vec::new();
                for (i, &a) in ts.iter().enumerate() {
                    for &b in &ts[i + 1..] {
                        if matches!(a, GTerm::Elem(_)) != matches!(b, GTerm::Elem(_)) {
                            return Err(self.unsupported("comparison between a vertex and an integer"));
                        }
                        pairs.push(GFormula::Cmp(CmpOp::Ne, a, b));
                    }
                }
                GFormula::And(pairs)
            }
            Formula::ForAll(vars, body) => {
                if let Some((_, sort)) = vars.iter().find(|(_, s)| *s != Sort::Vertex) {
                    return Err(self.unsupported(format!("quantification over {sort:?}")));
                }
                let mut instances = Vec::new();
                self.instantiate(vars, body, env, &mut instances)?;
                GFormula::And(instances)
            }
        })
    }

    /// Pushes to `out` the instance of `body` for every assignment of `vars` to individuals.
    fn instantiate(
        &mut self,
        vars: &[(Var, Sort)],
        body: &Formula,
        env: &mut Vec<(Var, Elem)>,
        out: &mut Vec<GFormula>,
    ) -> Result<(), SolverError> {
        match vars.split_first() {
            None => out.push(self.expand(body, env)?),
            Some(((var, _), rest)) => {
                for e in 0..self.universe.len() {
                    env.push((*var, e));
                    let res = self.instantiate(rest, body, env, out);
                    env.pop();
                    res?;
                }
            }
        }
        Ok(())
    }

    fn elements(&mut self, args: &[Term], env: &[(Var, Elem)]) -> Result<Vec<Elem>, SolverError> {
        args.iter()
            .map(|a| match self.term(a, env)? {
                GTerm::Elem(e) => Ok(e),
                _ => Err(self.unsupported("symbols with non-vertex arguments")),
            })
            .collect()
    }

    fn term(&mut self, t: &Term, env: &[(Var, Elem)]) -> Result<GTerm, SolverError> {
        match t {
            Term::Var(v) => env
                .iter()
                .rev()
                .find(|(bound, _)| bound == v)
                .map(|&(_, e)| GTerm::Elem(e))
                .ok_or_else(|| self.unsupported(format!("free variable ?x{}", v.0))),
            Term::Int(i) => {
                if i.unsigned_abs() > MAX_LITERAL as u64 {
                    return Err(self.unsupported(format!("integer literal {i}")));
                }
                self.literals.push(*i);
                Ok(GTerm::Int(*i))
            }
            Term::App(f, args) => {
                let theory = self.theory;
                let decl = theory.signature.decl(*f);
                match decl.ret {
                    Sort::Vertex if args.is_empty() => match self.elems.get(f) {
                        Some(&e) => Ok(GTerm::Elem(e)),
                        None => Err(self.unsupported(format!("unknown constant {}", decl.name))),
                    },
                    Sort::Vertex => Err(self.unsupported(format!("vertex-valued function {}", decl.name))),
                    Sort::Bool => Err(self.unsupported(format!("boolean term {}", decl.name))),
                    Sort::Int => {
                        let key = (*f, self.elements(args, env)?);
                        let next = self.ints.len();
                        Ok(GTerm::App(*self.ints.entry(key).or_insert(next)))
                    }
                }
            }
        }
    }
}
