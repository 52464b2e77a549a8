//! A small many-sorted first-order language with uninterpreted symbols, integer comparisons
//! and universal quantification.

use std::fmt::{Display, Formatter, Write};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Sort {
    /// Uninterpreted sort of graph vertices.
    Vertex,
    Int,
    Bool,
}

impl Sort {
    fn smt2(self) -> &'static str {
        match self {
            Sort::Vertex => "Vertex",
            Sort::Int => "Int",
            Sort::Bool => "Bool",
        }
    }
}

/// Handle to a function symbol declared in a [`Signature`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunId(u32);

impl FunId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct FunDecl {
    pub name: String,
    pub args: Vec<Sort>,
    pub ret: Sort,
}

#[derive(Debug, Clone, Default)]
pub struct Signature {
    decls: Vec<FunDecl>,
}

impl Signature {
    pub fn declare(&mut self, name: impl Into<String>, args: Vec<Sort>, ret: Sort) -> FunId {
        let id = FunId(self.decls.len() as u32);
        self.decls.push(FunDecl {
            name: name.into(),
            args,
            ret,
        });
        id
    }

    pub fn decl(&self, f: FunId) -> &FunDecl {
        &self.decls[f.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (FunId, &FunDecl)> + '_ {
        self.decls.iter().enumerate().map(|(i, d)| (FunId(i as u32), d))
    }

    /// Nullary symbols of the given sort, i.e. its named individuals.
    pub fn constants_of(&self, sort: Sort) -> impl Iterator<Item = FunId> + '_ {
        self.iter()
            .filter(move |(_, d)| d.args.is_empty() && d.ret == sort)
            .map(|(f, _)| f)
    }
}

/// A variable bound by a quantifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Var(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Var(Var),
    Int(i64),
    App(FunId, Vec<Term>),
}

impl Term {
    pub fn cst(f: FunId) -> Term {
        Term::App(f, Vec::new())
    }

    pub fn app(f: FunId, args: impl Into<Vec<Term>>) -> Term {
        Term::App(f, args.into())
    }
}

impl From<Var> for Term {
    fn from(v: Var) -> Self {
        Term::Var(v)
    }
}

impl From<i64> for Term {
    fn from(i: i64) -> Self {
        Term::Int(i)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Le,
    Lt,
    Eq,
    Ne,
}

impl CmpOp {
    fn smt2(self) -> &'static str {
        match self {
            CmpOp::Le => "<=",
            CmpOp::Lt => "<",
            CmpOp::Eq | CmpOp::Ne => "=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Formula {
    True,
    False,
    /// Application of a `Bool`-valued symbol.
    Pred(FunId, Vec<Term>),
    Not(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    Cmp(CmpOp, Term, Term),
    Distinct(Vec<Term>),
    ForAll(Vec<(Var, Sort)>, Box<Formula>),
}

pub fn pred(f: FunId, args: impl Into<Vec<Term>>) -> Formula {
    Formula::Pred(f, args.into())
}

pub fn not(f: Formula) -> Formula {
    Formula::Not(Box::new(f))
}

pub fn and(fs: impl Into<Vec<Formula>>) -> Formula {
    Formula::And(fs.into())
}

pub fn or(fs: impl Into<Vec<Formula>>) -> Formula {
    Formula::Or(fs.into())
}

pub fn implies(a: Formula, b: Formula) -> Formula {
    Formula::Implies(Box::new(a), Box::new(b))
}

pub fn leq(a: impl Into<Term>, b: impl Into<Term>) -> Formula {
    Formula::Cmp(CmpOp::Le, a.into(), b.into())
}

pub fn lt(a: impl Into<Term>, b: impl Into<Term>) -> Formula {
    Formula::Cmp(CmpOp::Lt, a.into(), b.into())
}

pub fn geq(a: impl Into<Term>, b: impl Into<Term>) -> Formula {
    leq(b, a)
}

pub fn eq(a: impl Into<Term>, b: impl Into<Term>) -> Formula {
    Formula::Cmp(CmpOp::Eq, a.into(), b.into())
}

pub fn neq(a: impl Into<Term>, b: impl Into<Term>) -> Formula {
    Formula::Cmp(CmpOp::Ne, a.into(), b.into())
}

pub fn forall(vars: impl Into<Vec<(Var, Sort)>>, body: Formula) -> Formula {
    Formula::ForAll(vars.into(), Box::new(body))
}

/// A signature together with a list of assertions, all of which must hold.
#[derive(Debug, Clone, Default)]
pub struct Theory {
    pub signature: Signature,
    assertions: Vec<Formula>,
}

impl Theory {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn assert(&mut self, f: Formula) {
        tracing::trace!("Asserting: {}", self.display(&f));
        self.assertions.push(f);
    }

    pub fn assertions(&self) -> &[Formula] {
        &self.assertions
    }

    pub fn num_assertions(&self) -> usize {
        self.assertions.len()
    }

    pub fn display<'a>(&'a self, f: &'a Formula) -> impl Display + 'a {
        Printed { sig: &self.signature, formula: f }
    }

    /// Renders the theory as an SMT-LIB 2 script querying the value of `queried(c)` for every
    /// given constant `c`.
    pub fn to_smt2(&self, queried: Option<(FunId, &[FunId])>) -> String {
        let mut out = String::new();
        let sig = &self.signature;
        // writing to a string cannot fail
        let _ = writeln!(out, "(set-logic UFLIA)");
        let _ = writeln!(out, "(declare-sort Vertex 0)");
        for (_, decl) in sig.iter() {
            let args = decl.args.iter().map(|s| s.smt2()).collect::<Vec<_>>().join(" ");
            let _ = writeln!(out, "(declare-fun {} ({}) {})", symbol(&decl.name), args, decl.ret.smt2());
        }
        for a in &self.assertions {
            let _ = writeln!(out, "(assert {})", self.display(a));
        }
        let _ = writeln!(out, "(check-sat)");
        if let Some((f, csts)) = queried.filter(|(_, csts)| !csts.is_empty()) {
            let name = symbol(&sig.decl(f).name);
            let terms = csts
                .iter()
                .map(|&c| format!("({} {})", name, symbol(&sig.decl(c).name)))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = writeln!(out, "(get-value ({terms}))");
        }
        out
    }
}

/// Formats a symbol as a valid SMT-LIB symbol, quoting it if necessary.
fn symbol(name: &str) -> String {
    const EXTRA: &str = "~!@$%^&*_-+=<>.?/";
    let simple = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || EXTRA.contains(c));
    if simple {
        name.to_string()
    } else {
        // `|` and `\` cannot appear in quoted symbols
        format!("|{}|", name.replace(['|', '\\'], "_"))
    }
}

struct Printed<'a> {
    sig: &'a Signature,
    formula: &'a Formula,
}

impl Printed<'_> {
    fn term(&self, t: &Term, f: &mut Formatter<'_>) -> std::fmt::Result {
        match t {
            Term::Var(v) => write!(f, "?x{}", v.0),
            Term::Int(i) if *i < 0 => write!(f, "(- {})", i.unsigned_abs()),
            Term::Int(i) => write!(f, "{i}"),
            Term::App(fun, args) => self.app(*fun, args, f),
        }
    }

    fn app(&self, fun: FunId, args: &[Term], f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = symbol(&self.sig.decl(fun).name);
        if args.is_empty() {
            return write!(f, "{name}");
        }
        write!(f, "({name}")?;
        for a in args {
            write!(f, " ")?;
            self.term(a, f)?;
        }
        write!(f, ")")
    }

    fn list(&self, head: &str, fs: &[Formula], f: &mut Formatter<'_>) -> std::fmt::Result {
        match fs {
            [] if head == "and" => write!(f, "true"),
            [] => write!(f, "false"),
            [single] => self.formula(single, f),
            _ => {
                write!(f, "({head}")?;
                for sub in fs {
                    write!(f, " ")?;
                    self.formula(sub, f)?;
                }
                write!(f, ")")
            }
        }
    }

    fn formula(&self, phi: &Formula, f: &mut Formatter<'_>) -> std::fmt::Result {
        match phi {
            Formula::True => write!(f, "true"),
            Formula::False => write!(f, "false"),
            Formula::Pred(p, args) => self.app(*p, args, f),
            Formula::Not(sub) => {
                write!(f, "(not ")?;
                self.formula(sub, f)?;
                write!(f, ")")
            }
            Formula::And(fs) => self.list("and", fs, f),
            Formula::Or(fs) => self.list("or", fs, f),
            Formula::Implies(a, b) => {
                write!(f, "(=> ")?;
                self.formula(a, f)?;
                write!(f, " ")?;
                self.formula(b, f)?;
                write!(f, ")")
            }
            Formula::Cmp(op, a, b) => {
                if *op == CmpOp::Ne {
                    write!(f, "(not ")?;
                }
                write!(f, "({} ", op.smt2())?;
                self.term(a, f)?;
                write!(f, " ")?;
                self.term(b, f)?;
                write!(f, ")")?;
                if *op == CmpOp::Ne {
                    write!(f, ")")?;
                }
                Ok(())
            }
            Formula::Distinct(ts) if ts.len() < 2 => write!(f, "true"),
            Formula::Distinct(ts) => {
                write!(f, "(distinct")?;
                for t in ts {
                    write!(f, " ")?;
                    self.term(t, f)?;
                }
                write!(f, ")")
            }
            Formula::ForAll(vars, body) => {
                write!(f, "(forall (")?;
                for (i, (v, sort)) in vars.iter().enumerate() {
                    if i != 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "(?x{} {})", v.0, sort.smt2())?;
                }
                write!(f, ") ")?;
                self.formula(body, f)?;
                write!(f, ")")
            }
        }
    }
}

impl Display for Printed<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.formula(self.formula, f)
    }
}
