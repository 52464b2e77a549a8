//! Reading and writing of graphs in the DOT language of Graphviz.
//!
//! Only the flat subset of the language is supported: node, edge and attribute statements.
//! Subgraphs, ports and HTML-like ids are rejected.

use crate::decode::ColorAssignment;
use crate::errors::ParseError;
use crate::graph::Graph;
use crate::palette::Palette;
use std::fmt::{Display, Formatter};

/// An ordered list of `key=value` attributes, where a later assignment of a key replaces the earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Target {
    Graph,
    Node,
    Edge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `key = value` at the graph level
    Assign(String, String),
    /// `graph [...]`, `node [...]` or `edge [...]`
    Defaults(Target, Attributes),
    Node(String, Attributes),
    /// An edge chain `a -- b -- c [...]`
    Edges(Vec<String>, Attributes),
}

/// A DOT document, kept statement by statement so that it can be written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotGraph {
    pub strict: bool,
    pub directed: bool,
    pub name: Option<String>,
    pub statements: Vec<Statement>,
}

impl DotGraph {
    /// A plain undirected document declaring every vertex and edge of `graph`.
    pub fn from_graph(graph: &Graph) -> Self {
        let mut statements: Vec<Statement> = graph
            .vertices()
            .map(|v| Statement::Node(graph.name(v).to_string(), Attributes::new()))
            .collect();
        statements.extend(graph.edges().map(|(a, b)| {
            Statement::Edges(
                vec![graph.name(a).to_string(), graph.name(b).to_string()],
                Attributes::new(),
            )
        }));
        DotGraph {
            strict: false,
            directed: false,
            name: None,
            statements,
        }
    }

    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let tokens = tokenize(input)?;
        Parser { tokens, pos: 0 }.graph()
    }

    /// The undirected graph described by the document. Vertices are numbered in order of first appearance.
    pub fn to_graph(&self) -> Graph {
        let mut graph = Graph::new();
        for statement in &self.statements {
            match statement {
                Statement::Node(id, _) => {
                    graph.add_vertex(id.as_str());
                }
                Statement::Edges(chain, _) => {
                    for pair in chain.windows(2) {
                        graph.add_edge(pair[0].as_str(), pair[1].as_str());
                    }
                }
                Statement::Assign(..) | Statement::Defaults(..) => {}
            }
        }
        graph
    }

    /// Displays the document followed by a node statement giving each vertex its color in `palette`.
    pub fn colored<'a>(
        &'a self,
        graph: &'a Graph,
        assignment: &'a ColorAssignment,
        palette: &'a Palette,
    ) -> impl Display + 'a {
        Colored {
            document: self,
            graph,
            assignment,
            palette,
        }
    }

    fn write_body(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.strict {
            write!(f, "strict ")?;
        }
        write!(f, "{}", if self.directed { "digraph" } else { "graph" })?;
        if let Some(name) = &self.name {
            write!(f, " {}", Id(name))?;
        }
        writeln!(f, " {{")?;
        let edge_op = if self.directed { " -> " } else { " -- " };
        for statement in &self.statements {
            write!(f, "  ")?;
            match statement {
                Statement::Assign(key, value) => write!(f, "{}={}", Id(key), Id(value))?,
                Statement::Defaults(target, attributes) => {
                    let keyword = match target {
                        Target::Graph => "graph",
                        Target::Node => "node",
                        Target::Edge => "edge",
                    };
                    write!(f, "{keyword}{}", Attrs(attributes))?;
                }
                Statement::Node(id, attributes) => write!(f, "{}{}", Id(id), Attrs(attributes))?,
                Statement::Edges(chain, attributes) => {
                    for (i, id) in chain.iter().enumerate() {
                        if i > 0 {
                            write!(f, "{edge_op}")?;
                        }
                        write!(f, "{}", Id(id))?;
                    }
                    write!(f, "{}", Attrs(attributes))?;
                }
            }
            writeln!(f, ";")?;
        }
        Ok(())
    }
}

impl Display for DotGraph {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.write_body(f)?;
        writeln!(f, "}}")
    }
}

struct Colored<'a> {
    document: &'a DotGraph,
    graph: &'a Graph,
    assignment: &'a ColorAssignment,
    palette: &'a Palette,
}

impl Display for Colored<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.document.write_body(f)?;
        for (v, c) in self.assignment.iter() {
            if let Some(color) = self.palette.color(c) {
                let mut attributes = Attributes::new();
                attributes.set("fillcolor", color);
                attributes.set("style", "filled");
                writeln!(f, "  {}{};", Id(self.graph.name(v)), Attrs(&attributes))?;
            }
        }
        writeln!(f, "}}")
    }
}

const KEYWORDS: [&str; 6] = ["strict", "graph", "digraph", "node", "edge", "subgraph"];

fn is_id_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_id_char(c: char) -> bool {
    is_id_start(c) || c.is_ascii_digit()
}

fn is_numeral(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let (int, frac) = match digits.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (digits, None),
    };
    let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
    all_digits(int) && frac.is_none_or(all_digits) && (!int.is_empty() || frac.is_some_and(|p| !p.is_empty()))
}

/// An id, quoted only when needed.
struct Id<'a>(&'a str);

impl Display for Id<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = self.0;
        let plain = s.chars().next().is_some_and(is_id_start)
            && s.chars().all(is_id_char)
            && !KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(s));
        if plain || is_numeral(s) {
            write!(f, "{s}")
        } else {
            write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
        }
    }
}

struct Attrs<'a>(&'a Attributes);

impl Display for Attrs<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        write!(f, " [")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", Id(key), Id(value))?;
        }
        write!(f, "]")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Id(String),
    Strict,
    Graph,
    Digraph,
    Node,
    Edge,
    Subgraph,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Equal,
    Semi,
    Comma,
    /// `->` if true, `--` otherwise
    EdgeOp(bool),
}

fn keyword(word: &str) -> Option<Tok> {
    let tok = match word.to_ascii_lowercase().as_str() {
        "strict" => Tok::Strict,
        "graph" => Tok::Graph,
        "digraph" => Tok::Digraph,
        "node" => Tok::Node,
        "edge" => Tok::Edge,
        "subgraph" => Tok::Subgraph,
        _ => return None,
    };
    Some(tok)
}

fn tokenize(input: &str) -> Result<Vec<(Tok, usize)>, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let at = |i: usize| chars.get(i).copied();
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut i = 0;
    while let Some(c) = at(i) {
        match c {
            '\n' => {
                line += 1;
                i += 1;
            }
            c if c.is_whitespace() => i += 1,
            '#' => {
                while at(i).is_some_and(|c| c != '\n') {
                    i += 1;
                }
            }
            '/' if at(i + 1) == Some('/') => {
                while at(i).is_some_and(|c| c != '\n') {
                    i += 1;
                }
            }
            '/' if at(i + 1) == Some('*') => {
                let start = line;
                i += 2;
                loop {
                    match at(i) {
                        None => return Err(ParseError::syntax(start, "unterminated comment")),
                        Some('*') if at(i + 1) == Some('/') => {
                            i += 2;
                            break;
                        }
                        Some(c) => {
                            if c == '\n' {
                                line += 1;
                            }
                            i += 1;
                        }
                    }
                }
            }
            '{' | '}' | '[' | ']' | '=' | ';' | ',' => {
                let tok = match c {
                    '{' => Tok::LBrace,
                    '}' => Tok::RBrace,
                    '[' => Tok::LBracket,
                    ']' => Tok::RBracket,
                    '=' => Tok::Equal,
                    ';' => Tok::Semi,
                    _ => Tok::Comma,
                };
                tokens.push((tok, line));
                i += 1;
            }
            ':' => return Err(ParseError::Unsupported { line, what: "ports" }),
            '<' => return Err(ParseError::Unsupported { line, what: "HTML ids" }),
            '-' if at(i + 1) == Some('-') => {
                tokens.push((Tok::EdgeOp(false), line));
                i += 2;
            }
            '-' if at(i + 1) == Some('>') => {
                tokens.push((Tok::EdgeOp(true), line));
                i += 2;
            }
            '"' => {
                let start = line;
                let mut s = String::new();
                i += 1;
                loop {
                    match at(i) {
                        None => return Err(ParseError::syntax(start, "unterminated string")),
                        Some('"') => {
                            i += 1;
                            break;
                        }
                        Some('\\') => match at(i + 1) {
                            Some(escaped @ ('"' | '\\')) => {
                                s.push(escaped);
                                i += 2;
                            }
                            Some('\n') => {
                                line += 1;
                                i += 2;
                            }
                            Some(next) => {
                                s.push('\\');
                                s.push(next);
                                i += 2;
                            }
                            None => i += 1,
                        },
                        Some(c) => {
                            if c == '\n' {
                                line += 1;
                            }
                            s.push(c);
                            i += 1;
                        }
                    }
                }
                tokens.push((Tok::Id(s), line));
            }
            c if is_id_start(c) => {
                let start = i;
                while at(i).is_some_and(is_id_char) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push((keyword(&word).unwrap_or(Tok::Id(word)), line));
            }
            c if c.is_ascii_digit() || c == '.' || c == '-' => {
                let start = i;
                i += 1;
                while at(i).is_some_and(|c| c.is_ascii_digit() || c == '.') {
                    i += 1;
                }
                let numeral: String = chars[start..i].iter().collect();
                if !is_numeral(&numeral) {
                    return Err(ParseError::syntax(line, format!("invalid numeral '{numeral}'")));
                }
                tokens.push((Tok::Id(numeral), line));
            }
            c => return Err(ParseError::syntax(line, format!("unexpected character '{c}'"))),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Tok, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or(self.tokens.last())
            .map(|(_, l)| *l)
            .unwrap_or(1)
    }

    fn next(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        self.pos += 1;
        tok
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(tok) => ParseError::syntax(self.line(), format!("expected {expected}, got {tok:?}")),
            None => ParseError::syntax(self.line(), format!("expected {expected}, got end of input")),
        }
    }

    fn id(&mut self, expected: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(Tok::Id(_)) => match self.next() {
                Some(Tok::Id(s)) => Ok(s),
                _ => Err(self.error(expected)),
            },
            Some(Tok::Subgraph) | Some(Tok::LBrace) => Err(self.subgraph()),
            _ => Err(self.error(expected)),
        }
    }

    fn subgraph(&self) -> ParseError {
        ParseError::Unsupported {
            line: self.line(),
            what: "subgraphs",
        }
    }

    fn graph(mut self) -> Result<DotGraph, ParseError> {
        let strict = self.eat(&Tok::Strict);
        let directed = match self.peek() {
            Some(Tok::Graph) => false,
            Some(Tok::Digraph) => true,
            _ => return Err(self.error("'graph' or 'digraph'")),
        };
        self.pos += 1;
        let name = match self.peek() {
            Some(Tok::Id(_)) => Some(self.id("graph name")?),
            _ => None,
        };
        if !self.eat(&Tok::LBrace) {
            return Err(self.error("'{'"));
        }
        let mut statements = Vec::new();
        loop {
            match self.peek() {
                Some(Tok::RBrace) => {
                    self.pos += 1;
                    break;
                }
                Some(Tok::Semi) => self.pos += 1,
                Some(Tok::Subgraph) | Some(Tok::LBrace) => return Err(self.subgraph()),
                Some(Tok::Graph) | Some(Tok::Node) | Some(Tok::Edge) => {
                    let target = match self.next() {
                        Some(Tok::Graph) => Target::Graph,
                        Some(Tok::Node) => Target::Node,
                        _ => Target::Edge,
                    };
                    if self.peek() != Some(&Tok::LBracket) {
                        return Err(self.error("'['"));
                    }
                    statements.push(Statement::Defaults(target, self.attributes()?));
                }
                Some(Tok::Id(_)) => statements.push(self.statement(directed)?),
                _ => return Err(self.error("a statement or '}'")),
            }
        }
        if self.peek().is_some() {
            return Err(self.error("end of input"));
        }
        Ok(DotGraph {
            strict,
            directed,
            name,
            statements,
        })
    }

    fn statement(&mut self, directed: bool) -> Result<Statement, ParseError> {
        let first = self.id("a node id")?;
        if self.eat(&Tok::Equal) {
            let value = self.id("a value")?;
            return Ok(Statement::Assign(first, value));
        }
        let mut chain = vec![first];
        while let Some(&Tok::EdgeOp(op_directed)) = self.peek() {
            if op_directed != directed {
                let (op, kind) = if op_directed { ("->", "undirected") } else { ("--", "directed") };
                return Err(ParseError::syntax(self.line(), format!("'{op}' in a {kind} graph")));
            }
            self.pos += 1;
            chain.push(self.id("a node id")?);
        }
        let attributes = self.attributes()?;
        if chain.len() == 1 {
            let id = chain.pop().unwrap_or_default();
            Ok(Statement::Node(id, attributes))
        } else {
            Ok(Statement::Edges(chain, attributes))
        }
    }

    /// Zero or more bracketed attribute lists.
    fn attributes(&mut self) -> Result<Attributes, ParseError> {
        let mut attributes = Attributes::new();
        while self.eat(&Tok::LBracket) {
            loop {
                match self.peek() {
                    Some(Tok::RBracket) => {
                        self.pos += 1;
                        break;
                    }
                    Some(Tok::Comma) | Some(Tok::Semi) => self.pos += 1,
                    Some(Tok::Id(_)) => {
                        let key = self.id("an attribute name")?;
                        if !self.eat(&Tok::Equal) {
                            return Err(self.error("'='"));
                        }
                        let value = self.id("an attribute value")?;
                        attributes.set(key, value);
                    }
                    _ => return Err(self.error("an attribute or ']'")),
                }
            }
        }
        Ok(attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_flat_graph() {
        let input = r##"
            /* a small graph */
            strict graph G {
                rankdir = LR;
                node [shape=circle, color="#000000"]
                a [label="vertex a"];
                a -- b -- c [weight=2]
                // trailing comment
                # preprocessor line
                d
            }
        "##;
        let dot = DotGraph::parse(input).unwrap();
        assert!(dot.strict);
        assert!(!dot.directed);
        assert_eq!(dot.name.as_deref(), Some("G"));
        assert_eq!(dot.statements.len(), 5);
        assert_eq!(dot.statements[0], Statement::Assign("rankdir".to_string(), "LR".to_string()));
        let Statement::Edges(chain, attrs) = &dot.statements[3] else {
            panic!("edge chain expected")
        };
        assert_eq!(chain, &["a", "b", "c"]);
        assert_eq!(attrs.get("weight"), Some("2"));

        let g = dot.to_graph();
        assert_eq!(g.num_vertices(), 4);
        assert_eq!(g.num_edges(), 2);
        let (a, b, c, d) = (g.find("a").unwrap(), g.find("b").unwrap(), g.find("c").unwrap(), g.find("d").unwrap());
        assert!(g.contains_edge(b, a));
        assert!(g.contains_edge(b, c));
        assert!(!g.contains_edge(a, c));
        assert_eq!(g.degree(d), 0);
    }

    #[test]
    fn directed_edges_are_undirected() {
        let dot = DotGraph::parse("digraph { 1 -> 2; 2 -> 1; \"x y\" -> 1 }").unwrap();
        assert!(dot.directed);
        let g = dot.to_graph();
        assert_eq!(g.num_vertices(), 3);
        assert_eq!(g.num_edges(), 2);
        assert!(g.find("x y").is_some());
    }

    #[test]
    fn rejected_inputs() {
        let unsupported = |input: &str| matches!(DotGraph::parse(input), Err(ParseError::Unsupported { .. }));
        assert!(unsupported("graph { subgraph s { a } }"));
        assert!(unsupported("graph { a -- { b c } }"));
        assert!(unsupported("graph { <b>x</b> }"));
        assert!(unsupported("graph { a:n -- b }"));

        let syntax = |input: &str| matches!(DotGraph::parse(input), Err(ParseError::Syntax { .. }));
        assert!(syntax("graph { a -> b }"));
        assert!(syntax("digraph { a -- b }"));
        assert!(syntax("graph { a -- b "));
        assert!(syntax("graph { a [label] }"));
        assert!(syntax("graph { \"a }"));
        assert!(syntax("graph { } extra"));
        assert!(syntax("{ a }"));
    }

    #[test]
    fn syntax_errors_report_lines() {
        match DotGraph::parse("graph {\n a -- b\n c -- \n}") {
            Err(ParseError::Syntax { line, .. }) => assert_eq!(line, 4),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn write_and_reparse() {
        let input = "graph \"my graph\" { a [label=\"say \\\"hi\\\"\"]; a -- b; b -- \"-3.5\"; edge [color=red] }";
        let dot = DotGraph::parse(input).unwrap();
        let written = dot.to_string();
        assert_eq!(DotGraph::parse(&written).unwrap(), dot);
    }

    #[test]
    fn backslashes_in_names() {
        let mut g = Graph::new();
        g.add_edge("a\\", "b\\\"c");
        g.add_vertex("d\\\n");
        let written = DotGraph::from_graph(&g).to_string();
        assert!(written.contains("\"a\\\\\" -- \"b\\\\\\\"c\""), "{written}");
        let reparsed = DotGraph::parse(&written).unwrap().to_graph();
        assert_eq!(reparsed.num_edges(), 1);
        assert!(reparsed.find("a\\").is_some());
        assert!(reparsed.find("b\\\"c").is_some());
        assert!(reparsed.find("d\\\n").is_some());
    }

    #[test]
    fn colored_output() {
        let dot = DotGraph::parse("graph { a -- b; node [shape=box] }").unwrap();
        let g = dot.to_graph();
        let assignment = ColorAssignment::new(vec![1, 0]);
        let palette = Palette::pastel(2);
        let written = dot.colored(&g, &assignment, &palette).to_string();
        assert_eq!(
            written,
            "graph {\n  a -- b;\n  node [shape=box];\n  a [fillcolor=\"#ffb482\", style=filled];\n  b [fillcolor=\"#a1c9f4\", style=filled];\n}\n"
        );
        let reparsed = DotGraph::parse(&written).unwrap().to_graph();
        assert_eq!(reparsed.num_vertices(), 2);
        assert_eq!(reparsed.num_edges(), 1);
    }

    #[test]
    fn from_graph_keeps_isolated_vertices() {
        let mut g = Graph::new();
        g.add_vertex("lonely");
        g.add_edge("1", "2");
        let dot = DotGraph::from_graph(&g);
        assert_eq!(dot.to_string(), "graph {\n  lonely;\n  1;\n  2;\n  1 -- 2;\n}\n");
    }
}
