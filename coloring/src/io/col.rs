//! Reader for the DIMACS graph format (`.col` files).
//!
//! The file must contain a problem line `p edge <n> <m>` followed by newline separated edges, e.g.:
//! ```text
//! c a path of length 2
//! p edge 3 2
//! e 1 2
//! e 2 3
//! ```
//! Vertices are named `1` to `n`. Lines starting with `c` are comments.

use crate::errors::ParseError;
use crate::graph::Graph;
use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

fn read_lines(filename: &Path) -> io::Result<io::Lines<io::BufReader<File>>> {
    let file = File::open(filename)?;
    Ok(io::BufReader::new(file).lines())
}

pub fn from_file(path: &Path) -> Result<Graph, ParseError> {
    let io_error = |source| ParseError::Io {
        path: path.display().to_string(),
        source,
    };
    let lines = read_lines(path).map_err(io_error)?;
    let mut reader = ColReader::default();
    for (i, line) in lines.enumerate() {
        reader.line(i + 1, &line.map_err(io_error)?)?;
    }
    reader.finish()
}

#[derive(Default)]
struct ColReader {
    graph: Graph,
    /// Number of vertices and edges announced by the problem line
    header: Option<(usize, usize)>,
    last_line: usize,
}

impl ColReader {
    fn line(&mut self, line_number: usize, line: &str) -> Result<(), ParseError> {
        self.last_line = line_number;
        let mut fields = line.split_whitespace();
        match fields.next() {
            None | Some("c") => Ok(()),
            Some(c) if c.starts_with('c') => Ok(()),
            Some("p") => {
                if self.header.is_some() {
                    return Err(ParseError::syntax(line_number, "duplicated problem line"));
                }
                match fields.next() {
                    Some("edge") | Some("col") => {}
                    _ => return Err(ParseError::syntax(line_number, "expected 'p edge <vertices> <edges>'")),
                }
                let n = number(fields.next(), line_number)?;
                let m = number(fields.next(), line_number)?;
                for v in 1..=n {
                    self.graph.add_vertex(v.to_string());
                }
                self.header = Some((n, m));
                Ok(())
            }
            Some("e") => {
                let Some((n, _)) = self.header else {
                    return Err(ParseError::syntax(line_number, "edge before the problem line"));
                };
                let a = number(fields.next(), line_number)?;
                let b = number(fields.next(), line_number)?;
                for v in [a, b] {
                    if v == 0 || v > n {
                        return Err(ParseError::syntax(line_number, format!("vertex {v} is not in 1..={n}")));
                    }
                }
                self.graph.add_edge(a.to_string(), b.to_string());
                Ok(())
            }
            Some(other) => Err(ParseError::syntax(line_number, format!("unknown line type '{other}'"))),
        }
    }

    fn finish(self) -> Result<Graph, ParseError> {
        let Some((_, m)) = self.header else {
            return Err(ParseError::syntax(self.last_line.max(1), "missing problem line"));
        };
        if m != self.graph.num_edges() {
            tracing::warn!("{m} edges announced, {} distinct edges read", self.graph.num_edges());
        }
        Ok(self.graph)
    }
}

fn number(field: Option<&str>, line: usize) -> Result<usize, ParseError> {
    let field = field.ok_or_else(|| ParseError::syntax(line, "missing number"))?;
    field
        .parse::<usize>()
        .map_err(|e| ParseError::syntax(line, format!("invalid number '{field}': {e}")))
}
