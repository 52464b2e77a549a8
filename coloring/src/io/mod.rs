//! Graph files.

pub mod col;
pub mod dot;

use crate::errors::ParseError;
pub use dot::DotGraph;
use std::path::Path;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Format {
    Dot,
    /// DIMACS graph format
    Col,
}

impl Format {
    /// Format suggested by the extension of `path`: `.col` files are DIMACS, anything else is DOT.
    pub fn of_path(path: &Path) -> Format {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("col") => Format::Col,
            _ => Format::Dot,
        }
    }
}

/// Loads a graph file as a DOT document. DIMACS graphs are converted to plain DOT documents.
pub fn read_file(path: &Path, format: Format) -> Result<DotGraph, ParseError> {
    tracing::debug!("reading {} as {format:?}", path.display());
    match format {
        Format::Dot => {
            let input = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
                path: path.display().to_string(),
                source,
            })?;
            DotGraph::parse(&input)
        }
        Format::Col => col::from_file(path).map(|graph| DotGraph::from_graph(&graph)),
    }
}
