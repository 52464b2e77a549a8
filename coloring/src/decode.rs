//! Interpretation of a solver model as a coloring of the graph.

use crate::encode::{ColorCount, Encoding, FunctionSymbols, Metadata, OneHotTable};
use crate::errors::DecodeError;
use crate::graph::{Graph, VertexId};
use crate::solver::{BoolModel, Interpretation, Model, Value};

/// A color index in `[0, k)` for every vertex of a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorAssignment {
    colors: Vec<u32>,
}

impl ColorAssignment {
    pub fn new(colors: Vec<u32>) -> Self {
        ColorAssignment { colors }
    }

    pub fn color_of(&self, v: VertexId) -> u32 {
        self.colors[v.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (VertexId, u32)> + '_ {
        self.colors.iter().enumerate().map(|(i, &c)| (VertexId::from_index(i), c))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Number of distinct colors in use.
    pub fn num_colors_used(&self) -> usize {
        let mut used: Vec<u32> = self.colors.clone();
        used.sort_unstable();
        used.dedup();
        used.len()
    }

    /// Verifies that the assignment is a proper `k`-coloring of `graph`.
    pub fn check(&self, graph: &Graph, k: ColorCount) -> Result<(), DecodeError> {
        if self.colors.len() != graph.num_vertices() {
            return Err(DecodeError::Incomplete(format!(
                "{} colors for {} vertices",
                self.colors.len(),
                graph.num_vertices()
            )));
        }
        for (v, c) in self.iter() {
            if c >= k.get() {
                return Err(DecodeError::OutOfRange {
                    vertex: graph.name(v).to_string(),
                    value: c as i64,
                    k: k.get(),
                });
            }
        }
        for (a, b) in graph.edges() {
            if self.color_of(a) == self.color_of(b) {
                return Err(DecodeError::Conflict(graph.name(a).to_string(), graph.name(b).to_string()));
            }
        }
        Ok(())
    }
}

/// Extracts the coloring encoded by `model`.
///
/// The decoder never picks a color arbitrarily: a vertex without exactly one color in the model
/// is reported as a [`DecodeError`].
pub fn decode(graph: &Graph, encoding: &Encoding, model: &Model) -> Result<ColorAssignment, DecodeError> {
    match (&encoding.metadata, model) {
        (Metadata::OneHot(table), Model::Boolean(values)) => decode_one_hot(graph, table, values),
        (Metadata::Function(symbols), Model::Function(interpretation)) => {
            decode_function(graph, encoding.k, symbols, interpretation)
        }
        _ => Err(DecodeError::ModelKind),
    }
}

fn decode_one_hot(graph: &Graph, table: &OneHotTable, model: &BoolModel) -> Result<ColorAssignment, DecodeError> {
    if table.num_vertices() != graph.num_vertices() {
        return Err(DecodeError::Incomplete("encoding of another graph".to_string()));
    }
    let mut colors = Vec::with_capacity(graph.num_vertices());
    for v in graph.vertices() {
        let mut color = None;
        for (c, &var) in table.indicators(v).iter().enumerate() {
            match model.value(var) {
                Some(true) if color.is_some() => return Err(DecodeError::SeveralColors(graph.name(v).to_string())),
                Some(true) => color = Some(c as u32),
                Some(false) => {}
                None => return Err(DecodeError::MissingValue(graph.name(v).to_string())),
            }
        }
        colors.push(color.ok_or_else(|| DecodeError::NoColor(graph.name(v).to_string()))?);
    }
    Ok(ColorAssignment { colors })
}

fn decode_function(
    graph: &Graph,
    k: ColorCount,
    symbols: &FunctionSymbols,
    interpretation: &Interpretation,
) -> Result<ColorAssignment, DecodeError> {
    if symbols.constants.len() != graph.num_vertices() {
        return Err(DecodeError::Incomplete("encoding of another graph".to_string()));
    }
    let mut colors = Vec::with_capacity(graph.num_vertices());
    for v in graph.vertices() {
        let name = || graph.name(v).to_string();
        let constant = symbols.constants[v.index()];
        let value = match interpretation.eval(symbols.color, &[constant]) {
            Some(Value::Int(i)) => i,
            Some(_) => return Err(DecodeError::NotAnInteger(name())),
            None => return Err(DecodeError::MissingValue(name())),
        };
        match u32::try_from(value) {
            Ok(c) if c < k.get() => colors.push(c),
            _ => {
                return Err(DecodeError::OutOfRange {
                    vertex: name(),
                    value,
                    k: k.get(),
                });
            }
        }
    }
    Ok(ColorAssignment { colors })
}
