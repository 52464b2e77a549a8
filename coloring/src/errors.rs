use std::io;
use thiserror::Error;

/// Failure to read a graph description.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("line {line}: {what} are not supported")]
    Unsupported { line: usize, what: &'static str },
}

impl ParseError {
    pub fn syntax(line: usize, message: impl ToString) -> Self {
        ParseError::Syntax {
            line,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidParameter {
    #[error("the number of colors must be at least 1, got {0}")]
    TooFewColors(i64),
    #[error("the number of colors must be at most {max}, got {got}")]
    TooManyColors { got: i64, max: u32 },
    #[error("unknown {kind} \"{value}\", expected one of: {expected}")]
    UnknownValue {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Failure of the decision procedure. Never stands for unsatisfiability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolverError {
    #[error("the solver did not terminate before the deadline")]
    TimedOut,
    #[error("the constraint system is not supported by this solver: {0}")]
    Unsupported(String),
    #[error("solver failure: {0}")]
    Backend(String),
    #[error("the solver worker terminated without an answer")]
    WorkerLost,
}

/// A model that does not fit the encoding it was produced for.
///
/// This reveals an inconsistency between the encoder, the solver and the decoder, not a user error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("the model kind does not match the encoding")]
    ModelKind,
    #[error("the model does not cover the encoding ({0})")]
    Incomplete(String),
    #[error("no value for vertex {0}")]
    MissingValue(String),
    #[error("vertex {0} has no color")]
    NoColor(String),
    #[error("vertex {0} has several colors")]
    SeveralColors(String),
    #[error("the color of vertex {0} is not an integer")]
    NotAnInteger(String),
    #[error("vertex {vertex} has color {value}, outside of [0, {k})")]
    OutOfRange { vertex: String, value: i64, k: u32 },
    #[error("adjacent vertices {0} and {1} have the same color")]
    Conflict(String, String),
}

/// Any failure of the coloring pipeline. Uncolorable graphs are not errors.
#[derive(Debug, Error)]
pub enum ColoringError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    InvalidParameter(#[from] InvalidParameter),
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error("internal inconsistency: {0}")]
    Decode(#[from] DecodeError),
}
