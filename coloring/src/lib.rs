//! Decision of graph k-colorability by reduction to a satisfiability problem.
//!
//! A [`graph::Graph`] and a number of colors are encoded into a constraint system
//! ([`encode::encode`]), which is handed to a decision procedure behind the [`solver::SolverPort`]
//! interface. A model of the system is then decoded into a [`decode::ColorAssignment`].
//! [`pipeline::color_graph`] chains the three steps.

pub mod cnf;
pub mod decode;
pub mod encode;
pub mod errors;
pub mod fol;
pub mod graph;
pub mod io;
pub mod palette;
pub mod params;
pub mod pipeline;
pub mod solver;

pub use decode::ColorAssignment;
pub use encode::{ColorCount, Strategy};
pub use errors::ColoringError;
pub use graph::{Graph, VertexId};
pub use pipeline::{Outcome, color_graph};
