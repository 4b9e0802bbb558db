pub mod common;
pub mod inference;
pub mod model;
pub mod scenarios;

/// Exports the main types for easy access
pub use inference::DiagnosisNetwork;
pub use model::{
    beta::Beta,
    dataset::Dataset,
    error::{NetworkError, NetworkResult},
    evidence::Evidence,
    params::{ParameterSet, ParameterStore, PointParams},
    topology::Topology,
};
