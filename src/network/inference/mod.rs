pub mod diagnosis_network;
pub mod learner;
pub mod monte_carlo;
pub mod query;

pub use diagnosis_network::DiagnosisNetwork;
