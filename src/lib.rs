pub mod network;
pub mod storage;

pub use network::{DiagnosisNetwork, Evidence, NetworkError, Topology};
pub use storage::ParameterDatabase;
