use thiserror::Error;

/// Failures raised by the diagnostic network engine.
///
/// Every variant is detected synchronously from the inputs; none of them are
/// transient, so callers should not retry without changing the input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    /// Dataset columns, parameter tables or records do not line up with the topology.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Node or parent definitions break the two-level root/symptom layout.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// Evidence observes a root, names an unknown node, or the query target is not a root.
    #[error("invalid evidence: {0}")]
    InvalidEvidence(String),

    /// The evidence has zero probability under the point parameters.
    #[error("degenerate query for '{target}': evidence has zero probability under the point parameters")]
    DegenerateQuery { target: String },

    /// Beta parameters, probabilities or sampling settings out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
