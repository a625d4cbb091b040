/// Result alias for `troop`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by network construction, statistics and model fitting.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input was empty.
    #[error("empty input provided")]
    EmptyInput,

    /// An edge referenced a monkey that is not in the node table.
    #[error("edge references unknown monkey '{name}'")]
    UnknownNode {
        /// Name found in the edge table.
        name: String,
    },

    /// A monkey name appeared twice in the node table.
    #[error("duplicate monkey '{name}' in node table")]
    DuplicateNode {
        /// Offending name.
        name: String,
    },

    /// Repeated observation of the same ordered pair under a rejecting policy.
    #[error("repeated grooming observation {groomer} -> {groomed}")]
    DuplicateEdge {
        /// Groomer.
        groomer: String,
        /// Groomed.
        groomed: String,
    },

    /// A categorical attribute value could not be parsed.
    #[error("invalid value '{value}' for attribute '{attribute}'")]
    InvalidAttribute {
        /// Attribute (column) name.
        attribute: &'static str,
        /// Raw value.
        value: String,
    },

    /// Matrix or vector dimension mismatch.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: String,
    },

    /// A model term specification was rejected at construction.
    #[error("invalid model specification: {0}")]
    InvalidModel(String),

    /// Graph is disconnected where connected was required.
    #[error("graph is disconnected ({components} components)")]
    DisconnectedGraph {
        /// Number of components in the view that was checked.
        components: usize,
    },

    /// An iterative procedure did not converge.
    #[error("{algorithm} did not converge after {iterations} iterations")]
    ConvergenceFailure {
        /// Procedure that failed.
        algorithm: &'static str,
        /// Number of iterations attempted.
        iterations: usize,
    },

    /// A statistic has no defined value for this input.
    #[error("{statistic} is undefined: {reason}")]
    Undefined {
        /// Statistic name.
        statistic: &'static str,
        /// Why it is undefined.
        reason: &'static str,
    },

    /// The network failed its health check.
    #[error("network failed validation:\n{0}")]
    Validation(String),

    /// I/O failure while reading inputs.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed CSV input.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Malformed TOML configuration.
    #[error(transparent)]
    Config(#[from] toml::de::Error),

    /// JSON serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
