//! Error types for building and evaluating fuzzy systems.

/// Errors raised while building a fuzzy system or evaluating it.
///
/// Configuration errors (`Unknown*`, `Duplicate*`, `Invalid{Shape,Universe,Threshold}`)
/// are raised while the system is being built. `InvalidInput`,
/// `MissingInput`, `NoRuleFired` and `NoDominantClass` are the only errors a caller can
/// trigger at evaluation time.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("invalid input for `{variable}`: {value} is not a finite number")]
    InvalidInput { variable: String, value: f64 },

    #[error("no input value was provided for `{0}`")]
    MissingInput(String),

    #[error("unknown variable `{0}`")]
    UnknownVariable(String),

    #[error("unknown term `{term}` in variable `{variable}`")]
    UnknownTerm { variable: String, term: String },

    #[error("variable `{0}` is already registered")]
    DuplicateVariable(String),

    #[error("term `{term}` is already defined in variable `{variable}`")]
    DuplicateTerm { variable: String, term: String },

    #[error("invalid membership function: {0}")]
    InvalidShape(String),

    #[error("invalid universe [{min}, {max}] with step {step}")]
    InvalidUniverse { min: f64, max: f64, step: f64 },

    #[error("classification threshold {0} must lie in [0, 1)")]
    InvalidThreshold(f64),

    #[error("no rule fired: the aggregated output set is empty")]
    NoRuleFired,

    #[error("no term has a membership above {threshold} at {value}")]
    NoDominantClass { value: f64, threshold: f64 },
}

pub type Result<T, E = InferenceError> = std::result::Result<T, E>;

impl InferenceError {
    /// Whether the error depends on the inputs rather than on how the system was built.
    pub fn is_evaluation_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. } | Self::MissingInput(_) | Self::NoRuleFired | Self::NoDominantClass { .. }
        )
    }
}
