//! Error types shared by every stage of an escalation run.

/// An escalation or identity record failed local validation.
///
/// Raised before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Required field is missing: {0}")]
    MissingField(&'static str),

    #[error("Required field is empty: {0}")]
    EmptyField(&'static str),

    #[error("Unrecognized value for {field}: {value:?}")]
    UnrecognizedValue { field: &'static str, value: String },

    #[error("Field {field} must be a string, number or boolean")]
    NotScalar { field: String },
}

/// Configuration could not be resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}
