use thiserror::Error;

/// Errors raised while parsing, addressing or editing an HL7 message
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Hl7Error {
    /// A malformed address, index, option or rule was passed in
    #[error("Invalid parameter: {0}")]
    InvalidArgument(String),

    /// A segment handle no longer refers to a member of the message
    #[error("Failed to locate: {0}")]
    NotFound(String),

    /// The raw text cannot be turned into a segment sequence
    #[error("Malformed message: {0}")]
    MalformedMessage(String),
}

/// Result type for every fallible HL7 operation
pub type Hl7Result<T> = Result<T, Hl7Error>;

/// Build an invalid-argument error for a named parameter and its offending value
pub(crate) fn invalid_param<T, V: std::fmt::Display>(name: &str, value: V) -> Hl7Result<T> {
    Err(Hl7Error::InvalidArgument(format!("'{name}' [{value}]")))
}

/// Build an invalid-argument error with extra detail appended
pub(crate) fn invalid_param_because<T, V: std::fmt::Display, S: AsRef<str>>(
    name: &str,
    value: V,
    reason: S,
) -> Hl7Result<T> {
    Err(Hl7Error::InvalidArgument(format!(
        "'{name}' [{value}]. {}",
        reason.as_ref()
    )))
}

/// Build a not-found error for a named handle parameter
pub(crate) fn not_found(name: &str, segment_type: impl std::fmt::Display) -> Hl7Error {
    Hl7Error::NotFound(format!("'{name}' [{segment_type}]"))
}
