//! Error types shared across the model.

use thiserror::Error;

/// Failure classes of the fire model.
///
/// Construction-time validation raises [`ModelError::InvalidInput`]; no
/// partially-built species, stratum, or crown ever escapes its factory.
/// "No ignition" is an outcome, not an error, and never appears here.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    /// An input invariant was violated at construction.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A geometric configuration is impossible, e.g. projecting a flame
    /// origin along a direction parallel to the surface line.
    #[error("geometry failure: {0}")]
    Geometry(String),

    /// A parameter was requested that is neither in the parameter file nor
    /// in the fallback provider.
    #[error("no value or fallback for parameter `{0}`")]
    MissingFallback(String),

    /// A stratum overlap keyword that is not one of
    /// `overlapped`, `not overlapped`, `automatic`.
    #[error("invalid overlap type `{0}`")]
    InvalidOverlapType(String),

    /// A malformed parameter file.
    #[error("parameter file, line {line}: {message}")]
    Params { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;

impl ModelError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ModelError::InvalidInput(msg.into())
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        ModelError::Geometry(msg.into())
    }
}
