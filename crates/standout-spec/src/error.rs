//! Error types for the spec crate.

use thiserror::Error;

/// Errors raised while exporting, rebinding or compiling expression trees.
#[derive(Debug, Error)]
pub enum SpecError {
    /// The rebinder met a node it cannot traverse.
    #[error("cannot rebind parameters inside a `{kind}` expression")]
    UnsupportedExpression { kind: &'static str },

    /// A lambda body references a parameter the lambda does not bind.
    #[error("parameter `{param}` is not bound by the enclosing lambda")]
    UnboundParameter { param: String },

    /// The lambda parameter appears where a plain value is expected.
    #[error("parameter `{param}` cannot be used as a value; read a field or pass it to a call")]
    MisplacedParameter { param: String },

    /// A field access or call receives something other than the lambda parameter.
    #[error("{context} must be applied to the lambda parameter")]
    NotAnEntity { context: &'static str },

    /// Invalid regular expression pattern.
    #[cfg(feature = "regex")]
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),
}

/// Result type for spec operations.
pub type Result<T> = std::result::Result<T, SpecError>;
