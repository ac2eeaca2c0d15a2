//! Error types for YAMLPath compilation.

/// Errors raised while compiling a YAMLPath expression.
///
/// Matching never fails; every problem with an expression surfaces here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum YamlPathError {
    /// Unexpected token at a specific position.
    #[error("Unexpected token '{found}' at position {position}, expected {expected}")]
    UnexpectedToken {
        position: usize,
        found: String,
        expected: String,
    },
    /// Unexpected end of input.
    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: String },
    /// Invalid syntax with description.
    #[error("Invalid YAMLPath syntax: {message}")]
    InvalidSyntax { message: String },
}
