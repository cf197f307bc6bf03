use crate::error::GeneratorError;

/// A source of globally unique, time-ordered tokens.
///
/// The token itself is never exposed; it only seeds the identifier hasher.
pub trait TokenGenerator: Send + Sync + 'static {
    /// Produces the next token.
    fn next_token(&self) -> Result<u64, GeneratorError>;
}
