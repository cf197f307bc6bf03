use portal_core::{GeneratorError, TokenGenerator};
use std::sync::atomic::{AtomicU64, Ordering};

/// A token generator backed by a process-local counter.
///
/// Unique only within a single instance. Meant for tests and
/// single-node development setups.
#[derive(Debug, Default)]
pub struct SeqGenerator {
    counter: AtomicU64,
}

impl SeqGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts counting from `offset`.
    pub fn with_offset(offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
        }
    }
}

impl TokenGenerator for SeqGenerator {
    fn next_token(&self) -> Result<u64, GeneratorError> {
        let token = self.counter.fetch_add(1, Ordering::SeqCst);
        if token == u64::MAX {
            return Err(GeneratorError::Exhausted("sequence wrapped".to_string()));
        }
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_sequential_tokens() {
        let generator = SeqGenerator::new();

        assert_eq!(generator.next_token().unwrap(), 0);
        assert_eq!(generator.next_token().unwrap(), 1);
        assert_eq!(generator.next_token().unwrap(), 2);
    }

    #[test]
    fn starts_from_offset() {
        let generator = SeqGenerator::with_offset(1000);

        assert_eq!(generator.next_token().unwrap(), 1000);
        assert_eq!(generator.next_token().unwrap(), 1001);
    }

    #[test]
    fn reports_exhaustion() {
        let generator = SeqGenerator::with_offset(u64::MAX);

        assert!(matches!(
            generator.next_token(),
            Err(GeneratorError::Exhausted(_))
        ));
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SeqGenerator>();
    }
}
