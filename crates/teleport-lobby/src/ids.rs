//! Identifier generation for session ids and reservation tokens.
//!
//! Teleport doesn't care what an identifier looks like, only that it is
//! unique, unguessable enough to act as a bearer credential, and safe to
//! put in a URL. The [`IdGenerator`] trait is that contract; the server
//! uses [`RandomIdGenerator`] unless told otherwise.
//!
//! # Why a trait?
//!
//! Generation can fail (an exhausted entropy source, a remote id
//! service), and the session layer must surface that failure instead of
//! panicking. Tests use the seam to inject a generator that always fails
//! or one that returns predictable ids.

use rand::Rng;

use crate::LobbyError;

/// Produces opaque, collision-resistant, URL-safe identifiers.
///
/// # Trait bounds
///
/// - `Send + Sync` → one generator is shared by every request task.
/// - `'static` → it lives as long as the server.
///
/// # Example
///
/// ```rust
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use teleport_lobby::{IdGenerator, LobbyError};
///
/// /// Hands out `id-1`, `id-2`, ... Only useful in tests.
/// struct Sequential(AtomicU64);
///
/// impl IdGenerator for Sequential {
///     fn new_id(&self) -> Result<String, LobbyError> {
///         let n = self.0.fetch_add(1, Ordering::Relaxed) + 1;
///         Ok(format!("id-{n}"))
///     }
/// }
///
/// let ids = Sequential(AtomicU64::new(0));
/// assert_eq!(ids.new_id().unwrap(), "id-1");
/// ```
pub trait IdGenerator: Send + Sync + 'static {
    /// Returns a fresh identifier.
    ///
    /// # Errors
    /// Returns [`LobbyError::IdentifierGenerationFailed`] if no identifier
    /// could be produced.
    fn new_id(&self) -> Result<String, LobbyError>;
}

/// Generates 32-character lowercase hex strings (128 bits of entropy).
///
/// 128 bits makes guessing a live token computationally infeasible, and
/// hex needs no escaping in a query string.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn new_id(&self) -> Result<String, LobbyError> {
        let bytes: [u8; 16] = rand::rng().random();
        Ok(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_id_is_32_lowercase_hex_chars() {
        let id = RandomIdGenerator.new_id().unwrap();

        assert_eq!(id.len(), 32);
        assert!(
            id.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)),
            "id should be lowercase hex, got {id}"
        );
    }

    #[test]
    fn test_random_ids_are_unique() {
        let a = RandomIdGenerator.new_id().unwrap();
        let b = RandomIdGenerator.new_id().unwrap();
        assert_ne!(a, b);
    }
}
