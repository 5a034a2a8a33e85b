//! Cryptographically secure random number generation.
//!
//! Used for artifact message handles, which must be unguessable.

use rand::Rng;

/// Generates a cryptographically secure random byte array.
///
/// Uses the thread-local random number generator which is cryptographically
/// secure by default.
#[must_use]
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut rng = rand::rng();
    let mut bytes = [0u8; N];
    rng.fill(&mut bytes[..]);
    bytes
}
