//! Activation code string generation.

use codegate_types::{CODE_ALPHABET, CODE_LENGTH};
use rand::rngs::OsRng;
use rand::Rng;

/// Generates a fresh activation code string: [`CODE_LENGTH`] characters drawn
/// uniformly from [`CODE_ALPHABET`] via the OS CSPRNG.
///
/// The space is 36^18, so collisions are left to the store's unique
/// constraint rather than checked up front.
#[must_use]
pub fn generate_code() -> String {
    let mut rng = OsRng;
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}
