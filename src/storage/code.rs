//! Share Codes
//!
//! A code is the short token a sender hands to a recipient. Codes are exactly
//! [`CODE_LENGTH`] ASCII decimal digits, so the whole space holds
//! [`CODE_SPACE`] values. Leading zeros are significant: `"042"` and `"42"`
//! are different strings and only the former is a valid code.

use crate::storage::StoreError;
use rand::Rng;
use std::fmt;

/// Number of characters in a code.
pub const CODE_LENGTH: usize = 3;

/// The alphabet codes are drawn from.
pub const CODE_ALPHABET: &[u8] = b"0123456789";

/// Total number of distinct codes.
pub const CODE_SPACE: usize = 1000;

/// A validated share code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Code(String);

impl Code {
    /// Parses a user-supplied code.
    ///
    /// Fails with [`StoreError::InvalidInput`] unless the input is exactly
    /// [`CODE_LENGTH`] characters from [`CODE_ALPHABET`].
    pub fn parse(input: &str) -> Result<Self, StoreError> {
        if input.len() != CODE_LENGTH {
            return Err(StoreError::InvalidInput("Invalid code format (must be 3 digits)"));
        }
        if !input.bytes().all(|b| CODE_ALPHABET.contains(&b)) {
            return Err(StoreError::InvalidInput("Invalid code format (must be 3 digits)"));
        }
        Ok(Self(input.to_string()))
    }

    /// Draws a code uniformly at random from the code space.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        let code = (0..CODE_LENGTH)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
