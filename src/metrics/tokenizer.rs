// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

//! Token counting with tiktoken encodings.
//!
//! # Example
//!
//! ```
//! use repopack::metrics::tokenizer::TokenCounter;
//!
//! let counter = TokenCounter::new("o200k_base").unwrap();
//! let count = counter.count("Hello, world!");
//! assert!(count > 0);
//! ```

use tiktoken_rs::{CoreBPE, cl100k_base, o200k_base, p50k_base, p50k_edit, r50k_base};

use crate::utils::error::PackError;

/// Encoding names accepted by [`TokenCounter::new`].
pub const SUPPORTED_ENCODINGS: &[&str] = &[
    "o200k_base",
    "cl100k_base",
    "p50k_base",
    "p50k_edit",
    "r50k_base",
];

/// Counts tokens for a single tiktoken encoding.
pub struct TokenCounter {
    encoding: CoreBPE,
}

impl TokenCounter {
    /// Create a new TokenCounter with the specified encoding.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the encoding name is unknown, or a
    /// tokenizer error if the encoding cannot be loaded.
    pub fn new(encoding_name: &str) -> Result<Self, PackError> {
        let loaded = match encoding_name {
            "o200k_base" => o200k_base(),
            "cl100k_base" => cl100k_base(),
            "p50k_base" => p50k_base(),
            "p50k_edit" => p50k_edit(),
            "r50k_base" => r50k_base(),
            _ => return Err(PackError::invalid_encoding(encoding_name)),
        };
        let encoding = loaded.map_err(|e| PackError::Tokenizer(e.to_string()))?;

        Ok(Self { encoding })
    }

    /// Count tokens in the given text.
    pub fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.encoding.encode_with_special_tokens(text).len()
    }
}

impl std::fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCounter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_counter_cl100k() {
        let counter = TokenCounter::new("cl100k_base").unwrap();
        let count = counter.count("Hello, world!");
        // "Hello, world!" typically tokenizes to 4 tokens in cl100k_base
        assert!((3..=6).contains(&count));
    }

    #[test]
    fn test_all_supported_encodings_load() {
        for name in SUPPORTED_ENCODINGS {
            let counter = TokenCounter::new(name).unwrap();
            assert!(counter.count("fn main() {}") > 0, "{name}");
        }
    }

    #[test]
    fn test_empty_text_counts_zero() {
        let counter = TokenCounter::new("o200k_base").unwrap();
        assert_eq!(counter.count(""), 0);
    }

    #[test]
    fn test_token_counter_invalid_encoding() {
        let err = TokenCounter::new("invalid_encoding").unwrap_err();
        assert!(err.to_string().contains("invalid_encoding"));
    }
}
