use portal_core::ShortCode;
use sha2::{Digest, Sha256};
use typed_builder::TypedBuilder;

const BASE62_ALPHABET: &[u8; 62] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Number of digest bytes kept. 40 bits always fit in 7 base62 digits.
const DIGEST_PREFIX_BYTES: usize = 5;

/// Compresses an arbitrary string into a short base62 [`ShortCode`].
///
/// Collision resistance comes from the input being unique (a generator token
/// is mixed in), not from the 40-bit hash itself.
#[derive(Debug, Clone, TypedBuilder)]
pub struct Base62Hasher {
    /// Minimum code width; shorter encodings are left-padded with `0`.
    #[builder(default = 7)]
    width: usize,
}

impl Default for Base62Hasher {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Base62Hasher {
    pub fn width(&self) -> usize {
        self.width
    }

    /// Hashes `input` into a short code.
    pub fn hash(&self, input: &str) -> ShortCode {
        let digest = Sha256::digest(input.as_bytes());

        let value = digest[..DIGEST_PREFIX_BYTES]
            .iter()
            .fold(0_u64, |acc, byte| (acc << 8) | u64::from(*byte));

        let encoded = encode_base62(value);
        let padded = if encoded.len() < self.width {
            format!("{}{}", "0".repeat(self.width - encoded.len()), encoded)
        } else {
            encoded
        };

        ShortCode::new_unchecked(padded)
    }

    /// Derives the public identifier for `url` from a generator token.
    pub fn derive(&self, token: u64, url: &str) -> ShortCode {
        self.hash(&format!("{token}{url}"))
    }
}

fn encode_base62(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(11);
    while value > 0 {
        digits.push(BASE62_ALPHABET[(value % 62) as usize]);
        value /= 62;
    }
    digits.reverse();

    digits.into_iter().map(char::from).collect()
}
