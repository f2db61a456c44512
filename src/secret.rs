//! Credential encoding and random tokens.
//!
//! Secrets are stored base64-encoded. The encoding is reversible and only keeps
//! plaintext out of casual view; it is not a hash and offers no protection to
//! anyone who can read the store.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{JuneError, Result};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn obfuscate(plain: &str) -> String {
    STANDARD.encode(plain.as_bytes())
}

/// Compare a candidate plaintext against a stored secret.
pub fn matches(encoded: &str, candidate: &str) -> bool {
    obfuscate(candidate) == encoded
}

/// Decode a stored secret. `None` if the stored text is not valid base64 UTF-8.
#[cfg(test)]
pub(crate) fn reveal(encoded: &str) -> Option<String> {
    let bytes = STANDARD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

/// `len` lowercase base-36 characters from the OS random source.
pub fn random_token(len: usize) -> Result<String> {
    random_token_with(len, |bytes| {
        getrandom::fill(bytes).map_err(|e| JuneError::Random(e.to_string()))
    })
}

pub(crate) fn random_token_with<F>(len: usize, mut fill_random: F) -> Result<String>
where
    F: FnMut(&mut [u8]) -> Result<()>,
{
    let mut bytes = vec![0_u8; len];
    fill_random(&mut bytes)?;
    Ok(bytes
        .iter()
        .map(|b| BASE36[(*b as usize) % BASE36.len()] as char)
        .collect())
}
