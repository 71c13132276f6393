use predcache_core::errors::{CacheError, Result};

/// Digits and uppercase letters only, so ids stay distinct on case-insensitive
/// filesystems.
pub const BASE36_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Converts sequence numbers into fixed width, prefixed short identifiers,
/// e.g. `1 -> SR00001`.
#[derive(Debug, Clone)]
pub struct IdConverter {
    prefix: String,
    length: usize,
    alphabet: &'static [u8],
}

impl IdConverter {
    pub fn new(prefix: &str, length: usize) -> Self {
        IdConverter {
            prefix: prefix.to_string(),
            length,
            alphabet: BASE36_ALPHABET,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// How many numbers fit in `length` digits (`base ^ length`), saturating
    /// at `u64::MAX`.
    pub fn capacity(&self) -> u64 {
        let base = self.alphabet.len() as u64;
        u32::try_from(self.length)
            .ok()
            .and_then(|exp| base.checked_pow(exp))
            .unwrap_or(u64::MAX)
    }

    ///
    /// Encode `number` as a zero padded identifier.
    ///
    /// # Errors
    ///
    /// `EncodingSpaceExhausted` if `number` does not fit in `length` digits.
    /// Identifiers are never truncated, since a wrapped id would collide with
    /// an earlier sequence.
    ///
    pub fn encode(&self, number: u64) -> Result<String> {
        let capacity = self.capacity();
        if number >= capacity {
            return Err(CacheError::EncodingSpaceExhausted {
                prefix: self.prefix.clone(),
                length: self.length,
                capacity,
            });
        }

        let base = self.alphabet.len() as u64;
        let mut digits = vec![self.alphabet[0]; self.length];
        let mut remaining = number;
        for slot in digits.iter_mut().rev() {
            *slot = self.alphabet[(remaining % base) as usize];
            remaining /= base;
            if remaining == 0 {
                break;
            }
        }

        let mut id = String::with_capacity(self.prefix.len() + self.length);
        id.push_str(&self.prefix);
        id.extend(digits.into_iter().map(char::from));
        Ok(id)
    }
}
