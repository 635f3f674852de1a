//! Positional base-X encoding over a fixed alphabet.
//!
//! The byte sequence is treated as a big-endian integer and re-expressed in
//! the base of the alphabet length. Leading zero bytes are preserved as
//! repeated leading `alphabet[0]` characters, so the mapping is bijective
//! and round-trips byte-for-byte.
//!
//! Only the base-62 alphabet is used by the cake identifier scheme. It is
//! case-sensitive and has no padding character.
use std::error::Error;
use std::fmt;

pub const BASE62_ALPHABET: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Debug)]
pub struct BaseXError;

impl Error for BaseXError {
    fn description(&self) -> &str{
        "character outside of alphabet"
    }
}

impl fmt::Display for BaseXError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str("character outside of alphabet")
    }
}

pub struct BaseX {
    alphabet: &'static str,
}

/// Codec instance for the identifier alphabet `0-9a-zA-Z`.
pub const BASE62: BaseX = BaseX::new(BASE62_ALPHABET);

impl BaseX {
    pub const fn new(alphabet: &'static str) -> BaseX {
        BaseX {
            alphabet: alphabet,
        }
    }

    pub fn base(&self) -> u32 {
        self.alphabet.len() as u32
    }

    /// Encode a byte sequence.
    pub fn encode(&self, v: &[u8]) -> String {
        let zeroes = v.iter().take_while(|b| **b == 0).count();

        // base-N digits of the remaining value, least significant first
        let mut digits: Vec<u32> = vec!();
        for b in v[zeroes..].iter() {
            let mut carry = *b as u32;
            for d in digits.iter_mut() {
                carry += *d << 8;
                *d = carry % self.base();
                carry /= self.base();
            }
            while carry > 0 {
                digits.push(carry % self.base());
                carry /= self.base();
            }
        }

        let mut s = String::new();
        let first = self.alphabet.chars().next().unwrap();
        for _ in 0..zeroes {
            s.push(first);
        }
        for d in digits.iter().rev() {
            s.push(self.alphabet.as_bytes()[*d as usize] as char);
        }
        s
    }

    /// Decode a string previously produced by [encode](BaseX::encode).
    ///
    /// Fails when any character falls outside the alphabet.
    pub fn decode(&self, s: &str) -> Result<Vec<u8>, BaseXError> {
        let first = self.alphabet.chars().next().unwrap();
        let zeroes = s.chars().take_while(|c| *c == first).count();

        let mut bytes: Vec<u32> = vec!();
        for c in s[zeroes..].chars() {
            let idx = match self.alphabet.find(c) {
                Some(v) => {
                    v as u32
                },
                None => {
                    return Err(BaseXError{});
                },
            };
            let mut carry = idx;
            for b in bytes.iter_mut() {
                carry += *b * self.base();
                *b = carry & 0xff;
                carry >>= 8;
            }
            while carry > 0 {
                bytes.push(carry & 0xff);
                carry >>= 8;
            }
        }

        let mut r: Vec<u8> = vec![0; zeroes];
        for b in bytes.iter().rev() {
            r.push(*b as u8);
        }
        Ok(r)
    }
}
