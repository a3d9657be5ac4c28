//! Canonical binary encoding shared by transaction signing and block hashing.
//!
//! Every signature and every block hash is computed over bytes produced by
//! [`Encoder`]. The layout is frozen at [`CODEC_VERSION`]:
//!
//! | value              | bytes                                        |
//! |--------------------|----------------------------------------------|
//! | `u64`              | 8 bytes, big-endian                          |
//! | `Hash`             | 32 raw bytes                                 |
//! | `Target`           | 32 bytes, big-endian                         |
//! | byte string / text | `u64` length, then the raw bytes             |
//! | sequence           | `u64` element count, then each element       |
//! | option             | `0x00` when absent, `0x01` then the value    |
//!
//! Changing any of these rules invalidates every stored hash and signature.

use crate::hash::Hash;
use thiserror::Error;

/// Version of the frozen canonical layout.
pub const CODEC_VERSION: u8 = 1;

const TAG_ABSENT: u8 = 0x00;
const TAG_PRESENT: u8 = 0x01;

/// Errors raised when a boundary value cannot be brought into canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("malformed hash: {0}")]
    InvalidHash(String),

    #[error("malformed target: {0}")]
    InvalidTarget(String),

    #[error("malformed signature: {0}")]
    InvalidSignature(String),

    #[error("malformed public key: {0}")]
    InvalidPublicKey(String),
}

/// A value with a canonical byte layout.
pub trait Encode {
    /// Append this value's canonical bytes to `enc`.
    fn encode_to(&self, enc: &mut Encoder);

    /// Canonical bytes of this value alone.
    fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        self.encode_to(&mut enc);
        enc.finish()
    }
}

/// Append-only writer for canonical bytes.
#[derive(Debug, Default, Clone)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn put_u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn put_u64(&mut self, value: u64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn put_hash(&mut self, hash: &Hash) -> &mut Self {
        self.buf.extend_from_slice(hash.as_bytes());
        self
    }

    /// Fixed-width bytes, written without a length prefix.
    pub fn put_fixed(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Variable-length bytes, prefixed with their length.
    pub fn put_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.put_u64(bytes.len() as u64);
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn put_str(&mut self, s: &str) -> &mut Self {
        self.put_bytes(s.as_bytes())
    }

    pub fn put_option<T: Encode>(&mut self, value: Option<&T>) -> &mut Self {
        match value {
            Some(v) => {
                self.put_u8(TAG_PRESENT);
                v.encode_to(self);
            }
            None => {
                self.put_u8(TAG_ABSENT);
            }
        }
        self
    }

    pub fn put_seq<T: Encode>(&mut self, items: &[T]) -> &mut Self {
        self.put_seq_with(items, |enc, item| item.encode_to(enc))
    }

    /// Write a sequence using a custom element encoder, e.g. a projection that
    /// omits some fields.
    pub fn put_seq_with<T, F>(&mut self, items: &[T], mut f: F) -> &mut Self
    where
        F: FnMut(&mut Encoder, &T),
    {
        self.put_u64(items.len() as u64);
        for item in items {
            f(self, item);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

impl Encode for u64 {
    fn encode_to(&self, enc: &mut Encoder) {
        enc.put_u64(*self);
    }
}

impl Encode for Hash {
    fn encode_to(&self, enc: &mut Encoder) {
        enc.put_hash(self);
    }
}
