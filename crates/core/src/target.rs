//! Proof-of-work targets as 256-bit integers.

use crate::codec::{Encode, Encoder, EncodingError};
use crate::hash::Hash;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uint::construct_uint;

construct_uint! {
    /// 256-bit unsigned integer used for hash/target comparison.
    pub struct U256(4);
}

/// Number of hex digits in a rendered target or hash.
pub const TARGET_HEX_WIDTH: usize = 64;

/// A difficulty threshold. A block is valid when its hash, read as a
/// big-endian 256-bit integer, is strictly below the target.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Target(pub U256);

impl Target {
    /// The easiest possible target: every digit `f`.
    pub const MAX: Self = Self(U256::MAX);

    /// A target no hash can meet.
    pub const ZERO: Self = Self(U256([0, 0, 0, 0]));

    /// `00000fff…f`: five leading zero nibbles.
    pub const DEFAULT: Self = Self(U256([
        0xFFFF_FFFF_FFFF_FFFF,
        0xFFFF_FFFF_FFFF_FFFF,
        0xFFFF_FFFF_FFFF_FFFF,
        0x0000_0FFF_FFFF_FFFF,
    ]));

    /// A target whose first `zeros` hex digits are zero and the rest `f`.
    pub fn with_leading_zeros(zeros: u32) -> Self {
        if zeros as usize >= TARGET_HEX_WIDTH {
            return Self::ZERO;
        }
        Self(U256::MAX >> (zeros * 4))
    }

    /// Parse 1 to 64 hex digits as a base-16 integer; leading zeros are allowed.
    pub fn from_hex(s: &str) -> Result<Self, EncodingError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.is_empty() || s.len() > TARGET_HEX_WIDTH {
            return Err(EncodingError::InvalidTarget(format!(
                "expected 1 to {} hex digits, got {}",
                TARGET_HEX_WIDTH,
                s.len()
            )));
        }
        let padded = format!("{:0>width$}", s, width = TARGET_HEX_WIDTH);
        let bytes =
            hex::decode(padded).map_err(|e| EncodingError::InvalidTarget(e.to_string()))?;
        Ok(Self(U256::from_big_endian(&bytes)))
    }

    /// Exactly 64 lowercase hex digits.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_be_bytes())
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        self.0.to_big_endian(&mut bytes);
        bytes
    }

    /// Numeric comparison of the hash against this target.
    pub fn is_met_by(&self, hash: &Hash) -> bool {
        hash_to_u256(hash) < self.0
    }
}

/// Interpret a hash as a big-endian 256-bit integer.
pub fn hash_to_u256(hash: &Hash) -> U256 {
    U256::from_big_endian(hash.as_bytes())
}

impl Default for Target {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Target({})", self.to_hex())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Target {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Encode for Target {
    fn encode_to(&self, enc: &mut Encoder) {
        enc.put_fixed(&self.to_be_bytes());
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Target::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Chooses the target for the next block given the chain so far (oldest
/// first).
///
/// This is where difficulty retargeting would plug in. Only a fixed policy
/// exists; no adjustment formula is defined.
pub trait TargetPolicy {
    fn next_target(&self, history: &[crate::Block]) -> Target;
}

/// Always returns the same target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedTarget(pub Target);

impl TargetPolicy for FixedTarget {
    fn next_target(&self, _history: &[crate::Block]) -> Target {
        self.0
    }
}
