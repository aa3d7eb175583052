// Copyright (c) 2022-2023 The MobileCoin Foundation

use core::fmt;
use core::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::ProtoError;

/// 32-byte transaction identifier.
///
/// Held in display (big-endian) order, the order used by block explorers and
/// cache keys. The wire protocol carries ids in little-endian order, use
/// [TxId::from_wire] and [TxId::to_wire] at the message boundary.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxId([u8; 32]);

impl TxId {
    /// Transaction id length in bytes
    pub const LEN: usize = 32;

    /// Create a transaction id from display-ordered bytes
    pub const fn new(display: [u8; 32]) -> Self {
        Self(display)
    }

    /// Parse a transaction id from wire-ordered (little-endian) bytes,
    /// rejecting anything that is not exactly 32 bytes
    pub fn from_wire(b: &[u8]) -> Result<Self, ProtoError> {
        if b.len() != Self::LEN {
            return Err(ProtoError::InvalidTxId(b.len()));
        }

        let mut d = [0u8; 32];
        for (o, i) in d.iter_mut().zip(b.iter().rev()) {
            *o = *i;
        }

        Ok(Self(d))
    }

    /// Encode the transaction id in wire (little-endian) order
    pub fn to_wire(&self) -> Vec<u8> {
        self.0.iter().rev().copied().collect()
    }

    /// Fetch display-ordered bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl AsRef<[u8]> for TxId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0[..] {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({self})")
    }
}

impl FromStr for TxId {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let b = hex::decode(s).map_err(|_| ProtoError::InvalidTxIdEncoding)?;

        if b.len() != Self::LEN {
            return Err(ProtoError::InvalidTxId(b.len()));
        }

        let mut d = [0u8; 32];
        d.copy_from_slice(&b);

        Ok(Self(d))
    }
}

impl Serialize for TxId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TxId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TxId::from_str(&s).map_err(de::Error::custom)
    }
}
