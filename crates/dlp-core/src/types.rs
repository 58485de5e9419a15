//! Core type definitions for the DLP root registry
//!
//! Accounts are 20-byte addresses, entities are addressed by sequential
//! 1-based ids, and every token amount or percentage is an 18-decimal
//! fixed-point `u128`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token amount in the smallest unit (18 decimals)
pub type Amount = u128;

/// Chain block height
pub type BlockNumber = u64;

/// Sequential DLP identifier (1-based, 0 means "none")
pub type DlpId = u64;

/// Sequential stake identifier (1-based, shared by every DLP)
pub type StakeId = u64;

/// Sequential epoch identifier (epoch 0 is the bootstrap epoch)
pub type EpochId = u64;

/// Address - 20-byte account identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address {
    bytes: [u8; 20],
}

impl Address {
    /// The zero address, never a valid owner, treasury or DLP identity
    pub const ZERO: Self = Self { bytes: [0u8; 20] };

    /// Create an address from raw bytes
    pub fn new(bytes: [u8; 20]) -> Self {
        Self { bytes }
    }

    /// Derive a deterministic address from arbitrary seed material (BLAKE3, truncated)
    pub fn from_seed(seed: &[u8]) -> Self {
        let hash = blake3::hash(seed);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash.as_bytes()[..20]);
        Self { bytes }
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.bytes
    }

    pub fn is_zero(&self) -> bool {
        self.bytes == [0u8; 20]
    }

    /// Convert to hex string (no prefix)
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parse from hex string, with or without a `0x` prefix
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let decoded = hex::decode(s)?;
        let bytes: [u8; 20] = decoded
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self { bytes })
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", &self.to_hex()[..12])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

/// DLP lifecycle status
///
/// ```text
/// None -> Registered -> {Eligible <-> SubEligible <-> Registered} -> Deregistered
/// ```
///
/// Everything but `Deregistered` is derived from stake amount and
/// verification; `Deregistered` is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DlpStatus {
    #[default]
    None,
    Registered,
    Eligible,
    SubEligible,
    Deregistered,
}

impl DlpStatus {
    /// Registered, sub-eligible or eligible
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Registered | Self::Eligible | Self::SubEligible)
    }

    /// Eligible or sub-eligible
    pub fn is_ranked(&self) -> bool {
        matches!(self, Self::Eligible | Self::SubEligible)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Registered => "Registered",
            Self::Eligible => "Eligible",
            Self::SubEligible => "SubEligible",
            Self::Deregistered => "Deregistered",
        }
    }
}

impl fmt::Display for DlpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed-point constants
pub mod constants {
    use super::Amount;

    /// Decimal places of the staking token
    pub const DECIMALS: u8 = 18;

    /// One whole token in smallest units
    pub const ONE_TOKEN: Amount = 1_000_000_000_000_000_000; // 10^18

    /// 100% in percentage fixed point
    pub const ONE_HUNDRED_PERCENT: Amount = 1_000_000_000_000_000_000; // 10^18

    /// 1% in percentage fixed point
    pub const ONE_PERCENT: Amount = ONE_HUNDRED_PERCENT / 100;
}

/// Serde adapter for `u128` amounts.
///
/// Amounts serialize as decimal strings (TOML and JSON numbers cannot hold
/// every `u128`); deserialization accepts either a string or an integer.
pub mod amount_serde {
    use super::Amount;
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Int(u64),
    }

    pub fn serialize<S: Serializer>(value: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s
                .trim()
                .replace('_', "")
                .parse::<Amount>()
                .map_err(|e| de::Error::custom(format!("invalid amount {s:?}: {e}"))),
            Repr::Int(v) => Ok(Amount::from(v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_hex_roundtrip() {
        let addr = Address::from_seed(b"alice");
        let parsed = Address::from_hex(&addr.to_string()).unwrap();

        assert_eq!(addr, parsed);
        assert!(!addr.is_zero());
    }

    #[test]
    fn test_address_rejects_wrong_length() {
        assert!(Address::from_hex("0x1234").is_err());
    }

    #[test]
    fn test_status_predicates() {
        assert!(DlpStatus::Registered.is_active());
        assert!(DlpStatus::SubEligible.is_ranked());
        assert!(!DlpStatus::Deregistered.is_active());
        assert!(!DlpStatus::None.is_active());
    }

    #[test]
    fn test_amount_serde_accepts_string_and_int() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            #[serde(with = "amount_serde")]
            value: Amount,
        }

        let w: Wrapper = serde_json::from_str(r#"{"value":"1000000000000000000000"}"#).unwrap();
        assert_eq!(w.value, 1_000 * constants::ONE_TOKEN);

        let w: Wrapper = serde_json::from_str(r#"{"value":42}"#).unwrap();
        assert_eq!(w.value, 42);
    }
}
