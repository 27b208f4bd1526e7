// Entity identifiers
// ObjectId-shaped references: 24 lowercase hex characters encoding 12 bytes

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use thiserror::Error;

const HEX_LEN: usize = 24;

/// Returned when a string is not a well-formed ObjectId
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0:?} is not a 24-character hexadecimal identifier")]
pub struct InvalidObjectId(pub String);

/// Identifier of a rating, lecturer, campus or author
///
/// Layout of the 12 bytes: 4-byte big-endian UNIX seconds, 5 random bytes
/// chosen once per process, 3-byte wrapping counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(try_from = "String", into = "String")]
#[sqlx(transparent)]
pub struct ObjectId(String);

/// Reference-shape check, independent of whether the entity exists
pub fn is_well_formed(value: &str) -> bool {
    value.len() == HEX_LEN && value.bytes().all(|b| b.is_ascii_hexdigit())
}

fn process_unique() -> &'static [u8; 5] {
    static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
    PROCESS_UNIQUE.get_or_init(rand::random)
}

fn counter() -> &'static AtomicU32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    COUNTER.get_or_init(|| AtomicU32::new(rand::random::<u32>() & 0x00FF_FFFF))
}

impl ObjectId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        let seconds = Utc::now().timestamp() as u32;
        let count = counter().fetch_add(1, Ordering::Relaxed) & 0x00FF_FFFF;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(process_unique());
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);

        Self(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// Parse a caller-supplied reference, normalizing hex digits to lowercase
    pub fn parse_str(value: &str) -> Result<Self, InvalidObjectId> {
        if is_well_formed(value) {
            Ok(Self(value.to_ascii_lowercase()))
        } else {
            Err(InvalidObjectId(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ObjectId {
    type Err = InvalidObjectId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl TryFrom<String> for ObjectId {
    type Error = InvalidObjectId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_str(&value)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_are_well_formed() {
        let id = ObjectId::new();
        assert!(is_well_formed(id.as_str()));
        assert_eq!(id.as_str(), id.as_str().to_ascii_lowercase());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: HashSet<ObjectId> = (0..1000).map(|_| ObjectId::new()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_malformed_references_are_rejected() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("not-an-id"));
        assert!(!is_well_formed("65f1c0ffee0000000000bee"));
        assert!(!is_well_formed("65f1c0ffee0000000000beef0"));
        assert!(!is_well_formed("65f1c0ffee0000000000beeg"));
        assert!(ObjectId::parse_str("zzzzzzzzzzzzzzzzzzzzzzzz").is_err());
    }

    #[test]
    fn test_uppercase_hex_is_normalized() {
        let id = ObjectId::parse_str("65F1C0FFEE0000000000BEEF").unwrap();
        assert_eq!(id.as_str(), "65f1c0ffee0000000000beef");
    }

    #[test]
    fn test_serde_rejects_malformed_ids() {
        let ok: ObjectId = serde_json::from_str("\"65f1c0ffee0000000000beef\"").unwrap();
        assert_eq!(ok.to_string(), "65f1c0ffee0000000000beef");

        let err = serde_json::from_str::<ObjectId>("\"65f1\"");
        assert!(err.is_err());
    }

    proptest! {
        #[test]
        fn prop_any_24_hex_chars_is_well_formed(value in "[0-9a-fA-F]{24}") {
            prop_assert!(is_well_formed(&value));
            prop_assert!(ObjectId::parse_str(&value).is_ok());
        }

        #[test]
        fn prop_wrong_length_is_rejected(value in "[0-9a-f]{0,23}|[0-9a-f]{25,40}") {
            prop_assert!(!is_well_formed(&value));
        }
    }
}
