//! Core types used throughout the system
//!
//! These are fundamental type aliases shared by the wallet, transfer and
//! store modules.

/// User ID - globally unique, immutable after assignment.
///
/// Wallet ownership and transfer initiation are both expressed in terms of
/// this id. The wallet service never creates users; it only records them.
pub type UserId = u64;

/// Timestamp in milliseconds since the Unix epoch (UTC)
pub type TimestampMs = i64;

/// Current wall-clock time in milliseconds
#[inline]
pub fn now_ms() -> TimestampMs {
    chrono::Utc::now().timestamp_millis()
}

/// Declare a ULID-backed identifier newtype.
///
/// ULIDs are sortable by creation time and need no coordination between
/// writers. The textual form (26 chars, Crockford base32) is what gets stored
/// and sent over the wire.
#[macro_export]
macro_rules! ulid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(ulid::Ulid);

        impl $name {
            /// Generate a new unique id
            pub fn new() -> Self {
                Self(ulid::Ulid::new())
            }

            /// Get the inner ULID value
            pub fn inner(&self) -> ulid::Ulid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = ulid::DecodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(ulid::Ulid::from_string(s)?))
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                s.parse::<Self>().map_err(serde::de::Error::custom)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    crate::ulid_id!(
        /// Id used only by these tests
        SampleId
    );

    #[test]
    fn test_ulid_id_text_roundtrip() {
        let id = SampleId::new();
        let text = id.to_string();
        assert_eq!(text.len(), 26);
        assert_eq!(text.parse::<SampleId>().unwrap(), id);
        assert!("not-a-ulid".parse::<SampleId>().is_err());
    }

    #[test]
    fn test_ulid_id_serializes_as_string() {
        let id = SampleId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: SampleId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_now_ms_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(super::now_ms() > 1_577_836_800_000);
    }
}
