use crate::common::{OBJECT_ID_HEX_LENGTH, OBJECT_ID_LENGTH};
use crate::errors::{BulkriteError, ErrorKind, BulkriteResult};
use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use rand::Rng;
use std::fmt::{Debug, Display};
use std::sync::atomic::{AtomicU32, Ordering};

/// Process-unique random component shared by every id generated in this
/// process. Computed once, lazily, from the OS entropy source.
static PROCESS_RANDOM: Lazy<[u8; 5]> = Lazy::new(|| {
    let random: [u8; 5] = OsRng.gen();
    log::info!("Initialized object id generator with process random {:02x?}", random);
    random
});

/// Monotonic per-process counter, randomly seeded so concurrent processes
/// do not collide on startup.
static COUNTER: Lazy<AtomicU32> = Lazy::new(|| AtomicU32::new(OsRng.gen::<u32>() & 0xFF_FFFF));

/// A unique identifier for documents.
///
/// Each document in a collection is uniquely identified by the `ObjectId`
/// stored in its `_id` field. The id is generated client-side at
/// document-creation time if absent, and is immutable once assigned.
///
/// # Layout
///
/// An `ObjectId` is 12 bytes:
/// - 4-byte big-endian seconds since the Unix epoch
/// - 5-byte random value unique to this process
/// - 3-byte big-endian counter, randomly seeded
///
/// This gives approximate timestamp ordering and global distinguishability
/// without central coordination.
///
/// # Examples
///
/// ```rust,ignore
/// use bulkrite::document::ObjectId;
///
/// // Auto-generate an id
/// let id = ObjectId::new();
///
/// // Round-trip through its 24-character hex form
/// let parsed = ObjectId::parse_str(&id.to_string())?;
/// assert_eq!(id, parsed);
/// ```
#[derive(PartialEq, Eq, Ord, PartialOrd, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ObjectId {
    bytes: [u8; OBJECT_ID_LENGTH],
}

impl ObjectId {
    /// Generates a new unique `ObjectId` from the current time, the process
    /// random component, and the process counter.
    pub fn new() -> Self {
        let timestamp = Utc::now().timestamp() as u32;
        let counter = COUNTER.fetch_add(1, Ordering::SeqCst) & 0xFF_FFFF;

        let mut bytes = [0u8; OBJECT_ID_LENGTH];
        bytes[0..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_RANDOM);
        bytes[9..12].copy_from_slice(&counter.to_be_bytes()[1..4]);

        ObjectId { bytes }
    }

    /// Creates an `ObjectId` from raw bytes.
    pub fn from_bytes(bytes: [u8; OBJECT_ID_LENGTH]) -> Self {
        ObjectId { bytes }
    }

    /// Parses an `ObjectId` from its 24-character hexadecimal representation.
    ///
    /// # Errors
    ///
    /// Returns an error of kind [`ErrorKind::InvalidId`] if the input has the
    /// wrong length or contains non-hexadecimal characters.
    pub fn parse_str(hex: &str) -> BulkriteResult<ObjectId> {
        if hex.len() != OBJECT_ID_HEX_LENGTH || !hex.is_ascii() {
            log::error!("Object id hex string must be {} ascii characters", OBJECT_ID_HEX_LENGTH);
            return Err(BulkriteError::new(
                &format!(
                    "Object id hex string must be {} ascii characters, got {:?}",
                    OBJECT_ID_HEX_LENGTH, hex
                ),
                ErrorKind::InvalidId,
            ));
        }

        let mut bytes = [0u8; OBJECT_ID_LENGTH];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = &hex[i * 2..i * 2 + 2];
            *byte = u8::from_str_radix(pair, 16).map_err(|err| {
                log::error!("Object id hex string contains invalid digit pair {:?}", pair);
                BulkriteError::new_with_cause(
                    &format!("Malformed object id {:?}", hex),
                    ErrorKind::InvalidId,
                    err.into(),
                )
            })?;
        }

        Ok(ObjectId { bytes })
    }

    /// Returns the raw bytes of this id.
    pub fn bytes(&self) -> &[u8; OBJECT_ID_LENGTH] {
        &self.bytes
    }

    /// Returns the creation time embedded in this id, at second precision.
    pub fn timestamp(&self) -> DateTime<Utc> {
        let seconds = u32::from_be_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]]);
        Utc.timestamp_opt(seconds as i64, 0)
            .single()
            .unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap())
    }

    /// Returns the 24-character hexadecimal representation of this id.
    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(OBJECT_ID_HEX_LENGTH);
        for byte in &self.bytes {
            hex.push_str(&format!("{:02x}", byte));
        }
        hex
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        ObjectId::new()
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Debug for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId(\"{}\")", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_generates_unique_ids() {
        let ids: HashSet<ObjectId> = (0..1000).map(|_| ObjectId::new()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_ids_share_process_random() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_eq!(a.bytes()[4..9], b.bytes()[4..9]);
    }

    #[test]
    fn test_hex_round_trip() {
        let id = ObjectId::new();
        let hex = id.to_hex();
        assert_eq!(hex.len(), OBJECT_ID_HEX_LENGTH);

        let parsed = ObjectId::parse_str(&hex).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_parse_str_rejects_wrong_length() {
        let result = ObjectId::parse_str("deadbeef");
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::InvalidId);
    }

    #[test]
    fn test_parse_str_rejects_non_hex() {
        let result = ObjectId::parse_str("zzzzzzzzzzzzzzzzzzzzzzzz");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidId);
        assert!(err.cause().is_some());
    }

    #[test]
    fn test_timestamp_is_embedded() {
        let before = Utc::now().timestamp();
        let id = ObjectId::new();
        let after = Utc::now().timestamp();

        let embedded = id.timestamp().timestamp();
        assert!(embedded >= before && embedded <= after);
    }

    #[test]
    fn test_from_bytes() {
        let bytes = [1u8; OBJECT_ID_LENGTH];
        let id = ObjectId::from_bytes(bytes);
        assert_eq!(id.bytes(), &bytes);
        assert_eq!(id.to_hex(), "010101010101010101010101");
    }

    #[test]
    fn test_debug_format() {
        let id = ObjectId::from_bytes([0u8; OBJECT_ID_LENGTH]);
        assert_eq!(format!("{:?}", id), "ObjectId(\"000000000000000000000000\")");
    }
}
