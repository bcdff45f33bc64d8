//! # Persistence Format
//!
//! Binary snapshot of an in-memory registry, used by the `file` backend.
//! File I/O lives in the app layer.
//!
//! Format: Header (5 bytes) + postcard-serialized `MemoryStore`.
//! - 4 bytes: Magic ("LFLW")
//! - 1 byte: Version
//!
//! The header and the payload size are validated before any payload bytes
//! are deserialized.

use crate::storage::MemoryStore;
use crate::{LifeFlowError, primitives};

/// Maximum accepted snapshot size (64 MB).
pub const MAX_SNAPSHOT_SIZE: usize = 64 * 1024 * 1024;

const HEADER_LEN: usize = 5;

// =============================================================================
// FILE HEADER
// =============================================================================

/// The persistence header precedes all snapshot data.
#[derive(Debug, Clone, Copy)]
pub struct PersistenceHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl PersistenceHeader {
    /// Create a new header with current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *primitives::MAGIC_BYTES,
            version: primitives::FORMAT_VERSION,
        }
    }

    /// Validate the header.
    pub fn validate(&self) -> Result<(), LifeFlowError> {
        if &self.magic != primitives::MAGIC_BYTES {
            return Err(LifeFlowError::SerializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != primitives::FORMAT_VERSION {
            return Err(LifeFlowError::SerializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version,
                primitives::FORMAT_VERSION
            )));
        }
        Ok(())
    }

    /// Write header to bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    /// Read header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LifeFlowError> {
        let Some(header) = bytes.get(..HEADER_LEN) else {
            return Err(LifeFlowError::SerializationError(
                "Header too short".to_string(),
            ));
        };
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&header[0..4]);
        Ok(Self {
            magic,
            version: header[4],
        })
    }
}

impl Default for PersistenceHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Serialize a store to bytes (header + payload).
pub fn store_to_bytes(store: &MemoryStore) -> Result<Vec<u8>, LifeFlowError> {
    let payload = postcard::to_stdvec(store)
        .map_err(|e| LifeFlowError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(HEADER_LEN + payload.len());
    result.extend_from_slice(&PersistenceHeader::new().to_bytes());
    result.extend_from_slice(&payload);
    Ok(result)
}

/// Deserialize a store from bytes.
pub fn store_from_bytes(bytes: &[u8]) -> Result<MemoryStore, LifeFlowError> {
    if bytes.len() > MAX_SNAPSHOT_SIZE {
        return Err(LifeFlowError::SerializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_SNAPSHOT_SIZE
        )));
    }

    let header = PersistenceHeader::from_bytes(bytes)?;
    header.validate()?;

    postcard::from_bytes(&bytes[HEADER_LEN..]).map_err(|e| {
        LifeFlowError::SerializationError(format!("Failed to deserialize snapshot: {}", e))
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::donor::Donor;
    use crate::donor::tests::registration;
    use crate::storage::RegistryStore;
    use crate::types::{BloodType, DonorId};

    #[test]
    fn snapshot_preserves_store() {
        let mut store = MemoryStore::new();
        let donor = Donor::new(
            DonorId(1),
            registration("Rahul Sharma", BloodType::OPositive, "Mumbai"),
            100,
        );
        store.put_donor(&donor).expect("put");

        let bytes = store_to_bytes(&store).expect("serialize");
        assert_eq!(&bytes[0..4], primitives::MAGIC_BYTES);

        let restored = store_from_bytes(&bytes).expect("deserialize");
        assert_eq!(restored, store);
        assert_eq!(restored.next_donor_id().expect("id"), DonorId(2));
    }

    #[test]
    fn invalid_magic_rejected() {
        let mut bytes = vec![0u8; 10];
        bytes[0..4].copy_from_slice(b"XXXX");
        assert!(store_from_bytes(&bytes).is_err());
    }

    #[test]
    fn short_input_rejected() {
        assert!(store_from_bytes(b"LFL").is_err());
    }

    #[test]
    fn future_version_rejected() {
        let mut bytes = store_to_bytes(&MemoryStore::new()).expect("serialize");
        bytes[4] = primitives::FORMAT_VERSION + 1;
        assert!(store_from_bytes(&bytes).is_err());
    }
}
