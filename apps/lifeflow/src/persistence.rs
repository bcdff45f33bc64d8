//! # Registry Persistence
//!
//! Opening and saving registries for the configured backend. This is the
//! only place the app touches the registry's files.
//!
//! - `redb`: the database is the registry; writes are durable immediately.
//! - `file`: an in-memory registry loaded from and saved to a snapshot file.

use crate::config::{Backend, StorageConfig};
use lifeflow_core::formats::persistence::MAX_SNAPSHOT_SIZE;
use lifeflow_core::{LifeFlowError, MemoryStore, Registry, store_from_bytes, store_to_bytes};
use std::path::Path;

/// Open the registry described by `storage`.
///
/// A missing snapshot file yields an empty registry. Oversized snapshots
/// are rejected before they are read.
pub fn open_registry(storage: &StorageConfig) -> Result<Registry, LifeFlowError> {
    match storage.backend {
        Backend::Redb => Registry::with_redb(&storage.database),
        Backend::File => {
            if !storage.database.exists() {
                return Ok(Registry::with_store(MemoryStore::new()));
            }
            let metadata = std::fs::metadata(&storage.database)
                .map_err(|e| LifeFlowError::IoError(format!("Read db metadata: {}", e)))?;
            if metadata.len() > MAX_SNAPSHOT_SIZE as u64 {
                return Err(LifeFlowError::SerializationError(format!(
                    "Snapshot size {} bytes exceeds maximum allowed {} bytes",
                    metadata.len(),
                    MAX_SNAPSHOT_SIZE
                )));
            }
            let data = std::fs::read(&storage.database)
                .map_err(|e| LifeFlowError::IoError(format!("Read db: {}", e)))?;
            Ok(Registry::with_store(store_from_bytes(&data)?))
        }
    }
}

/// Encode the registry's snapshot, or `None` for redb registries, which
/// persist as they go.
pub fn snapshot_bytes(registry: &Registry) -> Result<Option<Vec<u8>>, LifeFlowError> {
    registry.memory_store().map(store_to_bytes).transpose()
}

/// Write snapshot bytes to `path` through a temporary file and a rename.
pub fn write_snapshot(path: &Path, data: &[u8]) -> Result<(), LifeFlowError> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, data).map_err(|e| LifeFlowError::IoError(format!("Write db: {}", e)))?;
    std::fs::rename(&tmp, path).map_err(|e| LifeFlowError::IoError(format!("Write db: {}", e)))
}

/// Save a registry to `path`. A no-op for redb registries.
pub fn save_registry(registry: &Registry, path: &Path) -> Result<(), LifeFlowError> {
    match snapshot_bytes(registry)? {
        Some(data) => write_snapshot(path, &data),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifeflow_core::{BloodType, DonorRegistration};

    fn registration() -> DonorRegistration {
        DonorRegistration {
            name: "Rahul Sharma".to_string(),
            age: 28,
            blood_type: BloodType::OPositive,
            phone: "+91 98765-43210".to_string(),
            email: Some("rahul@example.com".to_string()),
            address: String::new(),
            city: "Mumbai".to_string(),
            state: "Maharashtra".to_string(),
            pincode: None,
            medical_conditions: None,
            emergency_contact: None,
            available_for_emergency: true,
            agree_terms: true,
        }
    }

    #[test]
    fn file_backend_survives_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = StorageConfig {
            database: dir.path().join("lifeflow.db"),
            backend: Backend::File,
        };

        let mut registry = open_registry(&storage).expect("open");
        assert!(!registry.is_persistent());
        let donor = registry.register_donor(registration(), 100).expect("register");
        save_registry(&registry, &storage.database).expect("save");

        let reloaded = open_registry(&storage).expect("reopen");
        assert_eq!(reloaded.get_donor(donor.id).expect("get"), donor);
    }

    #[test]
    fn redb_backend_needs_no_save() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = StorageConfig {
            database: dir.path().join("lifeflow.redb"),
            backend: Backend::Redb,
        };

        let id = {
            let mut registry = open_registry(&storage).expect("open");
            assert!(registry.is_persistent());
            let id = registry.register_donor(registration(), 1).expect("register").id;
            save_registry(&registry, &storage.database).expect("save is a no-op");
            id
        };

        let reopened = open_registry(&storage).expect("reopen");
        assert_eq!(reopened.get_donor(id).expect("get").name, "Rahul Sharma");
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("lifeflow.db");
        assert!(matches!(
            save_registry(&Registry::new(), &path),
            Err(LifeFlowError::IoError(_))
        ));
    }

    #[test]
    fn oversized_snapshot_rejected_before_read() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("huge.db");
        let file = std::fs::File::create(&path).expect("create");
        file.set_len(MAX_SNAPSHOT_SIZE as u64 + 1).expect("set_len");
        let storage = StorageConfig {
            database: path,
            backend: Backend::File,
        };
        assert!(matches!(
            open_registry(&storage),
            Err(LifeFlowError::SerializationError(msg)) if msg.contains("exceeds")
        ));
    }

    #[test]
    fn corrupt_snapshot_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.db");
        std::fs::write(&path, b"not a snapshot").expect("write");
        let storage = StorageConfig {
            database: path,
            backend: Backend::File,
        };
        assert!(open_registry(&storage).is_err());
    }
}
