//! # redb-backed Registry Storage
//!
//! A disk-backed registry store using the redb embedded database:
//! - ACID transactions
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)
//!
//! Records are postcard-encoded. Id counters live in the `metadata` table
//! and are advanced in the same transaction as the record that uses them.

use super::RegistryStore;
use crate::donor::Donor;
use crate::emergency::EmergencyRequest;
use crate::types::{DonorId, LifeFlowError, RequestId};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// A table of postcard-encoded records keyed by numeric id.
type RecordTable = TableDefinition<'static, u64, &'static [u8]>;

/// Table for donors: DonorId(u64) -> serialized Donor bytes
const DONORS: RecordTable = TableDefinition::new("donors");

/// Table for emergency requests: RequestId(u64) -> serialized request bytes
const REQUESTS: RecordTable = TableDefinition::new("requests");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const NEXT_DONOR_ID: &str = "next_donor_id";
const NEXT_REQUEST_ID: &str = "next_request_id";

fn io_err(e: impl std::fmt::Display) -> LifeFlowError {
    LifeFlowError::IoError(e.to_string())
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, LifeFlowError> {
    postcard::to_allocvec(value).map_err(|e| LifeFlowError::SerializationError(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LifeFlowError> {
    postcard::from_bytes(bytes).map_err(|e| LifeFlowError::SerializationError(e.to_string()))
}

/// A disk-backed registry store using redb.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a registry database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LifeFlowError> {
        let db = Database::create(path.as_ref()).map_err(io_err)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(io_err)?;
            let _ = write_txn.open_table(DONORS).map_err(io_err)?;
            let _ = write_txn.open_table(REQUESTS).map_err(io_err)?;
            let _ = write_txn.open_table(METADATA).map_err(io_err)?;
            write_txn.commit().map_err(io_err)?;
        }

        Ok(Self { db })
    }

    fn read_counter(&self, key: &str) -> Result<u64, LifeFlowError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(METADATA).map_err(io_err)?;
        Ok(table
            .get(key)
            .map_err(io_err)?
            .map(|v| v.value())
            .unwrap_or(1))
    }

    /// Write one record and advance its id counter atomically.
    fn put_record(
        &mut self,
        table_def: RecordTable,
        counter: &str,
        id: u64,
        bytes: &[u8],
    ) -> Result<(), LifeFlowError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut table = write_txn.open_table(table_def).map_err(io_err)?;
            table.insert(id, bytes).map_err(io_err)?;

            let mut meta = write_txn.open_table(METADATA).map_err(io_err)?;
            let current = meta
                .get(counter)
                .map_err(io_err)?
                .map(|v| v.value())
                .unwrap_or(1);
            let next = current.max(id.saturating_add(1));
            meta.insert(counter, next).map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)
    }

    fn get_record<T: DeserializeOwned>(
        &self,
        table_def: RecordTable,
        id: u64,
    ) -> Result<Option<T>, LifeFlowError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(table_def).map_err(io_err)?;
        match table.get(id).map_err(io_err)? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    fn all_records<T: DeserializeOwned>(
        &self,
        table_def: RecordTable,
    ) -> Result<Vec<T>, LifeFlowError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(table_def).map_err(io_err)?;
        let mut records = Vec::new();
        for entry in table.iter().map_err(io_err)? {
            let (_, value) = entry.map_err(io_err)?;
            records.push(decode(value.value())?);
        }
        Ok(records)
    }
}

impl RegistryStore for RedbStore {
    fn next_donor_id(&self) -> Result<DonorId, LifeFlowError> {
        self.read_counter(NEXT_DONOR_ID).map(DonorId)
    }

    fn put_donor(&mut self, donor: &Donor) -> Result<(), LifeFlowError> {
        let bytes = encode(donor)?;
        self.put_record(DONORS, NEXT_DONOR_ID, donor.id.0, &bytes)
    }

    fn get_donor(&self, id: DonorId) -> Result<Option<Donor>, LifeFlowError> {
        self.get_record(DONORS, id.0)
    }

    fn remove_donor(&mut self, id: DonorId) -> Result<Option<Donor>, LifeFlowError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let removed = {
            let mut table = write_txn.open_table(DONORS).map_err(io_err)?;
            let removed = table.remove(id.0).map_err(io_err)?;
            match removed {
                Some(data) => Some(decode::<Donor>(data.value())?),
                None => None,
            }
        };
        write_txn.commit().map_err(io_err)?;
        Ok(removed)
    }

    fn donors(&self) -> Result<Vec<Donor>, LifeFlowError> {
        self.all_records(DONORS)
    }

    fn donor_count(&self) -> Result<usize, LifeFlowError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(DONORS).map_err(io_err)?;
        let count = table.len().map_err(io_err)?;
        Ok(count as usize)
    }

    fn next_request_id(&self) -> Result<RequestId, LifeFlowError> {
        self.read_counter(NEXT_REQUEST_ID).map(RequestId)
    }

    fn put_request(&mut self, request: &EmergencyRequest) -> Result<(), LifeFlowError> {
        let bytes = encode(request)?;
        self.put_record(REQUESTS, NEXT_REQUEST_ID, request.id.0, &bytes)
    }

    fn get_request(&self, id: RequestId) -> Result<Option<EmergencyRequest>, LifeFlowError> {
        self.get_record(REQUESTS, id.0)
    }

    fn requests(&self) -> Result<Vec<EmergencyRequest>, LifeFlowError> {
        self.all_records(REQUESTS)
    }
}
