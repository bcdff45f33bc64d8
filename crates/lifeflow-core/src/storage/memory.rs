//! In-memory registry store.

use super::RegistryStore;
use crate::donor::Donor;
use crate::emergency::EmergencyRequest;
use crate::types::{DonorId, LifeFlowError, RequestId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Volatile store backed by `BTreeMap`s.
///
/// The whole store is serializable, which is how the `file` backend
/// persists it (see `formats::persistence`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStore {
    donors: BTreeMap<DonorId, Donor>,
    requests: BTreeMap<RequestId, EmergencyRequest>,
    next_donor_id: u64,
    next_request_id: u64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            donors: BTreeMap::new(),
            requests: BTreeMap::new(),
            next_donor_id: 1,
            next_request_id: 1,
        }
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RegistryStore for MemoryStore {
    fn next_donor_id(&self) -> Result<DonorId, LifeFlowError> {
        Ok(DonorId(self.next_donor_id))
    }

    fn put_donor(&mut self, donor: &Donor) -> Result<(), LifeFlowError> {
        self.next_donor_id = self.next_donor_id.max(donor.id.0.saturating_add(1));
        self.donors.insert(donor.id, donor.clone());
        Ok(())
    }

    fn get_donor(&self, id: DonorId) -> Result<Option<Donor>, LifeFlowError> {
        Ok(self.donors.get(&id).cloned())
    }

    fn remove_donor(&mut self, id: DonorId) -> Result<Option<Donor>, LifeFlowError> {
        Ok(self.donors.remove(&id))
    }

    fn donors(&self) -> Result<Vec<Donor>, LifeFlowError> {
        Ok(self.donors.values().cloned().collect())
    }

    fn donor_count(&self) -> Result<usize, LifeFlowError> {
        Ok(self.donors.len())
    }

    fn next_request_id(&self) -> Result<RequestId, LifeFlowError> {
        Ok(RequestId(self.next_request_id))
    }

    fn put_request(&mut self, request: &EmergencyRequest) -> Result<(), LifeFlowError> {
        self.next_request_id = self.next_request_id.max(request.id.0.saturating_add(1));
        self.requests.insert(request.id, request.clone());
        Ok(())
    }

    fn get_request(&self, id: RequestId) -> Result<Option<EmergencyRequest>, LifeFlowError> {
        Ok(self.requests.get(&id).cloned())
    }

    fn requests(&self) -> Result<Vec<EmergencyRequest>, LifeFlowError> {
        Ok(self.requests.values().cloned().collect())
    }
}
