//! # Registry Module
//!
//! The donor and emergency-request registry: every stateful LifeFlow
//! operation goes through here.
//!
//! ## Storage Backends
//!
//! A registry runs over one of two backends:
//! - `InMemory`: `MemoryStore` (fast, volatile unless explicitly snapshotted)
//! - `Persistent`: `RedbStore` for disk-backed ACID storage
//!
//! All operations take the current time as unix seconds. The registry never
//! reads the clock itself.

use crate::donor::{Donor, DonorRegistration};
use crate::emergency::{Broadcast, EmergencyDraft, EmergencyRequest, select_donors};
use crate::search::{DonorQuery, search};
use crate::storage::{MemoryStore, RedbStore, RegistryStore};
use crate::types::{BloodType, DonorId, LifeFlowError, RequestId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Storage backend for a Registry.
#[derive(Debug)]
pub enum StorageBackend {
    /// In-memory store (fast, volatile).
    InMemory(MemoryStore),
    /// Disk-backed store using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

/// Aggregate counts for the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub donor_count: usize,
    /// Donors eligible at the time the stats were taken.
    pub eligible_donors: usize,
    pub open_requests: usize,
    pub total_requests: usize,
    /// Registered donors per blood type code, canonical order.
    pub by_blood_type: BTreeMap<BloodType, usize>,
}

/// Donor and emergency-request registry.
///
/// Note: Registry does NOT implement Clone (redb handles cannot be cloned).
#[derive(Debug, Default)]
pub struct Registry {
    backend: StorageBackend,
}

impl Registry {
    /// Create an empty registry with in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry over an existing in-memory store.
    #[must_use]
    pub fn with_store(store: MemoryStore) -> Self {
        Self {
            backend: StorageBackend::InMemory(store),
        }
    }

    /// Create a registry with persistent redb storage.
    ///
    /// Opens or creates a redb database at the given path.
    /// All changes are persisted as they happen.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, LifeFlowError> {
        Ok(Self {
            backend: StorageBackend::Persistent(RedbStore::open(path)?),
        })
    }

    /// Check if using persistent storage.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StorageBackend::Persistent(_))
    }

    /// The in-memory store, for snapshotting. `None` for redb.
    #[must_use]
    pub fn memory_store(&self) -> Option<&MemoryStore> {
        match &self.backend {
            StorageBackend::InMemory(store) => Some(store),
            StorageBackend::Persistent(_) => None,
        }
    }

    fn store(&self) -> &dyn RegistryStore {
        match &self.backend {
            StorageBackend::InMemory(store) => store,
            StorageBackend::Persistent(store) => store,
        }
    }

    fn store_mut(&mut self) -> &mut dyn RegistryStore {
        match &mut self.backend {
            StorageBackend::InMemory(store) => store,
            StorageBackend::Persistent(store) => store,
        }
    }

    // =========================================================================
    // DONORS
    // =========================================================================

    /// Validate and register a new donor. New donors start available.
    pub fn register_donor(
        &mut self,
        registration: DonorRegistration,
        now: u64,
    ) -> Result<Donor, LifeFlowError> {
        registration.validate()?;
        let id = self.store().next_donor_id()?;
        let donor = Donor::new(id, registration, now);
        self.store_mut().put_donor(&donor)?;
        Ok(donor)
    }

    pub fn get_donor(&self, id: DonorId) -> Result<Donor, LifeFlowError> {
        self.store()
            .get_donor(id)?
            .ok_or(LifeFlowError::DonorNotFound(id))
    }

    /// Replace a donor's profile fields.
    pub fn update_donor(
        &mut self,
        id: DonorId,
        registration: DonorRegistration,
    ) -> Result<Donor, LifeFlowError> {
        registration.validate()?;
        let mut donor = self.get_donor(id)?;
        donor.apply(registration);
        self.store_mut().put_donor(&donor)?;
        Ok(donor)
    }

    pub fn remove_donor(&mut self, id: DonorId) -> Result<Donor, LifeFlowError> {
        self.store_mut()
            .remove_donor(id)?
            .ok_or(LifeFlowError::DonorNotFound(id))
    }

    /// Set the donor's availability status.
    ///
    /// Turning availability on during the post-donation cooldown fails.
    /// Turning it off always succeeds.
    pub fn set_availability(
        &mut self,
        id: DonorId,
        available: bool,
        now: u64,
    ) -> Result<Donor, LifeFlowError> {
        let mut donor = self.get_donor(id)?;
        if available {
            let remaining_days = donor.cooldown_remaining_days(now);
            if remaining_days > 0 {
                return Err(LifeFlowError::DonationCooldown {
                    donor: id,
                    remaining_days,
                });
            }
        }
        donor.available = available;
        self.store_mut().put_donor(&donor)?;
        Ok(donor)
    }

    /// Record a donation at `now`. The donor becomes unavailable.
    pub fn record_donation(&mut self, id: DonorId, now: u64) -> Result<Donor, LifeFlowError> {
        let mut donor = self.get_donor(id)?;
        donor.last_donation_at = Some(now);
        donor.available = false;
        self.store_mut().put_donor(&donor)?;
        Ok(donor)
    }

    /// Search eligible donors.
    pub fn search_donors(&self, query: &DonorQuery, now: u64) -> Result<Vec<Donor>, LifeFlowError> {
        let donors = self.store().donors()?;
        Ok(search(&donors, query, now).into_iter().cloned().collect())
    }

    pub fn donor_count(&self) -> Result<usize, LifeFlowError> {
        self.store().donor_count()
    }

    // =========================================================================
    // EMERGENCY REQUESTS
    // =========================================================================

    /// Store a new emergency request and select the donors to alert.
    pub fn create_emergency(
        &mut self,
        draft: EmergencyDraft,
        now: u64,
    ) -> Result<Broadcast, LifeFlowError> {
        draft.validate()?;
        let donors = self.store().donors()?;
        let matches = select_donors(&donors, &draft, now);

        let id = self.store().next_request_id()?;
        let request = EmergencyRequest::open(id, draft, now);
        self.store_mut().put_request(&request)?;

        Ok(Broadcast { request, matches })
    }

    pub fn get_request(&self, id: RequestId) -> Result<EmergencyRequest, LifeFlowError> {
        self.store()
            .get_request(id)?
            .ok_or(LifeFlowError::RequestNotFound(id))
    }

    /// Requests, newest first.
    pub fn list_requests(&self, open_only: bool) -> Result<Vec<EmergencyRequest>, LifeFlowError> {
        let mut requests = self.store().requests()?;
        if open_only {
            requests.retain(|r| r.status.is_open());
        }
        requests.reverse();
        Ok(requests)
    }

    /// Mark a request fulfilled.
    pub fn resolve_request(
        &mut self,
        id: RequestId,
        now: u64,
    ) -> Result<EmergencyRequest, LifeFlowError> {
        let mut request = self.get_request(id)?;
        request.resolve(now)?;
        self.store_mut().put_request(&request)?;
        Ok(request)
    }

    // =========================================================================
    // STATS
    // =========================================================================

    pub fn stats(&self, now: u64) -> Result<RegistryStats, LifeFlowError> {
        let donors = self.store().donors()?;
        let requests = self.store().requests()?;

        let mut by_blood_type: BTreeMap<BloodType, usize> =
            BloodType::ALL.into_iter().map(|t| (t, 0)).collect();
        for donor in &donors {
            *by_blood_type.entry(donor.blood_type).or_insert(0) += 1;
        }

        Ok(RegistryStats {
            donor_count: donors.len(),
            eligible_donors: donors.iter().filter(|d| d.is_eligible(now)).count(),
            open_requests: requests.iter().filter(|r| r.status.is_open()).count(),
            total_requests: requests.len(),
            by_blood_type,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
