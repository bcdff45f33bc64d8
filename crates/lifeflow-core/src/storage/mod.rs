//! # Storage
//!
//! The `RegistryStore` trait and its two implementations:
//! - `MemoryStore`: `BTreeMap`s, snapshot-able to a file
//! - `RedbStore`: disk-backed redb database with ACID transactions
//!
//! Both hand out ids from monotonically increasing counters starting at 1.
//! Removed ids are never reused.

mod memory;
mod redb_store;

pub use memory::MemoryStore;
pub use redb_store::RedbStore;

use crate::donor::Donor;
use crate::emergency::EmergencyRequest;
use crate::types::{DonorId, LifeFlowError, RequestId};

/// Persistence interface for donors and emergency requests.
///
/// Implementations must return collections in ascending id order.
pub trait RegistryStore {
    /// The id the next newly registered donor will receive.
    fn next_donor_id(&self) -> Result<DonorId, LifeFlowError>;

    /// Insert or replace a donor. Advances the id counter past `donor.id`.
    fn put_donor(&mut self, donor: &Donor) -> Result<(), LifeFlowError>;

    fn get_donor(&self, id: DonorId) -> Result<Option<Donor>, LifeFlowError>;

    /// Remove a donor, returning it if it existed.
    fn remove_donor(&mut self, id: DonorId) -> Result<Option<Donor>, LifeFlowError>;

    /// All donors, ascending by id.
    fn donors(&self) -> Result<Vec<Donor>, LifeFlowError>;

    fn donor_count(&self) -> Result<usize, LifeFlowError>;

    /// The id the next emergency request will receive.
    fn next_request_id(&self) -> Result<RequestId, LifeFlowError>;

    /// Insert or replace a request. Advances the id counter past `request.id`.
    fn put_request(&mut self, request: &EmergencyRequest) -> Result<(), LifeFlowError>;

    fn get_request(&self, id: RequestId) -> Result<Option<EmergencyRequest>, LifeFlowError>;

    /// All requests, ascending by id.
    fn requests(&self) -> Result<Vec<EmergencyRequest>, LifeFlowError>;
}
