//! # lifeflow-core
//!
//! The domain logic for LifeFlow, a blood donor matching service.
//!
//! The heart of the crate is the ABO/Rh compatibility engine: a fixed 8x8
//! relation between blood types, compiled in as lookup tables and checked
//! against the transfusion rules it encodes. Around it sit the donor
//! registry, donor search, emergency broadcasts, and a static hospital
//! directory.
//!
//! ## Architectural Constraints
//!
//! The core:
//! - Has NO async, NO network dependencies (pure Rust)
//! - Never reads the clock; callers pass `now` as unix seconds
//! - Is deterministic: `BTreeMap` only, no floats, stable ordering everywhere

// =============================================================================
// MODULES
// =============================================================================

pub mod compatibility;
pub mod donor;
pub mod emergency;
pub mod formats;
pub mod hospital;
pub mod primitives;
pub mod profile;
pub mod registry;
pub mod search;
pub mod storage;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{AboGroup, BloodType, BloodTypeSet, DonorId, LifeFlowError, RequestId, RhFactor};

// =============================================================================
// RE-EXPORTS: Compatibility Engine
// =============================================================================

pub use compatibility::{
    CompatibilityReport, compatible_donors, compatible_recipients, is_compatible,
};
pub use profile::{BloodTypeProfile, Rarity, SpecialProperty, all_profiles, profile};

// =============================================================================
// RE-EXPORTS: Registry
// =============================================================================

pub use donor::{Donor, DonorRegistration};
pub use emergency::{
    Broadcast, DonorMatch, EmergencyDraft, EmergencyRequest, RequestStatus, Urgency,
};
pub use hospital::Hospital;
pub use registry::{Registry, RegistryStats, StorageBackend};
pub use search::{DonorQuery, MatchMode};
pub use storage::{MemoryStore, RedbStore, RegistryStore};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{PersistenceHeader, store_from_bytes, store_to_bytes};
