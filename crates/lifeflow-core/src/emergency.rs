//! # Emergency Requests
//!
//! An urgent request for blood at a hospital, and the broadcast that
//! selects which donors to alert.
//!
//! Broadcast targets are eligible donors whose type can safely give to the
//! requested type. Ranking is deterministic:
//! 1. donors who opted into emergency alerts
//! 2. exact type before merely compatible
//! 3. newest registration, then higher id

use crate::compatibility::compatible_donors;
use crate::donor::{Donor, limit_text, require_text};
use crate::primitives::MAX_UNITS_PER_REQUEST;
use crate::search::contains_ignore_case;
use crate::types::{BloodType, DonorId, LifeFlowError, RequestId};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;

// =============================================================================
// URGENCY
// =============================================================================

/// How quickly the blood is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Life-threatening; needed immediately.
    #[default]
    Critical,
    /// Needed within 6 hours.
    Urgent,
    /// Needed within 24 hours.
    Moderate,
}

impl Urgency {
    /// Response window in hours. Zero means immediately.
    #[must_use]
    pub const fn response_window_hours(self) -> u32 {
        match self {
            Self::Critical => 0,
            Self::Urgent => 6,
            Self::Moderate => 24,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical (Life-threatening)",
            Self::Urgent => "Urgent (Within 6 hours)",
            Self::Moderate => "Moderate (Within 24 hours)",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// DRAFT
// =============================================================================

/// Submitted emergency request, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyDraft {
    pub patient_name: String,
    pub blood_type: BloodType,
    pub units_needed: u32,
    pub hospital_name: String,
    #[serde(default)]
    pub hospital_address: String,
    pub contact_person: String,
    pub contact_phone: String,
    #[serde(default)]
    pub urgency: Urgency,
    /// Restrict the broadcast to donors in this city.
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub medical_condition: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl EmergencyDraft {
    pub fn validate(&self) -> Result<(), LifeFlowError> {
        require_text("patient_name", &self.patient_name)?;
        require_text("hospital_name", &self.hospital_name)?;
        require_text("contact_person", &self.contact_person)?;
        require_text("contact_phone", &self.contact_phone)?;
        limit_text("hospital_address", &self.hospital_address)?;

        for (field, value) in [
            ("city", &self.city),
            ("medical_condition", &self.medical_condition),
            ("notes", &self.notes),
        ] {
            if let Some(value) = value {
                limit_text(field, value)?;
            }
        }

        if self.units_needed == 0 || self.units_needed > MAX_UNITS_PER_REQUEST {
            return Err(LifeFlowError::invalid_field(
                "units_needed",
                format!(
                    "{} is outside 1..={}",
                    self.units_needed, MAX_UNITS_PER_REQUEST
                ),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// STORED REQUEST
// =============================================================================

/// Lifecycle of a stored request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Open,
    Fulfilled { resolved_at: u64 },
}

impl RequestStatus {
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// A stored emergency request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyRequest {
    pub id: RequestId,
    pub details: EmergencyDraft,
    pub created_at: u64,
    pub status: RequestStatus,
}

impl EmergencyRequest {
    /// Wrap a validated draft as a new open request.
    #[must_use]
    pub fn open(id: RequestId, details: EmergencyDraft, created_at: u64) -> Self {
        Self {
            id,
            details,
            created_at,
            status: RequestStatus::Open,
        }
    }

    /// Close the request. Fails if it is already closed.
    pub fn resolve(&mut self, now: u64) -> Result<(), LifeFlowError> {
        if !self.status.is_open() {
            return Err(LifeFlowError::RequestClosed(self.id));
        }
        self.status = RequestStatus::Fulfilled { resolved_at: now };
        Ok(())
    }
}

// =============================================================================
// BROADCAST
// =============================================================================

/// One donor selected for an emergency alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorMatch {
    pub donor_id: DonorId,
    pub name: String,
    pub blood_type: BloodType,
    pub phone: String,
    pub city: String,
    /// Donor type equals the requested type.
    pub exact_match: bool,
    pub available_for_emergency: bool,
}

impl DonorMatch {
    fn from_donor(donor: &Donor, requested: BloodType) -> Self {
        Self {
            donor_id: donor.id,
            name: donor.name.clone(),
            blood_type: donor.blood_type,
            phone: donor.phone.clone(),
            city: donor.city.clone(),
            exact_match: donor.blood_type == requested,
            available_for_emergency: donor.available_for_emergency,
        }
    }
}

/// A stored request together with the donors alerted for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broadcast {
    pub request: EmergencyRequest,
    pub matches: Vec<DonorMatch>,
}

/// Select and rank donors for a request.
#[must_use]
pub fn select_donors(donors: &[Donor], request: &EmergencyDraft, now: u64) -> Vec<DonorMatch> {
    let accepted = compatible_donors(request.blood_type);
    let city = request
        .city
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let mut selected: Vec<&Donor> = donors
        .iter()
        .filter(|d| d.is_eligible(now) && accepted.contains(d.blood_type))
        .filter(|d| city.is_none_or(|c| contains_ignore_case(&d.city, c)))
        .collect();

    selected.sort_by_key(|d| {
        (
            Reverse(d.available_for_emergency),
            Reverse(d.blood_type == request.blood_type),
            Reverse(d.registered_at),
            Reverse(d.id),
        )
    });

    selected
        .into_iter()
        .map(|d| DonorMatch::from_donor(d, request.blood_type))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
