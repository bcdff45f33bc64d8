//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Every fallible response carries `success` and `error`; the payload
//! fields are empty on failure.

use lifeflow_core::{
    BloodTypeProfile, Broadcast, CompatibilityReport, Donor, DonorMatch, EmergencyRequest,
    Hospital, RegistryStats,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Registry status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    pub persistent: bool,
    pub donor_count: usize,
    pub eligible_donors: usize,
    pub open_requests: usize,
    pub total_requests: usize,
    /// Donors per blood type code.
    pub by_blood_type: BTreeMap<String, usize>,
    pub error: Option<String>,
}

impl StatusResponse {
    pub fn success(stats: RegistryStats, persistent: bool) -> Self {
        Self {
            success: true,
            persistent,
            donor_count: stats.donor_count,
            eligible_donors: stats.eligible_donors,
            open_requests: stats.open_requests,
            total_requests: stats.total_requests,
            by_blood_type: stats
                .by_blood_type
                .into_iter()
                .map(|(bt, count)| (bt.code().to_string(), count))
                .collect(),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            persistent: false,
            donor_count: 0,
            eligible_donors: 0,
            open_requests: 0,
            total_requests: 0,
            by_blood_type: BTreeMap::new(),
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// BLOOD TYPES / COMPATIBILITY
// =============================================================================

/// All blood type profiles, canonical order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloodTypesResponse {
    pub profiles: Vec<BloodTypeProfile>,
}

/// Compatibility report for one type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityResponse {
    pub success: bool,
    pub report: Option<CompatibilityReport>,
    pub error: Option<String>,
}

impl CompatibilityResponse {
    pub fn success(report: CompatibilityReport) -> Self {
        Self {
            success: true,
            report: Some(report),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            report: None,
            error: Some(msg.into()),
        }
    }
}

/// Pairwise check request. Codes are parsed by the handler so bad codes
/// produce a structured 400.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    pub donor: String,
    pub recipient: String,
}

/// Pairwise check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResponse {
    pub success: bool,
    pub donor: Option<String>,
    pub recipient: Option<String>,
    pub compatible: Option<bool>,
    pub error: Option<String>,
}

impl CheckResponse {
    pub fn success(donor: &str, recipient: &str, compatible: bool) -> Self {
        Self {
            success: true,
            donor: Some(donor.to_string()),
            recipient: Some(recipient.to_string()),
            compatible: Some(compatible),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            donor: None,
            recipient: None,
            compatible: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// DONORS
// =============================================================================

/// Single-donor response (register, read, update, remove, availability,
/// donation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonorResponse {
    pub success: bool,
    pub donor: Option<Donor>,
    pub error: Option<String>,
}

impl DonorResponse {
    pub fn success(donor: Donor) -> Self {
        Self {
            success: true,
            donor: Some(donor),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            donor: None,
            error: Some(msg.into()),
        }
    }
}

/// Availability toggle request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    pub available: bool,
}

/// Donor search response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub count: usize,
    pub donors: Vec<Donor>,
    pub error: Option<String>,
}

impl SearchResponse {
    pub fn success(donors: Vec<Donor>) -> Self {
        Self {
            success: true,
            count: donors.len(),
            donors,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            count: 0,
            donors: vec![],
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// EMERGENCY REQUESTS
// =============================================================================

/// Response to creating an emergency request: the stored request and the
/// donors selected for the alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastResponse {
    pub success: bool,
    pub request: Option<EmergencyRequest>,
    pub notified: usize,
    pub matches: Vec<DonorMatch>,
    pub error: Option<String>,
}

impl BroadcastResponse {
    pub fn success(broadcast: Broadcast) -> Self {
        Self {
            success: true,
            request: Some(broadcast.request),
            notified: broadcast.matches.len(),
            matches: broadcast.matches,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            request: None,
            notified: 0,
            matches: vec![],
            error: Some(msg.into()),
        }
    }
}

/// Single emergency request response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestResponse {
    pub success: bool,
    pub request: Option<EmergencyRequest>,
    pub error: Option<String>,
}

impl RequestResponse {
    pub fn success(request: EmergencyRequest) -> Self {
        Self {
            success: true,
            request: Some(request),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            request: None,
            error: Some(msg.into()),
        }
    }
}

/// Query string for `GET /emergency`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestListQuery {
    /// Include fulfilled requests.
    #[serde(default)]
    pub all: bool,
}

/// Emergency request listing, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestListResponse {
    pub success: bool,
    pub count: usize,
    pub requests: Vec<EmergencyRequest>,
    pub error: Option<String>,
}

impl RequestListResponse {
    pub fn success(requests: Vec<EmergencyRequest>) -> Self {
        Self {
            success: true,
            count: requests.len(),
            requests,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            count: 0,
            requests: vec![],
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// HOSPITALS
// =============================================================================

/// Query string for `GET /hospitals`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HospitalQuery {
    #[serde(default)]
    pub q: String,
}

/// Hospital JSON representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalJson {
    pub id: u32,
    pub name: String,
    pub address: String,
    /// Latitude in micro-degrees.
    pub lat_micro: i32,
    /// Longitude in micro-degrees.
    pub lng_micro: i32,
}

impl From<&Hospital> for HospitalJson {
    fn from(h: &Hospital) -> Self {
        Self {
            id: h.id,
            name: h.name.to_string(),
            address: h.address.to_string(),
            lat_micro: h.coordinates.lat_micro,
            lng_micro: h.coordinates.lng_micro,
        }
    }
}

/// Hospital autocomplete response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HospitalListResponse {
    pub count: usize,
    pub hospitals: Vec<HospitalJson>,
}
