//! Unit tests for API types serialization/deserialization.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use lifeflow::api::{
    AvailabilityRequest, BroadcastResponse, CheckRequest, CompatibilityResponse, DonorResponse,
    HealthResponse, HospitalJson, RequestListQuery, SearchResponse, StatusResponse,
};
use lifeflow_core::{
    BloodType, CompatibilityReport, DonorQuery, MatchMode, Registry, RegistryStats, hospital,
};
use serde_json::json;
use std::collections::BTreeMap;

// =============================================================================
// HEALTH / STATUS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn test_status_response_uses_type_codes() {
    let mut by_blood_type = BTreeMap::new();
    by_blood_type.insert(BloodType::ONegative, 3);
    by_blood_type.insert(BloodType::ABPositive, 1);
    let stats = RegistryStats {
        donor_count: 4,
        eligible_donors: 2,
        open_requests: 1,
        total_requests: 5,
        by_blood_type,
    };

    let json = serde_json::to_value(StatusResponse::success(stats, true)).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["persistent"], true);
    assert_eq!(json["donor_count"], 4);
    assert_eq!(json["by_blood_type"]["O-"], 3);
    assert_eq!(json["by_blood_type"]["AB+"], 1);
    assert!(json["error"].is_null());
}

#[test]
fn test_status_error_shape() {
    let json = serde_json::to_value(StatusResponse::error("disk full")).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "disk full");
    assert_eq!(json["donor_count"], 0);
}

// =============================================================================
// COMPATIBILITY
// =============================================================================

#[test]
fn test_compatibility_response_lists_codes() {
    let report = CompatibilityReport::for_type(BloodType::ANegative);
    let response = CompatibilityResponse::success(report);
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["report"]["blood_type"], "A-");
    assert_eq!(json["report"]["compatible_donors"], json!(["A-", "O-"]));
    assert_eq!(
        json["report"]["compatible_recipients"],
        json!(["A+", "A-", "AB+", "AB-"])
    );
}

#[test]
fn test_check_request_deserialization() {
    let request: CheckRequest =
        serde_json::from_str(r#"{"donor": "o-", "recipient": "AB+"}"#).unwrap();
    assert_eq!(request.donor, "o-");
    assert_eq!(request.recipient, "AB+");
}

// =============================================================================
// DONORS / SEARCH
// =============================================================================

#[test]
fn test_donor_query_defaults() {
    let query: DonorQuery = serde_json::from_str(r#"{"blood_type": "B-"}"#).unwrap();
    assert_eq!(query.blood_type, BloodType::BNegative);
    assert_eq!(query.mode, MatchMode::Exact);
    assert!(query.city.is_none());
    assert!(!query.emergency_only);
    assert!(query.limit.is_none());
}

#[test]
fn test_donor_query_rejects_unknown_type() {
    let result: Result<DonorQuery, _> = serde_json::from_str(r#"{"blood_type": "X"}"#);
    assert!(result.is_err());
}

#[test]
fn test_availability_request_requires_flag() {
    let ok: AvailabilityRequest = serde_json::from_str(r#"{"available": false}"#).unwrap();
    assert!(!ok.available);
    assert!(serde_json::from_str::<AvailabilityRequest>("{}").is_err());
}

#[test]
fn test_error_responses_have_empty_payloads() {
    let donor = serde_json::to_value(DonorResponse::error("nope")).unwrap();
    assert!(donor["donor"].is_null());
    assert_eq!(donor["success"], false);

    let search = serde_json::to_value(SearchResponse::error("nope")).unwrap();
    assert_eq!(search["count"], 0);
    assert_eq!(search["donors"], json!([]));

    let broadcast = serde_json::to_value(BroadcastResponse::error("nope")).unwrap();
    assert_eq!(broadcast["notified"], 0);
    assert!(broadcast["request"].is_null());
}

#[test]
fn test_search_response_counts_donors() {
    let response = SearchResponse::success(vec![]);
    assert!(response.success);
    assert_eq!(response.count, 0);
}

// =============================================================================
// EMERGENCY REQUESTS
// =============================================================================

#[test]
fn test_broadcast_response_from_registry() {
    let mut registry = Registry::new();
    let draft = serde_json::from_value(json!({
        "patient_name": "Ravi",
        "blood_type": "O+",
        "units_needed": 1,
        "hospital_name": "KEM Hospital",
        "contact_person": "Nurse Joshi",
        "contact_phone": "+91 98765-12345"
    }))
    .unwrap();
    let broadcast = registry.create_emergency(draft, 1_700_000_000).unwrap();

    let json = serde_json::to_value(BroadcastResponse::success(broadcast)).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["notified"], 0);
    assert_eq!(json["request"]["status"], "open");
    assert_eq!(json["request"]["details"]["urgency"], "critical");
    assert_eq!(json["request"]["created_at"], 1_700_000_000u64);
}

#[test]
fn test_request_list_query_defaults_to_open_only() {
    let query: RequestListQuery = serde_json::from_str("{}").unwrap();
    assert!(!query.all);
}

// =============================================================================
// HOSPITALS
// =============================================================================

#[test]
fn test_hospital_json_from_directory_entry() {
    let entry = hospital::by_id(1).unwrap();
    let json = HospitalJson::from(entry);

    assert_eq!(json.id, 1);
    assert_eq!(json.name, entry.name);
    assert_eq!(json.lat_micro, entry.coordinates.lat_micro);
}
