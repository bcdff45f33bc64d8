//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Core errors map to statuses in `error_status`. Malformed JSON bodies
//! (including unknown blood type codes inside them) and non-numeric ids
//! are answered with a structured 400 rather than axum's default
//! rejection.

use super::{
    AppState,
    types::{
        AvailabilityRequest, BloodTypesResponse, BroadcastResponse, CheckRequest, CheckResponse,
        CompatibilityResponse, DonorResponse, HealthResponse, HospitalJson, HospitalListResponse,
        HospitalQuery, RequestListQuery, RequestListResponse, RequestResponse, SearchResponse,
        StatusResponse,
    },
};
use crate::unix_now;
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use lifeflow_core::{
    BloodType, CompatibilityReport, DonorId, DonorQuery, DonorRegistration, EmergencyDraft,
    LifeFlowError, RequestId, all_profiles, hospital, is_compatible,
};

// =============================================================================
// RESPONSE HELPERS
// =============================================================================

/// HTTP status for a core error.
pub fn error_status(error: &LifeFlowError) -> StatusCode {
    match error {
        LifeFlowError::InvalidBloodType(_) | LifeFlowError::InvalidField { .. } => {
            StatusCode::BAD_REQUEST
        }
        LifeFlowError::DonorNotFound(_) | LifeFlowError::RequestNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        LifeFlowError::DonationCooldown { .. } | LifeFlowError::RequestClosed(_) => {
            StatusCode::CONFLICT
        }
        LifeFlowError::SerializationError(_) | LifeFlowError::IoError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Turn a core result into a status and JSON body.
fn respond<T, R>(
    ok_status: StatusCode,
    result: Result<T, LifeFlowError>,
    success: impl FnOnce(T) -> R,
    failure: impl FnOnce(String) -> R,
) -> (StatusCode, Json<R>) {
    match result {
        Ok(value) => (ok_status, Json(success(value))),
        Err(e) => {
            let status = error_status(&e);
            if status.is_server_error() {
                tracing::error!("Registry error: {}", e);
            }
            (status, Json(failure(e.to_string())))
        }
    }
}

/// Message for a rejected JSON body.
fn bad_body(rejection: &JsonRejection) -> String {
    format!("Invalid request body: {}", rejection.body_text())
}

/// Message for a rejected path parameter.
fn bad_path(rejection: &PathRejection) -> String {
    format!("Invalid path parameter: {}", rejection.body_text())
}

// =============================================================================
// HEALTH / STATUS
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// Registry counts.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.registry.read().await;
    let persistent = registry.is_persistent();
    respond(
        StatusCode::OK,
        registry.stats(unix_now()),
        |stats| StatusResponse::success(stats, persistent),
        StatusResponse::error,
    )
}

// =============================================================================
// COMPATIBILITY
// =============================================================================

/// Profiles for all eight blood types.
pub async fn blood_types_handler() -> impl IntoResponse {
    Json(BloodTypesResponse {
        profiles: all_profiles().to_vec(),
    })
}

/// Donors, recipients, and profile for one blood type.
pub async fn compatibility_handler(Path(code): Path<String>) -> impl IntoResponse {
    respond(
        StatusCode::OK,
        code.parse::<BloodType>().map(CompatibilityReport::for_type),
        CompatibilityResponse::success,
        CompatibilityResponse::error,
    )
}

/// Can `donor` give to `recipient`?
pub async fn check_handler(
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(CheckResponse::error(bad_body(&rejection))),
            );
        }
    };

    let parsed = request
        .donor
        .parse::<BloodType>()
        .and_then(|donor| {
            request
                .recipient
                .parse::<BloodType>()
                .map(|recipient| (donor, recipient))
        });
    respond(
        StatusCode::OK,
        parsed,
        |(donor, recipient)| {
            CheckResponse::success(donor.code(), recipient.code(), is_compatible(donor, recipient))
        },
        CheckResponse::error,
    )
}

// =============================================================================
// DONORS
// =============================================================================

/// Register a donor.
pub async fn register_donor_handler(
    State(state): State<AppState>,
    payload: Result<Json<DonorRegistration>, JsonRejection>,
) -> impl IntoResponse {
    let Json(registration) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(DonorResponse::error(bad_body(&rejection))),
            );
        }
    };

    let result = state
        .mutate(|registry| registry.register_donor(registration, unix_now()))
        .await;
    if let Ok(donor) = &result {
        tracing::info!("Registered donor {} ({})", donor.id, donor.blood_type);
    }
    respond(
        StatusCode::CREATED,
        result,
        DonorResponse::success,
        DonorResponse::error,
    )
}

/// Read one donor.
pub async fn get_donor_handler(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> impl IntoResponse {
    let Path(id) = match id {
        Ok(p) => p,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(DonorResponse::error(bad_path(&rejection))),
            );
        }
    };

    let registry = state.registry.read().await;
    respond(
        StatusCode::OK,
        registry.get_donor(DonorId(id)),
        DonorResponse::success,
        DonorResponse::error,
    )
}

/// Replace a donor's profile.
pub async fn update_donor_handler(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<DonorRegistration>, JsonRejection>,
) -> impl IntoResponse {
    let (Path(id), Json(registration)) = match (id, payload) {
        (Ok(id), Ok(body)) => (id, body),
        (Err(rejection), _) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(DonorResponse::error(bad_path(&rejection))),
            );
        }
        (_, Err(rejection)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(DonorResponse::error(bad_body(&rejection))),
            );
        }
    };

    let result = state
        .mutate(|registry| registry.update_donor(DonorId(id), registration))
        .await;
    respond(
        StatusCode::OK,
        result,
        DonorResponse::success,
        DonorResponse::error,
    )
}

/// Remove a donor.
pub async fn delete_donor_handler(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> impl IntoResponse {
    let Path(id) = match id {
        Ok(p) => p,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(DonorResponse::error(bad_path(&rejection))),
            );
        }
    };

    let result = state
        .mutate(|registry| registry.remove_donor(DonorId(id)))
        .await;
    if result.is_ok() {
        tracing::info!("Removed donor {}", id);
    }
    respond(
        StatusCode::OK,
        result,
        DonorResponse::success,
        DonorResponse::error,
    )
}

/// Toggle a donor's availability.
pub async fn availability_handler(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<AvailabilityRequest>, JsonRejection>,
) -> impl IntoResponse {
    let (Path(id), Json(request)) = match (id, payload) {
        (Ok(id), Ok(body)) => (id, body),
        (Err(rejection), _) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(DonorResponse::error(bad_path(&rejection))),
            );
        }
        (_, Err(rejection)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(DonorResponse::error(bad_body(&rejection))),
            );
        }
    };

    let result = state
        .mutate(|registry| registry.set_availability(DonorId(id), request.available, unix_now()))
        .await;
    respond(
        StatusCode::OK,
        result,
        DonorResponse::success,
        DonorResponse::error,
    )
}

/// Record a donation made now.
pub async fn donation_handler(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> impl IntoResponse {
    let Path(id) = match id {
        Ok(p) => p,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(DonorResponse::error(bad_path(&rejection))),
            );
        }
    };

    let result = state
        .mutate(|registry| registry.record_donation(DonorId(id), unix_now()))
        .await;
    respond(
        StatusCode::OK,
        result,
        DonorResponse::success,
        DonorResponse::error,
    )
}

/// Search eligible donors.
pub async fn search_handler(
    State(state): State<AppState>,
    payload: Result<Json<DonorQuery>, JsonRejection>,
) -> impl IntoResponse {
    let Json(query) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(SearchResponse::error(bad_body(&rejection))),
            );
        }
    };

    let registry = state.registry.read().await;
    respond(
        StatusCode::OK,
        registry.search_donors(&query, unix_now()),
        SearchResponse::success,
        SearchResponse::error,
    )
}

// =============================================================================
// EMERGENCY REQUESTS
// =============================================================================

/// Create an emergency request and select donors to alert.
pub async fn create_emergency_handler(
    State(state): State<AppState>,
    payload: Result<Json<EmergencyDraft>, JsonRejection>,
) -> impl IntoResponse {
    let Json(draft) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(BroadcastResponse::error(bad_body(&rejection))),
            );
        }
    };

    let result = state
        .mutate(|registry| registry.create_emergency(draft, unix_now()))
        .await;
    if let Ok(broadcast) = &result {
        tracing::info!(
            "Emergency request {} ({}, {}) broadcast to {} donors",
            broadcast.request.id,
            broadcast.request.details.blood_type,
            broadcast.request.details.urgency,
            broadcast.matches.len()
        );
    }
    respond(
        StatusCode::CREATED,
        result,
        BroadcastResponse::success,
        BroadcastResponse::error,
    )
}

/// List emergency requests, open only unless `?all=true`.
pub async fn list_requests_handler(
    State(state): State<AppState>,
    Query(query): Query<RequestListQuery>,
) -> impl IntoResponse {
    let registry = state.registry.read().await;
    respond(
        StatusCode::OK,
        registry.list_requests(!query.all),
        RequestListResponse::success,
        RequestListResponse::error,
    )
}

/// Read one emergency request.
pub async fn get_request_handler(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> impl IntoResponse {
    let Path(id) = match id {
        Ok(p) => p,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(RequestResponse::error(bad_path(&rejection))),
            );
        }
    };

    let registry = state.registry.read().await;
    respond(
        StatusCode::OK,
        registry.get_request(RequestId(id)),
        RequestResponse::success,
        RequestResponse::error,
    )
}

/// Mark a request fulfilled.
pub async fn resolve_request_handler(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> impl IntoResponse {
    let Path(id) = match id {
        Ok(p) => p,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(RequestResponse::error(bad_path(&rejection))),
            );
        }
    };

    let result = state
        .mutate(|registry| registry.resolve_request(RequestId(id), unix_now()))
        .await;
    if result.is_ok() {
        tracing::info!("Emergency request {} fulfilled", id);
    }
    respond(
        StatusCode::OK,
        result,
        RequestResponse::success,
        RequestResponse::error,
    )
}

// =============================================================================
// HOSPITALS
// =============================================================================

/// Hospital autocomplete.
pub async fn hospitals_handler(Query(query): Query<HospitalQuery>) -> impl IntoResponse {
    let hospitals: Vec<HospitalJson> = hospital::search(&query.q)
        .into_iter()
        .map(HospitalJson::from)
        .collect();
    Json(HospitalListResponse {
        count: hospitals.len(),
        hospitals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_mapping() {
        assert_eq!(
            error_status(&LifeFlowError::InvalidBloodType("X".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&LifeFlowError::invalid_field("age", "too young")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&LifeFlowError::DonorNotFound(DonorId(1))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(&LifeFlowError::RequestNotFound(RequestId(1))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(&LifeFlowError::DonationCooldown {
                donor: DonorId(1),
                remaining_days: 3
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(&LifeFlowError::RequestClosed(RequestId(1))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(&LifeFlowError::IoError("disk".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
