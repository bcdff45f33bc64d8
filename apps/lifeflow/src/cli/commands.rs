//! # CLI Command Implementations
//!
//! Each `cmd_*` function opens the registry for the configured backend,
//! runs one operation, saves if the registry changed, and prints either a
//! human-readable summary or JSON (`--json-mode`).

use crate::api::{AppState, run_server};
use crate::config::{AppConfig, Backend, StorageConfig};
use crate::persistence::{open_registry, save_registry};
use crate::unix_now;
use lifeflow_core::{
    BloodType, CompatibilityReport, DonorId, DonorQuery, DonorRegistration, EmergencyDraft,
    EmergencyRequest, LifeFlowError, MatchMode, Registry, RequestId, RequestStatus, all_profiles,
    hospital,
};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Maximum size of a JSON input file (1 MB).
const MAX_INPUT_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// INPUT VALIDATION
// =============================================================================

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), LifeFlowError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| LifeFlowError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(LifeFlowError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve an input path, rejecting anything that is not a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, LifeFlowError> {
    let canonical = path.canonicalize().map_err(|e| {
        LifeFlowError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(LifeFlowError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Read and parse a JSON input file.
fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, LifeFlowError> {
    let path = validate_file_path(path)?;
    validate_file_size(&path, MAX_INPUT_FILE_SIZE)?;

    let content = std::fs::read_to_string(&path)
        .map_err(|e| LifeFlowError::IoError(format!("Failed to read file: {}", e)))?;

    serde_json::from_str(&content)
        .map_err(|e| LifeFlowError::SerializationError(format!("Invalid JSON: {}", e)))
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Open, mutate, save.
fn with_registry_mut<T>(
    storage: &StorageConfig,
    op: impl FnOnce(&mut Registry) -> Result<T, LifeFlowError>,
) -> Result<T, LifeFlowError> {
    let mut registry = open_registry(storage)?;
    let out = op(&mut registry)?;
    save_registry(&registry, &storage.database)?;
    Ok(out)
}

fn format_status(status: RequestStatus) -> String {
    match status {
        RequestStatus::Open => "open".to_string(),
        RequestStatus::Fulfilled { resolved_at } => format!("fulfilled at {}", resolved_at),
    }
}

// =============================================================================
// SERVER
// =============================================================================

/// Start the HTTP server over the configured registry.
pub async fn cmd_server(config: &AppConfig) -> Result<(), LifeFlowError> {
    let registry = open_registry(&config.storage)?;
    tracing::info!(
        "Registry opened: {:?} (backend: {})",
        config.storage.database,
        config.storage.backend
    );

    let state = match config.storage.backend {
        Backend::Redb => AppState::new(registry),
        Backend::File => AppState::with_snapshot(registry, config.storage.database.clone()),
    };

    run_server(state, &config.server).await
}

// =============================================================================
// STATUS / INIT
// =============================================================================

/// Show registry counts.
pub fn cmd_status(storage: &StorageConfig, json_mode: bool) -> Result<(), LifeFlowError> {
    let registry = open_registry(storage)?;
    let stats = registry.stats(unix_now())?;

    if json_mode {
        let by_type: serde_json::Map<String, serde_json::Value> = stats
            .by_blood_type
            .iter()
            .map(|(bt, count)| (bt.code().to_string(), serde_json::json!(count)))
            .collect();
        print_json(&serde_json::json!({
            "database": storage.database.to_string_lossy(),
            "backend": storage.backend.as_str(),
            "donor_count": stats.donor_count,
            "eligible_donors": stats.eligible_donors,
            "open_requests": stats.open_requests,
            "total_requests": stats.total_requests,
            "by_blood_type": by_type,
        }));
        return Ok(());
    }

    println!("LifeFlow Registry Status");
    println!("========================");
    println!("Database: {:?}", storage.database);
    println!("Backend:  {}", storage.backend);
    println!();
    println!("Donors:          {}", stats.donor_count);
    println!("Eligible now:    {}", stats.eligible_donors);
    println!("Open requests:   {}", stats.open_requests);
    println!("Total requests:  {}", stats.total_requests);
    println!();
    for (bt, count) in &stats.by_blood_type {
        println!("  {:<4} {}", bt.code(), count);
    }

    Ok(())
}

/// Initialize a new, empty database.
pub fn cmd_init(storage: &StorageConfig, force: bool) -> Result<(), LifeFlowError> {
    let path = &storage.database;
    if path.exists() {
        if !force {
            return Err(LifeFlowError::IoError(
                "Database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(path)
            .map_err(|e| LifeFlowError::IoError(format!("Remove db: {}", e)))?;
    }

    match storage.backend {
        Backend::Redb => {
            Registry::with_redb(path)?;
            println!("Initialized new redb database at {:?}", path);
        }
        Backend::File => {
            save_registry(&Registry::new(), path)?;
            println!("Initialized new file database at {:?}", path);
        }
    }

    Ok(())
}

// =============================================================================
// BLOOD TYPES
// =============================================================================

/// Show compatible donors and recipients for one blood type.
pub fn cmd_compat(code: &str, json_mode: bool) -> Result<(), LifeFlowError> {
    let blood_type: BloodType = code.parse()?;
    let report = CompatibilityReport::for_type(blood_type);

    if json_mode {
        print_json(&serde_json::json!(report));
        return Ok(());
    }

    println!("Blood type {}", report.blood_type);
    println!("  Can receive from: {}", report.compatible_donors);
    println!("  Can donate to:    {}", report.compatible_recipients);
    println!(
        "  Frequency:        {}% ({})",
        report.profile.frequency_percent, report.profile.rarity
    );
    if let Some(special) = report.profile.special {
        println!("  Note:             {}", special);
    }

    Ok(())
}

/// List all eight blood type profiles.
pub fn cmd_blood_types(json_mode: bool) -> Result<(), LifeFlowError> {
    let profiles = all_profiles();

    if json_mode {
        print_json(&serde_json::json!({ "profiles": profiles }));
        return Ok(());
    }

    println!("{:<5} {:>5}  {:<12} Note", "Type", "Freq", "Rarity");
    for p in profiles {
        println!(
            "{:<5} {:>4}%  {:<12} {}",
            p.blood_type.code(),
            p.frequency_percent,
            p.rarity.label(),
            p.special.map(|s| s.label()).unwrap_or("")
        );
    }

    Ok(())
}

// =============================================================================
// DONORS
// =============================================================================

/// Register a donor from a JSON file.
pub fn cmd_register(
    storage: &StorageConfig,
    json_mode: bool,
    file: &Path,
) -> Result<(), LifeFlowError> {
    let registration: DonorRegistration = read_json_file(file)?;
    let donor =
        with_registry_mut(storage, |registry| registry.register_donor(registration, unix_now()))?;

    if json_mode {
        print_json(&serde_json::json!({ "success": true, "donor": donor }));
    } else {
        println!(
            "Registered donor {} ({}, {}, {})",
            donor.id, donor.name, donor.blood_type, donor.city
        );
    }

    Ok(())
}

/// Show one donor.
pub fn cmd_donor(storage: &StorageConfig, json_mode: bool, id: u64) -> Result<(), LifeFlowError> {
    let registry = open_registry(storage)?;
    let donor = registry.get_donor(DonorId(id))?;
    let now = unix_now();

    if json_mode {
        print_json(&serde_json::json!({
            "donor": donor,
            "eligible": donor.is_eligible(now),
            "cooldown_remaining_days": donor.cooldown_remaining_days(now),
        }));
        return Ok(());
    }

    println!("Donor {}", donor.id);
    println!("  Name:       {}", donor.name);
    println!("  Blood type: {}", donor.blood_type);
    println!("  Age:        {}", donor.age);
    println!("  Phone:      {}", donor.phone);
    println!("  Location:   {}, {}", donor.city, donor.state);
    println!("  Available:  {}", donor.available);
    println!("  Emergency:  {}", donor.available_for_emergency);
    match donor.cooldown_remaining_days(now) {
        0 => println!("  Eligible:   {}", donor.is_eligible(now)),
        days => println!("  Eligible:   false ({} days until next donation)", days),
    }

    Ok(())
}

/// Donor search parameters from the command line.
#[derive(Debug, Clone)]
pub struct SearchArgs {
    pub blood_type: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub compatible: bool,
    pub emergency_only: bool,
    pub limit: Option<usize>,
}

impl SearchArgs {
    fn into_query(self) -> Result<DonorQuery, LifeFlowError> {
        let blood_type: BloodType = self.blood_type.parse()?;
        let mode = if self.compatible {
            MatchMode::Compatible
        } else {
            MatchMode::Exact
        };
        Ok(DonorQuery {
            city: self.city,
            state: self.state,
            mode,
            emergency_only: self.emergency_only,
            limit: self.limit,
            ..DonorQuery::new(blood_type)
        })
    }
}

/// Search eligible donors.
pub fn cmd_search(
    storage: &StorageConfig,
    json_mode: bool,
    args: SearchArgs,
) -> Result<(), LifeFlowError> {
    let query = args.into_query()?;
    let registry = open_registry(storage)?;
    let donors = registry.search_donors(&query, unix_now())?;

    if json_mode {
        print_json(&serde_json::json!({ "count": donors.len(), "donors": donors }));
        return Ok(());
    }

    if donors.is_empty() {
        println!("No eligible donors found for {}", query.blood_type);
        return Ok(());
    }

    println!("Found {} donor(s):", donors.len());
    for donor in &donors {
        println!(
            "  [{}] {:<4} {} - {}, {} - {}",
            donor.id, donor.blood_type, donor.name, donor.city, donor.state, donor.phone
        );
    }

    Ok(())
}

/// Record a donation.
pub fn cmd_donate(storage: &StorageConfig, json_mode: bool, id: u64) -> Result<(), LifeFlowError> {
    let now = unix_now();
    let donor = with_registry_mut(storage, |registry| registry.record_donation(DonorId(id), now))?;

    if json_mode {
        print_json(&serde_json::json!({ "success": true, "donor": donor }));
    } else {
        println!(
            "Recorded donation for donor {} ({}). Eligible again in {} days.",
            donor.id,
            donor.name,
            donor.cooldown_remaining_days(now)
        );
    }

    Ok(())
}

// =============================================================================
// EMERGENCY REQUESTS
// =============================================================================

/// Create an emergency request and list the donors selected for the alert.
pub fn cmd_emergency(
    storage: &StorageConfig,
    json_mode: bool,
    file: &Path,
) -> Result<(), LifeFlowError> {
    let draft: EmergencyDraft = read_json_file(file)?;
    let broadcast =
        with_registry_mut(storage, |registry| registry.create_emergency(draft, unix_now()))?;

    if json_mode {
        print_json(&serde_json::json!({
            "success": true,
            "request": broadcast.request,
            "notified": broadcast.matches.len(),
            "matches": broadcast.matches,
        }));
        return Ok(());
    }

    let details = &broadcast.request.details;
    println!(
        "Emergency request {} created: {} unit(s) of {} at {} ({})",
        broadcast.request.id,
        details.units_needed,
        details.blood_type,
        details.hospital_name,
        details.urgency.label()
    );
    println!("Alerting {} donor(s):", broadcast.matches.len());
    for m in &broadcast.matches {
        let tag = if m.exact_match { "exact" } else { "compatible" };
        println!(
            "  [{}] {:<4} {} - {} - {} ({})",
            m.donor_id, m.blood_type, m.name, m.city, m.phone, tag
        );
    }

    Ok(())
}

fn print_request(request: &EmergencyRequest) {
    let d = &request.details;
    println!(
        "  [{}] {:<4} x{} {} - {} - {} ({})",
        request.id,
        d.blood_type,
        d.units_needed,
        d.patient_name,
        d.hospital_name,
        d.urgency.label(),
        format_status(request.status)
    );
}

/// List emergency requests, newest first.
pub fn cmd_requests(
    storage: &StorageConfig,
    json_mode: bool,
    all: bool,
) -> Result<(), LifeFlowError> {
    let registry = open_registry(storage)?;
    let requests = registry.list_requests(!all)?;

    if json_mode {
        print_json(&serde_json::json!({ "count": requests.len(), "requests": requests }));
        return Ok(());
    }

    if requests.is_empty() {
        println!("No emergency requests");
        return Ok(());
    }

    println!("{} request(s):", requests.len());
    for request in &requests {
        print_request(request);
    }

    Ok(())
}

/// Mark a request fulfilled.
pub fn cmd_resolve(storage: &StorageConfig, json_mode: bool, id: u64) -> Result<(), LifeFlowError> {
    let request =
        with_registry_mut(storage, |registry| registry.resolve_request(RequestId(id), unix_now()))?;

    if json_mode {
        print_json(&serde_json::json!({ "success": true, "request": request }));
    } else {
        println!("Resolved request {}", request.id);
        print_request(&request);
    }

    Ok(())
}

// =============================================================================
// HOSPITALS
// =============================================================================

/// Search the hospital directory.
pub fn cmd_hospitals(term: &str, json_mode: bool) -> Result<(), LifeFlowError> {
    let hospitals = hospital::search(term);

    if json_mode {
        print_json(&serde_json::json!({ "count": hospitals.len(), "hospitals": hospitals }));
        return Ok(());
    }

    if hospitals.is_empty() {
        println!("No hospitals match '{}'", term);
        return Ok(());
    }

    for h in hospitals {
        println!("  [{}] {} - {}", h.id, h.name, h.address);
    }

    Ok(())
}
