//! # Primitives
//!
//! Fixed limits and constants compiled into LifeFlow.

/// Magic bytes for the LifeFlow snapshot file header.
///
/// - File Header = Magic Bytes ("LFLW") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"LFLW";

/// Current snapshot format version.
///
/// Increment this when making breaking changes to the serialization format.
pub const FORMAT_VERSION: u8 = 1;

// =============================================================================
// DONOR RULES
// =============================================================================

/// Youngest age accepted at registration.
pub const MIN_DONOR_AGE: u8 = 18;

/// Oldest age accepted at registration.
pub const MAX_DONOR_AGE: u8 = 65;

/// Seconds in one day.
pub const SECS_PER_DAY: u64 = 86_400;

/// Days a donor stays unavailable after giving blood.
pub const DONATION_COOLDOWN_DAYS: u64 = 30;

/// `DONATION_COOLDOWN_DAYS` in seconds.
pub const DONATION_COOLDOWN_SECS: u64 = DONATION_COOLDOWN_DAYS * SECS_PER_DAY;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length, in bytes, of any free-text field.
///
/// Longer values are rejected at validation time.
pub const MAX_TEXT_LENGTH: usize = 256;

/// Maximum number of blood units a single emergency request may ask for.
pub const MAX_UNITS_PER_REQUEST: u32 = 20;

/// Upper bound on donors returned by a single search.
pub const MAX_SEARCH_RESULTS: usize = 100;

/// Hospital search terms shorter than this (after trimming) return nothing.
pub const MIN_HOSPITAL_QUERY_LENGTH: usize = 2;
