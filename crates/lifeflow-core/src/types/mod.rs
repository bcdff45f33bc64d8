//! # Core Type Definitions
//!
//! This module contains the value types shared by every LifeFlow component:
//! - Identifiers (`DonorId`, `RequestId`)
//! - Blood typing (`BloodType`, `AboGroup`, `RhFactor`, `BloodTypeSet`)
//! - Error types (`LifeFlowError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - Iterate in a fixed canonical order

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Unique identifier for a registered donor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DonorId(pub u64);

/// Unique identifier for an emergency request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for DonorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// ABO GROUP & RH FACTOR
// =============================================================================

/// ABO group, determined by the surface antigens on red blood cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AboGroup {
    A,
    B,
    AB,
    O,
}

impl AboGroup {
    /// Canonical letters for this group.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::AB => "AB",
            Self::O => "O",
        }
    }
}

/// Presence (`Positive`) or absence (`Negative`) of the Rh(D) antigen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RhFactor {
    Positive,
    Negative,
}

// =============================================================================
// BLOOD TYPE
// =============================================================================

/// One of the eight ABO/Rh blood types.
///
/// Declaration order is the canonical order used for iteration and display
/// everywhere in LifeFlow: `A+, A-, B+, B-, AB+, AB-, O+, O-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BloodType {
    APositive,
    ANegative,
    BPositive,
    BNegative,
    ABPositive,
    ABNegative,
    OPositive,
    ONegative,
}

impl BloodType {
    /// All blood types in canonical order.
    pub const ALL: [BloodType; 8] = [
        Self::APositive,
        Self::ANegative,
        Self::BPositive,
        Self::BNegative,
        Self::ABPositive,
        Self::ABNegative,
        Self::OPositive,
        Self::ONegative,
    ];

    /// Position of this type in canonical order (0..8).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Bit for this type in a `BloodTypeSet` mask.
    const fn bit(self) -> u8 {
        1u8 << (self as u8)
    }

    /// Build a blood type from its two components.
    #[must_use]
    pub const fn from_parts(abo: AboGroup, rh: RhFactor) -> Self {
        match (abo, rh) {
            (AboGroup::A, RhFactor::Positive) => Self::APositive,
            (AboGroup::A, RhFactor::Negative) => Self::ANegative,
            (AboGroup::B, RhFactor::Positive) => Self::BPositive,
            (AboGroup::B, RhFactor::Negative) => Self::BNegative,
            (AboGroup::AB, RhFactor::Positive) => Self::ABPositive,
            (AboGroup::AB, RhFactor::Negative) => Self::ABNegative,
            (AboGroup::O, RhFactor::Positive) => Self::OPositive,
            (AboGroup::O, RhFactor::Negative) => Self::ONegative,
        }
    }

    #[must_use]
    pub const fn abo(self) -> AboGroup {
        match self {
            Self::APositive | Self::ANegative => AboGroup::A,
            Self::BPositive | Self::BNegative => AboGroup::B,
            Self::ABPositive | Self::ABNegative => AboGroup::AB,
            Self::OPositive | Self::ONegative => AboGroup::O,
        }
    }

    #[must_use]
    pub const fn rh(self) -> RhFactor {
        match self {
            Self::APositive | Self::BPositive | Self::ABPositive | Self::OPositive => {
                RhFactor::Positive
            }
            Self::ANegative | Self::BNegative | Self::ABNegative | Self::ONegative => {
                RhFactor::Negative
            }
        }
    }

    /// Canonical code, e.g. `"AB+"`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::ABPositive => "AB+",
            Self::ABNegative => "AB-",
            Self::OPositive => "O+",
            Self::ONegative => "O-",
        }
    }

    /// O- red cells can be given to any recipient.
    #[must_use]
    pub const fn is_universal_donor(self) -> bool {
        matches!(self, Self::ONegative)
    }

    /// AB+ recipients accept red cells of any type.
    #[must_use]
    pub const fn is_universal_recipient(self) -> bool {
        matches!(self, Self::ABPositive)
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for BloodType {
    type Err = LifeFlowError;

    /// Parse a blood type code.
    ///
    /// Surrounding whitespace is ignored and the group letters are
    /// case-insensitive. Anything outside the eight codes is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || LifeFlowError::InvalidBloodType(s.to_string());

        let (letters, sign) = match trimmed.char_indices().last() {
            Some((idx, c)) => (&trimmed[..idx], c),
            None => return Err(invalid()),
        };

        let rh = match sign {
            '+' => RhFactor::Positive,
            '-' => RhFactor::Negative,
            _ => return Err(invalid()),
        };

        let abo = match letters.to_ascii_uppercase().as_str() {
            "A" => AboGroup::A,
            "B" => AboGroup::B,
            "AB" => AboGroup::AB,
            "O" => AboGroup::O,
            _ => return Err(invalid()),
        };

        Ok(Self::from_parts(abo, rh))
    }
}

impl TryFrom<String> for BloodType {
    type Error = LifeFlowError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BloodType> for String {
    fn from(value: BloodType) -> Self {
        value.code().to_string()
    }
}

// =============================================================================
// BLOOD TYPE SET
// =============================================================================

/// A set of blood types backed by an 8-bit mask.
///
/// Bit `i` corresponds to `BloodType::ALL[i]`, so iteration is always in
/// canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<BloodType>", into = "Vec<BloodType>")]
pub struct BloodTypeSet(u8);

impl BloodTypeSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// All eight blood types.
    pub const FULL: Self = Self(0xFF);

    /// Build a set from a slice of types. Usable in `const` tables.
    #[must_use]
    pub const fn of(types: &[BloodType]) -> Self {
        let mut mask = 0u8;
        let mut i = 0;
        while i < types.len() {
            mask |= types[i].bit();
            i += 1;
        }
        Self(mask)
    }

    #[must_use]
    pub const fn contains(self, blood_type: BloodType) -> bool {
        self.0 & blood_type.bit() != 0
    }

    #[must_use]
    pub const fn with(self, blood_type: BloodType) -> Self {
        Self(self.0 | blood_type.bit())
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate members in canonical order.
    pub fn iter(self) -> impl Iterator<Item = BloodType> {
        BloodType::ALL
            .into_iter()
            .filter(move |blood_type| self.contains(*blood_type))
    }

    /// Members as canonical codes.
    #[must_use]
    pub fn codes(self) -> Vec<&'static str> {
        self.iter().map(BloodType::code).collect()
    }
}

impl FromIterator<BloodType> for BloodTypeSet {
    fn from_iter<I: IntoIterator<Item = BloodType>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl From<Vec<BloodType>> for BloodTypeSet {
    fn from(value: Vec<BloodType>) -> Self {
        value.into_iter().collect()
    }
}

impl From<BloodTypeSet> for Vec<BloodType> {
    fn from(value: BloodTypeSet) -> Self {
        value.iter().collect()
    }
}

impl fmt::Display for BloodTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.codes().join(", "))
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the LifeFlow system.
///
/// - No silent failures
/// - Use `Result<T, LifeFlowError>` for fallible operations
/// - The core never panics; every error is recoverable by the caller
#[derive(Debug, Error)]
pub enum LifeFlowError {
    /// The supplied code is not one of the eight blood types.
    #[error("Invalid blood type: {0:?}")]
    InvalidBloodType(String),

    /// A registration or request field failed validation.
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// The requested donor does not exist.
    #[error("Donor not found: {0}")]
    DonorNotFound(DonorId),

    /// The requested emergency request does not exist.
    #[error("Emergency request not found: {0}")]
    RequestNotFound(RequestId),

    /// The donor gave blood too recently to be marked available.
    #[error("Donor {donor} is in the post-donation cooldown ({remaining_days} days remaining)")]
    DonationCooldown { donor: DonorId, remaining_days: u64 },

    /// The emergency request has already been resolved.
    #[error("Emergency request {0} is already closed")]
    RequestClosed(RequestId),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O or storage error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl LifeFlowError {
    /// Shorthand for `InvalidField`.
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_all_canonical_codes() {
        for blood_type in BloodType::ALL {
            let parsed: BloodType = blood_type.code().parse().expect("parse");
            assert_eq!(parsed, blood_type);
        }
    }

    #[test]
    fn parse_is_lenient_on_case_and_whitespace() {
        assert_eq!(" ab+ ".parse::<BloodType>().expect("parse"), BloodType::ABPositive);
        assert_eq!("o-".parse::<BloodType>().expect("parse"), BloodType::ONegative);
    }

    #[test]
    fn parse_rejects_unknown_codes() {
        for code in ["", "+", "C+", "A", "AB", "A*", "BA+", "O+-", "Unknown"] {
            let result = code.parse::<BloodType>();
            assert!(
                matches!(result, Err(LifeFlowError::InvalidBloodType(_))),
                "{code:?} should be rejected"
            );
        }
    }

    #[test]
    fn parts_roundtrip() {
        for blood_type in BloodType::ALL {
            assert_eq!(BloodType::from_parts(blood_type.abo(), blood_type.rh()), blood_type);
        }
    }

    #[test]
    fn serde_uses_codes() {
        let json = serde_json::to_string(&BloodType::ABNegative).expect("serialize");
        assert_eq!(json, "\"AB-\"");

        let parsed: BloodType = serde_json::from_str("\"O+\"").expect("deserialize");
        assert_eq!(parsed, BloodType::OPositive);

        assert!(serde_json::from_str::<BloodType>("\"Q+\"").is_err());
    }

    #[test]
    fn set_iterates_in_canonical_order() {
        let set = BloodTypeSet::of(&[
            BloodType::ONegative,
            BloodType::APositive,
            BloodType::BNegative,
        ]);
        assert_eq!(set.codes(), vec!["A+", "B-", "O-"]);
        assert_eq!(set.len(), 3);
        assert!(set.contains(BloodType::BNegative));
        assert!(!set.contains(BloodType::BPositive));
    }

    #[test]
    fn set_serializes_as_code_array() {
        let set = BloodTypeSet::of(&[BloodType::OPositive, BloodType::ONegative]);
        let json = serde_json::to_string(&set).expect("serialize");
        assert_eq!(json, r#"["O+","O-"]"#);

        let back: BloodTypeSet = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, set);
    }

    #[test]
    fn full_and_empty_sets() {
        assert_eq!(BloodTypeSet::FULL.len(), 8);
        assert!(BloodTypeSet::EMPTY.is_empty());
        assert_eq!(BloodType::ALL.into_iter().collect::<BloodTypeSet>(), BloodTypeSet::FULL);
    }
}
