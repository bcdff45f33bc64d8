//! # Compatibility Engine
//!
//! Red-cell transfusion compatibility between the eight ABO/Rh blood types.
//!
//! The relation is fixed and is compiled into the binary as two lookup tables:
//! - `RECEIVE_FROM[r]`: donor types whose blood is safe for recipient `r`
//! - `DONATE_TO[d]`: recipient types donor `d` may safely give to
//!
//! The tables are the fast path. `is_compatible` is the rule-based
//! derivation they must agree with for all 64 ordered pairs:
//!
//! 1. **ABO**: donor is O, or donor group equals recipient group, or
//!    recipient is AB.
//! 2. **Rh**: donor is Rh-negative, or donor Rh equals recipient Rh.

use crate::profile::{BloodTypeProfile, profile};
use crate::types::{AboGroup, BloodType, BloodTypeSet, RhFactor};
use serde::{Deserialize, Serialize};

use BloodType::{
    ABNegative, ABPositive, ANegative, APositive, BNegative, BPositive, ONegative, OPositive,
};

/// Donors accepted by each recipient, indexed by `BloodType::index()`.
const RECEIVE_FROM: [BloodTypeSet; 8] = [
    // A+
    BloodTypeSet::of(&[APositive, ANegative, OPositive, ONegative]),
    // A-
    BloodTypeSet::of(&[ANegative, ONegative]),
    // B+
    BloodTypeSet::of(&[BPositive, BNegative, OPositive, ONegative]),
    // B-
    BloodTypeSet::of(&[BNegative, ONegative]),
    // AB+ (universal recipient)
    BloodTypeSet::FULL,
    // AB-
    BloodTypeSet::of(&[ANegative, BNegative, ABNegative, ONegative]),
    // O+
    BloodTypeSet::of(&[OPositive, ONegative]),
    // O-
    BloodTypeSet::of(&[ONegative]),
];

/// Recipients served by each donor, indexed by `BloodType::index()`.
const DONATE_TO: [BloodTypeSet; 8] = [
    // A+
    BloodTypeSet::of(&[APositive, ABPositive]),
    // A-
    BloodTypeSet::of(&[APositive, ANegative, ABPositive, ABNegative]),
    // B+
    BloodTypeSet::of(&[BPositive, ABPositive]),
    // B-
    BloodTypeSet::of(&[BPositive, BNegative, ABPositive, ABNegative]),
    // AB+
    BloodTypeSet::of(&[ABPositive]),
    // AB-
    BloodTypeSet::of(&[ABPositive, ABNegative]),
    // O+
    BloodTypeSet::of(&[APositive, BPositive, ABPositive, OPositive]),
    // O- (universal donor)
    BloodTypeSet::FULL,
];

/// Every donor type `recipient` can safely receive red cells from.
///
/// Never empty: every type accepts itself.
#[must_use]
pub const fn compatible_donors(recipient: BloodType) -> BloodTypeSet {
    RECEIVE_FROM[recipient.index()]
}

/// Every recipient type `donor` can safely give red cells to.
#[must_use]
pub const fn compatible_recipients(donor: BloodType) -> BloodTypeSet {
    DONATE_TO[donor.index()]
}

/// Rule-based compatibility check for a single donor/recipient pair.
#[must_use]
pub const fn is_compatible(donor: BloodType, recipient: BloodType) -> bool {
    let abo_ok = matches!(donor.abo(), AboGroup::O)
        || matches!(recipient.abo(), AboGroup::AB)
        || donor.abo() as u8 == recipient.abo() as u8;
    let rh_ok =
        matches!(donor.rh(), RhFactor::Negative) || donor.rh() as u8 == recipient.rh() as u8;
    abo_ok && rh_ok
}

// =============================================================================
// REPORT
// =============================================================================

/// Everything the compatibility checker shows for one blood type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    pub blood_type: BloodType,
    /// Types that can donate to `blood_type`.
    pub compatible_donors: BloodTypeSet,
    /// Types `blood_type` can donate to.
    pub compatible_recipients: BloodTypeSet,
    pub profile: BloodTypeProfile,
}

impl CompatibilityReport {
    #[must_use]
    pub fn for_type(blood_type: BloodType) -> Self {
        Self {
            blood_type,
            compatible_donors: compatible_donors(blood_type),
            compatible_recipients: compatible_recipients(blood_type),
            profile: profile(blood_type).clone(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn set(codes: &[&str]) -> BloodTypeSet {
        codes
            .iter()
            .map(|c| c.parse::<BloodType>().expect("parse"))
            .collect()
    }

    #[test]
    fn tables_agree_with_rules_for_all_pairs() {
        for donor in BloodType::ALL {
            for recipient in BloodType::ALL {
                let expected = is_compatible(donor, recipient);
                assert_eq!(
                    compatible_donors(recipient).contains(donor),
                    expected,
                    "RECEIVE_FROM disagrees for {donor} -> {recipient}"
                );
                assert_eq!(
                    compatible_recipients(donor).contains(recipient),
                    expected,
                    "DONATE_TO disagrees for {donor} -> {recipient}"
                );
            }
        }
    }

    #[test]
    fn relations_are_inverse() {
        for x in BloodType::ALL {
            for y in BloodType::ALL {
                assert_eq!(
                    compatible_donors(x).contains(y),
                    compatible_recipients(y).contains(x)
                );
            }
        }
    }

    #[test]
    fn every_type_matches_itself() {
        for x in BloodType::ALL {
            assert!(compatible_donors(x).contains(x));
            assert!(compatible_recipients(x).contains(x));
        }
    }

    #[test]
    fn o_negative_is_universal_donor() {
        assert_eq!(compatible_recipients(ONegative), BloodTypeSet::FULL);
        for x in BloodType::ALL {
            assert!(compatible_donors(x).contains(ONegative));
        }
    }

    #[test]
    fn universal_predicates_match_tables() {
        for x in BloodType::ALL {
            assert_eq!(
                x.is_universal_donor(),
                compatible_recipients(x) == BloodTypeSet::FULL
            );
            assert_eq!(
                x.is_universal_recipient(),
                compatible_donors(x) == BloodTypeSet::FULL
            );
        }
    }

    #[test]
    fn ab_positive_is_universal_recipient() {
        assert_eq!(compatible_donors(ABPositive), BloodTypeSet::FULL);
        assert_eq!(compatible_donors(ABPositive).len(), 8);
        assert_eq!(compatible_recipients(ABPositive), set(&["AB+"]));
    }

    #[test]
    fn known_cases() {
        assert_eq!(compatible_donors(APositive), set(&["A+", "A-", "O+", "O-"]));
        assert_eq!(compatible_donors(ONegative), set(&["O-"]));
        assert_eq!(
            compatible_recipients(BNegative),
            set(&["B+", "B-", "AB+", "AB-"])
        );
        assert_eq!(
            compatible_donors(ABNegative),
            set(&["A-", "B-", "AB-", "O-"])
        );
        assert_eq!(
            compatible_recipients(OPositive),
            set(&["A+", "B+", "AB+", "O+"])
        );
    }

    #[test]
    fn rh_negative_recipients_reject_positive_donors() {
        for recipient in BloodType::ALL.into_iter().filter(|t| t.rh() == RhFactor::Negative) {
            for donor in compatible_donors(recipient).iter() {
                assert_eq!(donor.rh(), RhFactor::Negative);
            }
        }
    }

    #[test]
    fn report_bundles_profile() {
        let report = CompatibilityReport::for_type(ONegative);
        assert_eq!(report.compatible_donors, set(&["O-"]));
        assert_eq!(report.compatible_recipients.len(), 8);
        assert_eq!(report.profile.frequency_percent, 7);
    }
}
