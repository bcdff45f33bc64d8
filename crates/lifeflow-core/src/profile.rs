//! # Blood Type Profiles
//!
//! Static descriptive metadata for each blood type: how common it is, a
//! rarity label, and the special role (if any) it plays in transfusion.
//!
//! Presentational only. Nothing in the compatibility engine reads these.

use crate::types::BloodType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal rarity category, from most to least common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    MostCommon,
    Common,
    LessCommon,
    Rare,
    VeryRare,
}

impl Rarity {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MostCommon => "Most Common",
            Self::Common => "Common",
            Self::LessCommon => "Less Common",
            Self::Rare => "Rare",
            Self::VeryRare => "Very Rare",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Notable transfusion role of a blood type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialProperty {
    UniversalBloodDonor,
    UniversalPlasmaDonor,
}

impl SpecialProperty {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::UniversalBloodDonor => "Universal Blood Donor",
            Self::UniversalPlasmaDonor => "Universal Plasma Donor",
        }
    }
}

impl fmt::Display for SpecialProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Descriptive metadata for one blood type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodTypeProfile {
    pub blood_type: BloodType,
    /// Share of the population with this type, in whole percent.
    pub frequency_percent: u8,
    pub rarity: Rarity,
    pub special: Option<SpecialProperty>,
}

const fn entry(
    blood_type: BloodType,
    frequency_percent: u8,
    rarity: Rarity,
    special: Option<SpecialProperty>,
) -> BloodTypeProfile {
    BloodTypeProfile {
        blood_type,
        frequency_percent,
        rarity,
        special,
    }
}

/// Profiles indexed by `BloodType::index()`.
static PROFILES: [BloodTypeProfile; 8] = [
    entry(BloodType::APositive, 34, Rarity::Common, None),
    entry(BloodType::ANegative, 6, Rarity::LessCommon, None),
    entry(BloodType::BPositive, 9, Rarity::LessCommon, None),
    entry(BloodType::BNegative, 2, Rarity::Rare, None),
    entry(
        BloodType::ABPositive,
        3,
        Rarity::Rare,
        Some(SpecialProperty::UniversalPlasmaDonor),
    ),
    entry(BloodType::ABNegative, 1, Rarity::VeryRare, None),
    entry(BloodType::OPositive, 38, Rarity::MostCommon, None),
    entry(
        BloodType::ONegative,
        7,
        Rarity::LessCommon,
        Some(SpecialProperty::UniversalBloodDonor),
    ),
];

/// Profile for a blood type. Total over the closed type set.
#[must_use]
pub fn profile(blood_type: BloodType) -> &'static BloodTypeProfile {
    &PROFILES[blood_type.index()]
}

/// All profiles in canonical order.
#[must_use]
pub fn all_profiles() -> &'static [BloodTypeProfile] {
    &PROFILES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_keyed_by_index() {
        for blood_type in BloodType::ALL {
            assert_eq!(profile(blood_type).blood_type, blood_type);
        }
    }

    #[test]
    fn frequencies_sum_to_one_hundred() {
        let total: u32 = all_profiles()
            .iter()
            .map(|p| u32::from(p.frequency_percent))
            .sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn special_roles() {
        assert_eq!(
            profile(BloodType::ONegative).special,
            Some(SpecialProperty::UniversalBloodDonor)
        );
        assert_eq!(
            profile(BloodType::ABPositive).special,
            Some(SpecialProperty::UniversalPlasmaDonor)
        );
        assert!(profile(BloodType::APositive).special.is_none());
    }

    #[test]
    fn rarity_labels() {
        assert_eq!(profile(BloodType::OPositive).rarity.label(), "Most Common");
        assert_eq!(profile(BloodType::ABNegative).rarity.to_string(), "Very Rare");
    }
}
