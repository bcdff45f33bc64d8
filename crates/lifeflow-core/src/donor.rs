//! # Donor Records
//!
//! A registered donor, the registration form that creates one, and the
//! eligibility rules around donation cooldown.
//!
//! Timestamps are unix seconds supplied by the caller. The core never reads
//! the clock.

use crate::primitives::{
    DONATION_COOLDOWN_SECS, MAX_DONOR_AGE, MAX_TEXT_LENGTH, MIN_DONOR_AGE, SECS_PER_DAY,
};
use crate::types::{BloodType, DonorId, LifeFlowError};
use serde::{Deserialize, Serialize};

// =============================================================================
// REGISTRATION
// =============================================================================

/// Donor-supplied profile data, as submitted on registration or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorRegistration {
    pub name: String,
    pub age: u8,
    pub blood_type: BloodType,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub medical_conditions: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub available_for_emergency: bool,
    #[serde(default)]
    pub agree_terms: bool,
}

impl DonorRegistration {
    /// Validate every field.
    ///
    /// - `name`, `phone`, `city`, `state` must be non-blank
    /// - every text field must fit in `MAX_TEXT_LENGTH` bytes
    /// - `age` must be within `MIN_DONOR_AGE..=MAX_DONOR_AGE`
    /// - the donor must have agreed to the terms
    pub fn validate(&self) -> Result<(), LifeFlowError> {
        require_text("name", &self.name)?;
        require_text("phone", &self.phone)?;
        require_text("city", &self.city)?;
        require_text("state", &self.state)?;
        limit_text("address", &self.address)?;

        for (field, value) in [
            ("email", &self.email),
            ("pincode", &self.pincode),
            ("medical_conditions", &self.medical_conditions),
            ("emergency_contact", &self.emergency_contact),
        ] {
            if let Some(value) = value {
                limit_text(field, value)?;
            }
        }

        if !(MIN_DONOR_AGE..=MAX_DONOR_AGE).contains(&self.age) {
            return Err(LifeFlowError::invalid_field(
                "age",
                format!(
                    "{} is outside {}..={}",
                    self.age, MIN_DONOR_AGE, MAX_DONOR_AGE
                ),
            ));
        }

        if !self.agree_terms {
            return Err(LifeFlowError::invalid_field(
                "agree_terms",
                "terms and conditions must be accepted",
            ));
        }

        Ok(())
    }
}

/// Reject blank or oversized required text.
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), LifeFlowError> {
    if value.trim().is_empty() {
        return Err(LifeFlowError::invalid_field(field, "must not be empty"));
    }
    limit_text(field, value)
}

/// Reject oversized text.
pub(crate) fn limit_text(field: &'static str, value: &str) -> Result<(), LifeFlowError> {
    if value.len() > MAX_TEXT_LENGTH {
        return Err(LifeFlowError::invalid_field(
            field,
            format!(
                "length {} exceeds maximum {} bytes",
                value.len(),
                MAX_TEXT_LENGTH
            ),
        ));
    }
    Ok(())
}

/// Trim optional text, dropping it entirely when blank.
fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// DONOR
// =============================================================================

/// A registered donor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donor {
    pub id: DonorId,
    pub name: String,
    pub age: u8,
    pub blood_type: BloodType,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: Option<String>,
    pub medical_conditions: Option<String>,
    pub emergency_contact: Option<String>,
    /// Donor-controlled availability status.
    pub available: bool,
    /// Donor opted into emergency alerts.
    pub available_for_emergency: bool,
    /// Unix seconds of the most recent recorded donation.
    pub last_donation_at: Option<u64>,
    /// Unix seconds of registration.
    pub registered_at: u64,
}

impl Donor {
    /// Build a new, available donor from a registration that has already
    /// been validated.
    #[must_use]
    pub fn new(id: DonorId, registration: DonorRegistration, registered_at: u64) -> Self {
        let mut donor = Self {
            id,
            name: String::new(),
            age: registration.age,
            blood_type: registration.blood_type,
            phone: String::new(),
            email: None,
            address: String::new(),
            city: String::new(),
            state: String::new(),
            pincode: None,
            medical_conditions: None,
            emergency_contact: None,
            available: true,
            available_for_emergency: false,
            last_donation_at: None,
            registered_at,
        };
        donor.apply(registration);
        donor
    }

    /// Overwrite profile fields from a registration.
    ///
    /// Identity, registration time, availability, and donation history
    /// are preserved.
    pub fn apply(&mut self, registration: DonorRegistration) {
        self.name = registration.name.trim().to_string();
        self.age = registration.age;
        self.blood_type = registration.blood_type;
        self.phone = registration.phone.trim().to_string();
        self.email = clean_optional(registration.email);
        self.address = registration.address.trim().to_string();
        self.city = registration.city.trim().to_string();
        self.state = registration.state.trim().to_string();
        self.pincode = clean_optional(registration.pincode);
        self.medical_conditions = clean_optional(registration.medical_conditions);
        self.emergency_contact = clean_optional(registration.emergency_contact);
        self.available_for_emergency = registration.available_for_emergency;
    }

    /// Whole days left in the post-donation cooldown at `now` (rounded up).
    ///
    /// Zero when no donation is recorded or the cooldown has elapsed.
    #[must_use]
    pub fn cooldown_remaining_days(&self, now: u64) -> u64 {
        let Some(last) = self.last_donation_at else {
            return 0;
        };
        let elapsed = now.saturating_sub(last);
        DONATION_COOLDOWN_SECS
            .saturating_sub(elapsed)
            .div_ceil(SECS_PER_DAY)
    }

    /// Available and past any donation cooldown.
    #[must_use]
    pub fn is_eligible(&self, now: u64) -> bool {
        self.available && self.cooldown_remaining_days(now) == 0
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn registration(name: &str, blood_type: BloodType, city: &str) -> DonorRegistration {
        DonorRegistration {
            name: name.to_string(),
            age: 30,
            blood_type,
            phone: "+91 98765-43210".to_string(),
            email: None,
            address: String::new(),
            city: city.to_string(),
            state: "Maharashtra".to_string(),
            pincode: None,
            medical_conditions: None,
            emergency_contact: None,
            available_for_emergency: false,
            agree_terms: true,
        }
    }

    #[test]
    fn valid_registration_passes() {
        let reg = registration("Rahul Sharma", BloodType::OPositive, "Mumbai");
        assert!(reg.validate().is_ok());
    }

    #[test]
    fn blank_required_fields_rejected() {
        let mut reg = registration("  ", BloodType::OPositive, "Mumbai");
        assert!(matches!(
            reg.validate(),
            Err(LifeFlowError::InvalidField { field: "name", .. })
        ));

        reg.name = "Priya".to_string();
        reg.city = String::new();
        assert!(matches!(
            reg.validate(),
            Err(LifeFlowError::InvalidField { field: "city", .. })
        ));
    }

    #[test]
    fn age_bounds_enforced() {
        let mut reg = registration("Amit", BloodType::ANegative, "Delhi");
        reg.age = 17;
        assert!(reg.validate().is_err());
        reg.age = 18;
        assert!(reg.validate().is_ok());
        reg.age = 65;
        assert!(reg.validate().is_ok());
        reg.age = 66;
        assert!(reg.validate().is_err());
    }

    #[test]
    fn terms_must_be_accepted() {
        let mut reg = registration("Amit", BloodType::ANegative, "Delhi");
        reg.agree_terms = false;
        assert!(matches!(
            reg.validate(),
            Err(LifeFlowError::InvalidField { field: "agree_terms", .. })
        ));
    }

    #[test]
    fn oversized_optional_text_rejected() {
        let mut reg = registration("Amit", BloodType::ANegative, "Delhi");
        reg.medical_conditions = Some("x".repeat(MAX_TEXT_LENGTH + 1));
        assert!(matches!(
            reg.validate(),
            Err(LifeFlowError::InvalidField { field: "medical_conditions", .. })
        ));
    }

    #[test]
    fn new_donor_is_trimmed_and_available() {
        let mut reg = registration("  Priya Patel ", BloodType::BNegative, " Pune ");
        reg.email = Some("   ".to_string());
        let donor = Donor::new(DonorId(7), reg, 1_000);

        assert_eq!(donor.name, "Priya Patel");
        assert_eq!(donor.city, "Pune");
        assert!(donor.email.is_none());
        assert!(donor.available);
        assert!(donor.is_eligible(1_000));
    }

    #[test]
    fn cooldown_rounds_up_and_expires() {
        let mut donor = Donor::new(
            DonorId(1),
            registration("Amit", BloodType::OPositive, "Delhi"),
            0,
        );
        donor.last_donation_at = Some(0);

        assert_eq!(donor.cooldown_remaining_days(0), 30);
        assert_eq!(donor.cooldown_remaining_days(1), 30);
        assert_eq!(donor.cooldown_remaining_days(29 * SECS_PER_DAY), 1);
        assert_eq!(donor.cooldown_remaining_days(DONATION_COOLDOWN_SECS), 0);
        assert!(!donor.is_eligible(DONATION_COOLDOWN_SECS - 1));
        assert!(donor.is_eligible(DONATION_COOLDOWN_SECS));
    }

    #[test]
    fn unavailable_donor_not_eligible() {
        let mut donor = Donor::new(
            DonorId(1),
            registration("Amit", BloodType::OPositive, "Delhi"),
            0,
        );
        donor.available = false;
        assert!(!donor.is_eligible(0));
    }
}
