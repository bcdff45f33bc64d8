//! # Property-Based Tests
//!
//! Compatibility invariants over the whole blood type domain, and ordering
//! and filtering guarantees of donor search.

use lifeflow_core::primitives::{DONATION_COOLDOWN_SECS, MAX_SEARCH_RESULTS};
use lifeflow_core::{
    BloodType, BloodTypeSet, DonorQuery, DonorRegistration, MatchMode, Registry,
    compatible_donors, compatible_recipients, is_compatible,
};
use proptest::collection::vec;
use proptest::prelude::*;

fn blood_type() -> impl Strategy<Value = BloodType> {
    (0usize..8).prop_map(|i| BloodType::ALL[i])
}

fn city() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["Mumbai", "Delhi", "New Delhi", "Pune"])
}

fn registration(
    name: String,
    blood_type: BloodType,
    city: &str,
    emergency: bool,
) -> DonorRegistration {
    DonorRegistration {
        name,
        age: 30,
        blood_type,
        phone: "+91 90000-00000".to_string(),
        email: None,
        address: String::new(),
        city: city.to_string(),
        state: "Delhi".to_string(),
        pincode: None,
        medical_conditions: None,
        emergency_contact: None,
        available_for_emergency: emergency,
        agree_terms: true,
    }
}

// =============================================================================
// COMPATIBILITY
// =============================================================================

proptest! {
    /// `y` can give to `x` exactly when `x` can receive from `y`.
    #[test]
    fn donor_and_recipient_relations_are_inverse(x in blood_type(), y in blood_type()) {
        prop_assert_eq!(
            compatible_donors(x).contains(y),
            compatible_recipients(y).contains(x)
        );
    }

    /// Lookup tables agree with the ABO/Rh rules.
    #[test]
    fn tables_match_rules(donor in blood_type(), recipient in blood_type()) {
        prop_assert_eq!(
            compatible_recipients(donor).contains(recipient),
            is_compatible(donor, recipient)
        );
    }

    /// Compatibility is transitive: if a gives to b and b gives to c,
    /// then a gives to c.
    #[test]
    fn compatibility_is_transitive(a in blood_type(), b in blood_type(), c in blood_type()) {
        if is_compatible(a, b) && is_compatible(b, c) {
            prop_assert!(is_compatible(a, c));
        }
    }

    /// Code text parses back to the same type regardless of case and padding.
    #[test]
    fn codes_parse_leniently(bt in blood_type(), pad in 0usize..3) {
        let text = format!("{}{}{}", " ".repeat(pad), bt.code().to_lowercase(), " ".repeat(pad));
        prop_assert_eq!(text.parse::<BloodType>().expect("parse"), bt);
    }

    /// Any subset survives conversion to and from a list of types.
    #[test]
    fn sets_preserve_membership(members in vec(blood_type(), 0..8)) {
        let set: BloodTypeSet = members.iter().copied().collect();
        for bt in BloodType::ALL {
            prop_assert_eq!(set.contains(bt), members.contains(&bt));
        }
        let listed: Vec<BloodType> = set.into();
        prop_assert_eq!(listed.len(), set.len());
    }
}

// =============================================================================
// SEARCH
// =============================================================================

proptest! {
    /// Every result satisfies the query; results are newest first and capped.
    #[test]
    fn search_results_match_and_are_ordered(
        donors in vec((blood_type(), city(), any::<bool>()), 0..60),
        wanted in blood_type(),
        compatible in any::<bool>(),
        limit in 1usize..200,
    ) {
        let mut registry = Registry::new();
        for (i, (bt, city, emergency)) in donors.iter().enumerate() {
            registry
                .register_donor(registration(format!("Donor {i}"), *bt, city, *emergency), i as u64)
                .expect("register");
        }

        let mode = if compatible { MatchMode::Compatible } else { MatchMode::Exact };
        let mut query = DonorQuery::new(wanted).with_city("delhi").with_mode(mode);
        query.limit = Some(limit);

        let results = registry.search_donors(&query, 1_000).expect("search");
        prop_assert!(results.len() <= limit.min(MAX_SEARCH_RESULTS));

        for donor in &results {
            prop_assert!(donor.city.to_lowercase().contains("delhi"));
            if compatible {
                prop_assert!(compatible_donors(wanted).contains(donor.blood_type));
            } else {
                prop_assert_eq!(donor.blood_type, wanted);
            }
        }
        for pair in results.windows(2) {
            prop_assert!(pair[0].registered_at >= pair[1].registered_at);
        }
    }

    /// A donor who just gave blood never shows up until the cooldown ends.
    #[test]
    fn recent_donors_never_returned(bt in blood_type(), offset in 0u64..DONATION_COOLDOWN_SECS) {
        let mut registry = Registry::new();
        let donor = registry
            .register_donor(registration("Resting".to_string(), bt, "Pune", true), 0)
            .expect("register");
        registry.record_donation(donor.id, 10).expect("donate");

        let query = DonorQuery::new(bt);
        prop_assert!(registry.search_donors(&query, 10 + offset).expect("search").is_empty());
        prop_assert!(registry.set_availability(donor.id, true, 10 + offset).is_err());
    }

    /// Every broadcast match can safely give to the requested type.
    #[test]
    fn broadcast_matches_are_compatible(
        donors in vec((blood_type(), city(), any::<bool>()), 0..40),
        wanted in blood_type(),
    ) {
        let mut registry = Registry::new();
        for (i, (bt, city, emergency)) in donors.iter().enumerate() {
            registry
                .register_donor(registration(format!("Donor {i}"), *bt, city, *emergency), i as u64)
                .expect("register");
        }

        let draft = lifeflow_core::EmergencyDraft {
            patient_name: "Patient".to_string(),
            blood_type: wanted,
            units_needed: 1,
            hospital_name: "AIIMS".to_string(),
            hospital_address: String::new(),
            contact_person: "Contact".to_string(),
            contact_phone: "100".to_string(),
            urgency: lifeflow_core::Urgency::Critical,
            city: None,
            medical_condition: None,
            notes: None,
        };
        let broadcast = registry.create_emergency(draft, 1_000).expect("create");

        let expected = donors
            .iter()
            .filter(|(bt, _, _)| is_compatible(*bt, wanted))
            .count();
        prop_assert_eq!(broadcast.matches.len(), expected);

        for m in &broadcast.matches {
            prop_assert!(is_compatible(m.blood_type, wanted));
            prop_assert_eq!(m.exact_match, m.blood_type == wanted);
        }
        // Emergency opt-ins come first.
        for pair in broadcast.matches.windows(2) {
            prop_assert!(pair[0].available_for_emergency >= pair[1].available_for_emergency);
        }
    }
}
