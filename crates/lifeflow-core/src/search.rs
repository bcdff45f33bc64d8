//! # Donor Search
//!
//! Filtering and ordering of donors for a recipient blood type.
//!
//! Search is a pure function over a donor slice; the registry feeds it the
//! current contents of its store. No distance ranking is performed: results
//! are ordered by registration time, newest first.

use crate::compatibility::compatible_donors;
use crate::donor::Donor;
use crate::primitives::MAX_SEARCH_RESULTS;
use crate::types::{BloodType, BloodTypeSet};
use serde::{Deserialize, Serialize};

/// Which donor types a search accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Only donors of exactly the requested type.
    #[default]
    Exact,
    /// Any donor type that can safely give to the requested type.
    Compatible,
}

/// Donor search parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorQuery {
    /// Blood type of the recipient being searched for.
    pub blood_type: BloodType,
    /// Case-insensitive substring of the donor's city.
    #[serde(default)]
    pub city: Option<String>,
    /// Case-insensitive exact state name.
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub mode: MatchMode,
    /// Keep only donors who opted into emergency alerts.
    #[serde(default)]
    pub emergency_only: bool,
    /// Maximum results (capped at `MAX_SEARCH_RESULTS`).
    #[serde(default)]
    pub limit: Option<usize>,
}

impl DonorQuery {
    /// Exact-type query with no location filter.
    #[must_use]
    pub fn new(blood_type: BloodType) -> Self {
        Self {
            blood_type,
            city: None,
            state: None,
            mode: MatchMode::Exact,
            emergency_only: false,
            limit: None,
        }
    }

    #[must_use]
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Donor types this query accepts.
    #[must_use]
    pub fn accepted_types(&self) -> BloodTypeSet {
        match self.mode {
            MatchMode::Exact => BloodTypeSet::of(&[self.blood_type]),
            MatchMode::Compatible => compatible_donors(self.blood_type),
        }
    }

    /// Effective result cap.
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.limit
            .map_or(MAX_SEARCH_RESULTS, |l| l.min(MAX_SEARCH_RESULTS))
    }

    /// Check a single donor against every filter.
    #[must_use]
    pub fn matches(&self, donor: &Donor, now: u64) -> bool {
        if !donor.is_eligible(now) || !self.accepted_types().contains(donor.blood_type) {
            return false;
        }
        if self.emergency_only && !donor.available_for_emergency {
            return false;
        }
        if let Some(city) = non_blank(self.city.as_deref())
            && !contains_ignore_case(&donor.city, city)
        {
            return false;
        }
        if let Some(state) = non_blank(self.state.as_deref())
            && !donor.state.trim().eq_ignore_ascii_case(state)
        {
            return false;
        }
        true
    }
}

/// Run a query over a set of donors.
///
/// Returns eligible matches, newest registration first (ties broken by
/// higher id), truncated to the query limit.
#[must_use]
pub fn search<'a>(donors: &'a [Donor], query: &DonorQuery, now: u64) -> Vec<&'a Donor> {
    let mut results: Vec<&Donor> = donors.iter().filter(|d| query.matches(d, now)).collect();
    results.sort_by(|a, b| {
        b.registered_at
            .cmp(&a.registered_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    results.truncate(query.effective_limit());
    results
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Case-insensitive substring test.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::donor::tests::registration;
    use crate::types::DonorId;

    fn donor(id: u64, blood_type: BloodType, city: &str, registered_at: u64) -> Donor {
        Donor::new(
            DonorId(id),
            registration(&format!("Donor {id}"), blood_type, city),
            registered_at,
        )
    }

    fn ids(results: &[&Donor]) -> Vec<u64> {
        results.iter().map(|d| d.id.0).collect()
    }

    #[test]
    fn exact_mode_matches_only_same_type() {
        let donors = vec![
            donor(1, BloodType::OPositive, "Mumbai", 10),
            donor(2, BloodType::ONegative, "Mumbai", 20),
            donor(3, BloodType::OPositive, "Mumbai", 30),
        ];
        let results = search(&donors, &DonorQuery::new(BloodType::OPositive), 100);
        assert_eq!(ids(&results), vec![3, 1]);
    }

    #[test]
    fn compatible_mode_uses_engine() {
        let donors = vec![
            donor(1, BloodType::APositive, "Delhi", 1),
            donor(2, BloodType::ONegative, "Delhi", 2),
            donor(3, BloodType::BPositive, "Delhi", 3),
            donor(4, BloodType::ANegative, "Delhi", 4),
        ];
        let query = DonorQuery::new(BloodType::APositive).with_mode(MatchMode::Compatible);
        let results = search(&donors, &query, 100);
        assert_eq!(ids(&results), vec![4, 2, 1]);
    }

    #[test]
    fn city_is_case_insensitive_substring() {
        let donors = vec![
            donor(1, BloodType::BPositive, "New Delhi", 1),
            donor(2, BloodType::BPositive, "Mumbai", 2),
        ];
        let query = DonorQuery::new(BloodType::BPositive).with_city("delhi");
        assert_eq!(ids(&search(&donors, &query, 10)), vec![1]);
    }

    #[test]
    fn state_is_case_insensitive_exact() {
        let mut other = donor(2, BloodType::BPositive, "Bengaluru", 2);
        other.state = "Karnataka".to_string();
        let donors = vec![donor(1, BloodType::BPositive, "Mumbai", 1), other];

        let query = DonorQuery::new(BloodType::BPositive).with_state("karnataka");
        assert_eq!(ids(&search(&donors, &query, 10)), vec![2]);

        let partial = DonorQuery::new(BloodType::BPositive).with_state("Karna");
        assert!(search(&donors, &partial, 10).is_empty());
    }

    #[test]
    fn blank_filters_are_ignored() {
        let donors = vec![donor(1, BloodType::ABNegative, "Chennai", 1)];
        let query = DonorQuery::new(BloodType::ABNegative)
            .with_city("  ")
            .with_state("");
        assert_eq!(ids(&search(&donors, &query, 10)), vec![1]);
    }

    #[test]
    fn ineligible_donors_excluded() {
        let mut resting = donor(1, BloodType::OPositive, "Mumbai", 1);
        resting.last_donation_at = Some(50);
        let mut off = donor(2, BloodType::OPositive, "Mumbai", 2);
        off.available = false;
        let donors = vec![resting, off, donor(3, BloodType::OPositive, "Mumbai", 3)];

        assert_eq!(
            ids(&search(&donors, &DonorQuery::new(BloodType::OPositive), 100)),
            vec![3]
        );
    }

    #[test]
    fn emergency_only_filter() {
        let mut opted_in = donor(1, BloodType::OPositive, "Mumbai", 1);
        opted_in.available_for_emergency = true;
        let donors = vec![opted_in, donor(2, BloodType::OPositive, "Mumbai", 2)];

        let mut query = DonorQuery::new(BloodType::OPositive);
        query.emergency_only = true;
        assert_eq!(ids(&search(&donors, &query, 10)), vec![1]);
    }

    #[test]
    fn limit_is_capped() {
        let donors: Vec<Donor> = (0..150)
            .map(|i| donor(i, BloodType::APositive, "Pune", i))
            .collect();

        let mut query = DonorQuery::new(BloodType::APositive);
        assert_eq!(search(&donors, &query, 1_000).len(), MAX_SEARCH_RESULTS);

        query.limit = Some(5);
        let results = search(&donors, &query, 1_000);
        assert_eq!(ids(&results), vec![149, 148, 147, 146, 145]);
    }

    #[test]
    fn registration_ties_break_on_id() {
        let donors = vec![
            donor(1, BloodType::APositive, "Pune", 5),
            donor(2, BloodType::APositive, "Pune", 5),
        ];
        assert_eq!(
            ids(&search(&donors, &DonorQuery::new(BloodType::APositive), 10)),
            vec![2, 1]
        );
    }
}
