//! # Hospital Directory
//!
//! A fixed list of Delhi government hospitals used to autocomplete the
//! hospital field of emergency requests.

use crate::primitives::MIN_HOSPITAL_QUERY_LENGTH;
use crate::search::contains_ignore_case;
use serde::Serialize;

/// A geographic point in micro-degrees (degrees x 1_000_000).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Coordinates {
    pub lat_micro: i32,
    pub lng_micro: i32,
}

/// One hospital in the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hospital {
    pub id: u32,
    pub name: &'static str,
    pub address: &'static str,
    pub coordinates: Coordinates,
}

const fn hospital(
    id: u32,
    name: &'static str,
    address: &'static str,
    lat_micro: i32,
    lng_micro: i32,
) -> Hospital {
    Hospital {
        id,
        name,
        address,
        coordinates: Coordinates {
            lat_micro,
            lng_micro,
        },
    }
}

static HOSPITALS: [Hospital; 15] = [
    hospital(
        1,
        "All India Institute of Medical Sciences (AIIMS)",
        "Sri Aurobindo Marg, Ansari Nagar, New Delhi - 110029",
        28_567_200,
        77_210_000,
    ),
    hospital(
        2,
        "Safdarjung Hospital",
        "Safdarjung Enclave, New Delhi - 110029",
        28_566_500,
        77_206_300,
    ),
    hospital(
        3,
        "Ram Manohar Lohia Hospital",
        "Park Street, New Delhi - 110001",
        28_635_800,
        77_224_500,
    ),
    hospital(
        4,
        "Guru Teg Bahadur Hospital",
        "Dilshad Garden, New Delhi - 110095",
        28_689_700,
        77_320_600,
    ),
    hospital(
        5,
        "Lok Nayak Hospital",
        "Jawahar Lal Nehru Marg, New Delhi - 110002",
        28_643_300,
        77_226_700,
    ),
    hospital(
        6,
        "Lady Hardinge Medical College & Hospital",
        "Shaheed Bhagat Singh Marg, New Delhi - 110001",
        28_638_900,
        77_221_900,
    ),
    hospital(
        7,
        "Maulana Azad Medical College & Hospital",
        "Bahadur Shah Zafar Marg, New Delhi - 110002",
        28_640_800,
        77_239_400,
    ),
    hospital(
        8,
        "Hindu Rao Hospital",
        "Malka Ganj, New Delhi - 110007",
        28_666_700,
        77_216_700,
    ),
    hospital(
        9,
        "Delhi Heart & Lung Institute",
        "Panchkuian Road, New Delhi - 110055",
        28_633_300,
        77_216_700,
    ),
    hospital(
        10,
        "Rajiv Gandhi Super Speciality Hospital",
        "Tahirpur, New Delhi - 110093",
        28_716_700,
        77_250_000,
    ),
    hospital(
        11,
        "Guru Nanak Eye Centre",
        "Maharaja Ranjit Singh Marg, New Delhi - 110002",
        28_646_700,
        77_233_300,
    ),
    hospital(
        12,
        "Dr. Baba Saheb Ambedkar Hospital",
        "Sector 6, Rohini, New Delhi - 110085",
        28_733_300,
        77_116_700,
    ),
    hospital(
        13,
        "Deen Dayal Upadhyay Hospital",
        "Hari Nagar, New Delhi - 110064",
        28_616_700,
        77_100_000,
    ),
    hospital(
        14,
        "Sanjay Gandhi Memorial Hospital",
        "Mangolpuri, New Delhi - 110083",
        28_683_300,
        77_066_700,
    ),
    hospital(
        15,
        "Bhagwan Mahavir Hospital",
        "Pitampura, New Delhi - 110088",
        28_700_000,
        77_133_300,
    ),
];

/// Every hospital, in directory order.
#[must_use]
pub fn all() -> &'static [Hospital] {
    &HOSPITALS
}

/// Look up a hospital by id.
#[must_use]
pub fn by_id(id: u32) -> Option<&'static Hospital> {
    HOSPITALS.iter().find(|h| h.id == id)
}

/// Autocomplete: hospitals whose name or address contains `term`.
///
/// Terms shorter than `MIN_HOSPITAL_QUERY_LENGTH` characters (after trimming)
/// return nothing.
#[must_use]
pub fn search(term: &str) -> Vec<&'static Hospital> {
    let term = term.trim();
    if term.chars().count() < MIN_HOSPITAL_QUERY_LENGTH {
        return Vec::new();
    }
    HOSPITALS
        .iter()
        .filter(|h| contains_ignore_case(h.name, term) || contains_ignore_case(h.address, term))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_terms_return_nothing() {
        assert!(search("").is_empty());
        assert!(search(" a ").is_empty());
    }

    #[test]
    fn matches_name_case_insensitively() {
        let results = search("aiims");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 1);
    }

    #[test]
    fn matches_address() {
        let ids: Vec<u32> = search("110029").iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn results_keep_directory_order() {
        let ids: Vec<u32> = search("medical college").iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![6, 7]);
    }

    #[test]
    fn lookup_by_id() {
        assert_eq!(by_id(9).map(|h| h.name), Some("Delhi Heart & Lung Institute"));
        assert!(by_id(99).is_none());
        assert_eq!(all().len(), 15);
    }
}
