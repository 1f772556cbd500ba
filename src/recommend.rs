use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_LOCATION: &str = "New York, NY";
pub const DEFAULT_TERM: &str = "food";
pub const DEFAULT_CATEGORIES: &str = "restaurants";

// Score positions fixed by the survey layout.
const SPICE_TOLERANCE_INDEX: usize = 0;
const ADVENTUROUSNESS_INDEX: usize = 7;

/// Index-wise average of the two respondents' answers.
pub fn merge_scores(host: &[f64], guest: &[f64]) -> Result<Vec<f64>, String> {
    if host.len() != guest.len() {
        return Err("hostAnswers and guestAnswers must have the same length".to_string());
    }
    Ok(host
        .iter()
        .zip(guest)
        .map(|(h, g)| (h + g) / 2.0)
        .collect())
}

/// What to search for, shared by both restaurant sources.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTerms {
    pub term: String,
    pub categories: String,
}

impl Default for SearchTerms {
    fn default() -> Self {
        Self {
            term: DEFAULT_TERM.to_string(),
            categories: DEFAULT_CATEGORIES.to_string(),
        }
    }
}

/// Threshold rules over the merged scores. Scores too short to carry an
/// index count as not above threshold; an empty survey falls back to the
/// defaults.
pub fn heuristic_terms(scores: &[f64]) -> SearchTerms {
    if scores.is_empty() {
        return SearchTerms::default();
    }

    let spice = scores.get(SPICE_TOLERANCE_INDEX).copied().unwrap_or(0.0);
    let adventurousness = scores.get(ADVENTUROUSNESS_INDEX).copied().unwrap_or(0.0);

    let term = if adventurousness > 7.0 { "fusion" } else { "food" };
    let categories = if spice > 7.0 {
        "szechuan,mexican"
    } else {
        "italian,japanese"
    };

    SearchTerms {
        term: term.to_string(),
        categories: categories.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Where to search. Coordinates win over free-text location; with neither,
/// the product falls back to its home market.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchArea {
    Point { latitude: f64, longitude: f64 },
    Text(String),
}

impl SearchArea {
    pub fn resolve(location: Option<String>, coordinates: Option<Coordinates>) -> Self {
        if let Some(point) = coordinates {
            return SearchArea::Point {
                latitude: point.latitude,
                longitude: point.longitude,
            };
        }
        match location {
            Some(text) if !text.trim().is_empty() => SearchArea::Text(text),
            _ => SearchArea::Text(DEFAULT_LOCATION.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingSource {
    Yelp,
    Google,
}

/// A restaurant normalized from either source into the response shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub name: String,
    pub rating: Option<f64>,
    pub address: String,
    pub image_url: Option<String>,
    pub url: String,
    pub categories: String,
    pub source: ListingSource,
}

/// Drops later listings that share a name and address with an earlier one.
/// Order is otherwise preserved.
pub fn dedupe_listings(listings: Vec<Listing>) -> Vec<Listing> {
    let mut seen = HashSet::new();
    listings
        .into_iter()
        .filter(|listing| seen.insert(format!("{}|{}", listing.name, listing.address)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(name: &str, address: &str, source: ListingSource) -> Listing {
        Listing {
            name: name.to_string(),
            rating: Some(4.0),
            address: address.to_string(),
            image_url: None,
            url: format!("https://example.com/{}", name),
            categories: "Test".to_string(),
            source,
        }
    }

    #[test]
    fn merged_scores_are_index_wise_averages() {
        let host = [2.0, 4.0, 6.0, 1.5];
        let guest = [4.0, 6.0, 9.0, 2.0];
        let merged = merge_scores(&host, &guest).unwrap();
        assert_eq!(merged, vec![3.0, 5.0, 7.5, 1.75]);
        for (i, value) in merged.iter().enumerate() {
            assert_eq!(*value, (host[i] + guest[i]) / 2.0);
        }
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = merge_scores(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert_eq!(err, "hostAnswers and guestAnswers must have the same length");
    }

    #[test]
    fn empty_surveys_merge_to_empty() {
        assert_eq!(merge_scores(&[], &[]).unwrap(), Vec::<f64>::new());
    }

    #[test]
    fn high_scores_pick_the_bolder_terms() {
        let scores = [8.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 7.5];
        let terms = heuristic_terms(&scores);
        assert_eq!(terms.term, "fusion");
        assert_eq!(terms.categories, "szechuan,mexican");
    }

    #[test]
    fn threshold_is_exclusive() {
        // Exactly 7 is not "above 7".
        let scores = [7.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 7.0];
        let terms = heuristic_terms(&scores);
        assert_eq!(terms.term, "food");
        assert_eq!(terms.categories, "italian,japanese");
    }

    #[test]
    fn short_surveys_read_missing_scores_as_low() {
        let terms = heuristic_terms(&[9.0]);
        assert_eq!(terms.term, "food");
        assert_eq!(terms.categories, "szechuan,mexican");
    }

    #[test]
    fn empty_scores_fall_back_to_defaults() {
        assert_eq!(heuristic_terms(&[]), SearchTerms::default());
    }

    #[test]
    fn coordinates_take_precedence_over_location() {
        let area = SearchArea::resolve(
            Some("Lisbon".to_string()),
            Some(Coordinates { latitude: 40.7, longitude: -74.0 }),
        );
        assert_eq!(
            area,
            SearchArea::Point { latitude: 40.7, longitude: -74.0 }
        );
    }

    #[test]
    fn missing_or_blank_location_falls_back_to_default() {
        assert_eq!(
            SearchArea::resolve(None, None),
            SearchArea::Text(DEFAULT_LOCATION.to_string())
        );
        assert_eq!(
            SearchArea::resolve(Some("   ".to_string()), None),
            SearchArea::Text(DEFAULT_LOCATION.to_string())
        );
    }

    #[test]
    fn duplicate_listings_keep_the_first_occurrence() {
        let listings = vec![
            listing("Casa Lola", "123 Smith St", ListingSource::Yelp),
            listing("Noodle Bar", "9 Mott St", ListingSource::Yelp),
            listing("Casa Lola", "123 Smith St", ListingSource::Google),
            listing("Casa Lola", "77 Other Ave", ListingSource::Google),
        ];
        let deduped = dedupe_listings(listings);
        assert_eq!(deduped.len(), 3);
        assert_eq!(deduped[0].name, "Casa Lola");
        assert_eq!(deduped[0].source, ListingSource::Yelp);
        assert_eq!(deduped[1].name, "Noodle Bar");
        // Same name at a different address is not a duplicate.
        assert_eq!(deduped[2].address, "77 Other Ave");
    }

    #[test]
    fn listing_source_serializes_lowercase() {
        let json = serde_json::to_value(ListingSource::Google).unwrap();
        assert_eq!(json, serde_json::json!("google"));
    }
}
