use log::{debug, info, warn};
use reqwest::Client;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::errors::UpstreamError;
use crate::recommend::{Listing, ListingSource, SearchArea, SearchTerms};

const MAX_RESULTS: usize = 5;
// Bias radius for coordinate searches, in meters.
const POINT_RADIUS: u32 = 5000;

/// Runs a Places text search for restaurants matching the derived terms.
pub async fn search_restaurants(
    client: &Client,
    config: &ApiConfig,
    terms: &SearchTerms,
    area: &SearchArea,
) -> Result<Vec<Listing>, UpstreamError> {
    let api_key = config
        .google_maps_api_key
        .as_deref()
        .ok_or(UpstreamError::MissingKey("Google Maps"))?;

    let base_url = config.google_places_base_url.trim_end_matches('/');
    let url = format!("{}/textsearch/json", base_url);

    let mut params: Vec<(&str, String)> = Vec::new();
    match area {
        SearchArea::Point {
            latitude,
            longitude,
        } => {
            params.push(("query", format!("{} restaurants", terms.term)));
            params.push(("location", format!("{},{}", latitude, longitude)));
            params.push(("radius", POINT_RADIUS.to_string()));
        }
        SearchArea::Text(location) => {
            params.push(("query", format!("{} restaurants in {}", terms.term, location)));
        }
    }
    params.push(("key", api_key.to_string()));

    debug!("Sending request to Google Places API: {}", url);

    let response = client
        .get(&url)
        .query(&params)
        .send()
        .await?
        .json::<Value>()
        .await?;

    if let Some(error_message) = response["error_message"].as_str() {
        warn!("Google Places API error: {}", error_message);
        return Err(UpstreamError::Api(format!(
            "Google Places API error: {}",
            error_message
        )));
    }

    let results = response["results"]
        .as_array()
        .ok_or_else(|| UpstreamError::InvalidResponse("no results array".to_string()))?;

    let listings: Vec<Listing> = results
        .iter()
        .take(MAX_RESULTS)
        .map(|place| normalize_place(place, base_url, api_key))
        .collect();
    info!("Google Places returned {} listings", listings.len());
    Ok(listings)
}

fn normalize_place(place: &Value, base_url: &str, api_key: &str) -> Listing {
    let image_url = place["photos"][0]["photo_reference"]
        .as_str()
        .map(|reference| {
            format!(
                "{}/photo?maxwidth=400&photoreference={}&key={}",
                base_url, reference, api_key
            )
        });

    let url = place["place_id"]
        .as_str()
        .map(|place_id| format!("https://www.google.com/maps/place/?q=place_id:{}", place_id))
        .unwrap_or_default();

    let categories = place["types"]
        .as_array()
        .map(|types| {
            types
                .iter()
                .filter_map(|value| value.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    Listing {
        name: place["name"].as_str().unwrap_or_default().to_string(),
        rating: place["rating"].as_f64(),
        address: place["formatted_address"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        image_url,
        url,
        categories,
        source: ListingSource::Google,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn place_payload_normalizes_to_listing() {
        let place = json!({
            "name": "Fusion Republic",
            "rating": 4.2,
            "formatted_address": "77 Atlantic Ave, Brooklyn, NY 11201",
            "place_id": "ChIJabc123",
            "photos": [{ "photo_reference": "photo-ref-1", "width": 600 }],
            "types": ["restaurant", "food", "point_of_interest"]
        });

        let listing = normalize_place(&place, "https://maps.googleapis.com/maps/api/place", "k");
        assert_eq!(listing.name, "Fusion Republic");
        assert_eq!(
            listing.url,
            "https://www.google.com/maps/place/?q=place_id:ChIJabc123"
        );
        assert_eq!(
            listing.image_url.as_deref(),
            Some("https://maps.googleapis.com/maps/api/place/photo?maxwidth=400&photoreference=photo-ref-1&key=k")
        );
        assert_eq!(listing.categories, "restaurant, food, point_of_interest");
        assert_eq!(listing.source, ListingSource::Google);
    }

    #[test]
    fn place_without_photos_has_no_image() {
        let place = json!({
            "name": "No Photo Diner",
            "formatted_address": "1 Main St",
            "place_id": "ChIJxyz"
        });
        let listing = normalize_place(&place, "https://maps.googleapis.com/maps/api/place", "k");
        assert_eq!(listing.image_url, None);
        assert_eq!(listing.categories, "");
    }
}
