use log::{debug, info, warn};
use reqwest::Client;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::errors::UpstreamError;
use crate::recommend::{Listing, ListingSource, SearchArea, SearchTerms};

const MAX_RESULTS: usize = 5;

/// Searches Yelp businesses matching the derived terms around the given
/// area. Listings come back already normalized and rating-sorted.
pub async fn search_businesses(
    client: &Client,
    config: &ApiConfig,
    terms: &SearchTerms,
    area: &SearchArea,
) -> Result<Vec<Listing>, UpstreamError> {
    let api_key = config
        .yelp_api_key
        .as_deref()
        .ok_or(UpstreamError::MissingKey("Yelp"))?;

    let url = format!(
        "{}/businesses/search",
        config.yelp_base_url.trim_end_matches('/')
    );

    let mut params: Vec<(&str, String)> = vec![
        ("term", terms.term.clone()),
        ("categories", terms.categories.clone()),
        ("sort_by", "rating".to_string()),
        ("limit", MAX_RESULTS.to_string()),
    ];
    match area {
        SearchArea::Point {
            latitude,
            longitude,
        } => {
            params.push(("latitude", latitude.to_string()));
            params.push(("longitude", longitude.to_string()));
        }
        SearchArea::Text(location) => params.push(("location", location.clone())),
    }

    debug!("Sending request to Yelp API with params: {:?}", params);

    let response = client
        .get(&url)
        .query(&params)
        .header("Authorization", format!("Bearer {}", api_key))
        .send()
        .await?
        .json::<Value>()
        .await?;

    if let Some(error) = response.get("error") {
        let description = error["description"].as_str().unwrap_or("Unknown error");
        warn!("Yelp API error: {}", description);
        return Err(UpstreamError::Api(format!("Yelp API error: {}", description)));
    }

    let businesses = response["businesses"]
        .as_array()
        .ok_or_else(|| UpstreamError::InvalidResponse("no businesses array".to_string()))?;

    let listings: Vec<Listing> = businesses
        .iter()
        .take(MAX_RESULTS)
        .map(normalize_business)
        .collect();
    info!("Yelp returned {} listings", listings.len());
    Ok(listings)
}

fn normalize_business(business: &Value) -> Listing {
    let address = business["location"]["display_address"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    let categories = business["categories"]
        .as_array()
        .map(|categories| {
            categories
                .iter()
                .filter_map(|category| category["title"].as_str())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    Listing {
        name: business["name"].as_str().unwrap_or_default().to_string(),
        rating: business["rating"].as_f64(),
        address,
        image_url: business["image_url"].as_str().map(String::from),
        url: business["url"].as_str().unwrap_or_default().to_string(),
        categories,
        source: ListingSource::Yelp,
    }
}
