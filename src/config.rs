use std::env;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_YELP_BASE_URL: &str = "https://api.yelp.com/v3";
pub const DEFAULT_GOOGLE_PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// API credentials and endpoints, read once at startup and handed to the
/// handlers as shared state. Base URLs are overridable so tests can point
/// the service at local doubles.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub openai_api_key: Option<String>,
    pub yelp_api_key: Option<String>,
    pub google_maps_api_key: Option<String>,
    pub openai_base_url: String,
    pub yelp_base_url: String,
    pub google_places_base_url: String,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            yelp_api_key: non_empty_var("YELP_API_KEY"),
            google_maps_api_key: non_empty_var("GOOGLE_MAPS_API_KEY"),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string()),
            yelp_base_url: env::var("YELP_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_YELP_BASE_URL.to_string()),
            google_places_base_url: env::var("GOOGLE_PLACES_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_PLACES_BASE_URL.to_string()),
        }
    }
}

// Blank values in .env files count as unset.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
