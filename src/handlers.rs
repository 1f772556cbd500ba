use actix_web::{web, HttpResponse, Responder};
use log::{debug, error, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::ApiConfig;
use crate::errors::UpstreamError;
use crate::google_places;
use crate::openai;
use crate::recommend::{dedupe_listings, heuristic_terms, merge_scores, Coordinates, SearchArea};
use crate::utils::extract_json_object;
use crate::yelp;

#[derive(Debug, Deserialize)]
struct SummaryRequest {
    questions: Option<Vec<String>>,
    answers: Option<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendRequest {
    host_answers: Option<Vec<f64>>,
    guest_answers: Option<Vec<f64>>,
    location: Option<String>,
    coordinates: Option<Coordinates>,
    questions: Option<Vec<String>>,
}

/// The restaurant the client wants a price estimate for.
#[derive(Debug, Clone, Deserialize)]
pub struct RestaurantInfo {
    pub name: String,
    pub categories: String,
    pub address: Option<String>,
    pub rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct InsightsRequest {
    restaurant: Option<RestaurantInfo>,
    people: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(rename = "aiResponse", skip_serializing_if = "Option::is_none")]
    ai_response: Option<String>,
}

impl ErrorResponse {
    fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
            details: None,
            ai_response: None,
        }
    }

    fn with_details(error: &str, details: String) -> Self {
        Self {
            error: error.to_string(),
            details: Some(details),
            ai_response: None,
        }
    }

    fn with_ai_response(error: &str, ai_response: String) -> Self {
        Self {
            error: error.to_string(),
            details: None,
            ai_response: Some(ai_response),
        }
    }
}

fn bad_request(request_id: &str, message: &str) -> HttpResponse {
    error!("Request {}: {}", request_id, message);
    HttpResponse::BadRequest().json(ErrorResponse::new(message))
}

fn new_request_id() -> String {
    chrono::Utc::now().format("%Y%m%d%H%M%S%f").to_string()
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .service(
            web::resource("/generateSummary")
                .route(web::post().to(generate_summary))
                .route(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/recommendRestaurants")
                .route(web::post().to(recommend_restaurants))
                .route(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/restaurantInsights")
                .route(web::post().to(restaurant_insights))
                .route(web::route().to(method_not_allowed)),
        );
}

async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "message": "Server is running"
    }))
}

async fn method_not_allowed() -> impl Responder {
    HttpResponse::MethodNotAllowed().json(json!({ "error": "Only POST allowed" }))
}

async fn generate_summary(
    body: web::Bytes,
    client: web::Data<Client>,
    config: web::Data<ApiConfig>,
) -> impl Responder {
    let request_id = new_request_id();
    info!("Request {}: Generate summary request received", request_id);
    debug!(
        "Request {}: Raw request body: {}",
        request_id,
        String::from_utf8_lossy(&body)
    );

    let req = match serde_json::from_slice::<SummaryRequest>(&body) {
        Ok(req) => req,
        Err(e) => return bad_request(&request_id, &format!("Invalid request format: {}", e)),
    };

    let (questions, answers) = match (req.questions, req.answers) {
        (Some(questions), Some(answers)) => (questions, answers),
        _ => return bad_request(&request_id, "Missing questions or answers"),
    };

    let prompt = openai::summary_prompt(&questions, &answers);
    let text = match openai::chat_completion(&client, &config, &prompt, 100, 0.8).await {
        Ok(text) => text,
        Err(UpstreamError::MissingKey(_)) => {
            error!("Request {}: OpenAI API key not configured", request_id);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Missing OpenAI API key"));
        }
        Err(e) => {
            error!("Request {}: Summary completion failed: {}", request_id, e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("AI summary failed", e.to_string()));
        }
    };

    info!("Request {}: Summary completion: {}", request_id, text);

    match extract_json_object(&text) {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => {
            error!("Request {}: Summary is not JSON: {}", request_id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("AI did not return JSON", text))
        }
    }
}

async fn recommend_restaurants(
    body: web::Bytes,
    client: web::Data<Client>,
    config: web::Data<ApiConfig>,
) -> impl Responder {
    let request_id = new_request_id();
    info!("Request {}: Recommend restaurants request received", request_id);
    debug!(
        "Request {}: Raw request body: {}",
        request_id,
        String::from_utf8_lossy(&body)
    );

    let req = match serde_json::from_slice::<RecommendRequest>(&body) {
        Ok(req) => req,
        Err(e) => return bad_request(&request_id, &format!("Invalid request format: {}", e)),
    };

    let (host, guest) = match (req.host_answers, req.guest_answers) {
        (Some(host), Some(guest)) => (host, guest),
        _ => return bad_request(&request_id, "Missing hostAnswers or guestAnswers"),
    };

    let scores = match merge_scores(&host, &guest) {
        Ok(scores) => scores,
        Err(message) => return bad_request(&request_id, &message),
    };
    debug!("Request {}: Merged scores: {:?}", request_id, scores);

    // Heuristic thresholds are the baseline; the model only refines them
    // when every score has its question text alongside.
    let mut terms = heuristic_terms(&scores);
    if config.openai_api_key.is_some() {
        if let Some(questions) = req.questions.as_deref().filter(|q| q.len() == scores.len()) {
            match openai::derive_search_terms(&client, &config, questions, &scores).await {
                Ok(derived) => terms = derived,
                Err(e) => {
                    warn!(
                        "Request {}: AI term derivation failed, using heuristic: {}",
                        request_id, e
                    );
                }
            }
        }
    }
    info!(
        "Request {}: Searching term \"{}\", categories \"{}\"",
        request_id, terms.term, terms.categories
    );

    let area = SearchArea::resolve(req.location, req.coordinates);

    let (yelp_result, google_result) = tokio::join!(
        yelp::search_businesses(&client, &config, &terms, &area),
        google_places::search_restaurants(&client, &config, &terms, &area),
    );

    let yelp_listings = yelp_result.unwrap_or_else(|e| {
        warn!("Request {}: Yelp search failed: {}", request_id, e);
        Vec::new()
    });
    let google_listings = google_result.unwrap_or_else(|e| {
        warn!("Request {}: Google Places search failed: {}", request_id, e);
        Vec::new()
    });

    let mut listings = yelp_listings;
    listings.extend(google_listings);
    let listings = dedupe_listings(listings);

    if listings.is_empty() {
        error!("Request {}: Both restaurant sources came back empty", request_id);
        return HttpResponse::InternalServerError().json(ErrorResponse::new(
            "Failed to fetch restaurant recommendations from Yelp and Google.",
        ));
    }

    info!("Request {}: Returning {} listings", request_id, listings.len());
    HttpResponse::Ok().json(listings)
}

async fn restaurant_insights(
    body: web::Bytes,
    client: web::Data<Client>,
    config: web::Data<ApiConfig>,
) -> impl Responder {
    let request_id = new_request_id();
    info!("Request {}: Restaurant insights request received", request_id);
    debug!(
        "Request {}: Raw request body: {}",
        request_id,
        String::from_utf8_lossy(&body)
    );

    let req = match serde_json::from_slice::<InsightsRequest>(&body) {
        Ok(req) => req,
        Err(e) => return bad_request(&request_id, &format!("Invalid request format: {}", e)),
    };

    // A zero head count is treated the same as an absent one.
    let (restaurant, people) = match (req.restaurant, req.people) {
        (Some(restaurant), Some(people)) if people > 0 => (restaurant, people),
        _ => return bad_request(&request_id, "Missing restaurant or people"),
    };

    let prompt = openai::price_prompt(&restaurant);
    let text = match openai::chat_completion(&client, &config, &prompt, 60, 0.3).await {
        Ok(text) => text,
        Err(UpstreamError::MissingKey(_)) => {
            error!("Request {}: OpenAI API key not configured", request_id);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Missing OpenAI API key"));
        }
        Err(e) => {
            error!("Request {}: Price completion failed: {}", request_id, e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Price estimation failed", e.to_string()));
        }
    };

    info!("Request {}: Price completion: {}", request_id, text);

    let bad_ai_response = |reason: &str| {
        error!("Request {}: {}", request_id, reason);
        HttpResponse::InternalServerError().json(ErrorResponse::with_ai_response(
            "AI did not return JSON",
            text.clone(),
        ))
    };

    let prices = match extract_json_object(&text) {
        Ok(prices) => prices,
        Err(e) => return bad_ai_response(&format!("Price estimate is not JSON: {}", e)),
    };

    let (appetizer, main, drink) = match (
        prices["appetizer"].as_f64(),
        prices["main"].as_f64(),
        prices["drink"].as_f64(),
    ) {
        (Some(appetizer), Some(main), Some(drink)) => (appetizer, main, drink),
        _ => return bad_ai_response("Price estimate is missing a numeric field"),
    };

    let per_person = appetizer + main + drink;
    let total = per_person * f64::from(people);

    let mut response = match prices {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    response.insert("perPerson".to_string(), json!(per_person));
    response.insert("total".to_string(), json!(total));

    info!(
        "Request {}: Estimated {:.2} per person, {:.2} total for {} people",
        request_id, per_person, total, people
    );
    HttpResponse::Ok().json(response)
}
