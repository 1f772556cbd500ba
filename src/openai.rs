use log::{debug, info};
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::ApiConfig;
use crate::errors::UpstreamError;
use crate::handlers::RestaurantInfo;
use crate::recommend::{SearchTerms, DEFAULT_CATEGORIES, DEFAULT_TERM};
use crate::utils::extract_json_object;

/// Model behind every completion call.
pub const COMPLETION_MODEL: &str = "gpt-3.5-turbo";

/// Sends a single-user-message chat completion and returns the raw
/// completion text.
pub async fn chat_completion(
    client: &Client,
    config: &ApiConfig,
    prompt: &str,
    max_tokens: u32,
    temperature: f64,
) -> Result<String, UpstreamError> {
    let api_key = config
        .openai_api_key
        .as_deref()
        .ok_or(UpstreamError::MissingKey("OpenAI"))?;

    let url = format!(
        "{}/chat/completions",
        config.openai_base_url.trim_end_matches('/')
    );
    let body = json!({
        "model": COMPLETION_MODEL,
        "messages": [{ "role": "user", "content": prompt }],
        "max_tokens": max_tokens,
        "temperature": temperature,
    });

    debug!("Sending completion request ({} prompt bytes)", prompt.len());

    let response = client
        .post(&url)
        .header("Authorization", format!("Bearer {}", api_key))
        .json(&body)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_body = response.text().await.unwrap_or_default();
        return Err(UpstreamError::Api(format!(
            "OpenAI API error {}: {}",
            status, error_body
        )));
    }

    let payload = response.json::<Value>().await?;
    let content = payload["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| {
            UpstreamError::InvalidResponse("completion has no message content".to_string())
        })?;

    Ok(content.to_string())
}

/// Asks the model for a term and category list fitting the merged scores.
/// Only called when a question text exists for every score.
pub async fn derive_search_terms(
    client: &Client,
    config: &ApiConfig,
    questions: &[String],
    scores: &[f64],
) -> Result<SearchTerms, UpstreamError> {
    let prompt = search_terms_prompt(questions, scores);
    let text = chat_completion(client, config, &prompt, 60, 0.3).await?;
    info!("Search term completion: {}", text);

    let parsed =
        extract_json_object(&text).map_err(|e| UpstreamError::InvalidResponse(e.to_string()))?;

    match (parsed["term"].as_str(), parsed["categories"].as_str()) {
        (Some(term), Some(categories)) if !term.is_empty() && !categories.is_empty() => {
            Ok(SearchTerms {
                term: term.to_string(),
                categories: categories.to_string(),
            })
        }
        _ => Err(UpstreamError::InvalidResponse(
            "completion is missing term or categories".to_string(),
        )),
    }
}

pub fn summary_prompt(questions: &[String], answers: &[f64]) -> String {
    format!(
        "Given these food survey questions and answers (0-10 scale), generate a fun, short \
         personality name, a playful one-sentence summary, and a lighthearted dining suggestion \
         for the user.\n\
         Questions: {}\n\
         Answers: {}\n\
         Respond as JSON: {{ \"name\": \"...\", \"summary\": \"...\", \"suggestion\": \"...\" }}",
        questions.join(" | "),
        join_numbers(answers)
    )
}

pub fn search_terms_prompt(questions: &[String], scores: &[f64]) -> String {
    let pairing = questions
        .iter()
        .zip(scores)
        .map(|(question, score)| format!("{}: {}", question, score))
        .collect::<Vec<_>>()
        .join(" | ");
    format!(
        "Two people answered a food survey (0-10 scale); their averaged answers are below. \
         Pick one short restaurant search term and a comma-separated list of cuisine \
         categories that fit their shared tastes. If unsure, use term \"{}\" and categories \
         \"{}\".\n\
         {}\n\
         Respond as JSON: {{ \"term\": \"...\", \"categories\": \"...\" }}",
        DEFAULT_TERM, DEFAULT_CATEGORIES, pairing
    )
}

pub fn price_prompt(restaurant: &RestaurantInfo) -> String {
    let address = restaurant.address.as_deref().unwrap_or("the US");
    let rating = restaurant
        .rating
        .map(|value| value.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    format!(
        "Estimate the average price for an appetizer, main course, and one drink at a {} \
         restaurant called \"{}\" in {}, rated {} stars.\n\
         Return a JSON object: {{ \"appetizer\": 12, \"main\": 22, \"drink\": 8 }}",
        restaurant.categories, restaurant.name, address, rating
    )
}

fn join_numbers(values: &[f64]) -> String {
    values
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
