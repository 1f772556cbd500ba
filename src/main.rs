use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use log::info;
use reqwest::Client;
use std::env;
use std::time::Duration;

use tastemate::config::ApiConfig;
use tastemate::handlers::configure_routes;
use tastemate::logging;
use tastemate::utils::mask_api_key;

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

fn log_environment_variables() {
    let mut env_vars = std::collections::HashMap::new();
    for (key, value) in env::vars() {
        if key.to_uppercase().contains("KEY") {
            env_vars.insert(key, mask_api_key(&value));
        } else {
            env_vars.insert(key, value);
        }
    }
    match serde_json::to_string_pretty(&env_vars) {
        Ok(dump) => info!("Environment variables: {}", dump),
        Err(e) => info!("Could not serialize environment variables: {}", e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    if let Err(e) = logging::setup_logging() {
        eprintln!("Failed to set up logging: {}", e);
        return Ok(());
    }

    log_environment_variables();

    let config = ApiConfig::from_env();
    let client = match Client::builder().timeout(UPSTREAM_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to build HTTP client: {}", e);
            return Ok(());
        }
    };

    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(9999);

    info!("Starting tastemate server on port {}", port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(client.clone()))
            .app_data(web::Data::new(config.clone()))
            .configure(configure_routes)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
