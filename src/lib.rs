pub mod config;
pub mod errors;
pub mod google_places;
pub mod handlers;
pub mod logging;
pub mod openai;
pub mod recommend;
pub mod utils;
pub mod yelp;
