pub mod crawler;
pub mod web;


pub use crawler::{CrawlSettings, Crawler, DEFAULT_FETCH_TIMEOUT};
pub use web::WebDriverSource;
