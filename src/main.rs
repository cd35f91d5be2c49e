use clap::Parser;
use nav_survey::{SiteMap, SiteSurvey};
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    ::log::info!("Starting site discovery for URL: {}", args.url);
    eprintln!("Note: site discovery requires a WebDriver server (e.g., ChromeDriver).");
    eprintln!(
        "Set WEBDRIVER_URL environment variable if not using the default http://localhost:4444"
    );

    let mut survey = SiteSurvey::new(&args.url);
    if let Some(path) = &args.config_file {
        survey = match survey.with_config_file(path) {
            Ok(survey) => survey,
            Err(e) => {
                ::log::error!("Failed to load config {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        };
    }
    // Command-line values win over the config file
    if let Some(max_pages) = args.max_pages {
        survey = survey.with_max_pages(max_pages);
    }
    if let Some(timeout) = args.timeout {
        survey = survey.with_fetch_timeout(timeout);
    }
    if let Some(webdriver_url) = &args.webdriver_url {
        survey = survey.with_webdriver_url(webdriver_url);
    }

    let start_time = std::time::Instant::now();
    let site_map = match survey.crawl().await {
        Ok(site_map) => site_map,
        Err(e) => {
            ::log::error!("Site discovery failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    ::log::info!(
        "Discovery complete - {} pages, {} interactive elements in {:.2} seconds",
        site_map.len(),
        site_map.interactive_count(),
        start_time.elapsed().as_secs_f64()
    );

    match print_site_map(&site_map) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ::log::error!("Failed to serialize site map: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_site_map(site_map: &SiteMap) -> Result<(), serde_json::Error> {
    for page in site_map.pages() {
        ::log::debug!(
            "{} - {} ({} navigation items)",
            page.fingerprint(),
            page.title(),
            page.navigation().len()
        );
    }
    println!("{}", serde_json::to_string_pretty(site_map)?);
    Ok(())
}
