use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nav-survey")]
#[command(about = "Discovers the navigable surface of a web application and prints its site map")]
#[command(version)]
pub struct Args {
    /// URL to start discovery from
    pub url: String,

    /// Maximum number of pages recorded in the site map [default: 10]
    #[arg(short, long)]
    pub max_pages: Option<usize>,

    /// Timeout in seconds for each page render or element activation [default: 30]
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// JSON configuration file (scope rules, extraction limits)
    #[arg(short, long)]
    pub config_file: Option<PathBuf>,

    /// WebDriver endpoint; the WEBDRIVER_URL environment variable takes precedence
    #[arg(long)]
    pub webdriver_url: Option<String>,
}
