use std::path::PathBuf;

use clap::Parser;
use xpath_core::JobRequest;

use crate::platform::AppConfig;

/// Runs one XPath search against a router and prints the matching nodes.
#[derive(Debug, Clone, Parser)]
#[command(name = "xpath-browser", version)]
pub struct Cli {
    /// Short name of the router to search.
    #[arg(short, long)]
    pub router: String,

    /// XPath expression evaluated on the router configuration.
    #[arg(short = 'x', long)]
    pub xpath: String,

    /// Merge inherited configuration groups before searching.
    #[arg(long)]
    pub merge: bool,

    /// Base URL of the server, overriding the config file.
    #[arg(short, long, value_name = "URL")]
    pub server: Option<String>,

    /// Config file (RON). Defaults to ./xpath_browser.ron when present.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Seconds without stream progress before the search is failed.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub idle_timeout: Option<u64>,

    /// Print the result tree as JSON instead of an indented outline.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded config.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(server) = &self.server {
            config.server_url = server.clone();
        }
        if let Some(secs) = self.idle_timeout {
            config.idle_timeout_secs = secs;
        }
    }

    pub fn request(&self) -> JobRequest {
        JobRequest::new(self.router.as_str(), self.xpath.as_str(), self.merge)
    }
}
