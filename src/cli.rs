use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::downloader::{CaptureConfig, DEFAULT_OUTPUT_DIR, USER_AGENT};

pub const USAGE: &str = "Usage: html-css-fetch <URL> [OUTPUT_DIR]";

#[derive(Parser, Debug)]
#[command(
    name = "html-css-fetch",
    about = "Save a web page together with local copies of its stylesheets",
    version,
    long_about = "Downloads a single page and every stylesheet it links, stores the stylesheets under <OUTPUT_DIR>/assets and rewrites the page to use them. The rewritten page is written to <OUTPUT_DIR>/page.html."
)]
pub struct FetchCommand {
    /// The URL of the page to fetch
    #[arg(required = true)]
    pub url: String,

    /// Output directory for the page and its assets
    #[arg(default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// User agent string to use for requests
    #[arg(long, default_value = USER_AGENT)]
    pub user_agent: String,

    /// Timeout for each request in seconds
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl FetchCommand {
    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }

    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            output_dir: self.output_dir.clone(),
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_args() {
        let args = FetchCommand::try_parse_from(&["html-css-fetch", "https://example.com"]).unwrap();

        assert_eq!(args.url, "https://example.com");
        assert_eq!(args.output_dir, PathBuf::from("output"));
        assert_eq!(args.user_agent, USER_AGENT);
        assert_eq!(args.timeout, 30);
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn test_parse_all_args() {
        let args = FetchCommand::try_parse_from(&[
            "html-css-fetch",
            "https://example.com/dir/page.html",
            "./saved",
            "--user-agent",
            "TestAgent/2.0",
            "--timeout",
            "5",
            "-vv",
        ])
        .unwrap();

        assert_eq!(args.url, "https://example.com/dir/page.html");
        assert_eq!(args.output_dir, PathBuf::from("./saved"));
        assert_eq!(args.user_agent, "TestAgent/2.0");
        assert_eq!(args.timeout, 5);
        assert_eq!(args.default_log_level(), "trace");
    }

    #[test]
    fn test_capture_config() {
        let args = FetchCommand::try_parse_from(&["html-css-fetch", "https://example.com", "out"]).unwrap();
        let config = args.capture_config();

        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.user_agent, USER_AGENT);
    }

    #[test]
    fn test_log_levels() {
        let quiet = FetchCommand::try_parse_from(&["html-css-fetch", "https://example.com", "-q"]).unwrap();
        let verbose = FetchCommand::try_parse_from(&["html-css-fetch", "https://example.com", "-v"]).unwrap();
        let default = FetchCommand::try_parse_from(&["html-css-fetch", "https://example.com"]).unwrap();

        assert_eq!(quiet.default_log_level(), "error");
        assert_eq!(verbose.default_log_level(), "debug");
        assert_eq!(default.default_log_level(), "warn");
    }

    #[test]
    fn test_parse_missing_url() {
        let result = FetchCommand::try_parse_from(&["html-css-fetch"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_parse_invalid_timeout() {
        let result = FetchCommand::try_parse_from(&["html-css-fetch", "https://example.com", "--timeout", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = FetchCommand::try_parse_from(&["html-css-fetch", "https://example.com", "-q", "-v"]);
        assert!(result.is_err());
    }
}
