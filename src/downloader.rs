use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, ClientBuilder};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::AssetError;
use crate::file_manager::FileManager;
use crate::html_parser::{set_attr, HtmlParser, PageDocument, SourceRewrite, StylesheetLink};
use crate::naming::asset_file_name;

pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; URL-to-HTML-CSS/1.0)";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub output_dir: PathBuf,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// A stylesheet that was fetched, written and linked from the page.
#[derive(Debug, Clone)]
pub struct SavedAsset {
    pub url: Url,
    pub file_name: String,
    pub path: PathBuf,
    pub size: usize,
}

#[derive(Debug)]
pub struct FailedAsset {
    pub href: String,
    /// `None` when the href could not be resolved at all.
    pub url: Option<Url>,
    pub error: AssetError,
}

pub type AssetOutcome = Result<SavedAsset, AssetError>;

#[derive(Debug)]
pub struct CaptureReport {
    pub page_path: PathBuf,
    pub assets_dir: PathBuf,
    pub saved: Vec<SavedAsset>,
    pub failed: Vec<FailedAsset>,
    pub sources: SourceRewrite,
}

/// One HTTP client per run, carrying the user agent and per-request timeout.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = ClientBuilder::new()
            .use_rustls_tls()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }

    /// Fetches the root page. Any failure here is fatal for the run.
    pub async fn fetch_page(&self, url: &Url) -> Result<String> {
        debug!(%url, "requesting page");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?
            .error_for_status()
            .with_context(|| format!("Failed to fetch {}", url))?;

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read page body from {}", url))?;

        debug!(%url, %final_url, bytes = body.len(), "page received");
        Ok(body)
    }

    pub async fn fetch_asset(&self, url: &Url) -> Result<Vec<u8>, AssetError> {
        debug!(%url, "requesting stylesheet");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(AssetError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Status { status });
        }

        let content = response.bytes().await.map_err(AssetError::Body)?;
        Ok(content.to_vec())
    }
}

/// Saves a page and its stylesheets, rewriting the page to use the local copies.
pub struct PageCapture {
    config: CaptureConfig,
    fetcher: Fetcher,
}

impl PageCapture {
    pub fn new(config: CaptureConfig) -> Result<Self> {
        let fetcher = Fetcher::new(&config.user_agent, config.timeout)?;
        Ok(Self { config, fetcher })
    }

    pub async fn run(&self, url: &str) -> Result<CaptureReport> {
        let target = Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;
        let html_content = self.fetcher.fetch_page(&target).await?;

        let file_manager = FileManager::new(&self.config.output_dir)?;
        // Relative references resolve against the requested URL, even after a redirect.
        let html_parser = HtmlParser::from_url(target);
        let document = PageDocument::parse(&html_content);

        let links = html_parser.stylesheet_links(&document);
        debug!(count = links.len(), "stylesheet links found");

        let progress_bar = ProgressBar::new(links.len() as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner} [{bar:30}] {pos}/{len} {msg}")
                .context("Invalid progress template")?,
        );

        let mut saved = Vec::new();
        let mut failed = Vec::new();
        // Stylesheets linked more than once are fetched once; `None` marks a failure.
        let mut seen: HashMap<Url, Option<String>> = HashMap::new();

        for link in &links {
            progress_bar.set_message(link.href.clone());

            let (url, outcome) = match html_parser.resolve_url(&link.href) {
                Ok(url) => match seen.get(&url).cloned() {
                    Some(Some(file_name)) => {
                        set_attr(&link.node, "href", &FileManager::asset_href(&file_name));
                        progress_bar.inc(1);
                        continue;
                    }
                    Some(None) => {
                        progress_bar.inc(1);
                        continue;
                    }
                    None => {
                        let outcome = self.localize_stylesheet(&file_manager, link, url.clone()).await;
                        seen.insert(url.clone(), outcome.as_ref().ok().map(|a| a.file_name.clone()));
                        (Some(url), outcome)
                    }
                },
                Err(source) => (
                    None,
                    Err(AssetError::InvalidUrl {
                        href: link.href.clone(),
                        source,
                    }),
                ),
            };

            match outcome {
                Ok(asset) => {
                    debug!(url = %asset.url, file = %asset.file_name, "stylesheet localized");
                    saved.push(asset);
                }
                Err(error) => {
                    let shown = url.as_ref().map_or(link.href.as_str(), |u| u.as_str());
                    progress_bar.suspend(|| {
                        warn!(url = %shown, error = %error, "could not download stylesheet")
                    });
                    failed.push(FailedAsset {
                        href: link.href.clone(),
                        url,
                        error,
                    });
                }
            }
            progress_bar.inc(1);
        }
        progress_bar.finish_and_clear();

        let sources = html_parser.absolutize_sources(&document);
        debug!(rewritten = sources.rewritten, skipped = sources.skipped.len(), "src attributes absolutized");

        let page_path = file_manager.save_page(&document.serialize()?)?;

        println!("Saved HTML -> {}", page_path.display().to_string().green());
        println!("Saved CSS  -> {}", file_manager.assets_dir().display().to_string().green());

        Ok(CaptureReport {
            page_path,
            assets_dir: file_manager.assets_dir().to_path_buf(),
            saved,
            failed,
            sources,
        })
    }

    /// Fetches one stylesheet and points its link at the local copy. The node
    /// is only rewritten once the file is on disk.
    async fn localize_stylesheet(
        &self,
        file_manager: &FileManager,
        link: &StylesheetLink,
        url: Url,
    ) -> AssetOutcome {
        let content = self.fetcher.fetch_asset(&url).await?;
        let file_name = asset_file_name(&url);
        let path = file_manager.save_asset(&file_name, &content)?;

        set_attr(&link.node, "href", &FileManager::asset_href(&file_name));

        Ok(SavedAsset {
            url,
            file_name,
            path,
            size: content.len(),
        })
    }
}
