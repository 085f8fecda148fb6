pub mod cli;
pub mod downloader;
pub mod error;
pub mod file_manager;
pub mod html_parser;
pub mod naming;

// Re-export main types for convenience
pub use cli::FetchCommand;
pub use downloader::{
    AssetOutcome, CaptureConfig, CaptureReport, FailedAsset, Fetcher, PageCapture, SavedAsset,
};
pub use error::AssetError;
pub use file_manager::FileManager;
pub use html_parser::{is_stylesheet_rel, HtmlParser, PageDocument, SourceRewrite, StylesheetLink};
pub use naming::{asset_file_name, fingerprint};
