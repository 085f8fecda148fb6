use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use std::io::IsTerminal;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use html_css_fetch::cli::{FetchCommand, USAGE};
use html_css_fetch::PageCapture;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = match FetchCommand::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.default_log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    debug!(?args, "CLI arguments parsed");

    let capture = PageCapture::new(args.capture_config())?;
    let report = capture.run(&args.url).await?;

    debug!(
        saved = report.saved.len(),
        failed = report.failed.len(),
        "capture finished"
    );
    Ok(())
}
