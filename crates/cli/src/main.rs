//! SpareBin robot - Main Entry Point
//!
//! Runs the sales-entry robot once: login, download, form replay,
//! screenshot, PDF export, logout.

use std::path::PathBuf;

use clap::Parser;
use tracing::error;

mod logging;

use sparebin_robot::fetch::HttpDownloader;
use sparebin_robot::playwright::{Browser, PlaywrightSession};
use sparebin_robot::render::PlaywrightPdfRenderer;
use sparebin_robot::sheet::XlsxReader;
use sparebin_robot::{load_credentials, Robot, RobotConfig};

/// RobotSpareBin Industries sales robot
#[derive(Parser, Debug)]
#[command(name = "sparebin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Two-line credential file (USER=..., PASS=...)
    #[arg(long, default_value = "credentials.txt")]
    credentials: PathBuf,

    /// Directory for the workbook, screenshot and PDF
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Log file, appended to on every run
    #[arg(long, default_value = "bot_log.log")]
    log_file: PathBuf,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium")]
    browser: String,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn robot_config(&self) -> anyhow::Result<RobotConfig> {
        let browser = Browser::from_name(&self.browser)
            .ok_or_else(|| anyhow::anyhow!("unknown browser '{}'", self.browser))?;

        let mut config = RobotConfig::default();
        config.files.output_dir = self.output_dir.clone();
        config.browser.browser = browser;
        config.browser.headless = !self.headed;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_file, cli.verbose)?;

    let config = cli.robot_config()?;

    let credentials = load_credentials(&cli.credentials).map_err(|e| {
        error!("Failed to load credentials from {}: {}", cli.credentials.display(), e);
        e
    })?;

    let mut robot = Robot::new(
        config.clone(),
        Box::new(PlaywrightSession::new(config.browser.clone())),
        Box::new(HttpDownloader::new()?),
        Box::new(XlsxReader),
        Box::new(PlaywrightPdfRenderer::new(config.browser.clone())),
    );

    // Failures are already in the log; the run itself always exits cleanly.
    robot.run(&credentials).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fixed_layout() {
        let cli = Cli::parse_from(["sparebin"]);
        assert_eq!(cli.credentials, PathBuf::from("credentials.txt"));
        assert_eq!(cli.log_file, PathBuf::from("bot_log.log"));

        let config = cli.robot_config().unwrap();
        assert_eq!(config.files.workbook_path(), PathBuf::from("output/SalesData.xlsx"));
        assert!(config.browser.headless);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from(["sparebin", "--output-dir", "/tmp/run", "--browser", "firefox", "--headed"]);
        let config = cli.robot_config().unwrap();
        assert_eq!(config.files.output_dir, PathBuf::from("/tmp/run"));
        assert_eq!(config.browser.browser, Browser::Firefox);
        assert!(!config.browser.headless);
    }

    #[test]
    fn test_unknown_browser_rejected() {
        let cli = Cli::parse_from(["sparebin", "--browser", "lynx"]);
        assert!(cli.robot_config().is_err());
    }
}
