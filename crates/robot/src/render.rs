//! HTML-to-document export

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{RobotError, RobotResult};
use crate::playwright::{self, PlaywrightConfig};

/// Render a markup fragment into a document file
#[async_trait]
pub trait DocumentRenderer: Send {
    async fn render_html(&mut self, markup: &str, destination: &Path) -> RobotResult<()>;
}

/// Prints HTML to PDF through a throwaway headless Chromium page
pub struct PlaywrightPdfRenderer {
    config: PlaywrightConfig,
}

impl PlaywrightPdfRenderer {
    pub fn new(config: PlaywrightConfig) -> Self {
        Self { config }
    }
}

/// Wrap a bare fragment so the printed page has a charset and a body.
pub fn html_document(fragment: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"></head>\n<body>\n{}\n</body>\n</html>\n",
        fragment
    )
}

#[async_trait]
impl DocumentRenderer for PlaywrightPdfRenderer {
    async fn render_html(&mut self, markup: &str, destination: &Path) -> RobotResult<()> {
        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        debug!("Rendering {} bytes of markup to {}", markup.len(), destination.display());
        playwright::render_pdf(&self.config, &html_document(markup), destination)
            .await
            .map_err(|e| RobotError::Render(format!("{}: {}", destination.display(), e)))
    }
}
