//! The automation surface every post-login stage acts on

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::RobotResult;

/// A single live browser tab.
///
/// Selectors use Playwright syntax (`#id`, `text=...`, `button:text('...')`).
/// Each call blocks the pipeline until the page responds or the surface's own
/// timeout fires.
#[async_trait]
pub trait PageSession: Send {
    /// Set the delay applied between browser actions. Must precede the first action.
    async fn configure(&mut self, slow_mo: Duration) -> RobotResult<()>;

    async fn goto(&mut self, url: &str) -> RobotResult<()>;

    async fn fill(&mut self, selector: &str, value: &str) -> RobotResult<()>;

    async fn click(&mut self, selector: &str) -> RobotResult<()>;

    async fn select_option(&mut self, selector: &str, value: &str) -> RobotResult<()>;

    /// Capture the visible page to a PNG file.
    async fn screenshot(&mut self, path: &Path) -> RobotResult<()>;

    /// Serialized markup inside the first element matching `selector`.
    async fn inner_html(&mut self, selector: &str) -> RobotResult<String>;

    /// Release the browser. Calling it on a session that never launched is a no-op.
    async fn close(&mut self) -> RobotResult<()>;
}
