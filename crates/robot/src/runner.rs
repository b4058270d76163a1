//! Pipeline runner: login, download, form replay, screenshot, PDF export,
//! and a logout attempt that always runs.
//!
//! ```text
//! Start -> Initialized -> Fetched -> FormFilled -> Collected -> Exported -> Closed
//!   \___________\____________\___________\___________\______________________/
//!                         (first failure jumps to Closed)
//! ```

use std::fmt;

use tracing::{error, info, warn};

use crate::config::RobotConfig;
use crate::credentials::Credentials;
use crate::error::{ErrorKind, RobotResult};
use crate::fetch::Downloader;
use crate::form;
use crate::render::DocumentRenderer;
use crate::session::PageSession;
use crate::sheet::SpreadsheetReader;

/// Position in the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunState {
    Start,
    Initialized,
    Fetched,
    FormFilled,
    Collected,
    Exported,
    Closed,
}

impl RunState {
    /// The forward successor, or `None` from `Exported` and `Closed`
    pub fn next(self) -> Option<RunState> {
        match self {
            RunState::Start => Some(RunState::Initialized),
            RunState::Initialized => Some(RunState::Fetched),
            RunState::Fetched => Some(RunState::FormFilled),
            RunState::FormFilled => Some(RunState::Collected),
            RunState::Collected => Some(RunState::Exported),
            RunState::Exported | RunState::Closed => None,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Start => "start",
            RunState::Initialized => "initialized",
            RunState::Fetched => "fetched",
            RunState::FormFilled => "form_filled",
            RunState::Collected => "collected",
            RunState::Exported => "exported",
            RunState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// The error that stopped a run
#[derive(Debug, Clone)]
pub struct StageFailure {
    /// Last state reached before the failing stage
    pub state: RunState,
    pub kind: ErrorKind,
    pub message: String,
}

/// Outcome of one run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Furthest forward state reached before closing
    pub last_state: RunState,
    pub rows_submitted: usize,
    pub failure: Option<StageFailure>,

    /// Whether the logout click succeeded
    pub logged_out: bool,
}

impl RunReport {
    pub fn success(&self) -> bool {
        self.failure.is_none()
    }
}

/// The sales robot and the collaborators it drives
pub struct Robot {
    config: RobotConfig,
    session: Box<dyn PageSession>,
    downloader: Box<dyn Downloader>,
    reader: Box<dyn SpreadsheetReader>,
    renderer: Box<dyn DocumentRenderer>,
}

impl Robot {
    pub fn new(
        config: RobotConfig,
        session: Box<dyn PageSession>,
        downloader: Box<dyn Downloader>,
        reader: Box<dyn SpreadsheetReader>,
        renderer: Box<dyn DocumentRenderer>,
    ) -> Self {
        Self {
            config,
            session,
            downloader,
            reader,
            renderer,
        }
    }

    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    /// Run every stage in order, then log out.
    ///
    /// Never fails: the first stage error is logged and recorded in the
    /// report, and teardown runs exactly once either way.
    pub async fn run(&mut self, credentials: &Credentials) -> RunReport {
        let mut state = RunState::Start;
        let mut rows_submitted = 0;

        let outcome = self.advance(credentials, &mut state, &mut rows_submitted).await;

        let failure = outcome.err().map(|e| {
            error!("Unexpected error occurred: {}", e);
            StageFailure {
                state,
                kind: e.kind(),
                message: e.to_string(),
            }
        });

        let logged_out = log_out(self.session.as_mut(), &self.config).await;

        RunReport {
            last_state: state,
            rows_submitted,
            failure,
            logged_out,
        }
    }

    async fn advance(
        &mut self,
        credentials: &Credentials,
        state: &mut RunState,
        rows_submitted: &mut usize,
    ) -> RobotResult<()> {
        while let Some(next) = state.next() {
            match next {
                RunState::Initialized => {
                    initialize(self.session.as_mut(), &self.config, credentials).await?
                }
                RunState::Fetched => download_excel_file(self.downloader.as_mut(), &self.config).await?,
                RunState::FormFilled => {
                    form::fill_form(
                        self.session.as_mut(),
                        self.reader.as_ref(),
                        &self.config,
                        rows_submitted,
                    )
                    .await?
                }
                RunState::Collected => collect_results(self.session.as_mut(), &self.config).await?,
                RunState::Exported => {
                    export_as_pdf(self.session.as_mut(), self.renderer.as_mut(), &self.config).await?
                }
                RunState::Start | RunState::Closed => break,
            }
            *state = next;
        }
        Ok(())
    }
}

/// Validate credentials, configure the browser, open the intranet and log in.
pub async fn initialize(
    session: &mut dyn PageSession,
    config: &RobotConfig,
    credentials: &Credentials,
) -> RobotResult<()> {
    info!("Initializing resources and browser.");
    credentials.validate()?;

    session.configure(config.site.slow_mo).await?;

    info!("Opening intranet website.");
    session.goto(&config.site.intranet_url).await?;

    log_in(session, config, credentials).await
}

async fn log_in(
    session: &mut dyn PageSession,
    config: &RobotConfig,
    credentials: &Credentials,
) -> RobotResult<()> {
    info!("Logging in to the website.");
    let s = &config.selectors;
    let result: RobotResult<()> = async {
        session.fill(&s.username, &credentials.username).await?;
        session.fill(&s.password, &credentials.password).await?;
        session.click(&s.login_button).await
    }
    .await;

    if let Err(e) = &result {
        error!("Error during login: {}", e);
    }
    result
}

/// Download the sales workbook, replacing any previous copy.
pub async fn download_excel_file(downloader: &mut dyn Downloader, config: &RobotConfig) -> RobotResult<()> {
    info!("Downloading Excel file.");
    let destination = config.files.workbook_path();
    match downloader.download(&config.site.sales_data_url, &destination, true).await {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("Error while downloading excel file: {}", e);
            Err(e)
        }
    }
}

/// Screenshot the page after all rows are submitted.
pub async fn collect_results(session: &mut dyn PageSession, config: &RobotConfig) -> RobotResult<()> {
    info!("Collecting results: Taking screenshot.");
    let result: RobotResult<()> = async {
        std::fs::create_dir_all(&config.files.output_dir)?;
        session.screenshot(&config.files.screenshot_path()).await
    }
    .await;

    if let Err(e) = &result {
        error!("Error during result collection: {}", e);
    }
    result
}

/// Export the results panel markup as a PDF.
pub async fn export_as_pdf(
    session: &mut dyn PageSession,
    renderer: &mut dyn DocumentRenderer,
    config: &RobotConfig,
) -> RobotResult<()> {
    info!("Exporting results to PDF.");
    let result: RobotResult<()> = async {
        let markup = session.inner_html(&config.selectors.sales_results).await?;
        renderer.render_html(&markup, &config.files.document_path()).await
    }
    .await;

    if let Err(e) = &result {
        error!("Error exporting PDF: {}", e);
    }
    result
}

/// Click "Log out" and release the browser. Errors are logged, never returned.
///
/// Returns whether the logout click succeeded.
pub async fn log_out(session: &mut dyn PageSession, config: &RobotConfig) -> bool {
    info!("Logging out and closing browser.");

    let clicked = match session.click(&config.selectors.logout).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Error during logging out: {}", e);
            false
        }
    };

    if let Err(e) = session.close().await {
        warn!("Error during logging out: {}", e);
    }

    clicked
}
