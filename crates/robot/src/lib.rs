//! RobotSpareBin sales-entry robot
//!
//! One linear run per invocation:
//! - logs into the intranet through a Playwright-driven browser
//! - downloads the sales workbook over HTTP
//! - replays every row of its `data` sheet into the sales form
//! - screenshots the results and exports the results panel as a PDF
//! - always attempts to log out, whatever happened before
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Robot (runner)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  initialize(session, credentials)                           │
//! │  download_excel_file(downloader)      -> output/*.xlsx      │
//! │  fill_form(session, reader)           -> N submissions      │
//! │  collect_results(session)             -> output/*.png       │
//! │  export_as_pdf(session, renderer)     -> output/*.pdf       │
//! │  log_out(session)                     (always, never fails) │
//! ├─────────────────────────────────────────────────────────────┤
//! │  PageSession        <- PlaywrightSession (node driver)      │
//! │  Downloader         <- HttpDownloader (reqwest)             │
//! │  SpreadsheetReader  <- XlsxReader (calamine)                │
//! │  DocumentRenderer   <- PlaywrightPdfRenderer                │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod fetch;
pub mod form;
pub mod playwright;
pub mod render;
pub mod runner;
pub mod session;
pub mod sheet;

pub use config::RobotConfig;
pub use credentials::{load_credentials, Credentials};
pub use error::{ErrorKind, RobotError, RobotResult};
pub use runner::{Robot, RunReport, RunState};
pub use session::PageSession;
