//! Recording fakes for the robot's collaborators

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing_subscriber::fmt::MakeWriter;

use sparebin_robot::config::{FileConfig, RobotConfig};
use sparebin_robot::fetch::Downloader;
use sparebin_robot::render::DocumentRenderer;
use sparebin_robot::sheet::{SpreadsheetReader, Table};
use sparebin_robot::{PageSession, Robot, RobotError, RobotResult};

pub const SALES_HEADERS: [&str; 4] = ["First Name", "Last Name", "Sales Target", "Sales"];

/// Every collaborator call, in the order it happened
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: String) -> usize {
        let mut entries = self.0.lock().unwrap();
        entries.push(entry.clone());
        entries.iter().filter(|e| **e == entry).count()
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| *e == entry).count()
    }

    pub fn any_starting_with(&self, prefix: &str) -> bool {
        self.entries().iter().any(|e| e.starts_with(prefix))
    }

    /// Values typed into the first-name field, in order
    pub fn first_names(&self) -> Vec<String> {
        self.entries()
            .iter()
            .filter_map(|e| e.strip_prefix("fill:#firstname=").map(String::from))
            .collect()
    }
}

/// Fails the `n`th occurrence of an exact journal entry
#[derive(Clone)]
pub struct Failure {
    pub entry: String,
    pub occurrence: usize,
}

impl Failure {
    pub fn on(entry: &str) -> Self {
        Self::on_nth(entry, 1)
    }

    pub fn on_nth(entry: &str, occurrence: usize) -> Self {
        Self {
            entry: entry.to_string(),
            occurrence,
        }
    }
}

pub struct FakeSession {
    pub journal: Journal,
    pub failure: Option<Failure>,
    pub results_markup: String,
}

impl FakeSession {
    fn act(&self, entry: String) -> RobotResult<()> {
        let seen = self.journal.record(entry.clone());
        match &self.failure {
            Some(f) if f.entry == entry && f.occurrence == seen => Err(RobotError::Interaction {
                action: entry,
                reason: "Timeout 30000ms exceeded.".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl PageSession for FakeSession {
    async fn configure(&mut self, slow_mo: Duration) -> RobotResult<()> {
        self.act(format!("configure:{}ms", slow_mo.as_millis()))
    }

    async fn goto(&mut self, url: &str) -> RobotResult<()> {
        self.act(format!("goto:{}", url))
    }

    async fn fill(&mut self, selector: &str, value: &str) -> RobotResult<()> {
        self.act(format!("fill:{}={}", selector, value))
    }

    async fn click(&mut self, selector: &str) -> RobotResult<()> {
        self.act(format!("click:{}", selector))
    }

    async fn select_option(&mut self, selector: &str, value: &str) -> RobotResult<()> {
        self.act(format!("select:{}={}", selector, value))
    }

    async fn screenshot(&mut self, path: &Path) -> RobotResult<()> {
        self.act("screenshot".to_string())?;
        std::fs::write(path, b"\x89PNG fake")?;
        Ok(())
    }

    async fn inner_html(&mut self, selector: &str) -> RobotResult<String> {
        self.act(format!("inner_html:{}", selector))?;
        Ok(self.results_markup.clone())
    }

    async fn close(&mut self) -> RobotResult<()> {
        self.act("close".to_string())
    }
}

pub struct FakeDownloader {
    pub journal: Journal,
    pub fail: bool,
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn download(&mut self, url: &str, destination: &Path, overwrite: bool) -> RobotResult<PathBuf> {
        self.journal.record(format!("download:{} overwrite={}", url, overwrite));
        if self.fail {
            return Err(RobotError::HttpStatus {
                url: url.to_string(),
                status: 503,
            });
        }
        std::fs::create_dir_all(destination.parent().unwrap())?;
        std::fs::write(destination, b"PK fake workbook")?;
        Ok(destination.to_path_buf())
    }
}

pub struct FakeReader {
    pub journal: Journal,
    pub rows: Vec<Vec<String>>,
    pub fail: bool,
}

impl SpreadsheetReader for FakeReader {
    fn read_table(&self, path: &Path, sheet: &str) -> RobotResult<Table> {
        self.journal.record(format!("read_table:{}", sheet));
        if self.fail {
            return Err(RobotError::Spreadsheet {
                path: path.to_path_buf(),
                reason: "Invalid Zip archive".to_string(),
            });
        }
        let mut rows: Vec<Vec<String>> = vec![SALES_HEADERS.iter().map(|h| h.to_string()).collect()];
        rows.extend(self.rows.iter().cloned());
        Ok(Table::from_rows(path, rows))
    }
}

pub struct FakeRenderer {
    pub journal: Journal,
    pub fail: bool,
}

#[async_trait]
impl DocumentRenderer for FakeRenderer {
    async fn render_html(&mut self, markup: &str, destination: &Path) -> RobotResult<()> {
        self.journal.record("render".to_string());
        if self.fail {
            return Err(RobotError::Render("page.pdf: Protocol error (Page.printToPDF)".to_string()));
        }
        std::fs::write(destination, format!("%PDF-fake\n{}", markup))?;
        Ok(())
    }
}

/// Knobs for one scripted run
#[derive(Default)]
pub struct Scenario {
    pub rows: Vec<[&'static str; 4]>,
    pub session_failure: Option<Failure>,
    pub download_fails: bool,
    pub read_fails: bool,
    pub render_fails: bool,
}

pub struct Harness {
    pub robot: Robot,
    pub journal: Journal,
    pub output_dir: PathBuf,
    _dir: tempfile::TempDir,
}

impl Harness {
    pub fn new(scenario: Scenario) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("output");
        let journal = Journal::default();

        let config = RobotConfig {
            files: FileConfig {
                output_dir: output_dir.clone(),
                ..Default::default()
            },
            ..Default::default()
        };

        let robot = Robot::new(
            config,
            Box::new(FakeSession {
                journal: journal.clone(),
                failure: scenario.session_failure,
                results_markup: "<table><tr><td>Jon Smith</td><td>250</td></tr></table>".to_string(),
            }),
            Box::new(FakeDownloader {
                journal: journal.clone(),
                fail: scenario.download_fails,
            }),
            Box::new(FakeReader {
                journal: journal.clone(),
                rows: scenario
                    .rows
                    .iter()
                    .map(|r| r.iter().map(|c| c.to_string()).collect())
                    .collect(),
                fail: scenario.read_fails,
            }),
            Box::new(FakeRenderer {
                journal: journal.clone(),
                fail: scenario.render_fails,
            }),
        );

        Self {
            robot,
            journal,
            output_dir,
            _dir: dir,
        }
    }
}

/// In-memory log sink for a scoped subscriber
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(String::from)
            .collect()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install a capturing subscriber for the current thread.
pub fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}
