//! Playwright browser automation
//!
//! A generated Node.js driver script hosts one Playwright page and answers
//! newline-delimited JSON requests on stdin/stdout:
//!
//! ```text
//! -> {"id":3,"op":"fill","selector":"#firstname","value":"Jon"}
//! <- {"id":3,"ok":true,"value":null}
//! ```
//!
//! The driver announces a successful browser launch with a reply of id 0.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, warn};

use crate::error::{RobotError, RobotResult};
use crate::session::PageSession;

const DRIVER_SCRIPT: &str = r#"
const { chromium, firefox, webkit } = require(require.resolve('playwright', { paths: [process.cwd()] }));
const readline = require('readline');

const options = JSON.parse(process.argv[2]);
const reply = (msg) => process.stdout.write(JSON.stringify(msg) + '\n');

(async () => {
  const engines = { chromium, firefox, webkit };
  const browser = await engines[options.browser].launch({
    headless: options.headless,
    slowMo: options.slowMo,
  });
  const context = await browser.newContext({
    viewport: { width: options.viewport.width, height: options.viewport.height }
  });
  const page = await context.newPage();
  reply({ id: 0, ok: true, value: 'ready' });

  const rl = readline.createInterface({ input: process.stdin });
  for await (const line of rl) {
    if (!line.trim()) continue;
    const cmd = JSON.parse(line);
    try {
      let value = null;
      switch (cmd.op) {
        case 'goto':
          await page.goto(cmd.url);
          break;
        case 'fill':
          await page.fill(cmd.selector, cmd.value);
          break;
        case 'click':
          await page.click(cmd.selector);
          break;
        case 'select_option':
          await page.selectOption(cmd.selector, cmd.value);
          break;
        case 'screenshot':
          await page.screenshot({ path: cmd.path, fullPage: cmd.full_page });
          break;
        case 'inner_html':
          value = await page.locator(cmd.selector).innerHTML();
          break;
        case 'render_pdf':
          await page.setContent(cmd.html, { waitUntil: 'load' });
          await page.pdf({ path: cmd.path, printBackground: true });
          break;
        case 'close':
          await browser.close();
          reply({ id: cmd.id, ok: true, value: null });
          process.exit(0);
        default:
          throw new Error('unknown op: ' + cmd.op);
      }
      reply({ id: cmd.id, ok: true, value });
    } catch (error) {
      reply({ id: cmd.id, ok: false, error: error.message });
    }
  }
  await browser.close();
})().catch((error) => {
  reply({ id: 0, ok: false, error: error.message });
  process.exit(1);
});
"#;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Some(Browser::Chromium),
            "firefox" => Some(Browser::Firefox),
            "webkit" => Some(Browser::Webkit),
            _ => None,
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Node.js executable used to host the driver
    pub node_binary: PathBuf,

    /// Directory whose `node_modules` provides `playwright`
    pub working_dir: PathBuf,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            node_binary: PathBuf::from("node"),
            working_dir: PathBuf::from("."),
        }
    }
}

/// One request to the driver
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DriverCommand {
    Goto { url: String },
    Fill { selector: String, value: String },
    Click { selector: String },
    SelectOption { selector: String, value: String },
    Screenshot { path: PathBuf, full_page: bool },
    InnerHtml { selector: String },
    RenderPdf { html: String, path: PathBuf },
    Close,
}

impl DriverCommand {
    /// Short label used in logs and interaction errors
    pub fn describe(&self) -> String {
        match self {
            DriverCommand::Goto { url } => format!("goto:{}", url),
            DriverCommand::Fill { selector, .. } => format!("fill:{}", selector),
            DriverCommand::Click { selector } => format!("click:{}", selector),
            DriverCommand::SelectOption { selector, value } => {
                format!("select:{}={}", selector, value)
            }
            DriverCommand::Screenshot { path, .. } => format!("screenshot:{}", path.display()),
            DriverCommand::InnerHtml { selector } => format!("inner_html:{}", selector),
            DriverCommand::RenderPdf { path, .. } => format!("render_pdf:{}", path.display()),
            DriverCommand::Close => "close".to_string(),
        }
    }
}

#[derive(Serialize)]
struct DriverRequest<'a> {
    id: u64,
    #[serde(flatten)]
    command: &'a DriverCommand,
}

/// One reply from the driver
#[derive(Debug, Clone, Deserialize)]
pub struct DriverReply {
    pub id: u64,
    pub ok: bool,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LaunchOptions {
    browser: &'static str,
    headless: bool,
    slow_mo: u64,
    viewport: Viewport,
}

#[derive(Serialize)]
struct Viewport {
    width: u32,
    height: u32,
}

/// A running driver process and its pipes
struct DriverProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,

    /// Holds the generated script for the life of the process
    _script_dir: tempfile::TempDir,
}

impl DriverProcess {
    async fn spawn(config: &PlaywrightConfig, slow_mo: Duration) -> RobotResult<Self> {
        check_playwright_installed(&config.working_dir).await?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("driver.js");
        std::fs::write(&script_path, DRIVER_SCRIPT)?;

        let options = serde_json::to_string(&LaunchOptions {
            browser: config.browser.as_str(),
            headless: config.headless,
            slow_mo: slow_mo.as_millis() as u64,
            viewport: Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
            },
        })?;

        debug!("Spawning Playwright driver: {}", script_path.display());

        let mut child = Command::new(&config.node_binary)
            .arg(&script_path)
            .arg(&options)
            .current_dir(&config.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                RobotError::Driver(format!(
                    "failed to spawn {}: {}",
                    config.node_binary.display(),
                    e
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RobotError::Driver("driver stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RobotError::Driver("driver stdout not captured".to_string()))?;

        let mut driver = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 0,
            _script_dir: script_dir,
        };

        let ready = driver.read_reply().await?;
        if !ready.ok {
            return Err(RobotError::Driver(format!(
                "browser launch failed: {}",
                ready.error.unwrap_or_else(|| "unknown error".to_string())
            )));
        }

        info!("{} browser ready (slow_mo: {} ms)", config.browser.as_str(), slow_mo.as_millis());
        Ok(driver)
    }

    async fn send(&mut self, command: &DriverCommand) -> RobotResult<serde_json::Value> {
        self.next_id += 1;
        let id = self.next_id;

        let mut line = serde_json::to_string(&DriverRequest { id, command })?;
        line.push('\n');

        debug!("-> [{}] {}", id, command.describe());
        write_line(&mut self.stdin, &line).await?;

        let reply = self.read_reply().await?;
        if reply.id != id {
            return Err(RobotError::Driver(format!(
                "reply id {} does not match request id {}",
                reply.id, id
            )));
        }

        debug!("<- [{}] ok={}", id, reply.ok);
        if reply.ok {
            Ok(reply.value)
        } else {
            Err(RobotError::interaction(
                command.describe(),
                reply.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }

    async fn read_reply(&mut self) -> RobotResult<DriverReply> {
        loop {
            let line = self
                .stdout
                .next_line()
                .await
                .map_err(|e| RobotError::Driver(format!("reading driver output: {}", e)))?
                .ok_or_else(|| RobotError::Driver("driver exited unexpectedly".to_string()))?;

            // Playwright itself occasionally prints to stdout
            match serde_json::from_str::<DriverReply>(&line) {
                Ok(reply) => return Ok(reply),
                Err(_) => debug!("driver: {}", line),
            }
        }
    }

    async fn shutdown(mut self) -> RobotResult<()> {
        let result = self.send(&DriverCommand::Close).await;
        if let Err(e) = self.child.wait().await {
            warn!("Failed to reap Playwright driver: {}", e);
        }
        result.map(|_| ())
    }
}

/// Check if Playwright is installed
async fn check_playwright_installed(working_dir: &Path) -> RobotResult<()> {
    let status = Command::new("npx")
        .args(["playwright", "--version"])
        .current_dir(working_dir)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) if status.success() => Ok(()),
        _ => Err(RobotError::PlaywrightNotFound),
    }
}

/// Playwright resolves relative paths against the driver's working directory,
/// which need not match ours.
fn absolute(path: &Path) -> RobotResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Browser page backed by a lazily launched Playwright driver
pub struct PlaywrightSession {
    config: PlaywrightConfig,
    slow_mo: Duration,
    driver: Option<DriverProcess>,
}

impl PlaywrightSession {
    pub fn new(config: PlaywrightConfig) -> Self {
        Self {
            config,
            slow_mo: Duration::ZERO,
            driver: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_some()
    }

    async fn driver(&mut self) -> RobotResult<&mut DriverProcess> {
        let driver = match self.driver.take() {
            Some(driver) => driver,
            None => DriverProcess::spawn(&self.config, self.slow_mo).await?,
        };
        Ok(self.driver.insert(driver))
    }

    async fn run(&mut self, command: DriverCommand) -> RobotResult<serde_json::Value> {
        self.driver().await?.send(&command).await
    }
}

#[async_trait]
impl PageSession for PlaywrightSession {
    async fn configure(&mut self, slow_mo: Duration) -> RobotResult<()> {
        if self.driver.is_some() {
            warn!("Browser already running; slow_mo change applies to the next launch");
        }
        self.slow_mo = slow_mo;
        Ok(())
    }

    async fn goto(&mut self, url: &str) -> RobotResult<()> {
        self.run(DriverCommand::Goto { url: url.to_string() }).await?;
        Ok(())
    }

    async fn fill(&mut self, selector: &str, value: &str) -> RobotResult<()> {
        self.run(DriverCommand::Fill {
            selector: selector.to_string(),
            value: value.to_string(),
        })
        .await?;
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> RobotResult<()> {
        self.run(DriverCommand::Click { selector: selector.to_string() }).await?;
        Ok(())
    }

    async fn select_option(&mut self, selector: &str, value: &str) -> RobotResult<()> {
        self.run(DriverCommand::SelectOption {
            selector: selector.to_string(),
            value: value.to_string(),
        })
        .await?;
        Ok(())
    }

    async fn screenshot(&mut self, path: &Path) -> RobotResult<()> {
        let path = absolute(path)?;
        self.run(DriverCommand::Screenshot { path, full_page: false }).await?;
        Ok(())
    }

    async fn inner_html(&mut self, selector: &str) -> RobotResult<String> {
        let value = self.run(DriverCommand::InnerHtml { selector: selector.to_string() }).await?;
        match value {
            serde_json::Value::String(html) => Ok(html),
            other => Err(RobotError::Driver(format!(
                "inner_html:{} returned non-string value {}",
                selector, other
            ))),
        }
    }

    async fn close(&mut self) -> RobotResult<()> {
        match self.driver.take() {
            Some(driver) => driver.shutdown().await,
            None => Ok(()),
        }
    }
}

/// Render HTML to PDF in a fresh headless Chromium page.
///
/// `page.pdf` is Chromium-only and headless-only, so this never reuses the
/// operator-facing session.
pub(crate) async fn render_pdf(config: &PlaywrightConfig, html: &str, path: &Path) -> RobotResult<()> {
    let config = PlaywrightConfig {
        browser: Browser::Chromium,
        headless: true,
        ..config.clone()
    };

    let mut driver = DriverProcess::spawn(&config, Duration::ZERO).await?;
    let rendered = driver
        .send(&DriverCommand::RenderPdf {
            html: html.to_string(),
            path: absolute(path)?,
        })
        .await;
    let closed = driver.shutdown().await;

    rendered?;
    closed
}

/// Pipe failures mean the driver is gone and surface as driver errors.
async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> RobotResult<()> {
    let result: std::io::Result<()> = async {
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await
    }
    .await;
    result.map_err(|e| RobotError::Driver(format!("writing to driver: {}", e)))
}
