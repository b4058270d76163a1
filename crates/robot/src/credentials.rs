//! Operator credential file (`USER=...` / `PASS=...`)

use std::fmt;
use std::path::Path;

use crate::error::{RobotError, RobotResult};

/// Intranet login credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both fields must be non-empty before the browser is touched.
    pub fn validate(&self) -> RobotResult<()> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(RobotError::Validation(
                "Credentials not found. Ensure the credential file has USER and PASS values.".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse the two-line `KEY=VALUE` format.
    pub fn parse(content: &str) -> RobotResult<Self> {
        let mut lines = content.lines();
        let username = value_of(lines.next(), 1)?;
        let password = value_of(lines.next(), 2)?;
        Ok(Self { username, password })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn value_of(line: Option<&str>, number: usize) -> RobotResult<String> {
    let line = line.ok_or_else(|| RobotError::CredentialFormat {
        line: number,
        reason: "expected two lines (USER=..., PASS=...)".to_string(),
    })?;

    let (_, value) = line.trim().split_once('=').ok_or_else(|| RobotError::CredentialFormat {
        line: number,
        reason: "missing '=' separator".to_string(),
    })?;

    Ok(value.trim().to_string())
}

/// Load credentials from a file on disk
pub fn load_credentials(path: &Path) -> RobotResult<Credentials> {
    let content = std::fs::read_to_string(path)?;
    Credentials::parse(&content)
}
