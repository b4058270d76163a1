//! Error types for the sales robot

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RobotError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Credential file line {line}: {reason}")]
    CredentialFormat { line: usize, reason: String },

    #[error("Spreadsheet error in {path}: {reason}")]
    Spreadsheet { path: PathBuf, reason: String },

    #[error("Download of {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Browser action failed: {action} - {reason}")]
    Interaction { action: String, reason: String },

    #[error("Playwright not found. Install with: npm install playwright && npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright driver error: {0}")]
    Driver(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Coarse failure taxonomy used by the pipeline report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Parse,
    Io,
    Transport,
    Interaction,
    Render,
}

impl RobotError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RobotError::Validation(_) => ErrorKind::Validation,
            RobotError::CredentialFormat { .. }
            | RobotError::Spreadsheet { .. }
            | RobotError::Json(_) => ErrorKind::Parse,
            RobotError::Io(_) => ErrorKind::Io,
            RobotError::Http(_) | RobotError::HttpStatus { .. } => ErrorKind::Transport,
            RobotError::Interaction { .. }
            | RobotError::PlaywrightNotFound
            | RobotError::Driver(_) => ErrorKind::Interaction,
            RobotError::Render(_) => ErrorKind::Render,
        }
    }

    pub(crate) fn interaction(action: impl Into<String>, reason: impl Into<String>) -> Self {
        RobotError::Interaction {
            action: action.into(),
            reason: reason.into(),
        }
    }
}

pub type RobotResult<T> = Result<T, RobotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_groups_variants() {
        assert_eq!(RobotError::Validation("x".into()).kind(), ErrorKind::Validation);
        assert_eq!(
            RobotError::HttpStatus { url: "u".into(), status: 404 }.kind(),
            ErrorKind::Transport
        );
        assert_eq!(RobotError::PlaywrightNotFound.kind(), ErrorKind::Interaction);
        assert_eq!(
            RobotError::CredentialFormat { line: 2, reason: "missing '='".into() }.kind(),
            ErrorKind::Parse
        );
    }

    #[test]
    fn test_interaction_message() {
        let err = RobotError::interaction("click:text=Log out", "timeout 30000ms exceeded");
        assert_eq!(
            err.to_string(),
            "Browser action failed: click:text=Log out - timeout 30000ms exceeded"
        );
    }
}
