//! Shared output layer for human/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its
//! result accordingly: labeled text for humans, or one stable JSON object
//! per result for scripts and agents.

use serde::Serialize;
use std::io::{self, Write};

/// The two output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text.
    Human,
    /// Machine-readable JSON (one object per result).
    Json,
}

impl OutputMode {
    /// Returns `true` if JSON output was requested.
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// A user-facing error with the core's machine-readable code attached.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            hint: None,
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<&stepdeck_core::Error> for CliError {
    fn from(error: &stepdeck_core::Error) -> Self {
        let code = error.code();
        let mut cli_error = Self::new(code.code(), error.to_string());
        if let Some(hint) = code.hint() {
            cli_error = cli_error.with_hint(hint);
        }
        cli_error
    }
}

/// Render a serializable result: JSON object in JSON mode, the provided
/// human formatter otherwise.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn render<T, F>(mode: OutputMode, value: &T, human: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce(&T, &mut dyn Write) -> io::Result<()>,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Human => human(value, &mut out)?,
        OutputMode::Json => {
            serde_json::to_writer(&mut out, value)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Render a short success line (`{"ok": true, "message": ...}` in JSON).
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn render_success(mode: OutputMode, message: &str) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if mode.is_json() {
        serde_json::to_writer(&mut out, &serde_json::json!({ "ok": true, "message": message }))?;
        writeln!(out)?;
    } else {
        writeln!(out, "{message}")?;
    }
    Ok(())
}

/// Render an error to stderr in the active mode.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    if mode.is_json() {
        serde_json::to_writer(&mut out, &serde_json::json!({ "ok": false, "error": error }))?;
        writeln!(out)?;
    } else {
        writeln!(out, "error[{}]: {}", error.code, error.message)?;
        if let Some(hint) = &error.hint {
            writeln!(out, "hint: {hint}")?;
        }
    }
    Ok(())
}

/// Report a core error in the active mode, then surface it as anyhow.
///
/// # Errors
///
/// Always returns the rendered error.
pub fn fail(mode: OutputMode, error: stepdeck_core::Error) -> anyhow::Result<()> {
    render_error(mode, &CliError::from(&error))?;
    Err(error.into())
}

#[cfg(test)]
mod tests {
    use super::{CliError, OutputMode};
    use stepdeck_core::error::{EntityKind, Error};

    #[test]
    fn output_mode_json_detection() {
        assert!(OutputMode::Json.is_json());
        assert!(!OutputMode::Human.is_json());
    }

    #[test]
    fn cli_error_carries_core_code_and_hint() {
        let core = Error::NotFound {
            kind: EntityKind::Version,
            id: 12,
        };
        let cli: CliError = (&core).into();
        assert_eq!(cli.code, "E2004");
        assert_eq!(cli.message, "version 12 not found");
        assert!(cli.hint.is_some());
    }

    #[test]
    fn cli_error_serializes_without_empty_hint() {
        let cli = CliError::new("E1001", "empty payload");
        let json = serde_json::to_string(&cli).unwrap();
        assert!(!json.contains("hint"));
    }
}
