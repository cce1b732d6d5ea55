//! JSON run reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required field was not set.
    #[error("Missing report field: {0}")]
    MissingField(&'static str),
}

/// Record of one Delft run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Company or ticker the run was about.
    pub subject: String,

    /// Command that produced the report (`sensitivity`, `market`, ...).
    pub command: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Files written during the run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,

    /// Report contents.
    pub contents: serde_json::Value,
}

impl Report {
    /// Create a new report stamped with the current time.
    pub fn new(subject: String, command: String, contents: serde_json::Value) -> Self {
        Self {
            subject,
            command,
            timestamp: Utc::now(),
            outputs: Vec::new(),
            contents,
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON.
    pub fn write_to_file(&self, path: &Path) -> Result<(), ReportError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    subject: Option<String>,
    command: Option<String>,
    outputs: Vec<String>,
    contents: Option<serde_json::Value>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the subject.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the command name.
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Record an output file.
    pub fn output(mut self, path: impl AsRef<Path>) -> Self {
        self.outputs.push(path.as_ref().display().to_string());
        self
    }

    /// Set the report contents.
    pub fn contents(mut self, contents: serde_json::Value) -> Self {
        self.contents = Some(contents);
        self
    }

    /// Build the report.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::MissingField`] if no subject was set.
    pub fn build(self) -> Result<Report, ReportError> {
        let subject = self.subject.ok_or(ReportError::MissingField("subject"))?;
        let mut report = Report::new(
            subject,
            self.command.unwrap_or_default(),
            self.contents.unwrap_or(serde_json::Value::Null),
        );
        report.outputs = self.outputs;
        Ok(report)
    }
}
