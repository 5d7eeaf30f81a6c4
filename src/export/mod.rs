//! Serializing transcripts for other tools and for people.
//!
//! - [`json`] - the persisted wire format
//! - [`markdown`] - a readable document
//! - [`filename`] - output file names from templates

pub mod filename;
pub mod json;
pub mod markdown;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::transcript::TranscriptRecord;

/// Errors that can occur while exporting.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize transcript: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Filename(#[from] filename::GenerateError),
}

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Markdown,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Markdown => "markdown",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(format!("unknown export format '{}' (expected json or markdown)", other)),
        }
    }
}

/// Render a transcript in the given format.
pub fn render(record: &TranscriptRecord, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => Ok(json::to_json(record)?),
        ExportFormat::Markdown => Ok(markdown::to_markdown(record)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing_and_extensions() {
        assert_eq!("MD".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("json".parse::<ExportFormat>().unwrap().extension(), "json");
        assert_eq!(ExportFormat::Markdown.extension(), "md");
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn error_messages_name_the_path() {
        let err = ExportError::Read {
            path: PathBuf::from("/tmp/missing.html"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "Failed to read /tmp/missing.html: gone");
    }
}
