//! `timestamp`: current wall-clock time in a chosen format.

use crate::schema::Schema;
use crate::tool::{CallContext, ToolError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Output formats for `timestamp`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimestampFormat {
    #[default]
    Rfc3339,
    Unix,
    UnixMilli,
}

impl TimestampFormat {
    /// Lowercase name, as echoed back to callers.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimestampFormat::Rfc3339 => "rfc3339",
            TimestampFormat::Unix => "unix",
            TimestampFormat::UnixMilli => "unixmilli",
        }
    }

    /// Render `at` in this format.
    pub fn format(&self, at: DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Rfc3339 => at.to_rfc3339_opts(SecondsFormat::Secs, true),
            TimestampFormat::Unix => at.timestamp().to_string(),
            TimestampFormat::UnixMilli => at.timestamp_millis().to_string(),
        }
    }
}

impl FromStr for TimestampFormat {
    type Err = ToolError;

    /// Case-insensitive; the empty string selects the default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" => Ok(TimestampFormat::default()),
            "rfc3339" => Ok(TimestampFormat::Rfc3339),
            "unix" => Ok(TimestampFormat::Unix),
            "unixmilli" => Ok(TimestampFormat::UnixMilli),
            _ => Err(ToolError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Arguments of `timestamp`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Schema)]
pub struct TimestampInput {
    #[schema(
        description = "Time format (RFC3339, Unix, or UnixMilli)",
        one_of = "RFC3339,Unix,UnixMilli",
        error = "unsupported format"
    )]
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Schema)]
pub struct TimestampOutput {
    /// The current time, rendered.
    pub timestamp: String,
    /// Format actually used, lowercase.
    pub format: String,
}

/// Current UTC time in the requested format, RFC3339 by default.
pub fn timestamp(_ctx: &CallContext, input: TimestampInput) -> Result<TimestampOutput, ToolError> {
    timestamp_at(Utc::now(), input)
}

/// `timestamp` with an explicit clock reading.
pub fn timestamp_at(
    now: DateTime<Utc>,
    input: TimestampInput,
) -> Result<TimestampOutput, ToolError> {
    let format: TimestampFormat = input.format.as_deref().unwrap_or_default().parse()?;
    Ok(TimestampOutput {
        timestamp: format.format(now),
        format: format.as_str().to_string(),
    })
}
