//! Source files and column usage records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Language;

/// How a line uses a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageType {
    Read,
    Write,
    Update,
    Delete,
    Join,
    Filter,
    Projection,
}

impl UsageType {
    /// Classification order for the keyword heuristics. The first match wins.
    pub const PRECEDENCE: [UsageType; 6] = [
        Self::Write,
        Self::Update,
        Self::Delete,
        Self::Join,
        Self::Filter,
        Self::Projection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Join => "join",
            Self::Filter => "filter",
            Self::Projection => "projection",
        }
    }
}

impl fmt::Display for UsageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UsageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "join" => Ok(Self::Join),
            "filter" => Ok(Self::Filter),
            "projection" => Ok(Self::Projection),
            other => Err(format!("unknown usage type: {other}")),
        }
    }
}

/// A source file handed over by ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSourceFile {
    pub path: String,
    pub language: Language,
    pub content: String,
}

impl NewSourceFile {
    /// Build a file record, detecting the language from the path.
    pub fn detect(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        let language = Language::from_path(&path);
        Self {
            path,
            language,
            content: content.into(),
        }
    }
}

/// A persisted source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub id: i64,
    pub project_id: String,
    pub path: String,
    pub language: Language,
    pub content: String,
    /// Set once usage extraction has run over the file.
    pub parsed: bool,
}

/// A usage found by the tracer, before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewColumnUsage {
    pub column_id: i64,
    pub source_file_id: i64,
    /// 1-based.
    pub line_number: u32,
    pub usage_type: UsageType,
    pub code_snippet: String,
    pub context: String,
}
