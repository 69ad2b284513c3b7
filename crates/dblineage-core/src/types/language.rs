//! Source language detection from file paths.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Languages the engine distinguishes. Anything else is `Unknown` and is
/// still traced with the generic heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Java,
    CSharp,
    Go,
    Rust,
    Ruby,
    Sql,
    Prisma,
    GraphQl,
    Proto,
    Unknown,
}

impl Language {
    pub const ALL: [Language; 13] = [
        Self::TypeScript,
        Self::JavaScript,
        Self::Python,
        Self::Java,
        Self::CSharp,
        Self::Go,
        Self::Rust,
        Self::Ruby,
        Self::Sql,
        Self::Prisma,
        Self::GraphQl,
        Self::Proto,
        Self::Unknown,
    ];

    /// Detect language from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "ts" | "tsx" | "mts" | "cts" => Self::TypeScript,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "py" | "pyi" => Self::Python,
            "java" => Self::Java,
            "cs" => Self::CSharp,
            "go" => Self::Go,
            "rs" => Self::Rust,
            "rb" | "rake" => Self::Ruby,
            "sql" => Self::Sql,
            "prisma" => Self::Prisma,
            "graphql" | "gql" => Self::GraphQl,
            "proto" => Self::Proto,
            _ => Self::Unknown,
        }
    }

    /// Detect language from a path, using the text after the last dot.
    pub fn from_path(path: &str) -> Self {
        let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        match file_name.rsplit_once('.') {
            Some((_, ext)) => Self::from_extension(ext),
            None => Self::Unknown,
        }
    }

    /// Stable lowercase name, as persisted on source file rows.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::Java => "java",
            Self::CSharp => "csharp",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::Ruby => "ruby",
            Self::Sql => "sql",
            Self::Prisma => "prisma",
            Self::GraphQl => "graphql",
            Self::Proto => "proto",
            Self::Unknown => "unknown",
        }
    }

    /// Whether rules written for `other` apply to source in `self`.
    /// JavaScript and TypeScript share ORM ecosystems.
    pub fn is_compatible_with(&self, other: Language) -> bool {
        *self == other
            || matches!(
                (self, other),
                (Self::JavaScript, Self::TypeScript) | (Self::TypeScript, Self::JavaScript)
            )
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.name() == lowered)
            .ok_or_else(|| format!("unknown language: {s}"))
    }
}
