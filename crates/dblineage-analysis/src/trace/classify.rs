//! Usage type classification.
//!
//! Detected ORM patterns are consulted first, in descriptor order. If none
//! match, keyword rules run over the line and then over the context window,
//! in [`UsageType::PRECEDENCE`] order. Anything unmatched is a read.

use std::sync::LazyLock;

use dblineage_core::types::UsageType;
use regex::Regex;

use crate::orm::OrmDescriptor;

struct Rule {
    usage: UsageType,
    /// Every pattern must match.
    patterns: Vec<Regex>,
}

impl Rule {
    fn matches(&self, text: &str) -> bool {
        self.patterns.iter().all(|p| p.is_match(text))
    }
}

fn compile_rules(defs: [(UsageType, &[&str]); 6]) -> Vec<Rule> {
    defs.into_iter()
        .map(|(usage, patterns)| Rule {
            usage,
            patterns: patterns
                .iter()
                .map(|p| Regex::new(p).expect("static regex"))
                .collect(),
        })
        .collect()
}

static LINE_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    let [write, update, delete, join, filter, projection] = UsageType::PRECEDENCE;
    compile_rules([
        (write, &[r"(?i)\b(INSERT\s+INTO|\.create|\.add|\.persist|\.save)\b"]),
        (update, &[r"(?i)\b(UPDATE\s+\w+\s+SET|\.update|\.merge|\.set\s*\()"]),
        (delete, &[r"(?i)\b(DELETE\s+FROM|\.delete|\.remove|\.destroy)"]),
        (
            join,
            &[r"(?i)\b(JOIN|INNER\s+JOIN|LEFT\s+JOIN|RIGHT\s+JOIN|CROSS\s+JOIN|\.join|\.include|\.preload)"],
        ),
        (
            filter,
            &[r"(?i)\b(WHERE|AND\s+\w+\s*=|OR\s+\w+\s*=|HAVING|\.filter|\.where|\.findBy)"],
        ),
        (
            projection,
            &[r"(?i)\b(SELECT\s+\w|\.select\s*\(|\.pluck\s*\(|RETURNING|\.findMany|\.findFirst|\.findOne|\.findAll)"],
        ),
    ])
});

static CONTEXT_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    let [write, update, delete, join, filter, projection] = UsageType::PRECEDENCE;
    compile_rules([
        (write, &[r"(?i)\b(INSERT|CREATE)\b"]),
        (update, &[r"(?i)\bUPDATE\b", r"(?i)\bSET\b"]),
        (delete, &[r"(?i)\bDELETE\b"]),
        (join, &[r"(?i)\bJOIN\b"]),
        (filter, &[r"(?i)\bWHERE\b"]),
        (projection, &[r"(?i)\bSELECT\b"]),
    ])
});

/// Classify one accepted match.
pub fn classify_usage(line: &str, context: &str, orms: &[&OrmDescriptor]) -> UsageType {
    orms.iter()
        .find_map(|orm| orm.classify(line, context))
        .unwrap_or_else(|| keyword_usage(line, context))
}

/// Generic keyword heuristics, line first, then context.
pub fn keyword_usage(line: &str, context: &str) -> UsageType {
    LINE_RULES
        .iter()
        .find(|rule| rule.matches(line))
        .or_else(|| CONTEXT_RULES.iter().find(|rule| rule.matches(context)))
        .map(|rule| rule.usage)
        .unwrap_or(UsageType::Read)
}

const COMMENT_PREFIXES: [&str; 5] = ["//", "#", "*", "/*", "--"];

/// Whether an already-trimmed line is a comment.
pub fn is_comment(trimmed: &str) -> bool {
    COMMENT_PREFIXES.iter().any(|p| trimmed.starts_with(p))
}
