//! Compiled ORM descriptor records.

use regex::Regex;

use dblineage_core::types::collections::FxHashMap;
use dblineage_core::types::{Language, UsageType};

/// What a usage pattern marks when it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternUsage {
    /// A call site of the given kind.
    Usage(UsageType),
    /// A schema-definition line. Never reported as a usage.
    Definition,
}

#[derive(Debug, Clone)]
pub struct UsagePattern {
    pub regex: Regex,
    pub usage: PatternUsage,
    pub description: String,
}

/// Extracts a table name from a model/class/table-macro definition.
#[derive(Debug, Clone)]
pub struct ModelPattern {
    pub regex: Regex,
    pub table_group: usize,
    pub description: String,
}

/// Extracts a (field name, column name) pair from a field annotation or tag.
#[derive(Debug, Clone)]
pub struct FieldPattern {
    pub regex: Regex,
    pub field_group: usize,
    pub column_group: usize,
    pub description: String,
}

/// One language/ORM rule set.
#[derive(Debug, Clone)]
pub struct OrmDescriptor {
    pub name: String,
    pub language: Language,
    pub file_indicators: Vec<Regex>,
    /// In precedence order; the first matching pattern classifies a line.
    pub usage_patterns: Vec<UsagePattern>,
    pub model_patterns: Vec<ModelPattern>,
    pub field_patterns: Vec<FieldPattern>,
}

impl OrmDescriptor {
    /// Language match, with JavaScript and TypeScript interchangeable.
    pub fn applies_to(&self, language: Language) -> bool {
        self.language.is_compatible_with(language)
    }

    /// Whether any file indicator matches the content.
    pub fn indicated_by(&self, content: &str) -> bool {
        self.file_indicators.iter().any(|re| re.is_match(content))
    }

    /// Classify by the first pattern matching the line or, failing that, the
    /// context window. Definition patterns are passed over.
    pub fn classify(&self, line: &str, context: &str) -> Option<UsageType> {
        self.usage_patterns.iter().find_map(|p| match p.usage {
            PatternUsage::Usage(usage) if p.regex.is_match(line) || p.regex.is_match(context) => {
                Some(usage)
            }
            _ => None,
        })
    }

    /// Table names declared in the content via this descriptor's model patterns.
    pub fn model_tables(&self, content: &str) -> Vec<String> {
        let mut tables = Vec::new();
        for pattern in &self.model_patterns {
            for caps in pattern.regex.captures_iter(content) {
                if let Some(m) = caps.get(pattern.table_group) {
                    let table = m.as_str().to_lowercase();
                    if !tables.contains(&table) {
                        tables.push(table);
                    }
                }
            }
        }
        tables
    }

    /// Field-to-column mappings in the content, both sides lowercased.
    /// Later patterns overwrite earlier ones for the same field.
    pub fn field_mappings(&self, content: &str, into: &mut FxHashMap<String, String>) {
        for pattern in &self.field_patterns {
            for caps in pattern.regex.captures_iter(content) {
                let (Some(field), Some(column)) =
                    (caps.get(pattern.field_group), caps.get(pattern.column_group))
                else {
                    continue;
                };
                into.insert(field.as_str().to_lowercase(), column.as_str().to_lowercase());
            }
        }
    }
}
