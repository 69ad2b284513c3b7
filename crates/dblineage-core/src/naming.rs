//! Naming-convention conversion between database and host-language
//! identifiers.
//!
//! Databases mostly use `snake_case`; ORMs expose the same column as
//! `camelCase` fields, `PascalCase` properties, or squashed lowercase.
//! Everything that matches identifiers across that boundary goes
//! through here.

use std::sync::LazyLock;

use regex::Regex;

static LOWER_UPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("static regex"));
static ACRONYM_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z])([A-Z][a-z])").expect("static regex"));
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("static regex"));

/// `userId` → `user_id`, `HTTPServer` → `http_server`, `OrderItem` → `order_item`.
pub fn to_snake_case(s: &str) -> String {
    let s = SEPARATORS.replace_all(s, "_");
    let s = LOWER_UPPER.replace_all(&s, "${1}_${2}");
    let s = ACRONYM_BOUNDARY.replace_all(&s, "${1}_${2}");
    s.to_lowercase()
}

/// `user_id` → `userId`. Only an underscore followed by a lowercase ASCII
/// letter is folded; everything else is kept as written.
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '_' {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_lowercase() {
                    out.push(next.to_ascii_uppercase());
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// `user_id` → `UserId`.
pub fn to_pascal_case(s: &str) -> String {
    upper_first(&to_camel_case(s))
}

/// `user_id` → `userid`.
pub fn to_concatenated(s: &str) -> String {
    s.replace('_', "")
}

pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Light English pluralization used to derive table names from model
/// names: `user` → `users`, `category` → `categories`, `box` → `boxes`.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    let lower = word.to_ascii_lowercase();
    if lower.ends_with('y') && !ends_with_vowel_y(&lower) {
        return format!("{}ies", &word[..word.len() - 1]);
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| lower.ends_with(suffix)) {
        return format!("{word}es");
    }
    format!("{word}s")
}

/// Inverse of [`pluralize`] for the common cases. Words that do not look
/// plural are returned unchanged.
pub fn singularize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if lower.len() > 3 && lower.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }
    if lower.ends_with("ches") || lower.ends_with("shes") || lower.ends_with("xes") {
        return word[..word.len() - 2].to_string();
    }
    if lower.len() > 1 && lower.ends_with('s') && !lower.ends_with("ss") {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Default table name for a model/class/struct name: pluralized
/// snake_case (`OrderItem` → `order_items`).
pub fn default_table_name(model: &str) -> String {
    pluralize(&to_snake_case(model))
}

/// Forms under which a table name can show up in code: as written,
/// lowercased, camelCase, PascalCase, and the singular of each
/// (models are usually singular while tables are plural).
pub fn table_variants(table: &str) -> Vec<String> {
    let mut forms = Vec::with_capacity(8);
    let lower = table.to_lowercase();
    for base in [table.to_string(), lower.clone(), to_camel_case(&lower), to_pascal_case(&lower)] {
        let singular = singularize(&base);
        push_unique(&mut forms, base);
        push_unique(&mut forms, singular);
    }
    forms
}

/// Naming variants of a column: raw, camelCase, PascalCase,
/// underscore-stripped, and `table.column` in raw and camelCase.
/// Variants shorter than `min_len` characters are dropped.
pub fn column_variants(column: &str, table: &str, min_len: usize) -> Vec<String> {
    let camel = to_camel_case(column);
    let candidates = [
        column.to_string(),
        camel.clone(),
        to_pascal_case(column),
        to_concatenated(column),
        format!("{table}.{column}"),
        format!("{table}.{camel}"),
    ];
    let mut variants = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if candidate.chars().count() >= min_len {
            push_unique(&mut variants, candidate);
        }
    }
    variants
}

fn ends_with_vowel_y(lower: &str) -> bool {
    let bytes = lower.as_bytes();
    bytes.len() >= 2 && matches!(bytes[bytes.len() - 2], b'a' | b'e' | b'i' | b'o' | b'u')
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !value.is_empty() && !list.contains(&value) {
        list.push(value);
    }
}
