//! Go structs with GORM, `db` or `json` tags.

use std::sync::LazyLock;

use regex::Regex;

use dblineage_core::naming::{default_table_name, to_snake_case};
use dblineage_core::types::collections::FxHashSet;
use dblineage_core::types::{ParsedColumn, ParsedTable};

use super::super::scan::{balanced, strip_comments};
use super::push_table;

static STRUCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\btype\s+(\w+)\s+struct\s*\{").expect("static regex"));
static FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\w+)\s+(\S+)\s+`([^`]*)`").expect("static regex")
});
static GORM_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"gorm:"[^"]*column:(\w+)"#).expect("static regex"));
static DB_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bdb:"(\w+)"#).expect("static regex"));
static JSON_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"json:"(\w+)"#).expect("static regex"));
static RELATION_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"gorm:"[^"]*(?:foreignKey|many2many|references|polymorphic):"#)
        .expect("static regex")
});

pub(super) fn extract(content: &str) -> Vec<ParsedTable> {
    let text = strip_comments(content, "//");
    let structs: Vec<(String, String)> = STRUCT
        .captures_iter(&text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let (body, _) = balanced(&text, whole.end() - 1)?;
            Some((caps.get(1)?.as_str().to_string(), body.to_string()))
        })
        .collect();
    let struct_names: FxHashSet<&str> = structs.iter().map(|(name, _)| name.as_str()).collect();

    let mut tables = Vec::new();
    for (name, body) in &structs {
        if !body.contains("gorm:") && !body.contains("db:") && !body.contains("json:") {
            continue;
        }
        let mut table = ParsedTable::new(table_name(&text, name));
        for line in body.lines() {
            if let Some(column) = parse_field(line, &struct_names) {
                table.columns.push(column);
            }
        }
        push_table(&mut tables, table);
    }
    tables
}

/// `TableName()` override on the struct, else the pluralized snake name.
fn table_name(text: &str, struct_name: &str) -> String {
    let pattern = format!(
        r#"func\s*\(\s*(?:\w+\s+)?\*?{}\s*\)\s*TableName\s*\(\s*\)\s*string\s*\{{[^}}]*return\s+["'`](\w+)["'`]"#,
        regex::escape(struct_name)
    );
    Regex::new(&pattern)
        .ok()
        .and_then(|re| re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str().to_string()))
        .unwrap_or_else(|| default_table_name(struct_name))
}

fn parse_field(line: &str, struct_names: &FxHashSet<&str>) -> Option<ParsedColumn> {
    let caps = FIELD.captures(line)?;
    let field = caps.get(1)?.as_str();
    let field_type = caps.get(2)?.as_str();
    let tags = caps.get(3)?.as_str();

    if tags.contains(r#"gorm:"-""#) || tags.contains(r#"db:"-""#) {
        return None;
    }
    if RELATION_TAG.is_match(tags) {
        return None;
    }
    let base_type = field_type.trim_start_matches(['*', '[', ']']);
    let is_slice = field_type.starts_with("[]") && base_type != "byte";
    if is_slice || struct_names.contains(base_type) {
        return None;
    }

    let name = GORM_COLUMN
        .captures(tags)
        .or_else(|| DB_TAG.captures(tags))
        .or_else(|| JSON_TAG.captures(tags))
        .and_then(|c| c.get(1))
        .map_or_else(|| to_snake_case(field), |m| m.as_str().to_string());
    let primary = tags.contains("primaryKey")
        || tags.contains("primarykey")
        || tags.contains("primary_key")
        || field == "ID";
    Some(
        ParsedColumn::new(name, field_type)
            .primary_key(primary)
            .foreign_key(field.ends_with("ID") && field != "ID"),
    )
}
