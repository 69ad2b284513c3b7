//! `CREATE TABLE` extraction from SQL DDL.

use std::sync::LazyLock;

use regex::Regex;

use dblineage_core::types::{ParsedColumn, ParsedTable};

use super::scan::{balanced, split_top_level, strip_comments, unquote_ident};

const IDENT: &str = r#"(?:`[^`]+`|"[^"]+"|\[[^\]]+\]|\w+)"#;

static CREATE_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\bCREATE\s+(?:OR\s+REPLACE\s+)?(?:(?:GLOBAL|LOCAL)\s+)?(?:TEMP\s+|TEMPORARY\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?:{IDENT}\s*\.\s*)*({IDENT})\s*\("
    ))
    .expect("static regex")
});

static CONSTRAINT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^CONSTRAINT\s+{IDENT}\s+")).expect("static regex")
});

static CONSTRAINT_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:PRIMARY\s+KEY|UNIQUE|INDEX|KEY|CONSTRAINT|CHECK|FOREIGN\s+KEY|FULLTEXT|SPATIAL|EXCLUDE)\b")
        .expect("static regex")
});

static TABLE_PRIMARY_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^PRIMARY\s+KEY\s*(?:CLUSTERED\s+|NONCLUSTERED\s+)?\(([^)]*)\)")
        .expect("static regex")
});

static TABLE_FOREIGN_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^FOREIGN\s+KEY\s*\(([^)]*)\)\s*REFERENCES\s+(?:{IDENT}\s*\.\s*)*({IDENT})\s*(?:\(([^)]*)\))?"
    ))
    .expect("static regex")
});

static COLUMN_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^({IDENT})\s+(\w+(?:\s*\([^)]*\))?)")).expect("static regex")
});

static INLINE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\bREFERENCES\s+(?:{IDENT}\s*\.\s*)*({IDENT})\s*(?:\(\s*({IDENT})\s*\))?"
    ))
    .expect("static regex")
});

static PRIMARY_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bPRIMARY\s+KEY\b").expect("static regex"));

/// Extract every `CREATE TABLE` in the text. Never fails: anything it
/// cannot read is skipped, and tables without columns are dropped.
pub fn extract_sql_schema(ddl: &str) -> Vec<ParsedTable> {
    let text = strip_comments(ddl, "--");
    let mut tables = Vec::new();
    let mut pos = 0;

    while let Some(caps) = CREATE_TABLE.captures(&text[pos..]) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let open_at = pos + whole.end() - 1;
        let table_name = unquote_ident(name.as_str()).to_string();
        let Some((body, end)) = balanced(&text, open_at) else {
            tracing::debug!(table = %table_name, "unbalanced CREATE TABLE body");
            break;
        };
        pos = end;

        let table = parse_table_body(table_name, body);
        if table.columns.is_empty() {
            tracing::debug!(table = %table.name, "CREATE TABLE yielded no columns");
            continue;
        }
        tables.push(table);
    }

    if tables.is_empty() && !ddl.trim().is_empty() {
        tracing::debug!("no tables extracted from SQL text");
    }
    tables
}

fn parse_table_body(name: String, body: &str) -> ParsedTable {
    let mut table = ParsedTable::new(name);
    let mut deferred: Vec<&str> = Vec::new();

    for item in split_top_level(body, b',') {
        let item = CONSTRAINT_PREFIX
            .find(item)
            .map_or(item, |m| &item[m.end()..]);
        if CONSTRAINT_ONLY.is_match(item) {
            deferred.push(item);
            continue;
        }
        if let Some(column) = parse_column(item) {
            table.columns.push(column);
        }
    }

    // Table-level keys refer to columns declared anywhere in the body.
    for clause in deferred {
        apply_table_constraint(&mut table, clause);
    }
    table
}

fn parse_column(item: &str) -> Option<ParsedColumn> {
    let caps = COLUMN_DEF.captures(item)?;
    let name = unquote_ident(caps.get(1)?.as_str());
    let data_type = caps.get(2)?.as_str().trim();

    let mut column =
        ParsedColumn::new(name, data_type).primary_key(PRIMARY_KEY.is_match(item));
    if let Some(reference) = INLINE_REFERENCE.captures(item) {
        let table = reference.get(1).map(|m| unquote_ident(m.as_str()));
        let target = reference.get(2).map(|m| unquote_ident(m.as_str()));
        column = match (table, target) {
            (Some(t), Some(c)) => column.references(t, c),
            _ => column.foreign_key(true),
        };
    }
    Some(column)
}

fn apply_table_constraint(table: &mut ParsedTable, clause: &str) {
    if let Some(caps) = TABLE_PRIMARY_KEY.captures(clause) {
        for name in ident_list(caps.get(1).map_or("", |m| m.as_str())) {
            if let Some(column) = table.column_mut(name) {
                column.is_primary_key = true;
            }
        }
        return;
    }

    if let Some(caps) = TABLE_FOREIGN_KEY.captures(clause) {
        let locals = ident_list(caps.get(1).map_or("", |m| m.as_str()));
        let target_table = caps.get(2).map(|m| unquote_ident(m.as_str()).to_string());
        let targets = ident_list(caps.get(3).map_or("", |m| m.as_str()));
        for (i, local) in locals.iter().enumerate() {
            let Some(column) = table.column_mut(local) else {
                continue;
            };
            column.is_foreign_key = true;
            if let (Some(t), Some(c)) = (&target_table, targets.get(i)) {
                column.foreign_table = Some(t.clone());
                column.foreign_column = Some((*c).to_string());
            }
        }
    }
}

fn ident_list(list: &str) -> Vec<&str> {
    split_top_level(list, b',')
        .into_iter()
        // `col ASC` / `col(10)` in index-style key lists
        .filter_map(|part| part.split_whitespace().next())
        .map(|part| unquote_ident(part.split('(').next().unwrap_or(part)))
        .filter(|part| !part.is_empty())
        .collect()
}
