//! Diesel `table!` macros.

use std::sync::LazyLock;

use regex::Regex;

use dblineage_core::types::{ParsedColumn, ParsedTable};

use super::super::scan::{balanced, split_top_level};
use super::push_table;

static TABLE_MACRO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\btable!\s*\{").expect("static regex"));
static TABLE_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\w+\s*\.\s*)?(\w+)\s*(?:\(([^)]*)\))?\s*\{").expect("static regex")
});
static COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:#\[[^\]]*\]\s*)*(\w+)\s*->\s*(.+)$").expect("static regex"));

pub(super) fn extract(content: &str) -> Vec<ParsedTable> {
    let mut tables = Vec::new();
    let mut pos = 0;

    while let Some(m) = TABLE_MACRO.find(&content[pos..]) {
        let open_at = pos + m.end() - 1;
        let Some((body, end)) = balanced(content, open_at) else {
            break;
        };
        pos = end;

        // A single invocation may declare several tables.
        let mut inner = 0;
        while let Some(caps) = TABLE_HEAD.captures(&body[inner..]) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            let Some((columns, after)) = balanced(body, inner + whole.end() - 1) else {
                break;
            };
            let keys: Vec<&str> = caps
                .get(2)
                .map_or_else(|| vec!["id"], |k| split_top_level(k.as_str(), b','));
            inner = after;

            let mut table = ParsedTable::new(name.as_str());
            for line in split_top_level(columns, b',') {
                let Some(col) = COLUMN.captures(line.trim()) else {
                    continue;
                };
                let (Some(col_name), Some(col_type)) = (col.get(1), col.get(2)) else {
                    continue;
                };
                table.columns.push(
                    ParsedColumn::new(col_name.as_str(), col_type.as_str().trim())
                        .primary_key(keys.contains(&col_name.as_str())),
                );
            }
            push_table(&mut tables, table);
        }
    }
    tables
}
