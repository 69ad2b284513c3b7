//! JPA / Hibernate `@Entity` classes.

use std::sync::LazyLock;

use regex::Regex;

use dblineage_core::naming::{default_table_name, to_snake_case};
use dblineage_core::types::{ParsedColumn, ParsedTable};

use super::super::scan::{balanced, leading_annotations, strip_comments, Annotation};
use super::push_table;

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(?:Entity|Table)\b[\s\S]*?\bclass\s+(\w+)[^{]*\{").expect("static regex")
});
static TABLE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@Table\s*\([^)]*\bname\s*=\s*"(\w+)""#).expect("static regex")
});
static NAME_ARG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bname\s*=\s*"(\w+)""#).expect("static regex"));

const MODIFIERS: &[&str] = &["private", "protected", "public", "final", "volatile"];
const EXCLUDING_MODIFIERS: &[&str] = &["static", "transient"];
const EXCLUDING_ANNOTATIONS: &[&str] = &["Transient", "OneToMany", "ManyToMany", "ElementCollection"];

pub(super) fn extract(content: &str) -> Vec<ParsedTable> {
    let text = strip_comments(content, "//");
    let mut tables = Vec::new();
    let mut pos = 0;

    while let Some(caps) = ENTITY.captures(&text[pos..]) {
        let (Some(whole), Some(class)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let header = whole.as_str();
        let open_at = pos + whole.end() - 1;
        let Some((body, end)) = balanced(&text, open_at) else {
            break;
        };
        pos = end;

        let table_name = TABLE_NAME
            .captures(header)
            .and_then(|c| c.get(1))
            .map_or_else(|| default_table_name(class.as_str()), |m| m.as_str().to_string());
        let mut table = ParsedTable::new(table_name);
        for member in member_declarations(body) {
            if let Some(column) = parse_member(member) {
                table.columns.push(column);
            }
        }
        push_table(&mut tables, table);
    }
    tables
}

/// Statements at the top level of a class body, ending in `;`. Method and
/// nested-class bodies are skipped.
fn member_declarations(body: &str) -> Vec<&str> {
    let bytes = body.as_bytes();
    let mut members = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => match balanced(body, i) {
                Some((_, end)) => {
                    i = end;
                    start = end;
                }
                None => break,
            },
            b'(' => i = balanced(body, i).map_or(bytes.len(), |(_, end)| end),
            quote @ (b'"' | b'\'') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += if bytes[i] == b'\\' { 2 } else { 1 };
                }
                i += 1;
            }
            b';' => {
                members.push(body[start..i].trim());
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    members
}

fn parse_member(member: &str) -> Option<ParsedColumn> {
    let (annots, decl) = leading_annotations(member);
    let decl = decl.split('=').next().unwrap_or(decl).trim();
    if decl.contains('(') || decl.is_empty() {
        return None;
    }
    let tokens: Vec<&str> = decl.split_whitespace().collect();
    if tokens.iter().any(|t| EXCLUDING_MODIFIERS.contains(t)) {
        return None;
    }
    if annots.iter().any(|a| EXCLUDING_ANNOTATIONS.contains(&a.short_name())) {
        return None;
    }
    let (field, type_tokens) = tokens.split_last()?;
    let field_type = type_tokens
        .iter()
        .filter(|t| !MODIFIERS.contains(*t))
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    if field_type.is_empty() {
        return None;
    }

    let find = |name: &str| annots.iter().find(|a| a.short_name() == name);
    let explicit_name = |a: &Annotation<'_>| {
        NAME_ARG
            .captures(a.args)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    };
    let is_primary = find("Id").is_some() || find("EmbeddedId").is_some();

    if find("ManyToOne").is_some() || find("OneToOne").is_some() {
        let join = find("JoinColumn");
        // The inverse side of a one-to-one owns no column.
        if find("OneToOne").is_some_and(|a| a.args.contains("mappedBy")) {
            return None;
        }
        let name = join
            .and_then(explicit_name)
            .unwrap_or_else(|| format!("{}_id", to_snake_case(field)));
        return Some(
            ParsedColumn::new(name, field_type.as_str())
                .primary_key(is_primary)
                .references(default_table_name(&field_type), "id"),
        );
    }

    let name = find("Column")
        .and_then(explicit_name)
        .unwrap_or_else(|| to_snake_case(field));
    Some(
        ParsedColumn::new(name, field_type)
            .primary_key(is_primary)
            .foreign_key(find("JoinColumn").is_some()),
    )
}
