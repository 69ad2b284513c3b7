//! TypeORM `@Entity` classes.

use std::sync::LazyLock;

use regex::Regex;

use dblineage_core::naming::{default_table_name, to_snake_case};
use dblineage_core::types::{ParsedColumn, ParsedTable};

use super::super::scan::{balanced, leading_annotations, strip_comments, Annotation};
use super::push_table;

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@Entity\s*\(([^)]*)\)[\s\S]*?\bclass\s+(\w+)[^{]*\{").expect("static regex")
});
static QUOTED_FIRST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*['"`](\w+)['"`]"#).expect("static regex"));
static NAME_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bname\s*:\s*['"`](\w+)['"`]"#).expect("static regex"));
static TYPE_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\btype\s*:\s*['"`](\w+)['"`]"#).expect("static regex"));
static PRIMARY_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bprimary\s*:\s*true").expect("static regex"));
static RELATION_TARGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\(\s*\)\s*=>\s*(\w+)").expect("static regex"));
static PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:public|private|protected|readonly|declare)\s+)*(\w+)\s*[!?]?\s*:\s*([^;=]+)")
        .expect("static regex")
});

const COLUMN_DECORATORS: &[&str] = &[
    "Column",
    "PrimaryColumn",
    "PrimaryGeneratedColumn",
    "CreateDateColumn",
    "UpdateDateColumn",
    "DeleteDateColumn",
    "VersionColumn",
];

pub(super) fn extract(content: &str) -> Vec<ParsedTable> {
    let text = strip_comments(content, "//");
    let mut tables = Vec::new();
    let mut pos = 0;

    while let Some(caps) = ENTITY.captures(&text[pos..]) {
        let (Some(whole), Some(options), Some(class)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            break;
        };
        let open_at = pos + whole.end() - 1;
        let Some((body, end)) = balanced(&text, open_at) else {
            break;
        };
        pos = end;

        let options = options.as_str();
        let table_name = QUOTED_FIRST
            .captures(options)
            .or_else(|| NAME_OPTION.captures(options))
            .and_then(|c| c.get(1))
            .map_or_else(|| default_table_name(class.as_str()), |m| m.as_str().to_string());
        let mut table = ParsedTable::new(table_name);
        for member in members(body) {
            if let Some(column) = parse_member(member) {
                table.columns.push(column);
            }
        }
        push_table(&mut tables, table);
    }
    tables
}

/// Class members at the top level of the body. A member ends at `;` or at
/// a newline once something other than decorators has been seen. Method
/// bodies are skipped together with their signatures.
fn members(body: &str) -> Vec<&str> {
    let bytes = body.as_bytes();
    let mut out = Vec::new();
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
            b'(' | b'[' => i = balanced(body, i).map_or(bytes.len(), |(_, end)| end),
            quote @ (b'"' | b'\'' | b'`') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += if bytes[i] == b'\\' { 2 } else { 1 };
                }
                i += 1;
            }
            b';' => {
                out.push(body[start..i].trim());
                i += 1;
                start = i;
            }
            b'\n' => {
                let segment = &body[start..i];
                if !leading_annotations(segment).1.is_empty() {
                    out.push(segment.trim());
                    start = i + 1;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        let tail = body[start..].trim();
        if !tail.is_empty() {
            out.push(tail);
        }
    }
    out
}

fn parse_member(member: &str) -> Option<ParsedColumn> {
    let (decorators, decl) = leading_annotations(member);
    let caps = PROPERTY.captures(decl)?;
    let property = caps.get(1)?.as_str();
    let ts_type = caps.get(2)?.as_str().trim();

    let find = |name: &str| decorators.iter().find(|d| d.short_name() == name);
    let column_decorator = decorators
        .iter()
        .find(|d| COLUMN_DECORATORS.contains(&d.short_name()));

    if let Some(relation) = find("ManyToOne").or_else(|| find("OneToOne")) {
        let join = find("JoinColumn");
        // A one-to-one without a join column is the inverse side.
        if relation.short_name() == "OneToOne" && join.is_none() {
            return None;
        }
        let name = join
            .and_then(option_name)
            .unwrap_or_else(|| format!("{}_id", to_snake_case(property)));
        let target = RELATION_TARGET
            .captures(relation.args)
            .and_then(|c| c.get(1))
            .map_or(ts_type, |m| m.as_str());
        return Some(ParsedColumn::new(name, target).references(default_table_name(target), "id"));
    }

    let decorator = column_decorator?;
    let name = option_name(decorator).unwrap_or_else(|| to_snake_case(property));
    let data_type = QUOTED_FIRST
        .captures(decorator.args)
        .or_else(|| TYPE_OPTION.captures(decorator.args))
        .and_then(|c| c.get(1))
        .map_or(ts_type, |m| m.as_str());
    let primary = decorator.short_name().starts_with("Primary")
        || PRIMARY_OPTION.is_match(decorator.args);
    Some(
        ParsedColumn::new(name, data_type)
            .primary_key(primary)
            .foreign_key(find("JoinColumn").is_some()),
    )
}

fn option_name(decorator: &Annotation<'_>) -> Option<String> {
    NAME_OPTION
        .captures(decorator.args)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
