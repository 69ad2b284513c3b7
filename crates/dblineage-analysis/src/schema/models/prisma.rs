//! Prisma schema `model` blocks.

use std::sync::LazyLock;

use regex::Regex;

use dblineage_core::naming::{default_table_name, to_snake_case};
use dblineage_core::types::{ParsedColumn, ParsedTable};

use super::super::scan::{balanced, strip_comments};
use super::push_table;

const SCALARS: &[&str] = &[
    "String", "Int", "Float", "Boolean", "DateTime", "BigInt", "Decimal", "Bytes", "Json",
];

static MODEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bmodel\s+(\w+)\s*\{").expect("static regex"));
static TABLE_MAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"@@map\(\s*["'](\w+)["']\s*\)"#).expect("static regex"));
static FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)\s+(\w+)(\?|\[\])?\s*(.*)$").expect("static regex"));
static COLUMN_MAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"@map\(\s*["'](\w+)["']\s*\)"#).expect("static regex"));
static ID_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@id\b").expect("static regex"));

pub(super) fn extract(content: &str) -> Vec<ParsedTable> {
    let text = strip_comments(content, "//");
    let mut tables = Vec::new();
    let mut pos = 0;

    while let Some(caps) = MODEL.captures(&text[pos..]) {
        let (Some(whole), Some(model)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let open_at = pos + whole.end() - 1;
        let Some((body, end)) = balanced(&text, open_at) else {
            break;
        };
        pos = end;

        let table_name = TABLE_MAP
            .captures(body)
            .and_then(|c| c.get(1))
            .map_or_else(|| default_table_name(model.as_str()), |m| m.as_str().to_string());
        let mut table = ParsedTable::new(table_name);

        for line in body.lines().map(str::trim) {
            if line.is_empty() || line.starts_with("@@") {
                continue;
            }
            if let Some(column) = parse_field(line) {
                table.columns.push(column);
            }
        }
        push_table(&mut tables, table);
    }
    tables
}

fn parse_field(line: &str) -> Option<ParsedColumn> {
    let caps = FIELD.captures(line)?;
    let field = caps.get(1)?.as_str();
    let field_type = caps.get(2)?.as_str();
    let rest = caps.get(4).map_or("", |m| m.as_str());

    if rest.contains("@relation") {
        return None;
    }
    let is_model_type = field_type.starts_with(|c: char| c.is_ascii_uppercase())
        && !SCALARS.contains(&field_type);
    if is_model_type {
        return None;
    }

    let name = COLUMN_MAP
        .captures(rest)
        .and_then(|c| c.get(1))
        .map_or_else(|| to_snake_case(field), |m| m.as_str().to_string());
    Some(
        ParsedColumn::new(name, field_type)
            .primary_key(ID_ATTR.is_match(rest))
            .foreign_key(field.ends_with("Id")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn models_with_maps_and_relations() {
        let schema = r#"
            model User {
              id        Int      @id @default(autoincrement())
              email     String   @unique
              fullName  String?  @map("display_name")
              posts     Post[]
              createdAt DateTime @default(now())
            }

            // blog posts
            model Post {
              id       Int    @id
              authorId Int
              author   User   @relation(fields: [authorId], references: [id])
              @@map("blog_posts")
            }
        "#;
        let tables = extract(schema);
        assert_eq!(tables.len(), 2);

        let users = &tables[0];
        assert_eq!(users.name, "users");
        let names: Vec<_> = users.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "email", "display_name", "created_at"]);
        assert!(users.columns[0].is_primary_key);

        let posts = &tables[1];
        assert_eq!(posts.name, "blog_posts");
        assert_eq!(posts.columns.len(), 2);
        assert!(posts.column("author_id").unwrap().is_foreign_key);
    }
}
