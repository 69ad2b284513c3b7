//! SQLAlchemy declarative models and Django models.

use std::sync::LazyLock;

use regex::Regex;

use dblineage_core::naming::{default_table_name, to_snake_case};
use dblineage_core::types::{ParsedColumn, ParsedTable};

use super::super::scan::{balanced, split_top_level};
use super::push_table;

static CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^class\s+(\w+)\s*(?:\(([^)]*)\))?\s*:").expect("static regex"));
static TABLENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"__tablename__\s*=\s*['"](\w+)['"]"#).expect("static regex")
});
static DB_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"db_table\s*=\s*['"](\w+)['"]"#).expect("static regex"));
static ALCHEMY_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s+(\w+)\s*(?::\s*[^=\n]+)?=\s*(?:db\.|sa\.)?(?:Column|mapped_column)\s*\(")
        .expect("static regex")
});
static ALCHEMY_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(Integer|String|Text|Float|Boolean|DateTime|BigInteger|SmallInteger|Numeric|Date|Time|LargeBinary|JSON|UUID|Enum)\b")
        .expect("static regex")
});
static ALCHEMY_FK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"ForeignKey\s*\(\s*['"](\w+)\.(\w+)['"]"#).expect("static regex")
});
static EXPLICIT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^['"](\w+)['"]$"#).expect("static regex"));
static PRIMARY_KEY_ARG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"primary_key\s*=\s*True").expect("static regex"));
static DJANGO_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s+(\w+)\s*=\s*models\.(\w+)\s*\(").expect("static regex")
});
static DB_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"db_column\s*=\s*['"](\w+)['"]"#).expect("static regex"));

const DJANGO_RELATIONS: &[&str] = &["ForeignKey", "OneToOneField"];
const DJANGO_SKIPPED: &[&str] = &["ManyToManyField", "GenericRelation", "GenericForeignKey"];

pub(super) fn extract(content: &str) -> Vec<ParsedTable> {
    let mut tables = Vec::new();
    for (class, bases, body) in class_blocks(content) {
        if let Some(table) = TABLENAME.captures(body).and_then(|c| c.get(1)) {
            push_table(&mut tables, sqlalchemy_table(table.as_str(), body));
        } else if bases.contains("models.Model") || bases.split(',').any(|b| b.trim() == "Model") {
            push_table(&mut tables, django_table(class, body));
        }
    }
    tables
}

/// Top-level classes with their base list and indented body.
fn class_blocks(content: &str) -> Vec<(&str, &str, &str)> {
    let mut blocks = Vec::new();
    let mut offsets = Vec::new();
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        offsets.push((offset, line));
        offset += line.len();
    }

    let mut i = 0;
    while i < offsets.len() {
        let (start, line) = offsets[i];
        let Some(caps) = CLASS.captures(line) else {
            i += 1;
            continue;
        };
        let class = caps.get(1).map_or("", |m| m.as_str());
        let bases = caps.get(2).map_or("", |m| m.as_str());
        let body_start = start + line.len();
        let mut j = i + 1;
        while j < offsets.len() {
            let next = offsets[j].1;
            let dedented = !next.trim().is_empty()
                && !next.starts_with(char::is_whitespace)
                && !next.starts_with('#');
            if dedented {
                break;
            }
            j += 1;
        }
        let body_end = offsets.get(j).map_or(content.len(), |(o, _)| *o);
        blocks.push((class, bases, &content[body_start..body_end]));
        i = j;
    }
    blocks
}

/// Argument text of a call whose opening parenthesis ends `m`.
fn call_args(body: &str, paren_end: usize) -> &str {
    balanced(body, paren_end - 1).map_or("", |(args, _)| args)
}

fn sqlalchemy_table(table: &str, body: &str) -> ParsedTable {
    let mut parsed = ParsedTable::new(table);
    for caps in ALCHEMY_COLUMN.captures_iter(body) {
        let (Some(whole), Some(field)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let args = call_args(body, whole.end());
        let first_arg = split_top_level(args, b',').into_iter().next().unwrap_or("");
        let name = EXPLICIT_NAME
            .captures(first_arg)
            .and_then(|c| c.get(1))
            .map_or(field.as_str(), |m| m.as_str());
        let data_type = ALCHEMY_TYPE
            .captures(args)
            .and_then(|c| c.get(1))
            .map_or("unknown", |m| m.as_str());

        let mut column =
            ParsedColumn::new(name, data_type).primary_key(PRIMARY_KEY_ARG.is_match(args));
        column = match ALCHEMY_FK.captures(args).and_then(|fk| Some((fk.get(1)?, fk.get(2)?))) {
            Some((table, target)) => column.references(table.as_str(), target.as_str()),
            None => column.foreign_key(args.contains("ForeignKey")),
        };
        parsed.columns.push(column);
    }
    parsed
}

fn django_table(class: &str, body: &str) -> ParsedTable {
    let table_name = DB_TABLE
        .captures(body)
        .and_then(|c| c.get(1))
        .map_or_else(|| default_table_name(class), |m| m.as_str().to_string());
    let mut parsed = ParsedTable::new(table_name);

    for caps in DJANGO_FIELD.captures_iter(body) {
        let (Some(whole), Some(field), Some(kind)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        let kind = kind.as_str();
        if DJANGO_SKIPPED.contains(&kind) || !(kind.ends_with("Field") || DJANGO_RELATIONS.contains(&kind)) {
            continue;
        }
        let args = call_args(body, whole.end());
        let explicit = DB_COLUMN.captures(args).and_then(|c| c.get(1)).map(|m| m.as_str().to_string());

        let column = if DJANGO_RELATIONS.contains(&kind) {
            let name = explicit.unwrap_or_else(|| format!("{}_id", to_snake_case(field.as_str())));
            let target = split_top_level(args, b',')
                .into_iter()
                .next()
                .map(|t| t.trim_matches(|c| c == '\'' || c == '"'))
                .filter(|t| !t.is_empty() && *t != "self" && !t.contains('='))
                .map(|t| default_table_name(t.rsplit('.').next().unwrap_or(t)));
            let column = ParsedColumn::new(name, kind);
            match target {
                Some(t) => column.references(t, "id"),
                None => column.foreign_key(true),
            }
        } else {
            let name = explicit.unwrap_or_else(|| to_snake_case(field.as_str()));
            ParsedColumn::new(name, kind).primary_key(PRIMARY_KEY_ARG.is_match(args))
        };
        parsed.columns.push(column);
    }

    // Django adds an `id` primary key unless a field claims the role.
    if !parsed.columns.is_empty() && !parsed.columns.iter().any(|c| c.is_primary_key) {
        parsed
            .columns
            .insert(0, ParsedColumn::new("id", "AutoField").primary_key(true));
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlalchemy_declarative_model() {
        let source = r#"
from sqlalchemy import Column, Integer, String, ForeignKey
from sqlalchemy.orm import relationship

class Order(Base):
    __tablename__ = "orders"

    id = Column(Integer, primary_key=True)
    user_id = Column(Integer, ForeignKey("users.id"), nullable=False)
    total = Column("order_total", Numeric(10, 2))
    user = relationship("User", back_populates="orders")

def helper():
    pass
"#;
        let tables = extract(source);
        assert_eq!(tables.len(), 1);
        let orders = &tables[0];
        assert_eq!(orders.name, "orders");
        let names: Vec<_> = orders.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "user_id", "order_total"]);
        assert!(orders.columns[0].is_primary_key);
        assert_eq!(orders.columns[1].foreign_table.as_deref(), Some("users"));
        assert_eq!(orders.columns[2].data_type, "Numeric");
    }

    #[test]
    fn django_model_with_foreign_key_and_meta() {
        let source = r#"
from django.db import models

class OrderItem(models.Model):
    order = models.ForeignKey(Order, on_delete=models.CASCADE)
    sku = models.CharField(max_length=64, db_column="product_sku")
    tags = models.ManyToManyField(Tag)

    class Meta:
        db_table = "line_items"
"#;
        let tables = extract(source);
        assert_eq!(tables.len(), 1);
        let items = &tables[0];
        assert_eq!(items.name, "line_items");
        let names: Vec<_> = items.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "order_id", "product_sku"]);
        let order = items.column("order_id").unwrap();
        assert!(order.is_foreign_key);
        assert_eq!(order.foreign_table.as_deref(), Some("orders"));
    }
}
