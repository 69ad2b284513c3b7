//! ORM model grammars, dispatched by language.
//!
//! Every grammar names a table after its model (pluralized snake_case)
//! unless an explicit mapping overrides it, names columns after fields
//! (snake_case) unless overridden, leaves relation-typed fields out, and
//! drops models that end up without columns.

mod diesel;
mod gorm;
mod jpa;
mod prisma;
mod python;
mod typeorm;

use dblineage_core::types::{Language, ParsedTable};

/// Extract model tables from one source file.
pub fn extract_orm_schema(content: &str, language: Language) -> Vec<ParsedTable> {
    let tables = match language {
        Language::Prisma | Language::Unknown => prisma::extract(content),
        Language::Python => python::extract(content),
        Language::Go => gorm::extract(content),
        Language::Java => jpa::extract(content),
        Language::TypeScript | Language::JavaScript => typeorm::extract(content),
        Language::Rust => diesel::extract(content),
        _ => Vec::new(),
    };
    if tables.is_empty() {
        tracing::debug!(language = %language, "no ORM models extracted");
    }
    tables
}

/// Keep a table only if it has columns.
fn push_table(tables: &mut Vec<ParsedTable>, table: ParsedTable) {
    if table.columns.is_empty() {
        tracing::debug!(table = %table.name, "model yielded no columns");
    } else {
        tables.push(table);
    }
}
