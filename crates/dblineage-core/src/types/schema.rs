//! Extracted schema records.

use serde::{Deserialize, Serialize};

/// One column as produced by the schema extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedColumn {
    pub name: String,
    pub data_type: String,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub foreign_table: Option<String>,
    pub foreign_column: Option<String>,
}

impl ParsedColumn {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_primary_key: false,
            is_foreign_key: false,
            foreign_table: None,
            foreign_column: None,
        }
    }

    pub fn primary_key(mut self, yes: bool) -> Self {
        self.is_primary_key = yes;
        self
    }

    /// Flag as a foreign key without a resolved target.
    pub fn foreign_key(mut self, yes: bool) -> Self {
        self.is_foreign_key = self.is_foreign_key || yes;
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.is_foreign_key = true;
        self.foreign_table = Some(table.into());
        self.foreign_column = Some(column.into());
        self
    }
}

/// A table and its columns, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTable {
    pub name: String,
    pub columns: Vec<ParsedColumn>,
}

impl ParsedTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&ParsedColumn> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut ParsedColumn> {
        self.columns
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// A persisted column, as the tracer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub id: i64,
    pub name: String,
    pub table: String,
}

/// Column details shown under a table (the "type information" list).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub id: i64,
    pub name: String,
    pub data_type: String,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
}

/// A table with its sorted columns, for table pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOverview {
    pub table_name: String,
    pub columns: Vec<ColumnInfo>,
}
