//! Component graph and lineage bookkeeping types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of a persisted graph component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentType {
    Table,
    Column,
    Procedure,
    Function,
    Query,
    FunctionCall,
    FunctionDefinition,
    CreateTableStatement,
    CreateColumnDefinition,
    /// Pseudo-component standing in for a whole source file.
    File,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "TABLE",
            Self::Column => "COLUMN",
            Self::Procedure => "PROCEDURE",
            Self::Function => "FUNCTION",
            Self::Query => "QUERY",
            Self::FunctionCall => "FUNCTION_CALL",
            Self::FunctionDefinition => "FUNCTION_DEFINITION",
            Self::CreateTableStatement => "CREATE_TABLE_STATEMENT",
            Self::CreateColumnDefinition => "CREATE_COLUMN_DEFINITION",
            Self::File => "FILE",
        }
    }

    /// How this component is drawn in a lineage tree.
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Table | Self::CreateTableStatement => NodeType::Table,
            Self::Column | Self::CreateColumnDefinition => NodeType::Column,
            Self::Procedure => NodeType::Procedure,
            Self::Query => NodeType::Query,
            Self::Function | Self::FunctionCall | Self::FunctionDefinition | Self::File => {
                NodeType::Function
            }
        }
    }

    /// Schema-definition components never appear as referencing components.
    pub fn is_definition(&self) -> bool {
        matches!(
            self,
            Self::CreateTableStatement | Self::CreateColumnDefinition
        )
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "TABLE" => Self::Table,
            "COLUMN" => Self::Column,
            "PROCEDURE" => Self::Procedure,
            "FUNCTION" => Self::Function,
            "QUERY" => Self::Query,
            "FUNCTION_CALL" => Self::FunctionCall,
            "FUNCTION_DEFINITION" => Self::FunctionDefinition,
            "CREATE_TABLE_STATEMENT" => Self::CreateTableStatement,
            "CREATE_COLUMN_DEFINITION" => Self::CreateColumnDefinition,
            "FILE" => Self::File,
            other => return Err(format!("unknown component type: {other}")),
        })
    }
}

/// Display type of a lineage tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Table,
    Column,
    Procedure,
    Function,
    Query,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "TABLE",
            Self::Column => "COLUMN",
            Self::Procedure => "PROCEDURE",
            Self::Function => "FUNCTION",
            Self::Query => "QUERY",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node colors by node type. Deserializes from the `COLUMN_COLORS`
/// control entry, e.g. `{"TABLE": "#82c158"}`; missing keys keep defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "UPPERCASE")]
pub struct NodeColors {
    pub table: String,
    pub query: String,
    pub procedure: String,
    pub function: String,
    pub column: String,
}

impl Default for NodeColors {
    fn default() -> Self {
        Self {
            table: "#82c158".to_string(),
            query: "#0a9ccd".to_string(),
            procedure: "#c34474".to_string(),
            function: "#5283a2".to_string(),
            column: "#b2f1ca".to_string(),
        }
    }
}

impl NodeColors {
    pub fn color_for(&self, node_type: NodeType) -> &str {
        match node_type {
            NodeType::Table => &self.table,
            NodeType::Query => &self.query,
            NodeType::Procedure => &self.procedure,
            NodeType::Function => &self.function,
            NodeType::Column => &self.column,
        }
    }
}

/// Logical identity of something that can appear in a lineage tree.
/// Cycle detection keys on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ComponentKey {
    Component(i64),
    File(i64),
}

/// A component that references a table, column, or another component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRecord {
    pub key: ComponentKey,
    pub name: String,
    pub component_type: ComponentType,
    pub description: Option<String>,
}

/// A registered ETL flow from one table to another, optionally through a
/// named procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFlow {
    pub source_table: String,
    pub target_table: String,
    pub procedure_name: Option<String>,
    pub flow_sequence: i64,
    pub flow_type: Option<String>,
}

/// Stored source text for a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSource {
    pub component_id: i64,
    pub file_path: Option<String>,
    pub source_code: String,
}

/// One row of the runtime control table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub application_id: Option<String>,
}

/// Lifecycle of one lineage generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Running,
    Completed,
    Failed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown report status: {other}")),
        }
    }
}

/// A previously generated tree, serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredLineage {
    pub lineage_json: String,
    pub updated_at: i64,
}

/// Which lineage is being asked for: a set of projects, a table, and
/// optionally one column of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageScope {
    pub project_ids: Vec<String>,
    pub table: String,
    pub column: Option<String>,
}

impl LineageScope {
    pub fn new(project_ids: Vec<String>, table: impl Into<String>, column: Option<String>) -> Self {
        Self {
            project_ids,
            table: table.into(),
            column: column.filter(|c| !c.is_empty()),
        }
    }

    /// Project ids sorted and joined with `_`. Order of the input does not
    /// matter.
    pub fn project_key(&self) -> String {
        project_set_key(&self.project_ids)
    }

    /// Column name, or `ALL` for a whole-table view.
    pub fn column_key(&self) -> &str {
        self.column.as_deref().unwrap_or("ALL")
    }

    /// The project reported on for bookkeeping rows: the first in sorted order.
    pub fn primary_project(&self) -> Option<&str> {
        self.project_ids.iter().map(String::as_str).min()
    }
}

/// Sorted, deduplicated project ids joined with `_`.
pub fn project_set_key(project_ids: &[String]) -> String {
    let mut ids: Vec<&str> = project_ids.iter().map(String::as_str).collect();
    ids.sort_unstable();
    ids.dedup();
    ids.join("_")
}
