//! Arena-backed lineage tree.
//!
//! Nodes live in one vector and refer to each other by index. The root is
//! always node 0. A cycle placeholder is an ordinary leaf with `is_cycle`
//! set, so serialization never follows a back edge.

use dblineage_core::errors::LineageError;
use dblineage_core::types::{ColumnInfo, ComponentKey, ComponentRecord, ComponentType, NodeColors, NodeType};
use serde::{Deserialize, Serialize};

pub type NodeId = usize;

/// Display names longer than this are cut and suffixed with `...`.
pub const MAX_DISPLAY_NAME_CHARS: usize = 40;

const TYPE_INFO_COLORS: [&str; 2] = ["#b2f1ca", "#FFFFFF"];

/// One column listed under a whole-table root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInformation {
    pub column_id: i64,
    pub name: String,
    pub display_name: String,
    pub data_type: String,
    pub color: String,
}

impl TypeInformation {
    /// Rows in the given order, with alternating background colors.
    pub fn from_columns(columns: &[ColumnInfo]) -> Vec<Self> {
        columns
            .iter()
            .enumerate()
            .map(|(i, col)| Self {
                column_id: col.id,
                name: col.name.clone(),
                display_name: col.name.clone(),
                data_type: col.data_type.clone(),
                color: TYPE_INFO_COLORS[i % 2].to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageNode {
    pub name: String,
    pub display_name: String,
    pub node_type: NodeType,
    pub component_type: ComponentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentKey>,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Stands in for a component already expanded elsewhere in this tree.
    #[serde(default)]
    pub is_cycle: bool,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_information: Vec<TypeInformation>,
}

impl LineageNode {
    fn new(name: String, node_type: NodeType, component_type: ComponentType, colors: &NodeColors) -> Self {
        Self {
            display_name: display_name(&name),
            name,
            node_type,
            component_type,
            component: None,
            color: colors.color_for(node_type).to_string(),
            description: None,
            is_cycle: false,
            parent: None,
            children: Vec::new(),
            type_information: Vec::new(),
        }
    }

    pub fn table(name: &str, colors: &NodeColors) -> Self {
        Self::new(name.to_string(), NodeType::Table, ComponentType::Table, colors)
    }

    /// Root of a column-scoped tree, named `table.column`.
    pub fn column(table: &str, column: &str, colors: &NodeColors) -> Self {
        Self::new(format!("{table}.{column}"), NodeType::Column, ComponentType::Column, colors)
    }

    pub fn component(record: &ComponentRecord, colors: &NodeColors) -> Self {
        let mut node = Self::new(
            record.name.clone(),
            record.component_type.node_type(),
            record.component_type,
            colors,
        );
        node.component = Some(record.key);
        node.description = record.description.clone();
        node
    }

    /// Non-expandable leaf for a component seen earlier in the same tree.
    pub fn cycle(record: &ComponentRecord, colors: &NodeColors) -> Self {
        let mut node = Self::component(record, colors);
        node.is_cycle = true;
        node
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Cut `name` to [`MAX_DISPLAY_NAME_CHARS`] characters plus `...`.
pub fn display_name(name: &str) -> String {
    match name.char_indices().nth(MAX_DISPLAY_NAME_CHARS) {
        Some((byte, _)) => format!("{}...", &name[..byte]),
        None => name.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageTree {
    nodes: Vec<LineageNode>,
}

impl LineageTree {
    pub const ROOT: NodeId = 0;

    pub fn new(mut root: LineageNode) -> Self {
        root.parent = None;
        root.children.clear();
        Self { nodes: vec![root] }
    }

    pub fn root(&self) -> &LineageNode {
        &self.nodes[Self::ROOT]
    }

    pub fn get(&self, id: NodeId) -> Option<&LineageNode> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Never true; a tree always has its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &LineageNode)> {
        self.nodes.iter().enumerate()
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &LineageNode)> {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(|&c| (c, &self.nodes[c]))
    }

    /// Append `node` under `parent`. Returns the new node's id.
    pub fn add_child(&mut self, parent: NodeId, mut node: LineageNode) -> NodeId {
        let id = self.nodes.len();
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent].children.push(id);
        id
    }

    pub fn set_type_information(&mut self, id: NodeId, rows: Vec<TypeInformation>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.type_information = rows;
        }
    }

    /// Edges from the root to `id`.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.nodes.get(id).and_then(|n| n.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes[parent].parent;
        }
        depth
    }

    pub fn max_depth(&self) -> usize {
        (0..self.nodes.len()).map(|id| self.depth(id)).max().unwrap_or(0)
    }

    pub fn cycle_nodes(&self) -> impl Iterator<Item = (NodeId, &LineageNode)> {
        self.nodes().filter(|(_, n)| n.is_cycle)
    }

    pub fn to_json(&self) -> Result<String, LineageError> {
        serde_json::to_string(self).map_err(|e| LineageError::Serialization {
            message: e.to_string(),
        })
    }

    /// Parse a stored tree, rejecting empty or dangling node arenas.
    pub fn from_json(json: &str) -> Result<Self, LineageError> {
        let tree: Self = serde_json::from_str(json).map_err(|e| LineageError::Serialization {
            message: e.to_string(),
        })?;
        let len = tree.nodes.len();
        let dangling = tree
            .nodes
            .iter()
            .any(|n| n.children.iter().chain(n.parent.iter()).any(|&i| i >= len));
        if len == 0 || dangling {
            return Err(LineageError::Serialization {
                message: "malformed lineage tree".to_string(),
            });
        }
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, name: &str, component_type: ComponentType) -> ComponentRecord {
        ComponentRecord {
            key: ComponentKey::Component(id),
            name: name.to_string(),
            component_type,
            description: None,
        }
    }

    #[test]
    fn long_names_are_truncated_for_display() {
        let name = "a".repeat(45);
        assert_eq!(display_name(&name), format!("{}...", "a".repeat(40)));
        assert_eq!(display_name("orders"), "orders");
        assert_eq!(display_name(&"é".repeat(40)), "é".repeat(40));
    }

    #[test]
    fn nodes_take_colors_by_type() {
        let colors = NodeColors::default();
        let proc_node = LineageNode::component(&record(1, "load_orders", ComponentType::Procedure), &colors);
        assert_eq!(proc_node.color, "#c34474");
        let call = LineageNode::component(&record(2, "save()", ComponentType::FunctionCall), &colors);
        assert_eq!(call.node_type, NodeType::Function);
        assert_eq!(call.color, "#5283a2");
        assert_eq!(LineageNode::column("users", "email", &colors).name, "users.email");
    }

    #[test]
    fn arena_links_parents_and_children() {
        let colors = NodeColors::default();
        let mut tree = LineageTree::new(LineageNode::table("orders", &colors));
        let a = tree.add_child(LineageTree::ROOT, LineageNode::component(&record(1, "a", ComponentType::Query), &colors));
        let b = tree.add_child(a, LineageNode::cycle(&record(1, "a", ComponentType::Query), &colors));
        assert_eq!(tree.depth(b), 2);
        assert_eq!(tree.max_depth(), 2);
        assert_eq!(tree.children(a).map(|(id, _)| id).collect::<Vec<_>>(), vec![b]);
        assert_eq!(tree.cycle_nodes().count(), 1);
    }

    #[test]
    fn json_round_trip_is_stable() {
        let colors = NodeColors::default();
        let mut tree = LineageTree::new(LineageNode::table("orders", &colors));
        tree.set_type_information(
            LineageTree::ROOT,
            TypeInformation::from_columns(&[
                ColumnInfo { id: 1, name: "id".into(), data_type: "INT".into(), is_primary_key: true, is_foreign_key: false },
                ColumnInfo { id: 2, name: "total".into(), data_type: "DECIMAL".into(), is_primary_key: false, is_foreign_key: false },
            ]),
        );
        tree.add_child(LineageTree::ROOT, LineageNode::component(&record(7, "q", ComponentType::Query), &colors));
        let json = tree.to_json().unwrap();
        let back = LineageTree::from_json(&json).unwrap();
        assert_eq!(back, tree);
        assert_eq!(back.to_json().unwrap(), json);
        assert_eq!(back.root().type_information[1].color, "#FFFFFF");
    }

    #[test]
    fn malformed_trees_are_rejected() {
        assert!(LineageTree::from_json(r#"{"nodes":[]}"#).is_err());
        assert!(LineageTree::from_json("not json").is_err());
    }
}
