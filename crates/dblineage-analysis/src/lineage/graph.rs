//! Where lineage generation finds referencing components.
//!
//! The persisted component graph is the canonical source. When a project
//! has no component graph, or none of its components reference the scope,
//! the flat usage view is used instead: every source file touching the
//! scope becomes a `FILE` pseudo-component without children.

use dblineage_core::errors::LineageError;
use dblineage_core::traits::LineageStore;
use dblineage_core::types::collections::FxHashMap;
use dblineage_core::types::{ComponentKey, ComponentRecord, LineageScope};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

pub trait ReferenceGraph {
    /// Components directly referencing the scoped table or column.
    fn roots(&self, scope: &LineageScope) -> Result<Vec<ComponentRecord>, LineageError>;

    /// Callees of `parent`, in call order.
    fn call_children(&self, parent: &ComponentRecord) -> Result<Vec<ComponentRecord>, LineageError>;

    /// Components referencing `parent` that are not among its call children.
    fn reference_children(&self, parent: &ComponentRecord)
        -> Result<Vec<ComponentRecord>, LineageError>;
}

/// Reference graph read from a [`LineageStore`].
pub struct StoreGraph<'a, S: ?Sized> {
    store: &'a S,
    has_components: bool,
}

impl<'a, S: LineageStore + ?Sized> StoreGraph<'a, S> {
    /// Decides once, for the whole generation, whether a component graph
    /// exists for these projects.
    pub fn new(store: &'a S, project_ids: &[String]) -> Result<Self, LineageError> {
        let has_components = store.has_component_graph(project_ids)?;
        Ok(Self {
            store,
            has_components,
        })
    }

    pub fn has_components(&self) -> bool {
        self.has_components
    }
}

impl<S: LineageStore + ?Sized> ReferenceGraph for StoreGraph<'_, S> {
    fn roots(&self, scope: &LineageScope) -> Result<Vec<ComponentRecord>, LineageError> {
        if self.has_components {
            let components = self.store.referencing_components(scope)?;
            if !components.is_empty() {
                return Ok(components);
            }
        }
        let files = self.store.usage_files(scope)?;
        tracing::debug!(
            table = %scope.table,
            column = scope.column_key(),
            files = files.len(),
            "using flat usage view"
        );
        Ok(files)
    }

    fn call_children(&self, parent: &ComponentRecord) -> Result<Vec<ComponentRecord>, LineageError> {
        match parent.key {
            ComponentKey::Component(id) => Ok(self.store.call_children(id)?),
            ComponentKey::File(_) => Ok(Vec::new()),
        }
    }

    fn reference_children(&self, parent: &ComponentRecord) -> Result<Vec<ComponentRecord>, LineageError> {
        match parent.key {
            ComponentKey::Component(id) => Ok(self.store.reference_children(id)?),
            ComponentKey::File(_) => Ok(Vec::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Call,
    Reference,
}

/// In-memory reference graph, for synthetic or pre-loaded graphs.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    graph: DiGraph<ComponentRecord, EdgeKind>,
    index: FxHashMap<ComponentKey, NodeIndex>,
    roots: FxHashMap<(String, String), Vec<NodeIndex>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a component, or return the existing node for its key.
    pub fn add_component(&mut self, record: ComponentRecord) -> NodeIndex {
        if let Some(&idx) = self.index.get(&record.key) {
            return idx;
        }
        let key = record.key;
        let idx = self.graph.add_node(record);
        self.index.insert(key, idx);
        idx
    }

    /// `child` is called by `parent`. Both must have been added.
    pub fn add_call(&mut self, parent: ComponentKey, child: ComponentKey) -> bool {
        self.add_edge(parent, child, EdgeKind::Call)
    }

    /// `child` references `parent`. Both must have been added.
    pub fn add_reference(&mut self, parent: ComponentKey, child: ComponentKey) -> bool {
        self.add_edge(parent, child, EdgeKind::Reference)
    }

    fn add_edge(&mut self, parent: ComponentKey, child: ComponentKey, kind: EdgeKind) -> bool {
        match (self.index.get(&parent), self.index.get(&child)) {
            (Some(&p), Some(&c)) => {
                self.graph.add_edge(p, c, kind);
                true
            }
            _ => false,
        }
    }

    /// Register `component` as directly referencing `table` (or one column
    /// of it when `column` is given).
    pub fn add_root(&mut self, table: &str, column: Option<&str>, component: ComponentKey) -> bool {
        let Some(&idx) = self.index.get(&component) else {
            return false;
        };
        let slot = (table.to_lowercase(), column.unwrap_or("").to_lowercase());
        let roots = self.roots.entry(slot).or_default();
        if !roots.contains(&idx) {
            roots.push(idx);
        }
        true
    }

    pub fn component_count(&self) -> usize {
        self.graph.node_count()
    }

    fn children(&self, parent: &ComponentRecord, kind: EdgeKind) -> Vec<NodeIndex> {
        let Some(&idx) = self.index.get(&parent.key) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|e| *e.weight() == kind)
            .map(|e| (e.id().index(), e.target()))
            .collect();
        edges.sort_unstable_by_key(|(order, _)| *order);
        let mut targets: Vec<NodeIndex> = Vec::with_capacity(edges.len());
        for (_, target) in edges {
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
        targets
    }

    fn records(&self, nodes: impl IntoIterator<Item = NodeIndex>) -> Vec<ComponentRecord> {
        nodes.into_iter().map(|n| self.graph[n].clone()).collect()
    }
}

impl ReferenceGraph for MemoryGraph {
    fn roots(&self, scope: &LineageScope) -> Result<Vec<ComponentRecord>, LineageError> {
        let column = scope.column.as_deref().unwrap_or("").to_lowercase();
        let slot = (scope.table.to_lowercase(), column);
        Ok(self
            .roots
            .get(&slot)
            .map(|nodes| self.records(nodes.iter().copied()))
            .unwrap_or_default())
    }

    fn call_children(&self, parent: &ComponentRecord) -> Result<Vec<ComponentRecord>, LineageError> {
        Ok(self.records(self.children(parent, EdgeKind::Call)))
    }

    fn reference_children(&self, parent: &ComponentRecord) -> Result<Vec<ComponentRecord>, LineageError> {
        let calls = self.children(parent, EdgeKind::Call);
        let refs = self
            .children(parent, EdgeKind::Reference)
            .into_iter()
            .filter(|n| !calls.contains(n));
        Ok(self.records(refs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dblineage_core::types::ComponentType;

    fn record(id: i64, name: &str) -> ComponentRecord {
        ComponentRecord {
            key: ComponentKey::Component(id),
            name: name.to_string(),
            component_type: ComponentType::Function,
            description: None,
        }
    }

    #[test]
    fn children_keep_insertion_order() {
        let mut graph = MemoryGraph::new();
        for (id, name) in [(1, "root"), (2, "b"), (3, "a"), (4, "c")] {
            graph.add_component(record(id, name));
        }
        graph.add_call(ComponentKey::Component(1), ComponentKey::Component(2));
        graph.add_call(ComponentKey::Component(1), ComponentKey::Component(3));
        graph.add_reference(ComponentKey::Component(1), ComponentKey::Component(3));
        graph.add_reference(ComponentKey::Component(1), ComponentKey::Component(4));

        let parent = record(1, "root");
        let calls: Vec<_> = graph.call_children(&parent).unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(calls, vec!["b", "a"]);
        let refs: Vec<_> = graph.reference_children(&parent).unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(refs, vec!["c"]);
    }

    #[test]
    fn roots_are_scoped_by_table_and_column() {
        let mut graph = MemoryGraph::new();
        graph.add_component(record(1, "q1"));
        graph.add_component(record(2, "q2"));
        graph.add_root("Orders", None, ComponentKey::Component(1));
        graph.add_root("orders", Some("total"), ComponentKey::Component(2));
        assert!(!graph.add_root("orders", None, ComponentKey::Component(99)));

        let table = LineageScope::new(vec!["p".into()], "orders", None);
        let column = LineageScope::new(vec!["p".into()], "orders", Some("TOTAL".into()));
        assert_eq!(graph.roots(&table).unwrap()[0].name, "q1");
        assert_eq!(graph.roots(&column).unwrap()[0].name, "q2");
    }
}
