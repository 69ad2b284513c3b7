//! Depth-bounded, cycle-safe lineage tree construction.

use std::collections::VecDeque;

use dblineage_core::errors::LineageError;
use dblineage_core::types::collections::FxHashSet;
use dblineage_core::types::{ComponentKey, ComponentRecord, LineageScope, NodeColors};

use super::graph::{EdgeKind, ReferenceGraph};
use super::tree::{LineageNode, LineageTree, NodeId};

/// Builds a tree for one scope. Holds no state between builds; the visited
/// set lives inside [`LineageBuilder::build`].
pub struct LineageBuilder<'a, G: ?Sized> {
    graph: &'a G,
    colors: &'a NodeColors,
    max_depth: u32,
}

struct Frame {
    node: NodeId,
    depth: u32,
    pending: VecDeque<(ComponentRecord, EdgeKind)>,
}

impl<'a, G: ReferenceGraph + ?Sized> LineageBuilder<'a, G> {
    pub fn new(graph: &'a G, colors: &'a NodeColors, max_depth: u32) -> Self {
        Self {
            graph,
            colors,
            max_depth: max_depth.max(1),
        }
    }

    /// Expand the scope's referencing components depth first.
    ///
    /// A component reached again through a root or call edge becomes a cycle
    /// placeholder. Reached again through a reference edge it is skipped, so
    /// a loop made only of reference edges ends without a placeholder: the
    /// edge back adds nothing the tree does not already show.
    /// Nodes at `max_depth` are leaves.
    pub fn build(&self, scope: &LineageScope) -> Result<LineageTree, LineageError> {
        let root = match &scope.column {
            Some(column) => LineageNode::column(&scope.table, column, self.colors),
            None => LineageNode::table(&scope.table, self.colors),
        };
        let mut tree = LineageTree::new(root);
        let mut visited: FxHashSet<ComponentKey> = FxHashSet::default();

        let roots = self.graph.roots(scope)?;
        let mut stack = vec![Frame {
            node: LineageTree::ROOT,
            depth: 0,
            pending: roots.into_iter().map(|r| (r, EdgeKind::Call)).collect(),
        }];

        while let Some(frame) = stack.last_mut() {
            let Some((record, edge)) = frame.pending.pop_front() else {
                stack.pop();
                continue;
            };
            let (parent, depth) = (frame.node, frame.depth);

            if !visited.insert(record.key) {
                if edge == EdgeKind::Call {
                    tree.add_child(parent, LineageNode::cycle(&record, self.colors));
                }
                continue;
            }

            let node = tree.add_child(parent, LineageNode::component(&record, self.colors));
            let child_depth = depth + 1;
            if child_depth >= self.max_depth {
                continue;
            }
            let pending = self.children(&record)?;
            if !pending.is_empty() {
                stack.push(Frame {
                    node,
                    depth: child_depth,
                    pending,
                });
            }
        }

        tracing::debug!(
            table = %scope.table,
            column = scope.column_key(),
            nodes = tree.len(),
            cycles = tree.cycle_nodes().count(),
            "built lineage tree"
        );
        Ok(tree)
    }

    fn children(&self, record: &ComponentRecord) -> Result<VecDeque<(ComponentRecord, EdgeKind)>, LineageError> {
        let calls = self.graph.call_children(record)?;
        let refs = self.graph.reference_children(record)?;
        Ok(calls
            .into_iter()
            .map(|r| (r, EdgeKind::Call))
            .chain(refs.into_iter().map(|r| (r, EdgeKind::Reference)))
            .collect())
    }
}
