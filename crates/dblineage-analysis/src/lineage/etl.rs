//! ETL flow attachment.

use dblineage_core::types::{NodeColors, NodeType, TableFlow};

use super::tree::{LineageNode, LineageTree, NodeId};

const DEFAULT_FLOW_TYPE: &str = "TRANSFORM";

/// Append a TABLE node for each flow target under every matching procedure
/// node. Only flows whose source is `table` count. A flow matches a
/// procedure by its procedure name, or by its source table when it names no
/// procedure. Cycle placeholders stay leaves. Returns how many nodes were
/// added.
pub fn attach_etl_flows(tree: &mut LineageTree, table: &str, flows: &[TableFlow], colors: &NodeColors) -> usize {
    let mut relevant: Vec<&TableFlow> = flows
        .iter()
        .filter(|f| f.source_table.eq_ignore_ascii_case(table) && !f.target_table.is_empty())
        .collect();
    if relevant.is_empty() {
        return 0;
    }
    relevant.sort_by_key(|f| f.flow_sequence);

    let procedures: Vec<(NodeId, String)> = tree
        .nodes()
        .filter(|(_, n)| n.node_type == NodeType::Procedure && !n.is_cycle)
        .map(|(id, n)| (id, n.name.clone()))
        .collect();

    let mut added = 0;
    for (id, name) in procedures {
        for flow in &relevant {
            let via = flow.procedure_name.as_deref().unwrap_or(&flow.source_table);
            if !via.eq_ignore_ascii_case(&name) {
                continue;
            }
            let flow_type = flow.flow_type.as_deref().unwrap_or(DEFAULT_FLOW_TYPE);
            let node = LineageNode::table(&flow.target_table, colors).with_description(format!("ETL: {flow_type}"));
            tree.add_child(id, node);
            added += 1;
        }
    }
    if added > 0 {
        tracing::debug!(table, added, "attached ETL targets");
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use dblineage_core::types::{ComponentKey, ComponentRecord, ComponentType};

    fn flow(source: &str, target: &str, procedure: Option<&str>, seq: i64, kind: Option<&str>) -> TableFlow {
        TableFlow {
            source_table: source.to_string(),
            target_table: target.to_string(),
            procedure_name: procedure.map(str::to_string),
            flow_sequence: seq,
            flow_type: kind.map(str::to_string),
        }
    }

    #[test]
    fn targets_hang_under_matching_procedures() {
        let colors = NodeColors::default();
        let mut tree = LineageTree::new(LineageNode::table("orders", &colors));
        let proc_record = ComponentRecord {
            key: ComponentKey::Component(1),
            name: "LOAD_ORDERS".to_string(),
            component_type: ComponentType::Procedure,
            description: None,
        };
        let proc_id = tree.add_child(LineageTree::ROOT, LineageNode::component(&proc_record, &colors));
        tree.add_child(proc_id, LineageNode::cycle(&proc_record, &colors));

        let flows = vec![
            flow("orders", "orders_archive", Some("load_orders"), 2, None),
            flow("orders", "orders_daily", Some("load_orders"), 1, Some("AGGREGATE")),
            flow("users", "users_copy", Some("load_orders"), 1, None),
        ];
        assert_eq!(attach_etl_flows(&mut tree, "orders", &flows, &colors), 2);

        let targets: Vec<_> = tree
            .children(proc_id)
            .filter(|(_, n)| n.node_type == NodeType::Table)
            .map(|(_, n)| (n.name.clone(), n.description.clone().unwrap_or_default()))
            .collect();
        assert_eq!(
            targets,
            vec![
                ("orders_daily".to_string(), "ETL: AGGREGATE".to_string()),
                ("orders_archive".to_string(), "ETL: TRANSFORM".to_string()),
            ]
        );
    }

    #[test]
    fn no_flows_no_changes() {
        let colors = NodeColors::default();
        let mut tree = LineageTree::new(LineageNode::table("orders", &colors));
        assert_eq!(attach_etl_flows(&mut tree, "orders", &[], &colors), 0);
        assert_eq!(tree.len(), 1);
    }
}
