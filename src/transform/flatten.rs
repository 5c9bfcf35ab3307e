use crate::model::{Domain, UmlAttribute};
use crate::transform::TransformError;
use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use tracing::debug;

type Edge = (String, String);

/// Copy every inherited attribute into the inheriting class, unless the
/// child already holds an equal attribute.
///
/// Ancestors are flattened before their descendants, so a grandchild ends up
/// with the attributes of the whole chain. Inheritance relations stay in the
/// domain; only the working set is consumed.
pub fn include_parent_members(domain: &mut Domain) -> Result<(), TransformError> {
    reject_cycles(domain)?;

    let mut pending: Vec<Edge> = domain.inheritances();
    let total = pending.len();
    while let Some(edge) = pending.first().cloned() {
        flatten_edge(domain, &mut pending, &edge);
    }

    debug!(relations = total, "included parent members");
    Ok(())
}

fn flatten_edge(domain: &mut Domain, pending: &mut Vec<Edge>, edge: &Edge) {
    let (parent, child) = edge;

    let grandparents: Vec<Edge> = pending
        .iter()
        .filter(|(_, c)| c == parent)
        .cloned()
        .collect();
    for upper in &grandparents {
        if pending.contains(upper) {
            flatten_edge(domain, pending, upper);
        }
    }

    let inherited: Vec<UmlAttribute> = domain
        .class(parent)
        .map(|c| c.attributes.clone())
        .unwrap_or_default();
    if let Some(target) = domain.items.get_mut(child).and_then(|i| i.as_class_mut()) {
        for attribute in inherited {
            if !target.attributes.contains(&attribute) {
                target.attributes.push(attribute);
            }
        }
    }

    if let Some(pos) = pending.iter().position(|e| e == edge) {
        pending.remove(pos);
    }
}

fn reject_cycles(domain: &Domain) -> Result<(), TransformError> {
    let graph = domain.inheritance_graph();

    for scc in tarjan_scc(&graph) {
        let is_cycle = scc.len() > 1
            || graph
                .neighbors_directed(scc[0], Direction::Outgoing)
                .any(|n| n == scc[0]);
        if is_cycle {
            let mut cycle: Vec<String> = scc
                .iter()
                .filter_map(|idx| graph.node_weight(*idx).cloned())
                .collect();
            cycle.sort();
            return Err(TransformError::CyclicInheritance { cycle });
        }
    }

    Ok(())
}
