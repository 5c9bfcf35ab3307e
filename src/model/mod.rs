mod item;
mod relation;

pub use item::{Member, UmlAttribute, UmlClass, UmlEnum, UmlItem, Visibility};
pub use relation::{RelType, UmlRelation};

use indexmap::IndexMap;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Items keyed by fqn plus the relations between them.
///
/// Item order is output order. `Clone` yields a fully independent copy,
/// which is how several diagrams are cut from one collection pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub items: IndexMap<String, UmlItem>,
    pub relations: Vec<UmlRelation>,
}

impl Domain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item: UmlItem) {
        self.items.insert(item.fqn().to_string(), item);
    }

    pub fn contains(&self, fqn: &str) -> bool {
        self.items.contains_key(fqn)
    }

    pub fn class(&self, fqn: &str) -> Option<&UmlClass> {
        self.items.get(fqn).and_then(UmlItem::as_class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &UmlClass> {
        self.items.values().filter_map(UmlItem::as_class)
    }

    pub fn classes_mut(&mut self) -> impl Iterator<Item = &mut UmlClass> {
        self.items.values_mut().filter_map(UmlItem::as_class_mut)
    }

    /// `(parent, child)` pairs of every inheritance relation, in order.
    pub fn inheritances(&self) -> Vec<(String, String)> {
        self.relations
            .iter()
            .filter(|r| r.is_inheritance())
            .map(|r| (r.source_fqn.clone(), r.target_fqn.clone()))
            .collect()
    }

    /// Inheritance edges as a graph, parent -> child.
    pub fn inheritance_graph(&self) -> DiGraph<String, ()> {
        let mut graph = DiGraph::new();
        let mut node_indices: HashMap<String, NodeIndex> = HashMap::new();

        for (parent, child) in self.inheritances() {
            let from = *node_indices
                .entry(parent.clone())
                .or_insert_with(|| graph.add_node(parent));
            let to = *node_indices
                .entry(child.clone())
                .or_insert_with(|| graph.add_node(child));
            graph.add_edge(from, to, ());
        }

        graph
    }
}
