//! In-memory knowledge-base model.
//!
//! The store is a directed multigraph: nodes are entities, every edge is one
//! `(subject, property, object)` fact. This replaces a remote query endpoint
//! with something a test or a training run can seed locally; the executor in
//! [`crate::query`] only ever reads it.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

/// A triple store over named entities.
#[derive(Debug, Clone, Default)]
pub struct KbModel {
    graph: DiGraph<String, String>,
    index: HashMap<String, NodeIndex>,
}

impl KbModel {
    /// An empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// A small geography model used by tests and demos.
    ///
    /// Facts are read `subject property object`, with `P36` as
    /// "is the capital of", `P31` as "is an instance of" and `Q515` as the
    /// city class.
    pub fn toy_geography() -> Self {
        let mut model = Self::new();
        // Q90 Paris, Q142 France, Q64 Berlin, Q183 Germany, Q220 Rome,
        // Q38 Italy, Q515 city class, Q6256 country class
        model.add_fact("Q90", "P36", "Q142");
        model.add_fact("Q64", "P36", "Q183");
        model.add_fact("Q220", "P36", "Q38");
        for city in ["Q90", "Q64", "Q220"] {
            model.add_fact(city, "P31", "Q515");
        }
        for country in ["Q142", "Q183", "Q38"] {
            model.add_fact(country, "P31", "Q6256");
        }
        model
    }

    /// Intern an entity, returning its node.
    pub fn add_entity(&mut self, id: &str) -> NodeIndex {
        if let Some(&node) = self.index.get(id) {
            return node;
        }
        let node = self.graph.add_node(id.to_string());
        self.index.insert(id.to_string(), node);
        node
    }

    /// Record one `(subject, property, object)` fact.
    pub fn add_fact(&mut self, subject: &str, property: &str, object: &str) {
        let s = self.add_entity(subject);
        let o = self.add_entity(object);
        self.graph.add_edge(s, o, property.to_string());
    }

    /// True when the entity is known.
    pub fn contains_entity(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// True when the exact fact is recorded.
    pub fn has_fact(&self, subject: &str, property: &str, object: &str) -> bool {
        let (Some(&s), Some(&o)) = (self.index.get(subject), self.index.get(object)) else {
            return false;
        };
        self.graph
            .edges_connecting(s, o)
            .any(|edge| edge.weight() == property)
    }

    /// All recorded facts.
    pub fn triples(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.graph.edge_references().map(|edge| {
            (
                self.graph[edge.source()].as_str(),
                edge.weight().as_str(),
                self.graph[edge.target()].as_str(),
            )
        })
    }

    /// Objects `o` such that `(subject, property, o)` holds.
    pub fn objects(&self, subject: &str, property: &str) -> Vec<&str> {
        let Some(&s) = self.index.get(subject) else {
            return Vec::new();
        };
        self.graph
            .edges(s)
            .filter(|edge| edge.weight() == property)
            .map(|edge| self.graph[edge.target()].as_str())
            .collect()
    }

    /// Subjects `s` such that `(s, property, object)` holds.
    pub fn subjects(&self, property: &str, object: &str) -> Vec<&str> {
        self.triples()
            .filter(|(_, p, o)| *p == property && *o == object)
            .map(|(s, _, _)| s)
            .collect()
    }

    /// Number of known entities.
    pub fn entity_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of recorded facts.
    pub fn fact_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facts_and_lookups() {
        let model = KbModel::toy_geography();
        assert!(model.has_fact("Q90", "P36", "Q142"));
        assert!(!model.has_fact("Q90", "P36", "Q183"));
        assert!(model.contains_entity("Q515"));

        assert_eq!(model.objects("Q90", "P36"), vec!["Q142"]);
        assert_eq!(model.subjects("P36", "Q142"), vec!["Q90"]);
    }

    #[test]
    fn test_entities_are_interned_once() {
        let mut model = KbModel::new();
        model.add_fact("Q1", "P1", "Q2");
        model.add_fact("Q1", "P2", "Q2");
        assert_eq!(model.entity_count(), 2);
        assert_eq!(model.fact_count(), 2);
    }

    #[test]
    fn test_class_membership_as_triples() {
        let model = KbModel::toy_geography();
        let mut cities = model.subjects("P31", "Q515");
        cities.sort();
        assert_eq!(cities, vec!["Q220", "Q64", "Q90"]);
    }
}
