use crate::domain::model::{FilteredGraph, RawGraph, Relationship};
use std::collections::HashSet;

/// Result of the subgraph filter. `NoRelationships` is an explicit marker,
/// distinct from a subgraph that merely turned out small: the driver
/// converts it into the "no rules to generate" outcome instead of invoking
/// the inference service on an empty payload.
#[derive(Debug, Clone)]
pub enum FilterOutcome {
    Subgraph(FilteredGraph),
    NoRelationships,
}

/// Reduces a raw graph to the elements that participate in at least one
/// relationship. Relationships with an endpoint missing from the element
/// mapping are dropped, not propagated.
pub fn filter(graph: RawGraph) -> FilterOutcome {
    let mut involved: HashSet<String> = HashSet::new();
    let mut relationships: Vec<Relationship> = Vec::new();

    for rel in graph.relationships {
        if !graph.elements.contains_key(&rel.source) || !graph.elements.contains_key(&rel.target) {
            tracing::warn!(
                "Dropping relationship with unresolved endpoint: {} -> {}",
                rel.source,
                rel.target
            );
            continue;
        }
        involved.insert(rel.source.clone());
        involved.insert(rel.target.clone());
        relationships.push(rel);
    }

    if involved.is_empty() {
        return FilterOutcome::NoRelationships;
    }

    let elements = graph
        .elements
        .into_iter()
        .filter(|(id, _)| involved.contains(id))
        .collect();

    FilterOutcome::Subgraph(FilteredGraph {
        elements,
        relationships,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ArchitectureElement;
    use std::collections::HashMap;

    fn element(id: &str) -> ArchitectureElement {
        ArchitectureElement {
            id: id.to_string(),
            title: id.to_string(),
            kind: "container".to_string(),
            description: String::new(),
            technology: None,
        }
    }

    fn rel(source: &str, target: &str) -> Relationship {
        Relationship {
            source: source.to_string(),
            target: target.to_string(),
            description: "calls".to_string(),
        }
    }

    fn graph(ids: &[&str], rels: Vec<Relationship>) -> RawGraph {
        let mut elements = HashMap::new();
        for id in ids {
            elements.insert(id.to_string(), element(id));
        }
        RawGraph {
            elements,
            relationships: rels,
        }
    }

    #[test]
    fn test_filter_drops_unconnected_elements() {
        let outcome = filter(graph(&["A", "B", "C"], vec![rel("A", "B")]));

        let filtered = match outcome {
            FilterOutcome::Subgraph(g) => g,
            FilterOutcome::NoRelationships => panic!("expected subgraph"),
        };

        assert_eq!(filtered.elements.len(), 2);
        assert!(filtered.elements.contains_key("A"));
        assert!(filtered.elements.contains_key("B"));
        assert!(!filtered.elements.contains_key("C"));
        assert_eq!(filtered.relationships.len(), 1);
    }

    #[test]
    fn test_filter_element_keys_equal_endpoint_union() {
        let outcome = filter(graph(
            &["A", "B", "C", "D"],
            vec![rel("A", "B"), rel("B", "C")],
        ));

        let filtered = match outcome {
            FilterOutcome::Subgraph(g) => g,
            FilterOutcome::NoRelationships => panic!("expected subgraph"),
        };

        let mut endpoints: HashSet<String> = HashSet::new();
        for r in &filtered.relationships {
            endpoints.insert(r.source.clone());
            endpoints.insert(r.target.clone());
        }
        let keys: HashSet<String> = filtered.elements.keys().cloned().collect();
        assert_eq!(keys, endpoints);
    }

    #[test]
    fn test_filter_drops_relationship_with_unresolved_endpoint() {
        let outcome = filter(graph(&["A", "B"], vec![rel("A", "B"), rel("A", "ghost")]));

        let filtered = match outcome {
            FilterOutcome::Subgraph(g) => g,
            FilterOutcome::NoRelationships => panic!("expected subgraph"),
        };

        assert_eq!(filtered.relationships.len(), 1);
        assert_eq!(filtered.relationships[0].target, "B");
    }

    #[test]
    fn test_filter_empty_relationships_returns_marker() {
        let outcome = filter(graph(&["A", "B"], vec![]));
        assert!(matches!(outcome, FilterOutcome::NoRelationships));
    }

    #[test]
    fn test_filter_only_dangling_relationships_returns_marker() {
        let outcome = filter(graph(&["A"], vec![rel("x", "y")]));
        assert!(matches!(outcome, FilterOutcome::NoRelationships));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let outcome = filter(graph(&["A", "B", "C"], vec![rel("A", "B")]));
        let first = match outcome {
            FilterOutcome::Subgraph(g) => g,
            FilterOutcome::NoRelationships => panic!("expected subgraph"),
        };

        let again = filter(RawGraph {
            elements: first.elements.clone(),
            relationships: first.relationships.clone(),
        });
        let second = match again {
            FilterOutcome::Subgraph(g) => g,
            FilterOutcome::NoRelationships => panic!("expected subgraph"),
        };

        assert_eq!(first.elements, second.elements);
        assert_eq!(first.relationships, second.relationships);
    }
}
