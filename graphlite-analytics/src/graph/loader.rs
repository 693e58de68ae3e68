// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Graph materialization
//!
//! The loader resolves a projection against a `GraphSource` and builds the
//! immutable CSR `Graph`. Selector and property validation happens here, so
//! a projection naming unknown labels, relationship types or properties
//! fails before any adjacency is allocated.

use super::graph::Graph;
use super::projection::{ElementSelector, GraphProjection, Orientation, ProjectionError};
use super::source::{GraphSource, SourceError};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

pub type LoadResult<T> = Result<T, LoadError>;

/// Materializes a graph from `source` under `projection`.
pub fn load_graph(source: &dyn GraphSource, projection: &GraphProjection) -> LoadResult<Graph> {
    let available_labels = source.node_labels();
    let missing_labels = projection.node_selector.missing_from(&available_labels);
    if !missing_labels.is_empty() {
        return Err(ProjectionError::LabelsNotFound(missing_labels).into());
    }

    let available_types = source.relationship_types();
    let missing_types = projection
        .relationship_selector
        .missing_from(&available_types);
    if !missing_types.is_empty() {
        return Err(ProjectionError::RelationshipTypesNotFound(missing_types).into());
    }

    let node_count = source.node_count() as usize;
    let relationships = source.relationships(&projection.relationship_selector);

    // Degree counting pass, then CSR fill. Orientation decides which
    // endpoints contribute adjacency entries.
    let mut degrees = vec![0usize; node_count];
    let each_edge = |f: &mut dyn FnMut(u64, u64)| {
        for rel in &relationships {
            match projection.orientation {
                Orientation::Natural => f(rel.source, rel.target),
                Orientation::Reverse => f(rel.target, rel.source),
                Orientation::Undirected => {
                    f(rel.source, rel.target);
                    f(rel.target, rel.source);
                }
            }
        }
    };
    each_edge(&mut |s, _| degrees[s as usize] += 1);

    let mut offsets = vec![0usize; node_count + 1];
    for node in 0..node_count {
        offsets[node + 1] = offsets[node] + degrees[node];
    }
    let mut cursors = offsets.clone();
    let mut targets = vec![0u64; offsets[node_count]];
    each_edge(&mut |s, t| {
        let slot = cursors[s as usize];
        targets[slot] = t;
        cursors[s as usize] += 1;
    });
    // Sorted adjacency gives deterministic traversal order regardless of
    // source insertion order.
    for node in 0..node_count {
        targets[offsets[node]..offsets[node + 1]].sort_unstable();
    }

    let properties = project_properties(source, &projection.node_properties)?;

    let labels = match &projection.node_selector {
        ElementSelector::All => available_labels,
        ElementSelector::Include(names) => names.clone(),
    };
    let relationship_types = match &projection.relationship_selector {
        ElementSelector::All => available_types,
        ElementSelector::Include(names) => names.clone(),
    };

    Ok(Graph::new(
        node_count,
        offsets,
        targets,
        labels,
        relationship_types,
        properties,
    ))
}

fn project_properties(
    source: &dyn GraphSource,
    requested: &[String],
) -> LoadResult<HashMap<String, Arc<Vec<f64>>>> {
    let mut properties = HashMap::with_capacity(requested.len());
    let mut missing = Vec::new();
    for name in requested {
        match source.node_property(name) {
            Some(column) => {
                properties.insert(name.clone(), Arc::new(column));
            }
            None => missing.push(name.clone()),
        }
    }
    if missing.is_empty() {
        Ok(properties)
    } else {
        Err(SourceError::PropertiesNotFound(missing).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::source::MemoryGraphSource;

    fn source_ab() -> MemoryGraphSource {
        let mut source = MemoryGraphSource::new(3);
        source.add_label(0, "A");
        source.add_label(1, "B");
        source.add_label(2, "B");
        source.add_relationship("X", 0, 1);
        source.add_relationship("X", 0, 2);
        source
    }

    #[test]
    fn test_load_natural() {
        let graph = load_graph(&source_ab(), &GraphProjection::default()).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.relationship_count(), 2);
        assert_eq!(graph.neighbors(0), &[1, 2]);
        assert_eq!(graph.neighbors(1), &[] as &[u64]);
    }

    #[test]
    fn test_load_reverse() {
        let projection = GraphProjection {
            orientation: Orientation::Reverse,
            ..GraphProjection::default()
        };
        let graph = load_graph(&source_ab(), &projection).unwrap();
        assert_eq!(graph.neighbors(1), &[0]);
        assert_eq!(graph.neighbors(0), &[] as &[u64]);
    }

    #[test]
    fn test_load_undirected_doubles_relationships() {
        let projection = GraphProjection {
            orientation: Orientation::Undirected,
            ..GraphProjection::default()
        };
        let graph = load_graph(&source_ab(), &projection).unwrap();
        assert_eq!(graph.relationship_count(), 4);
        assert_eq!(graph.neighbors(0), &[1, 2]);
        assert_eq!(graph.neighbors(2), &[0]);
    }

    #[test]
    fn test_unknown_label_fails_with_all_missing_names() {
        let projection = GraphProjection {
            node_selector: ElementSelector::Include(vec!["A".to_string(), "C".to_string()]),
            ..GraphProjection::default()
        };
        let error = load_graph(&source_ab(), &projection).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Invalid node projection, one or more labels not found: 'C'"
        );
    }

    #[test]
    fn test_unknown_relationship_types_fail_in_declaration_order() {
        let projection = GraphProjection {
            relationship_selector: ElementSelector::Include(vec![
                "Y".to_string(),
                "Z".to_string(),
            ]),
            ..GraphProjection::default()
        };
        let error = load_graph(&source_ab(), &projection).unwrap_err();
        assert_eq!(error.to_string(), "Relationship type(s) not found: 'Y', 'Z'");
    }

    #[test]
    fn test_unknown_property_fails() {
        let projection = GraphProjection {
            node_properties: vec!["seed".to_string()],
            ..GraphProjection::default()
        };
        let error = load_graph(&source_ab(), &projection).unwrap_err();
        assert_eq!(error.to_string(), "Node properties not found: 'seed'");
    }

    #[test]
    fn test_property_projection() {
        let mut source = source_ab();
        source.set_node_property("seed", vec![7.0, 7.0, 9.0]);
        let projection = GraphProjection {
            node_properties: vec!["seed".to_string()],
            ..GraphProjection::default()
        };
        let graph = load_graph(&source, &projection).unwrap();
        assert_eq!(*graph.node_property("seed").unwrap(), vec![7.0, 7.0, 9.0]);
    }
}
