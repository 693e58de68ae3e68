//! Memory estimation and admission integration tests

#[path = "testutils/mod.rs"]
mod testutils;

use graphlite_analytics::{human_readable, ExecutionError, MemoryGuard, MemoryGraphSource};
use graphlite_analytics::AnalyticsEngine;
use serde_json::json;
use std::sync::Arc;
use testutils::{config, ConfigMap, TestFixture};

const ESTIMATE_SUFFIX: &str = ".estimate";

fn estimate_config(operation: &str) -> ConfigMap {
    if operation.contains(".write") {
        config(&[("writeProperty", json!("value"))])
    } else {
        ConfigMap::empty()
    }
}

#[test]
fn test_compute_and_estimate_operations_are_in_bijection() {
    let fixture = TestFixture::star();
    let operations = fixture.engine.operations();
    for name in &operations {
        if name.ends_with(ESTIMATE_SUFFIX) {
            let compute = name.trim_end_matches(ESTIMATE_SUFFIX).to_string();
            assert!(
                operations.contains(&compute),
                "estimate `{name}` lacks a compute operation"
            );
        } else {
            let estimate = format!("{name}{ESTIMATE_SUFFIX}");
            assert!(
                operations.contains(&estimate),
                "compute `{name}` lacks an estimate operation"
            );
        }
    }
}

#[test]
fn test_every_estimate_yields_positive_consistent_figures() {
    let fixture = TestFixture::star();
    for name in fixture.engine.operations() {
        if !name.ends_with(ESTIMATE_SUFFIX) {
            continue;
        }
        let row = fixture
            .engine
            .run(&name, &estimate_config(&name))
            .unwrap()
            .into_estimate()
            .unwrap();

        assert!(row.bytes_min > 0, "{name}: bytes_min must be positive");
        assert!(
            row.bytes_max >= row.bytes_min,
            "{name}: bytes_max below bytes_min"
        );
        assert_eq!(row.node_count, 4);
        // undirected algorithms count both stored directions
        assert!(row.relationship_count == 2 || row.relationship_count == 4, "{name}");

        // the human-readable minimum appears verbatim in both renderings
        let rendered_min = human_readable(row.bytes_min);
        assert!(row.required_memory.contains(&rendered_min), "{name}");
        assert!(row.tree_view.contains(&rendered_min), "{name}");
    }
}

#[test]
fn test_estimate_is_deterministic() {
    let fixture = TestFixture::star();
    let map = config(&[("concurrency", json!(2))]);
    let first = fixture
        .engine
        .run("wcc.stream.estimate", &map)
        .unwrap()
        .into_estimate()
        .unwrap();
    let second = fixture
        .engine
        .run("wcc.stream.estimate", &map)
        .unwrap()
        .into_estimate()
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_per_thread_components_scale_with_concurrency() {
    let fixture = TestFixture::isolated(1000);
    let low = fixture
        .engine
        .run("wcc.stream.estimate", &config(&[("concurrency", json!(1))]))
        .unwrap()
        .into_estimate()
        .unwrap();
    let high = fixture
        .engine
        .run("wcc.stream.estimate", &config(&[("concurrency", json!(4))]))
        .unwrap()
        .into_estimate()
        .unwrap();
    assert!(high.bytes_min > low.bytes_min);
}

#[test]
fn test_estimate_uses_catalog_dimensions() {
    let fixture = TestFixture::star();
    fixture
        .engine
        .graph_project("g", &ConfigMap::empty())
        .unwrap();
    let row = fixture
        .engine
        .run("degree.stream.estimate", &config(&[("graph", json!("g"))]))
        .unwrap()
        .into_estimate()
        .unwrap();
    assert_eq!(row.node_count, 4);
    assert_eq!(row.relationship_count, 2);
}

#[test]
fn test_degree_estimate_has_no_variability() {
    let fixture = TestFixture::star();
    let row = fixture
        .engine
        .run("degree.stream.estimate", &ConfigMap::empty())
        .unwrap()
        .into_estimate()
        .unwrap();
    assert_eq!(row.bytes_min, row.bytes_max);
}

#[test]
fn test_admission_blocks_run_below_minimum() {
    let estimate = TestFixture::star()
        .engine
        .run("wcc.stream.estimate", &ConfigMap::empty())
        .unwrap()
        .into_estimate()
        .unwrap();

    let mut source = MemoryGraphSource::new(4);
    source.add_relationship("REL", 0, 1);
    source.add_relationship("REL", 0, 2);
    let available = estimate.bytes_min - 1;
    let engine =
        AnalyticsEngine::new(Arc::new(source)).with_memory_guard(MemoryGuard::fixed(available));

    let error = engine.run("wcc.stream", &ConfigMap::empty()).unwrap_err();
    assert!(matches!(error, ExecutionError::Resource(_)));
    let message = error.to_string();
    assert_eq!(
        message,
        format!(
            "Procedure was blocked since minimum estimated memory ({}) exceeds current free memory ({}).",
            human_readable(estimate.bytes_min),
            human_readable(available)
        )
    );
}

#[test]
fn test_admission_passes_at_maximum() {
    let estimate = TestFixture::star()
        .engine
        .run("wcc.stream.estimate", &ConfigMap::empty())
        .unwrap()
        .into_estimate()
        .unwrap();

    let mut source = MemoryGraphSource::new(4);
    source.add_relationship("REL", 0, 1);
    source.add_relationship("REL", 0, 2);
    let engine = AnalyticsEngine::new(Arc::new(source))
        .with_memory_guard(MemoryGuard::fixed(estimate.bytes_max));

    assert!(engine.run("wcc.stream", &ConfigMap::empty()).is_ok());
}

#[test]
fn test_blocked_run_leaves_catalog_untouched() {
    let fixture = TestFixture::star();
    let engine = AnalyticsEngine::new(fixture.source.clone())
        .with_memory_guard(MemoryGuard::fixed(0));
    assert!(engine.run("wcc.stream", &ConfigMap::empty()).is_err());
    assert!(engine.graph_list().is_empty());
    assert!(fixture.source.written_property("anything").is_none());
}
