//! Integration tests for resource model projection and manifest sections.

use kubequill::document::cursor::Cursor;
use kubequill::document::node::{Block, MappingEntry};
use kubequill::document::parser::{parse_document, parse_yaml};
use kubequill::kubernetes::sections::{self, Section};
use kubequill::kubernetes::{
    get_resource_model, project_resource_model, project_tree, resources, ResourceModel,
};
use std::sync::Arc;

const MANIFESTS: &str = r#"
apiVersion: v1
kind: Pod
metadata:
  name: nginx
  labels:
    app: demo
---
apiVersion: v1
kind: Service
metadata:
  name: nginx
  namespace: web
  annotations:
    prometheus.io/scrape: "true"
spec:
  type: NodePort
---
metadata:
  name: orphan
"#;

#[test]
fn test_pod_model_serializes_as_expected() {
    let doc = parse_document(
        "apiVersion: v1\nkind: Pod\nmetadata:\n  name: nginx\n  labels:\n    app: demo\n",
    )
    .unwrap();
    let projected = project_resource_model(&doc);
    let model = get_resource_model(&projected).unwrap();

    let json = serde_json::to_value(model).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {
                "namespace": null,
                "name": "nginx",
                "annotations": null,
                "labels": { "app": "demo" }
            }
        })
    );
}

#[test]
fn test_document_without_kind_has_no_model() {
    let doc = parse_document("apiVersion: v1\nmetadata:\n  name: nginx\n").unwrap();
    assert!(get_resource_model(&project_resource_model(&doc)).is_none());
}

#[test]
fn test_project_tree_models_each_document() {
    let tree = project_tree(&parse_yaml(MANIFESTS).unwrap());
    assert_eq!(tree.len(), 3);

    let service = tree.document(1).and_then(|d| d.model()).unwrap();
    assert_eq!(service.kind(), Some("Service"));
    assert_eq!(service.metadata.namespace.as_deref(), Some("web"));
    assert_eq!(service.annotation("prometheus.io/scrape"), Some("true"));
    assert!(tree.document(2).unwrap().model().is_none());

    assert_eq!(resources(&tree, Some("Pod"), Some("v1")).len(), 1);
    assert_eq!(resources(&tree, None, Some("v1")).len(), 2);
}

#[test]
fn test_reprojection_after_edit_replaces_model() {
    let doc = parse_document("apiVersion: v1\nkind: Pod\nmetadata:\n  name: a\n").unwrap();
    let projected = project_resource_model(&doc);

    // Rename the pod by rebuilding the metadata entry.
    let body = projected.block().as_mapping().unwrap();
    let metadata = body.entries()[2].value().as_mapping().unwrap();
    let renamed = metadata.with_entry(0, MappingEntry::new("name", Block::scalar("b")));
    let edited = projected.with_block(Block::Mapping(
        body.with_entry(2, body.entries()[2].with_value(Block::Mapping(renamed))),
    ));

    // The stale model travels with the edit until the next projection.
    assert_eq!(edited.model().unwrap().metadata.name.as_deref(), Some("a"));
    let reprojected = project_resource_model(&edited);
    assert_eq!(reprojected.model().unwrap().metadata.name.as_deref(), Some("b"));

    // Untouched siblings keep their identity.
    assert!(Arc::ptr_eq(
        projected.block().as_mapping().unwrap().entries()[0].value_arc(),
        reprojected.block().as_mapping().unwrap().entries()[0].value_arc(),
    ));
}

#[test]
fn test_projection_is_idempotent() {
    let tree = project_tree(&parse_yaml(MANIFESTS).unwrap());
    let again = project_tree(&tree);
    let models: Vec<Option<&ResourceModel>> = tree.documents().map(|d| d.model()).collect();
    let models_again: Vec<Option<&ResourceModel>> = again.documents().map(|d| d.model()).collect();
    assert_eq!(models, models_again);
}

#[test]
fn test_sections_of_service() {
    let tree = parse_yaml(MANIFESTS).unwrap();
    let service = tree.document(1).unwrap();

    let spec_type = Cursor::locate(service, &["spec", "type"]).unwrap();
    assert!(sections::in_service(&spec_type));
    assert!(Section::Service.contains(&spec_type));
    assert!(!Section::Labels.contains(&spec_type));
    assert_eq!(sections::service_type(service), Some("NodePort"));

    let annotation = Cursor::locate(service, &["metadata", "annotations", "prometheus.io/scrape"]).unwrap();
    assert_eq!(
        Section::at(&annotation),
        vec![Section::Resource, Section::Metadata, Section::Annotations]
    );
}
