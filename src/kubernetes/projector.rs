//! Derives a [`ResourceModel`] from a document in one traversal.
//!
//! Scalar entry values are recognized by the keys of their enclosing entries,
//! root first, with sequence indices skipped: `apiVersion`, `kind`,
//! `metadata/name`, `metadata/namespace`, `metadata/labels/<key>` and
//! `metadata/annotations/<key>`. Recognized values are left as messages on
//! the document frame and turned into a model once the whole document has
//! been walked.

use indexmap::IndexMap;
use tracing::debug;

use super::model::{Metadata, ResourceModel};
use crate::document::cursor::{Cursor, Message, Messages};
use crate::document::node::{Document, MappingEntry, NodeKind};
use crate::document::tree::YamlTree;
use crate::document::visitor::{walk_document, Visitor};

const API_VERSION: &str = "apiVersion";
const KIND: &str = "kind";
const NAME: &str = "name";
const NAMESPACE: &str = "namespace";
const LABELS: &str = "labels";
const ANNOTATIONS: &str = "annotations";

#[derive(Default)]
struct ModelProjector {
    model: Option<ResourceModel>,
}

impl<'a> Visitor<'a> for ModelProjector {
    fn visit_mapping_entry(&mut self, entry: &'a MappingEntry, cursor: &mut Cursor<'a>) {
        let Some(scalar) = entry.value().as_scalar() else {
            return;
        };
        let value = scalar.value().to_string();

        match cursor.entry_keys().as_slice() {
            [API_VERSION] => put_text(cursor, API_VERSION, value),
            [KIND] => put_text(cursor, KIND, value),
            ["metadata", NAME] => put_text(cursor, NAME, value),
            ["metadata", NAMESPACE] => put_text(cursor, NAMESPACE, value),
            ["metadata", LABELS, rest @ ..] if !rest.is_empty() => {
                put_entry(cursor, LABELS, rest.join("/"), value)
            }
            ["metadata", ANNOTATIONS, rest @ ..] if !rest.is_empty() => {
                put_entry(cursor, ANNOTATIONS, rest.join("/"), value)
            }
            _ => {}
        }
    }

    fn leave_document(&mut self, _document: &'a Document, messages: Messages) {
        let text = |name: &str| {
            messages
                .get(name)
                .and_then(Message::as_text)
                .map(str::to_string)
        };
        let entries = |name: &str| messages.get(name).and_then(Message::as_entries).cloned();

        let api_version = text(API_VERSION);
        let kind = text(KIND);
        if api_version.is_none() || kind.is_none() {
            debug!(?api_version, ?kind, "document is not a resource");
            self.model = None;
            return;
        }

        let model = ResourceModel {
            api_version,
            kind,
            metadata: Metadata {
                namespace: text(NAMESPACE),
                name: text(NAME),
                annotations: entries(ANNOTATIONS),
                labels: entries(LABELS),
            },
        };
        debug!(
            kind = model.kind(),
            name = model.metadata.name.as_deref(),
            "projected resource model"
        );
        self.model = Some(model);
    }
}

fn put_text(cursor: &mut Cursor<'_>, name: &str, value: String) {
    cursor.put_message_on_first_enclosing(NodeKind::Document, name, Message::Text(value));
}

fn put_entry(cursor: &mut Cursor<'_>, name: &str, key: String, value: String) {
    let message = cursor.compute_message_if_absent(NodeKind::Document, name, || {
        Message::Entries(IndexMap::new())
    });
    if let Some(Message::Entries(map)) = message {
        map.insert(key, value);
    }
}

/// Returns `document` carrying a freshly derived model.
///
/// Any model already attached is replaced, and dropped if the document no
/// longer has both `apiVersion` and `kind`. The body is shared, not copied.
pub fn project_resource_model(document: &Document) -> Document {
    let mut projector = ModelProjector::default();
    walk_document(document, &mut projector);
    document.with_model(projector.model)
}

/// Projects every document of `tree`.
pub fn project_tree(tree: &YamlTree) -> YamlTree {
    tree.map_documents(project_resource_model)
}

/// The model attached by [`project_resource_model`], if the document is a
/// resource.
pub fn get_resource_model(document: &Document) -> Option<&ResourceModel> {
    document.model()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parser::{parse_document, parse_yaml};
    use std::sync::Arc;

    #[test]
    fn test_projects_pod() {
        let doc = parse_document(
            r#"
apiVersion: v1
kind: Pod
metadata:
  name: nginx
  labels:
    app: demo
"#,
        )
        .unwrap();
        let projected = project_resource_model(&doc);
        let model = get_resource_model(&projected).unwrap();

        assert_eq!(model.api_version(), Some("v1"));
        assert_eq!(model.kind(), Some("Pod"));
        assert_eq!(model.metadata.name.as_deref(), Some("nginx"));
        assert_eq!(model.metadata.namespace, None);
        assert_eq!(model.metadata.annotations, None);
        assert_eq!(model.label("app"), Some("demo"));
        assert!(Arc::ptr_eq(doc.block_arc(), projected.block_arc()));
    }

    #[test]
    fn test_missing_kind_has_no_model() {
        let doc = parse_document("apiVersion: v1\nmetadata:\n  name: x\n").unwrap();
        assert!(get_resource_model(&project_resource_model(&doc)).is_none());
    }

    #[test]
    fn test_nested_metadata_is_ignored() {
        let doc = parse_document(
            r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
spec:
  template:
    metadata:
      name: inner
      labels:
        tier: frontend
"#,
        )
        .unwrap();
        let model = project_resource_model(&doc).model().cloned().unwrap();
        assert_eq!(model.metadata.name.as_deref(), Some("web"));
        assert_eq!(model.metadata.labels, None);
    }

    #[test]
    fn test_annotation_keys_keep_slashes() {
        let doc = parse_document(
            r#"
apiVersion: networking.k8s.io/v1
kind: Ingress
metadata:
  annotations:
    kubernetes.io/ingress.class: nginx
"#,
        )
        .unwrap();
        let projected = project_resource_model(&doc);
        let model = projected.model().unwrap();
        assert_eq!(model.annotation("kubernetes.io/ingress.class"), Some("nginx"));
    }

    #[test]
    fn test_reprojection_replaces_model() {
        let doc = parse_document("apiVersion: v1\nkind: Pod\n").unwrap();
        let once = project_resource_model(&doc);
        let twice = project_resource_model(&once);
        assert_eq!(once, twice);

        let without_kind = twice.with_block(parse_document("apiVersion: v1\n").unwrap().block().clone());
        assert!(project_resource_model(&without_kind).model().is_none());
    }

    #[test]
    fn test_project_tree() {
        let tree = parse_yaml("apiVersion: v1\nkind: Pod\n---\nfoo: bar\n").unwrap();
        let projected = project_tree(&tree);
        assert!(projected.document(0).unwrap().model().is_some());
        assert!(projected.document(1).unwrap().model().is_none());
    }
}
