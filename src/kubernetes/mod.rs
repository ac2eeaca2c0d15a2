//! Kubernetes resource semantics on top of the document tree.
//!
//! - [`model`]: the resource model attached to projected documents
//! - [`projector`]: derives and attaches that model
//! - [`sections`]: classifies positions within a manifest

pub mod model;
pub mod projector;
pub mod sections;

pub use model::{Metadata, ResourceModel};
pub use projector::{get_resource_model, project_resource_model, project_tree};
pub use sections::Section;

use crate::document::node::Document;
use crate::document::tree::YamlTree;

/// Projected documents of `tree` whose model matches the given kind and
/// apiVersion. `None` accepts any value.
///
/// Documents are only considered if they already carry a model, so run
/// [`project_tree`] first.
pub fn resources<'a>(
    tree: &'a YamlTree,
    kind: Option<&str>,
    api_version: Option<&str>,
) -> Vec<&'a Document> {
    tree.documents()
        .filter(|doc| match doc.model() {
            Some(model) => {
                kind.map_or(true, |k| model.kind() == Some(k))
                    && api_version.map_or(true, |v| model.api_version() == Some(v))
            }
            None => false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parser::parse_yaml;

    #[test]
    fn test_resources_filter() {
        let tree = parse_yaml(
            "apiVersion: v1\nkind: Pod\n---\napiVersion: v1\nkind: Service\n---\nfoo: bar\n",
        )
        .unwrap();
        let projected = project_tree(&tree);

        assert_eq!(resources(&projected, None, None).len(), 2);
        assert_eq!(resources(&projected, Some("Service"), None).len(), 1);
        assert_eq!(resources(&projected, Some("Pod"), Some("v2")).len(), 0);
        assert!(resources(&tree, None, None).is_empty());
    }
}
