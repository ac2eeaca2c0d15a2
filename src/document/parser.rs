//! YAML parsing into the immutable node tree.
//!
//! This module uses `yaml-rust2` to read one or more YAML documents and converts
//! each of them into a [`Document`]. Every scalar is kept as text: manifests are
//! queried and rewritten as strings, so numbers, booleans and nulls are rendered
//! back to their canonical YAML spelling.
//!
//! # Example
//!
//! ```
//! use kubequill::document::parser::parse_yaml;
//!
//! let tree = parse_yaml("apiVersion: v1\nkind: Pod\n").unwrap();
//! assert_eq!(tree.len(), 1);
//! ```

use anyhow::{Context, Result};
use yaml_rust2::{Yaml, YamlLoader};

use super::node::{Block, Document, Mapping, MappingEntry, Scalar, Sequence, SequenceEntry};
use super::tree::YamlTree;

/// Parses a YAML string, possibly holding several `---` separated documents.
///
/// # Errors
///
/// Returns an error if the input is not valid YAML.
pub fn parse_yaml(yaml_str: &str) -> Result<YamlTree> {
    let docs = YamlLoader::load_from_str(yaml_str).context("Failed to parse YAML")?;

    let documents = docs.iter().map(|doc| Document::new(convert(doc))).collect();
    Ok(YamlTree::with_source(documents, Some(yaml_str.to_string())))
}

/// Parses a YAML string that is expected to hold exactly one document.
pub fn parse_document(yaml_str: &str) -> Result<Document> {
    let tree = parse_yaml(yaml_str)?;
    match tree.len() {
        1 => tree
            .document(0)
            .cloned()
            .context("Document vanished while parsing"),
        0 => anyhow::bail!("No YAML document found"),
        n => anyhow::bail!("Expected a single YAML document, found {}", n),
    }
}

fn convert(value: &Yaml) -> Block {
    match value {
        Yaml::Hash(hash) => Block::Mapping(Mapping::new(
            hash.iter()
                .map(|(k, v)| MappingEntry::new(scalar_text(k), convert(v)))
                .collect(),
        )),
        Yaml::Array(items) => Block::Sequence(Sequence::new(
            items.iter().map(|v| SequenceEntry::new(convert(v))).collect(),
        )),
        other => Block::Scalar(Scalar::new(scalar_text(other))),
    }
}

/// Renders a YAML value as scalar text. Containers used as keys are rare
/// enough in manifests that they are flattened to an empty key.
fn scalar_text(value: &Yaml) -> String {
    match value {
        Yaml::String(s) => s.clone(),
        Yaml::Integer(i) => i.to_string(),
        Yaml::Real(r) => r.clone(),
        Yaml::Boolean(b) => b.to_string(),
        Yaml::Null => "null".to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_mapping() {
        let tree = parse_yaml("name: test\ncount: 42\nenabled: true\n").unwrap();
        let doc = tree.document(0).unwrap();
        let m = doc.block().as_mapping().expect("Expected mapping");

        assert_eq!(m.entries().len(), 3);
        assert_eq!(m.scalar("name"), Some("test"));
        assert_eq!(m.scalar("count"), Some("42"));
        assert_eq!(m.scalar("enabled"), Some("true"));
    }

    #[test]
    fn test_parse_preserves_entry_order() {
        let tree = parse_yaml("kind: Pod\napiVersion: v1\nmetadata: {}\n").unwrap();
        let m = tree.document(0).unwrap().block().as_mapping().unwrap();
        let keys: Vec<_> = m.entries().iter().map(|e| e.key().value()).collect();
        assert_eq!(keys, vec!["kind", "apiVersion", "metadata"]);
    }

    #[test]
    fn test_parse_sequence() {
        let tree = parse_yaml("items:\n  - a\n  - b\n").unwrap();
        let m = tree.document(0).unwrap().block().as_mapping().unwrap();
        let seq = m.get("items").unwrap().value().as_sequence().unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.entries()[1].block().as_scalar().unwrap().value(), "b");
    }

    #[test]
    fn test_parse_multi_document() {
        let yaml = "---\nkind: Pod\n---\nkind: Service\n---\nkind: Deployment\n";
        let tree = parse_yaml(yaml).unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.original_source(), Some(yaml));
    }

    #[test]
    fn test_parse_null_and_numbers() {
        let tree = parse_yaml("a: ~\nb: 1.5\n5: x\n").unwrap();
        let m = tree.document(0).unwrap().block().as_mapping().unwrap();
        assert_eq!(m.scalar("a"), Some("null"));
        assert_eq!(m.scalar("b"), Some("1.5"));
        assert_eq!(m.scalar("5"), Some("x"));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        assert!(parse_yaml("key: [unclosed").is_err());
    }

    #[test]
    fn test_parse_document_requires_exactly_one() {
        assert!(parse_document("a: 1").is_ok());
        assert!(parse_document("").is_err());
        assert!(parse_document("---\na: 1\n---\nb: 2\n").is_err());
    }
}
