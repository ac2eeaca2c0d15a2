//! Immutable YAML node representation with structural sharing.
//!
//! This module provides the node types that make up a parsed manifest. Nodes are
//! never mutated in place: every `with_*` method returns a new value and keeps
//! the `Arc` identity of every child it did not touch, so a rewrite of one
//! scalar deep inside a document only reallocates the spine above it.
//!
//! # Example
//!
//! ```
//! use kubequill::document::node::{Block, Mapping, MappingEntry, Scalar};
//!
//! let mapping = Mapping::new(vec![
//!     MappingEntry::new("kind", Block::scalar("Pod")),
//!     MappingEntry::new("apiVersion", Block::scalar("v1")),
//! ]);
//! let updated = mapping.with_entry(0, mapping.entries()[0].with_value(Block::scalar("Service")));
//!
//! // The untouched entry still shares its value with the original.
//! assert!(std::sync::Arc::ptr_eq(
//!     mapping.entries()[1].value_arc(),
//!     updated.entries()[1].value_arc(),
//! ));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::kubernetes::model::ResourceModel;

/// A scalar value, kept as its textual representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    value: String,
}

impl Scalar {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn with_value(&self, value: impl Into<String>) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A `key: value` pair inside a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingEntry {
    key: Scalar,
    value: Arc<Block>,
}

impl MappingEntry {
    pub fn new(key: impl Into<String>, value: Block) -> Self {
        Self {
            key: Scalar::new(key),
            value: Arc::new(value),
        }
    }

    /// Builds an entry around an already shared value.
    pub fn from_shared(key: Scalar, value: Arc<Block>) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> &Scalar {
        &self.key
    }

    pub fn value(&self) -> &Block {
        &self.value
    }

    pub fn value_arc(&self) -> &Arc<Block> {
        &self.value
    }

    /// Returns a copy of this entry with a new value and the same key.
    pub fn with_value(&self, value: Block) -> Self {
        Self {
            key: self.key.clone(),
            value: Arc::new(value),
        }
    }

    pub fn with_key(&self, key: impl Into<String>) -> Self {
        Self {
            key: Scalar::new(key),
            value: Arc::clone(&self.value),
        }
    }
}

/// An ordered list of mapping entries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mapping {
    entries: Vec<MappingEntry>,
}

impl Mapping {
    pub fn new(entries: Vec<MappingEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    /// Looks up the first entry with the given key.
    pub fn get(&self, key: &str) -> Option<&MappingEntry> {
        self.entries.iter().find(|e| e.key.value() == key)
    }

    /// Returns the scalar text stored under `key`, if the value is a scalar.
    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|e| e.value().as_scalar()).map(Scalar::value)
    }

    /// Returns a copy with the entry at `index` replaced.
    ///
    /// An out of range index leaves the mapping unchanged.
    pub fn with_entry(&self, index: usize, entry: MappingEntry) -> Self {
        let mut entries = self.entries.clone();
        if let Some(slot) = entries.get_mut(index) {
            *slot = entry;
        }
        Self { entries }
    }

    /// Returns a copy with `entry` appended.
    pub fn with_appended(&self, entry: MappingEntry) -> Self {
        let mut entries = self.entries.clone();
        entries.push(entry);
        Self { entries }
    }
}

/// One `- item` of a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceEntry {
    block: Arc<Block>,
}

impl SequenceEntry {
    pub fn new(block: Block) -> Self {
        Self {
            block: Arc::new(block),
        }
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn block_arc(&self) -> &Arc<Block> {
        &self.block
    }

    pub fn with_block(&self, block: Block) -> Self {
        Self::new(block)
    }
}

/// An ordered list of sequence entries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    entries: Vec<SequenceEntry>,
}

impl Sequence {
    pub fn new(entries: Vec<SequenceEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[SequenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a copy with the entry at `index` replaced.
    pub fn with_entry(&self, index: usize, entry: SequenceEntry) -> Self {
        let mut entries = self.entries.clone();
        if let Some(slot) = entries.get_mut(index) {
            *slot = entry;
        }
        Self { entries }
    }

    pub fn with_appended(&self, entry: SequenceEntry) -> Self {
        let mut entries = self.entries.clone();
        entries.push(entry);
        Self { entries }
    }
}

/// Any value that can appear as a document body, mapping value or sequence item.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Mapping(Mapping),
    Sequence(Sequence),
    Scalar(Scalar),
}

impl Block {
    pub fn scalar(value: impl Into<String>) -> Self {
        Block::Scalar(Scalar::new(value))
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Block::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Block::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Block::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_node_ref(&self) -> NodeRef<'_> {
        match self {
            Block::Mapping(m) => NodeRef::Mapping(m),
            Block::Sequence(s) => NodeRef::Sequence(s),
            Block::Scalar(s) => NodeRef::Scalar(s),
        }
    }
}

/// A single YAML document, optionally carrying its projected resource model.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    block: Arc<Block>,
    model: Option<Arc<ResourceModel>>,
}

impl Document {
    pub fn new(block: Block) -> Self {
        Self {
            block: Arc::new(block),
            model: None,
        }
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn block_arc(&self) -> &Arc<Block> {
        &self.block
    }

    /// The resource model attached by the projector, if any.
    pub fn model(&self) -> Option<&ResourceModel> {
        self.model.as_deref()
    }

    /// Returns a copy with a new body. The attached model is kept as is.
    pub fn with_block(&self, block: Block) -> Self {
        Self {
            block: Arc::new(block),
            model: self.model.clone(),
        }
    }

    /// Returns a copy that shares the body and carries `model` instead of the
    /// current one.
    pub fn with_model(&self, model: Option<ResourceModel>) -> Self {
        Self {
            block: Arc::clone(&self.block),
            model: model.map(Arc::new),
        }
    }
}

/// The kind of a node, used to address enclosing frames of a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Mapping,
    MappingEntry,
    Sequence,
    SequenceEntry,
    Scalar,
}

/// A borrowed reference to any node in a document.
///
/// Sequence entry references carry the entry's index within its sequence.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Document(&'a Document),
    Mapping(&'a Mapping),
    MappingEntry(&'a MappingEntry),
    Sequence(&'a Sequence),
    SequenceEntry(usize, &'a SequenceEntry),
    Scalar(&'a Scalar),
}

impl<'a> NodeRef<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRef::Document(_) => NodeKind::Document,
            NodeRef::Mapping(_) => NodeKind::Mapping,
            NodeRef::MappingEntry(_) => NodeKind::MappingEntry,
            NodeRef::Sequence(_) => NodeKind::Sequence,
            NodeRef::SequenceEntry(..) => NodeKind::SequenceEntry,
            NodeRef::Scalar(_) => NodeKind::Scalar,
        }
    }

    /// Returns true if both references point at the very same node.
    pub fn same_node(&self, other: &NodeRef<'_>) -> bool {
        use std::ptr;
        match (self, other) {
            (NodeRef::Document(a), NodeRef::Document(b)) => ptr::eq(*a, *b),
            (NodeRef::Mapping(a), NodeRef::Mapping(b)) => ptr::eq(*a, *b),
            (NodeRef::MappingEntry(a), NodeRef::MappingEntry(b)) => ptr::eq(*a, *b),
            (NodeRef::Sequence(a), NodeRef::Sequence(b)) => ptr::eq(*a, *b),
            (NodeRef::SequenceEntry(_, a), NodeRef::SequenceEntry(_, b)) => ptr::eq(*a, *b),
            (NodeRef::Scalar(a), NodeRef::Scalar(b)) => ptr::eq(*a, *b),
            _ => false,
        }
    }

    /// The block this position holds: the body of a document, the value of an
    /// entry, the item of a sequence entry, or the node itself.
    pub fn value_block(&self) -> Option<&'a Block> {
        match *self {
            NodeRef::Document(d) => Some(d.block()),
            NodeRef::MappingEntry(e) => Some(e.value()),
            NodeRef::SequenceEntry(_, e) => Some(e.block()),
            _ => None,
        }
    }

    /// Scalar text if this position is a scalar or an entry/item holding one.
    pub fn scalar_value(&self) -> Option<&'a str> {
        match *self {
            NodeRef::Scalar(s) => Some(s.value()),
            other => other
                .value_block()
                .and_then(Block::as_scalar)
                .map(Scalar::value),
        }
    }

    pub fn as_mapping_entry(&self) -> Option<&'a MappingEntry> {
        match *self {
            NodeRef::MappingEntry(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pod() -> Mapping {
        Mapping::new(vec![
            MappingEntry::new("apiVersion", Block::scalar("v1")),
            MappingEntry::new("kind", Block::scalar("Pod")),
            MappingEntry::new(
                "metadata",
                Block::Mapping(Mapping::new(vec![MappingEntry::new(
                    "name",
                    Block::scalar("nginx"),
                )])),
            ),
        ])
    }

    #[test]
    fn test_mapping_lookup() {
        let m = pod();
        assert_eq!(m.scalar("kind"), Some("Pod"));
        assert!(m.scalar("metadata").is_none());
        assert!(m.get("spec").is_none());
    }

    #[test]
    fn test_with_entry_preserves_siblings() {
        let m = pod();
        let replaced = m.with_entry(1, m.entries()[1].with_value(Block::scalar("Service")));

        assert_eq!(replaced.scalar("kind"), Some("Service"));
        assert_eq!(m.scalar("kind"), Some("Pod"));
        assert!(Arc::ptr_eq(
            m.entries()[2].value_arc(),
            replaced.entries()[2].value_arc()
        ));
    }

    #[test]
    fn test_renamed_entry_shares_value() {
        let m = pod();
        let metadata = &m.entries()[2];
        let renamed = metadata.with_key("meta");

        assert_eq!(renamed.key().value(), "meta");
        assert_eq!(metadata.key().value(), "metadata");
        assert!(Arc::ptr_eq(metadata.value_arc(), renamed.value_arc()));

        let rebuilt =
            MappingEntry::from_shared(Scalar::new("copy"), Arc::clone(metadata.value_arc()));
        assert!(Arc::ptr_eq(metadata.value_arc(), rebuilt.value_arc()));
        assert_eq!(rebuilt.value(), metadata.value());
    }

    #[test]
    fn test_with_appended_shares_existing_entries() {
        let m = pod();
        let extended =
            m.with_appended(MappingEntry::new("spec", Block::Mapping(Mapping::default())));

        assert_eq!(m.entries().len(), 3);
        assert_eq!(extended.entries().len(), 4);
        assert!(extended.get("spec").is_some());
        assert!(Arc::ptr_eq(
            m.entries()[2].value_arc(),
            extended.entries()[2].value_arc()
        ));

        let seq = Sequence::new(vec![SequenceEntry::new(Block::scalar("a"))]);
        let longer = seq.with_appended(SequenceEntry::new(Block::scalar("b")));
        assert_eq!(seq.len(), 1);
        assert_eq!(longer.len(), 2);
        assert_eq!(
            longer.entries()[1].block().as_scalar().map(Scalar::value),
            Some("b")
        );
        assert!(Arc::ptr_eq(
            seq.entries()[0].block_arc(),
            longer.entries()[0].block_arc()
        ));
    }

    #[test]
    fn test_with_entry_out_of_range_is_noop() {
        let m = pod();
        let same = m.with_entry(9, MappingEntry::new("x", Block::scalar("y")));
        assert_eq!(m, same);
    }

    #[test]
    fn test_document_with_model_shares_block() {
        let doc = Document::new(Block::Mapping(pod()));
        let modeled = doc.with_model(Some(ResourceModel::default()));

        assert!(doc.model().is_none());
        assert!(modeled.model().is_some());
        assert!(Arc::ptr_eq(doc.block_arc(), modeled.block_arc()));
    }

    #[test]
    fn test_node_ref_identity() {
        let m = pod();
        let a = NodeRef::MappingEntry(&m.entries()[0]);
        let b = NodeRef::MappingEntry(&m.entries()[0]);
        let c = NodeRef::MappingEntry(&m.entries()[1]);
        assert!(a.same_node(&b));
        assert!(!a.same_node(&c));
        assert_eq!(a.scalar_value(), Some("v1"));
    }
}
