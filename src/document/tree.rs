//! Multi-document container for a parsed manifest source.
//!
//! A single YAML file may hold several `---` separated documents. `YamlTree`
//! keeps them in source order together with the original text. Like the nodes
//! it holds, a tree is never edited in place; replacing a document yields a new
//! tree that shares every other document with the old one.

use std::sync::Arc;

use super::node::Document;

/// A complete YAML source: its documents and the text they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct YamlTree {
    documents: Vec<Arc<Document>>,
    /// The original YAML string, when the tree was parsed from text
    original_source: Option<String>,
}

impl YamlTree {
    /// Creates a tree with no original source.
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents: documents.into_iter().map(Arc::new).collect(),
            original_source: None,
        }
    }

    /// Creates a tree that remembers the text it was parsed from.
    pub fn with_source(documents: Vec<Document>, original_source: Option<String>) -> Self {
        Self {
            documents: documents.into_iter().map(Arc::new).collect(),
            original_source,
        }
    }

    pub fn original_source(&self) -> Option<&str> {
        self.original_source.as_deref()
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter().map(|d| d.as_ref())
    }

    pub fn document(&self, index: usize) -> Option<&Document> {
        self.documents.get(index).map(|d| d.as_ref())
    }

    pub fn document_arc(&self, index: usize) -> Option<&Arc<Document>> {
        self.documents.get(index)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns a copy with the document at `index` replaced.
    ///
    /// An out of range index leaves the tree unchanged.
    pub fn with_document(&self, index: usize, document: Document) -> Self {
        let mut documents = self.documents.clone();
        if let Some(slot) = documents.get_mut(index) {
            *slot = Arc::new(document);
        }
        Self {
            documents,
            original_source: self.original_source.clone(),
        }
    }

    /// Returns a copy where every document has been passed through `f`.
    pub fn map_documents<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&Document) -> Document,
    {
        Self {
            documents: self.documents.iter().map(|d| Arc::new(f(d))).collect(),
            original_source: self.original_source.clone(),
        }
    }
}
