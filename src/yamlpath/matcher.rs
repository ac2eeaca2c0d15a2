//! Compiled path expressions and position matching.
//!
//! A [`Matcher`] answers two questions about a cursor position:
//!
//! - [`Matcher::matches`]: does the position itself satisfy the expression?
//!   This walks the cursor's ancestor chain from the position outwards,
//!   consuming segments right to left and backtracking over recursive descent.
//!   Nothing is collected along the way.
//! - [`Matcher::find`]: which nodes of the position's document satisfy it?
//!   This evaluates forwards from the document root (or from the position, for
//!   relative expressions) and returns every hit.
//!
//! Queries target values. A mapping entry and the value it holds are the same
//! position; the entry's key scalar never matches.

use tracing::trace;

use super::ast::{normalize_index, normalize_slice, Anchor, Filter, FilterOp, PathSegment, YamlPath};
use super::error::YamlPathError;
use super::evaluator::{Evaluator, Position};
use super::parser::Parser;
use crate::document::cursor::Cursor;
use crate::document::node::{Block, MappingEntry, NodeRef, SequenceEntry};

/// One level between a document body and a position.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Step<'a> {
    Key(&'a MappingEntry),
    Index {
        index: usize,
        len: usize,
        entry: &'a SequenceEntry,
    },
}

impl<'a> Step<'a> {
    pub(crate) fn block(&self) -> &'a Block {
        match *self {
            Step::Key(e) => e.value(),
            Step::Index { entry, .. } => entry.block(),
        }
    }

    pub(crate) fn node_ref(&self) -> NodeRef<'a> {
        match *self {
            Step::Key(e) => NodeRef::MappingEntry(e),
            Step::Index { index, entry, .. } => NodeRef::SequenceEntry(index, entry),
        }
    }
}

/// The steps from the document body down to the cursor's position, or `None`
/// when the cursor sits on a key scalar.
pub(crate) fn steps_of<'a>(cursor: &Cursor<'a>) -> Option<Vec<Step<'a>>> {
    if cursor.is_key() {
        return None;
    }

    let mut steps = Vec::new();
    let mut sequence_len = 0;
    for node in cursor.path() {
        match node {
            NodeRef::Sequence(s) => sequence_len = s.len(),
            NodeRef::MappingEntry(e) => steps.push(Step::Key(e)),
            NodeRef::SequenceEntry(index, entry) => steps.push(Step::Index {
                index,
                len: sequence_len,
                entry,
            }),
            _ => {}
        }
    }
    Some(steps)
}

impl Filter {
    /// True if `block` is a mapping satisfying this filter.
    pub(crate) fn accepts(&self, block: &Block) -> bool {
        let Some(mapping) = block.as_mapping() else {
            return false;
        };
        let Some(entry) = mapping.get(&self.key) else {
            return false;
        };
        let value = entry.value().as_scalar().map(|s| s.value());
        match &self.op {
            FilterOp::Exists => true,
            FilterOp::Eq(expected) => value == Some(expected.as_str()),
            FilterOp::Ne(expected) => value != Some(expected.as_str()),
        }
    }
}

impl PathSegment {
    /// True if this single-level segment accepts `step`.
    ///
    /// Recursive descent spans levels and is handled by the callers.
    pub(crate) fn accepts(&self, step: &Step<'_>) -> bool {
        match (self, step) {
            (PathSegment::Child(name), Step::Key(e)) => e.key().value() == name,
            (PathSegment::MultiProperty(names), Step::Key(e)) => {
                names.iter().any(|n| n == e.key().value())
            }
            (PathSegment::Wildcard, _) => true,
            (PathSegment::Index(i), Step::Index { index, len, .. }) => {
                normalize_index(*i, *len) == Some(*index)
            }
            (PathSegment::AnyIndex, Step::Index { .. }) => true,
            (PathSegment::Slice(start, end), Step::Index { index, len, .. }) => {
                normalize_slice(*start, *end, *len).contains(index)
            }
            (PathSegment::Filter(f), Step::Index { entry, .. }) => f.accepts(entry.block()),
            _ => false,
        }
    }
}

/// A compiled path expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Matcher {
    expression: String,
    path: YamlPath,
}

impl Matcher {
    /// Compiles `expression` in either dialect.
    ///
    /// # Errors
    ///
    /// Returns a [`YamlPathError`] for unmatched brackets, unknown tokens or
    /// malformed predicates. Matching itself never fails.
    pub fn compile(expression: &str) -> Result<Self, YamlPathError> {
        let path = Parser::parse(expression)?;
        trace!(
            expression,
            anchor = ?path.anchor,
            segments = path.segments.len(),
            "compiled path expression"
        );
        Ok(Self {
            expression: expression.to_string(),
            path,
        })
    }

    /// Wraps an already parsed path.
    pub fn from_path(path: YamlPath) -> Self {
        Self {
            expression: String::new(),
            path,
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn path(&self) -> &YamlPath {
        &self.path
    }

    /// Returns true if the cursor's position satisfies this expression.
    pub fn matches(&self, cursor: &Cursor<'_>) -> bool {
        match steps_of(cursor) {
            Some(steps) => match_backward(
                &self.path.segments,
                &steps,
                self.path.anchor == Anchor::Root,
            ),
            None => false,
        }
    }

    /// Returns true if the cursor's position, or any position enclosing it,
    /// satisfies this expression.
    pub fn matches_within(&self, cursor: &Cursor<'_>) -> bool {
        let Some(steps) = steps_of(cursor) else {
            return false;
        };
        let anchored = self.path.anchor == Anchor::Root;
        (0..=steps.len())
            .rev()
            .any(|len| match_backward(&self.path.segments, &steps[..len], anchored))
    }

    /// Returns every node of the cursor's document that satisfies this
    /// expression, in document order.
    ///
    /// Keyed hits are mapping entries, indexed hits sequence entries, and an
    /// empty root path yields the document body.
    pub fn find<'a>(&self, cursor: &Cursor<'a>) -> Vec<NodeRef<'a>> {
        let start = match self.path.anchor {
            Anchor::Root => Position::Root(cursor.document().block()),
            Anchor::Relative => match steps_of(cursor) {
                Some(steps) => match steps.last() {
                    Some(step) => Position::Step(*step),
                    None => Position::Root(cursor.document().block()),
                },
                None => return Vec::new(),
            },
        };

        Evaluator::new(start)
            .evaluate(&self.path.segments)
            .into_iter()
            .map(|p| p.node_ref())
            .collect()
    }

    /// The first node [`Matcher::find`] would return.
    pub fn find_first<'a>(&self, cursor: &Cursor<'a>) -> Option<NodeRef<'a>> {
        self.find(cursor).into_iter().next()
    }
}

/// Convenience for [`Matcher::compile`].
pub fn compile(expression: &str) -> Result<Matcher, YamlPathError> {
    Matcher::compile(expression)
}

/// Matches `segments` against the tail of `steps`, last segment first.
///
/// Anchored paths must consume every step; relative paths may leave a prefix.
fn match_backward(segments: &[PathSegment], steps: &[Step<'_>], anchored: bool) -> bool {
    match segments.split_last() {
        None => !anchored || steps.is_empty(),
        Some((PathSegment::RecursiveDescent, rest)) => (0..=steps.len())
            .rev()
            .any(|keep| match_backward(rest, &steps[..keep], anchored)),
        Some((segment, rest)) => match steps.split_last() {
            Some((last, init)) => segment.accepts(last) && match_backward(rest, init, anchored),
            None => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::node::Document;
    use crate::document::parser::parse_document;
    use crate::document::visitor::for_each_position;

    const POD: &str = r#"
apiVersion: v1
kind: Pod
metadata:
  name: nginx
  labels:
    app: demo
spec:
  containers:
    - name: web
      image: nginx:1.25
      resources:
        limits:
          memory: 2Gi
    - name: sidecar
      image: busybox
"#;

    fn pod() -> Document {
        parse_document(POD).unwrap()
    }

    fn at<'a>(doc: &'a Document, path: &[&str]) -> Cursor<'a> {
        Cursor::locate(doc, path).unwrap()
    }

    fn matches(expr: &str, doc: &Document, path: &[&str]) -> bool {
        Matcher::compile(expr).unwrap().matches(&at(doc, path))
    }

    #[test]
    fn test_labels_wildcard() {
        let doc = pod();
        assert!(matches("metadata.labels.*", &doc, &["metadata", "labels", "app"]));
        assert!(!matches("metadata.annotations.*", &doc, &["metadata", "labels", "app"]));
    }

    #[test]
    fn test_anchored_vs_relative() {
        let doc = pod();
        let path = ["spec", "containers", "0", "image"];
        assert!(matches("$.spec.containers[*].image", &doc, &path));
        assert!(matches("containers[*].image", &doc, &path));
        assert!(!matches("$.containers[*].image", &doc, &path));
    }

    #[test]
    fn test_recursive_descent() {
        let doc = pod();
        let path = ["spec", "containers", "0", "resources", "limits", "memory"];
        assert!(matches("..limits.memory", &doc, &path));
        assert!(matches("$..memory", &doc, &path));
        assert!(matches("$.spec..memory", &doc, &path));
        assert!(matches("//resources/limits/memory", &doc, &path));
        assert!(!matches("$..requests.memory", &doc, &path));
    }

    #[test]
    fn test_index_predicates() {
        let doc = pod();
        let second = ["spec", "containers", "1", "image"];
        assert!(matches("$.spec.containers[1].image", &doc, &second));
        assert!(matches("$.spec.containers[-1].image", &doc, &second));
        assert!(matches("$.spec.containers[1:].image", &doc, &second));
        assert!(!matches("$.spec.containers[0].image", &doc, &second));
        assert!(!matches("$.spec.containers.image", &doc, &second));
    }

    #[test]
    fn test_filter_predicate() {
        let doc = pod();
        let first = ["spec", "containers", "0", "image"];
        let second = ["spec", "containers", "1", "image"];
        let m = Matcher::compile("$.spec.containers[?(@.name == 'web')].image").unwrap();
        assert!(m.matches(&at(&doc, &first)));
        assert!(!m.matches(&at(&doc, &second)));

        let m = Matcher::compile("$.spec.containers[?(@.resources)].image").unwrap();
        assert!(m.matches(&at(&doc, &first)));
        assert!(!m.matches(&at(&doc, &second)));
    }

    #[test]
    fn test_entry_and_value_are_one_position() {
        let doc = pod();
        let mut cursor = at(&doc, &["metadata", "labels"]);
        let entry = cursor.first_enclosing_entry().unwrap();
        let m = Matcher::compile("$.metadata.labels").unwrap();
        assert!(m.matches(&cursor));

        cursor.push(entry.value().as_node_ref());
        assert!(m.matches(&cursor));
    }

    #[test]
    fn test_key_side_never_matches() {
        let doc = pod();
        let mut cursor = at(&doc, &["kind"]);
        let entry = cursor.first_enclosing_entry().unwrap();
        cursor.push(NodeRef::Scalar(entry.key()));
        assert!(!Matcher::compile("$.kind").unwrap().matches(&cursor));
        assert!(!Matcher::compile("$..*").unwrap().matches(&cursor));
    }

    #[test]
    fn test_matches_within() {
        let doc = pod();
        let m = Matcher::compile("$.spec.containers[*]").unwrap();
        let image = at(&doc, &["spec", "containers", "0", "image"]);
        assert!(!m.matches(&image));
        assert!(m.matches_within(&image));
        assert!(!m.matches_within(&at(&doc, &["metadata", "name"])));
    }

    #[test]
    fn test_root_matches_document() {
        let doc = pod();
        let cursor = Cursor::new(&doc);
        assert!(Matcher::compile("$").unwrap().matches(&cursor));
        assert!(Matcher::compile("/").unwrap().matches(&cursor));
        assert!(!Matcher::compile("$.kind").unwrap().matches(&cursor));
    }

    #[test]
    fn test_find_anchored() {
        let doc = pod();
        let cursor = Cursor::new(&doc);
        let images: Vec<_> = Matcher::compile("$.spec.containers[*].image")
            .unwrap()
            .find(&cursor)
            .into_iter()
            .filter_map(|n| n.scalar_value())
            .collect();
        assert_eq!(images, vec!["nginx:1.25", "busybox"]);
    }

    #[test]
    fn test_find_relative_from_position() {
        let doc = pod();
        let cursor = at(&doc, &["spec", "containers", "0", "resources"]);
        let found = Matcher::compile(".limits.memory").unwrap().find(&cursor);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].scalar_value(), Some("2Gi"));

        assert!(Matcher::compile(".requests.memory")
            .unwrap()
            .find(&cursor)
            .is_empty());
    }

    #[test]
    fn test_find_agrees_with_matches() {
        let doc = pod();
        for expr in [
            "$..name",
            "$.spec.containers[*].*",
            "$.*",
            "//image",
            "$.spec.containers[?(@.name != 'web')]",
        ] {
            let m = Matcher::compile(expr).unwrap();
            let found = m.find(&Cursor::new(&doc));

            let mut matched = Vec::new();
            for_each_position(&doc, |cursor| {
                let node = cursor.value();
                if matches!(node, NodeRef::MappingEntry(_) | NodeRef::SequenceEntry(..))
                    && m.matches(cursor)
                {
                    matched.push(node);
                }
            });

            assert_eq!(found.len(), matched.len(), "{}", expr);
            for node in &found {
                assert!(matched.iter().any(|n| n.same_node(node)), "{}", expr);
            }
        }
    }

    #[test]
    fn test_compile_errors_surface_early() {
        assert!(Matcher::compile("$.spec[").is_err());
        assert!(Matcher::compile("$.spec]").is_err());
        assert!(Matcher::compile("/spec/[x").is_err());
        assert!(compile("$.metadata").is_ok());
    }
}
