//! Integration tests for cursor traversal and bottom-up accumulation.

use indexmap::IndexMap;
use kubequill::document::cursor::{Cursor, Message, Messages};
use kubequill::document::node::{Document, NodeKind, NodeRef, Scalar};
use kubequill::document::parser::parse_yaml;
use kubequill::document::visitor::{walk_document, Visitor};

/// Counts scalar values under each top-level key, reading each count once the
/// key's subtree is complete.
#[derive(Default)]
struct SubtreeCounter {
    counts: IndexMap<String, usize>,
    document_done: usize,
}

impl<'a> Visitor<'a> for SubtreeCounter {
    fn visit_scalar(&mut self, _scalar: &'a Scalar, cursor: &mut Cursor<'a>) {
        if cursor.is_key() {
            return;
        }
        if let Some(Message::Text(n)) =
            cursor.compute_message_if_absent(NodeKind::MappingEntry, "count", || {
                Message::Text("0".to_string())
            })
        {
            let next = n.parse::<usize>().unwrap_or(0) + 1;
            *n = next.to_string();
        }
    }

    fn leave_node(&mut self, node: NodeRef<'a>, messages: Messages, cursor: &mut Cursor<'a>) {
        let NodeRef::MappingEntry(entry) = node else {
            return;
        };
        let count = messages
            .get("count")
            .and_then(Message::as_text)
            .and_then(|t| t.parse::<usize>().ok())
            .unwrap_or(0);
        if cursor.depth() == 1 {
            self.counts.insert(entry.key().value().to_string(), count);
        } else if count > 0 {
            // Hand the subtree total up to the enclosing entry.
            if let Some(Message::Text(n)) =
                cursor.compute_message_if_absent(NodeKind::MappingEntry, "count", || {
                    Message::Text("0".to_string())
                })
            {
                let next = n.parse::<usize>().unwrap_or(0) + count;
                *n = next.to_string();
            }
        }
    }

    fn leave_document(&mut self, _document: &'a Document, _messages: Messages) {
        self.document_done += 1;
    }
}

#[test]
fn test_subtree_totals_are_complete_before_parent_reads_them() {
    let tree = parse_yaml(
        r#"
metadata:
  name: web
  labels:
    app: web
    tier: frontend
spec:
  containers:
    - name: a
      image: nginx
    - name: b
      image: envoy
      args: [--verbose, --port, "8080"]
"#,
    )
    .unwrap();

    let mut counter = SubtreeCounter::default();
    walk_document(tree.document(0).unwrap(), &mut counter);

    assert_eq!(counter.counts.get("metadata"), Some(&3));
    assert_eq!(counter.counts.get("spec"), Some(&7));
    assert_eq!(counter.document_done, 1);
}

#[test]
fn test_independent_documents_do_not_share_state() {
    let tree = parse_yaml("a: 1\n---\nb: 2\nc: 3\n").unwrap();

    let mut first = SubtreeCounter::default();
    walk_document(tree.document(0).unwrap(), &mut first);
    let mut second = SubtreeCounter::default();
    walk_document(tree.document(1).unwrap(), &mut second);

    assert_eq!(first.counts.len(), 1);
    assert_eq!(second.counts.len(), 2);
    assert!(!second.counts.contains_key("a"));
}
