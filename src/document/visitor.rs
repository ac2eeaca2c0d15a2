//! Depth-first traversal of a document.
//!
//! [`walk_document`] drives a [`Visitor`] over every node of a document in
//! source order, maintaining a [`Cursor`] as it goes. Hooks run when a node is
//! entered; `leave_node` and `leave_document` run only once the node's whole
//! subtree has been visited, receiving whatever messages were left on that
//! node's frame.
//!
//! Key scalars are visited too, as children of their mapping entry, before the
//! entry's value. Use [`Cursor::is_key`] to tell them apart.

use super::cursor::{Cursor, Messages};
use super::node::{Block, Document, MappingEntry, NodeRef, Scalar};

/// Callbacks for [`walk_document`]. All hooks default to doing nothing.
pub trait Visitor<'a> {
    /// Called on entering every node, the document included.
    fn visit_node(&mut self, _cursor: &mut Cursor<'a>) {}

    fn visit_mapping_entry(&mut self, _entry: &'a MappingEntry, _cursor: &mut Cursor<'a>) {}

    fn visit_scalar(&mut self, _scalar: &'a Scalar, _cursor: &mut Cursor<'a>) {}

    /// Called after the subtree of `node` is complete.
    fn leave_node(&mut self, _node: NodeRef<'a>, _messages: Messages, _cursor: &mut Cursor<'a>) {
    }

    /// Called last, with the messages left on the document frame.
    fn leave_document(&mut self, _document: &'a Document, _messages: Messages) {}
}

/// Walks every node of `document` with `visitor`.
pub fn walk_document<'a, V>(document: &'a Document, visitor: &mut V)
where
    V: Visitor<'a> + ?Sized,
{
    let mut cursor = Cursor::new(document);
    visitor.visit_node(&mut cursor);
    walk_block(document.block(), &mut cursor, visitor);
    visitor.leave_document(document, cursor.into_messages());
}

/// Calls `f` with a cursor positioned on every node of `document`.
pub fn for_each_position<'a, F>(document: &'a Document, f: F)
where
    F: FnMut(&Cursor<'a>),
{
    struct Positions<F>(F);

    impl<'a, F: FnMut(&Cursor<'a>)> Visitor<'a> for Positions<F> {
        fn visit_node(&mut self, cursor: &mut Cursor<'a>) {
            (self.0)(cursor)
        }
    }

    walk_document(document, &mut Positions(f));
}

fn enter<'a, V>(node: NodeRef<'a>, cursor: &mut Cursor<'a>, visitor: &mut V)
where
    V: Visitor<'a> + ?Sized,
{
    cursor.push(node);
    visitor.visit_node(cursor);
}

fn leave<'a, V>(cursor: &mut Cursor<'a>, visitor: &mut V)
where
    V: Visitor<'a> + ?Sized,
{
    if let Some((node, messages)) = cursor.pop() {
        visitor.leave_node(node, messages, cursor);
    }
}

fn walk_block<'a, V>(block: &'a Block, cursor: &mut Cursor<'a>, visitor: &mut V)
where
    V: Visitor<'a> + ?Sized,
{
    enter(block.as_node_ref(), cursor, visitor);
    match block {
        Block::Mapping(m) => {
            for entry in m.entries() {
                walk_entry(entry, cursor, visitor);
            }
        }
        Block::Sequence(s) => {
            for (index, entry) in s.entries().iter().enumerate() {
                enter(NodeRef::SequenceEntry(index, entry), cursor, visitor);
                walk_block(entry.block(), cursor, visitor);
                leave(cursor, visitor);
            }
        }
        Block::Scalar(s) => visitor.visit_scalar(s, cursor),
    }
    leave(cursor, visitor);
}

fn walk_entry<'a, V>(entry: &'a MappingEntry, cursor: &mut Cursor<'a>, visitor: &mut V)
where
    V: Visitor<'a> + ?Sized,
{
    enter(NodeRef::MappingEntry(entry), cursor, visitor);
    visitor.visit_mapping_entry(entry, cursor);

    enter(NodeRef::Scalar(entry.key()), cursor, visitor);
    visitor.visit_scalar(entry.key(), cursor);
    leave(cursor, visitor);

    walk_block(entry.value(), cursor, visitor);
    leave(cursor, visitor);
}
