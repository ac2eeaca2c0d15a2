//! Traversal context for depth-first walks over a document.
//!
//! A `Cursor` is the chain of nodes from the document down to the position
//! currently being visited. Each frame of the chain also owns a small message
//! map, so a visitor can leave values on an enclosing frame (say, the document)
//! while it is deep inside a subtree and read them back once that frame's
//! subtree is complete.
//!
//! Cursors are created per traversal and dropped with it; nothing in here is
//! shared between walks.

use indexmap::IndexMap;

use super::node::{Block, Document, MappingEntry, NodeKind, NodeRef};

/// A value accumulated on a cursor frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Text(String),
    Entries(IndexMap<String, String>),
}

impl Message {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Message::Text(s) => Some(s),
            Message::Entries(_) => None,
        }
    }

    pub fn as_entries(&self) -> Option<&IndexMap<String, String>> {
        match self {
            Message::Entries(m) => Some(m),
            Message::Text(_) => None,
        }
    }
}

/// Messages attached to one frame, keyed by name.
pub type Messages = IndexMap<String, Message>;

#[derive(Debug, Clone)]
struct Frame<'a> {
    node: NodeRef<'a>,
    messages: Messages,
}

impl<'a> Frame<'a> {
    fn new(node: NodeRef<'a>) -> Self {
        Self {
            node,
            messages: Messages::new(),
        }
    }
}

/// The ancestor chain of a position inside one document.
///
/// The root frame is always the document itself and is never popped.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    frames: Vec<Frame<'a>>,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor positioned on `document`.
    pub fn new(document: &'a Document) -> Self {
        Self {
            frames: vec![Frame::new(NodeRef::Document(document))],
        }
    }

    /// Positions a cursor on the entry reached by following `path` from the
    /// document body. Numeric segments index into sequences.
    ///
    /// Returns `None` when any segment cannot be followed.
    pub fn locate(document: &'a Document, path: &[&str]) -> Option<Self> {
        let mut cursor = Self::new(document);
        let mut block: &'a Block = document.block();

        for segment in path {
            cursor.push(block.as_node_ref());
            match block {
                Block::Mapping(m) => {
                    let entry = m.get(segment)?;
                    cursor.push(NodeRef::MappingEntry(entry));
                    block = entry.value();
                }
                Block::Sequence(s) => {
                    let index: usize = segment.parse().ok()?;
                    let entry = s.entries().get(index)?;
                    cursor.push(NodeRef::SequenceEntry(index, entry));
                    block = entry.block();
                }
                Block::Scalar(_) => return None,
            }
        }

        Some(cursor)
    }

    /// Enters `node`, making it the current position.
    pub fn push(&mut self, node: NodeRef<'a>) {
        self.frames.push(Frame::new(node));
    }

    /// Leaves the current position and hands back the messages left on it.
    ///
    /// Returns `None` at the document frame, which is only released by
    /// [`Cursor::into_messages`].
    pub fn pop(&mut self) -> Option<(NodeRef<'a>, Messages)> {
        if self.frames.len() <= 1 {
            return None;
        }
        self.frames.pop().map(|f| (f.node, f.messages))
    }

    /// Consumes the cursor, returning the messages left on the document frame.
    pub fn into_messages(mut self) -> Messages {
        self.frames.truncate(1);
        self.frames
            .pop()
            .map(|f| f.messages)
            .unwrap_or_default()
    }

    /// Number of frames below the document.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// The node at the current position.
    pub fn value(&self) -> NodeRef<'a> {
        self.frames[self.frames.len() - 1].node
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        let n = self.frames.len();
        if n < 2 {
            None
        } else {
            Some(self.frames[n - 2].node)
        }
    }

    /// The document this cursor walks.
    pub fn document(&self) -> &'a Document {
        match self.frames[0].node {
            NodeRef::Document(d) => d,
            _ => unreachable!("cursor root frame is always a document"),
        }
    }

    /// Nodes from the current position outwards to the document.
    pub fn ancestors(&self) -> impl Iterator<Item = NodeRef<'a>> + '_ {
        self.frames.iter().rev().map(|f| f.node)
    }

    /// Nodes from the document down to the current position.
    pub fn path(&self) -> impl Iterator<Item = NodeRef<'a>> + '_ {
        self.frames.iter().map(|f| f.node)
    }

    /// The innermost frame (current position included) of the given kind.
    pub fn first_enclosing(&self, kind: NodeKind) -> Option<NodeRef<'a>> {
        self.ancestors().find(|n| n.kind() == kind)
    }

    pub fn first_enclosing_entry(&self) -> Option<&'a MappingEntry> {
        self.first_enclosing(NodeKind::MappingEntry)
            .and_then(|n| n.as_mapping_entry())
    }

    /// True when the current position is the key scalar of its mapping entry.
    pub fn is_key(&self) -> bool {
        match (self.value(), self.parent()) {
            (NodeRef::Scalar(s), Some(NodeRef::MappingEntry(e))) => std::ptr::eq(s, e.key()),
            _ => false,
        }
    }

    /// Keys of the enclosing mapping entries, outermost first. Sequence
    /// indices do not contribute.
    pub fn entry_keys(&self) -> Vec<&'a str> {
        self.path()
            .filter_map(|n| n.as_mapping_entry())
            .map(|e| e.key().value())
            .collect()
    }

    /// Messages on the current frame.
    pub fn message(&self, name: &str) -> Option<&Message> {
        self.frames[self.frames.len() - 1].messages.get(name)
    }

    /// Messages on the innermost frame of the given kind.
    pub fn message_on_first_enclosing(&self, kind: NodeKind, name: &str) -> Option<&Message> {
        self.frames
            .iter()
            .rev()
            .find(|f| f.node.kind() == kind)
            .and_then(|f| f.messages.get(name))
    }

    /// Stores `message` on the innermost frame of the given kind, replacing any
    /// previous value under `name`. Returns false if there is no such frame.
    pub fn put_message_on_first_enclosing(
        &mut self,
        kind: NodeKind,
        name: impl Into<String>,
        message: Message,
    ) -> bool {
        match self.frames.iter_mut().rev().find(|f| f.node.kind() == kind) {
            Some(frame) => {
                frame.messages.insert(name.into(), message);
                true
            }
            None => false,
        }
    }

    /// Returns the message under `name` on the innermost frame of the given
    /// kind, creating it with `init` first if needed.
    pub fn compute_message_if_absent<F>(
        &mut self,
        kind: NodeKind,
        name: impl Into<String>,
        init: F,
    ) -> Option<&mut Message>
    where
        F: FnOnce() -> Message,
    {
        let frame = self.frames.iter_mut().rev().find(|f| f.node.kind() == kind)?;
        Some(frame.messages.entry(name.into()).or_insert_with(init))
    }
}
