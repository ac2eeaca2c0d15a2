use super::ast::{normalize_index, normalize_slice, PathSegment};
use super::matcher::Step;
use crate::document::node::{Block, NodeRef};

/// A node reached while evaluating a path forwards.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Position<'a> {
    /// A document body, or the start of a relative evaluation from it.
    Root(&'a Block),
    Step(Step<'a>),
}

impl<'a> Position<'a> {
    fn block(&self) -> &'a Block {
        match self {
            Position::Root(b) => b,
            Position::Step(s) => s.block(),
        }
    }

    pub(crate) fn node_ref(&self) -> NodeRef<'a> {
        match self {
            Position::Root(b) => b.as_node_ref(),
            Position::Step(s) => s.node_ref(),
        }
    }
}

pub(crate) struct Evaluator<'a> {
    start: Position<'a>,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(start: Position<'a>) -> Self {
        Evaluator { start }
    }

    /// Applies `segments` in order, returning the reached positions in
    /// document order without duplicates.
    pub(crate) fn evaluate(&self, segments: &[PathSegment]) -> Vec<Position<'a>> {
        let mut current = vec![self.start];

        for segment in segments {
            let mut next = Vec::new();
            for position in &current {
                self.evaluate_segment(*position, segment, &mut next);
            }
            current = dedup(next);
            if current.is_empty() {
                break;
            }
        }

        current
    }

    fn evaluate_segment(
        &self,
        position: Position<'a>,
        segment: &PathSegment,
        out: &mut Vec<Position<'a>>,
    ) {
        if let PathSegment::RecursiveDescent = segment {
            out.push(position);
            descendants(position.block(), out);
            return;
        }

        for step in children(position.block()) {
            if segment.accepts(&step) {
                out.push(Position::Step(step));
            }
        }
    }
}

/// One-level children of a block: mapping entries or sequence entries.
fn children(block: &Block) -> Vec<Step<'_>> {
    match block {
        Block::Mapping(m) => m.entries().iter().map(Step::Key).collect(),
        Block::Sequence(s) => s
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| Step::Index {
                index,
                len: s.len(),
                entry,
            })
            .collect(),
        Block::Scalar(_) => Vec::new(),
    }
}

fn descendants<'a>(block: &'a Block, out: &mut Vec<Position<'a>>) {
    for step in children(block) {
        out.push(Position::Step(step));
        descendants(step.block(), out);
    }
}

fn dedup(positions: Vec<Position<'_>>) -> Vec<Position<'_>> {
    let mut unique: Vec<Position<'_>> = Vec::with_capacity(positions.len());
    for p in positions {
        let node = p.node_ref();
        if !unique.iter().any(|u| u.node_ref().same_node(&node)) {
            unique.push(p);
        }
    }
    unique
}
