//! Abstract syntax tree types for YAMLPath expressions.
//!
//! Both query dialects compile to these types, so the matcher and evaluator
//! never need to know which syntax an expression was written in.

/// Where the first segment of a path is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// The body of the enclosing document (`$`, leading `/`).
    Root,
    /// The position the path is evaluated against. When matching, any
    /// ancestor prefix is accepted.
    Relative,
}

/// Comparison in a sequence filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOp {
    /// `[?(@.key)]`
    Exists,
    /// `[?(@.key == 'value')]`
    Eq(String),
    /// `[?(@.key != 'value')]`
    Ne(String),
}

/// Selects sequence entries whose item is a mapping satisfying a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub key: String,
    pub op: FilterOp,
}

/// A segment in a YAMLPath expression.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// Named child (`.name`, `/name`, `['name']`)
    Child(String),
    /// Any of several named children (`['a','b']`)
    MultiProperty(Vec<String>),
    /// Exactly one level, mapping key or sequence index (`*`)
    Wildcard,
    /// Zero or more levels (`..`, `//`)
    RecursiveDescent,
    /// Sequence entry by position, negative counts from the end (`[0]`, `[-1]`)
    Index(isize),
    /// Any sequence entry (`[*]`)
    AnyIndex,
    /// Sequence entries in a range (`[start:end]`)
    Slice(Option<isize>, Option<isize>),
    /// Sequence entries matching a filter (`[?(@.name == 'web')]`)
    Filter(Filter),
}

/// A complete YAMLPath expression.
#[derive(Debug, Clone, PartialEq)]
pub struct YamlPath {
    pub anchor: Anchor,
    /// Segments that make up the path, outermost first.
    pub segments: Vec<PathSegment>,
}

impl YamlPath {
    /// Creates a new YAMLPath with the given segments.
    pub fn new(anchor: Anchor, segments: Vec<PathSegment>) -> Self {
        Self { anchor, segments }
    }
}

/// Resolves a possibly negative index against a sequence length.
pub(crate) fn normalize_index(index: isize, len: usize) -> Option<usize> {
    let len = len as isize;
    let idx = if index < 0 { len + index } else { index };
    if idx >= 0 && idx < len {
        Some(idx as usize)
    } else {
        None
    }
}

/// Resolves slice bounds against a sequence length.
pub(crate) fn normalize_slice(
    start: Option<isize>,
    end: Option<isize>,
    len: usize,
) -> std::ops::Range<usize> {
    let len = len as isize;
    let start_idx = match start {
        Some(s) if s < 0 => (len + s).max(0),
        Some(s) => s.min(len),
        None => 0,
    };
    let end_idx = match end {
        Some(e) if e < 0 => (len + e).max(0),
        Some(e) => e.min(len),
        None => len,
    };
    if start_idx <= end_idx {
        start_idx as usize..end_idx as usize
    } else {
        0..0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_index() {
        assert_eq!(normalize_index(0, 3), Some(0));
        assert_eq!(normalize_index(-1, 3), Some(2));
        assert_eq!(normalize_index(3, 3), None);
        assert_eq!(normalize_index(-4, 3), None);
    }

    #[test]
    fn test_normalize_slice() {
        assert_eq!(normalize_slice(Some(1), None, 4), 1..4);
        assert_eq!(normalize_slice(None, Some(-1), 4), 0..3);
        assert_eq!(normalize_slice(Some(3), Some(1), 4), 0..0);
        assert_eq!(normalize_slice(Some(0), Some(10), 2), 0..2);
    }
}
