//! Immutable document tree for YAML manifests.
//!
//! - [`node`]: node types and the borrowed [`node::NodeRef`] union
//! - [`parser`]: YAML text into a [`tree::YamlTree`]
//! - [`tree`]: the documents of one source
//! - [`cursor`]: ancestor chain and per-frame messages during a walk
//! - [`visitor`]: depth-first traversal driving a cursor

pub mod cursor;
pub mod node;
pub mod parser;
pub mod tree;
pub mod visitor;
