//! Path expressions over manifest documents.
//!
//! Two dialects compile to the same [`YamlPath`]:
//!
//! - JSONPath: `$.spec.containers[*].image`, `..metadata.labels.*`
//! - slash paths: `/spec/containers[*]/image`, `//metadata/labels/*`
//!
//! # Supported Syntax
//!
//! - `$`, leading `/` - document body
//! - `.name`, `/name`, `['name']` - named child
//! - `['a','b']` - any of several names
//! - `*` - any single child, key or index
//! - `..`, `//` - zero or more levels
//! - `[n]`, `[-n]` - sequence index
//! - `[*]` - any sequence entry
//! - `[start:end]` - sequence slice
//! - `[?(@.key)]`, `[?(@.key == 'v')]`, `[?(@.key != 'v')]` - entry filters
//!
//! Expressions without `$` or a leading `/` are relative: they match any
//! position whose trailing levels fit the expression.

pub mod ast;
pub mod error;
pub(crate) mod evaluator;
pub mod matcher;
pub mod parser;
mod xpath;

pub use ast::{Anchor, PathSegment, YamlPath};
pub use error::YamlPathError;
pub use matcher::{compile, Matcher};
pub use parser::Parser;
