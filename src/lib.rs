//! KubeQuill - structural queries, resource models and value parsing for
//! Kubernetes manifests.
//!
//! - [`document`]: immutable YAML document tree, cursors and traversal
//! - [`yamlpath`]: path expressions matched against cursor positions
//! - [`kubernetes`]: resource model projection and manifest sections
//! - [`image`]: container image references
//! - [`quantity`]: resource quantities such as `512Mi`
//! - [`config`]: user configuration
//! - [`file`]: loading manifests from disk or stdin

pub mod config;
pub mod document;
pub mod file;
pub mod image;
pub mod kubernetes;
pub mod quantity;
pub mod yamlpath;
