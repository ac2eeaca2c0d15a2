//! File I/O for manifests.
//!
//! This module loads YAML manifests from disk or stdin, gzip aware.

pub mod loader;

pub use loader::{load_manifest_file, load_manifest_from_reader, load_manifest_from_stdin};
