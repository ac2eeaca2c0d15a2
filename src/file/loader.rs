//! Manifest loading.
//!
//! Manifests are read from files or stdin, transparently decompressing gzip
//! input, and parsed into a [`YamlTree`] holding every `---` separated
//! document.

use crate::document::parser::parse_yaml;
use crate::document::tree::YamlTree;
use anyhow::{Context, Result};
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Loads and parses a manifest file.
///
/// Files ending in `.gz`, or starting with the gzip magic bytes, are
/// decompressed first.
///
/// # Errors
///
/// This function will return an error if:
/// - The file cannot be read
/// - The file is gzipped but corrupted
/// - The contents are not valid UTF-8 or not valid YAML
pub fn load_manifest_file<P: AsRef<Path>>(path: P) -> Result<YamlTree> {
    let path_ref = path.as_ref();
    let bytes = fs::read(path_ref)
        .with_context(|| format!("Failed to read file: {}", path_ref.display()))?;

    let is_gzipped = path_ref
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let content = if is_gzipped || bytes.starts_with(&GZIP_MAGIC) {
        decompress_gzip_bytes(&bytes)
            .with_context(|| format!("Failed to decompress {}", path_ref.display()))?
    } else {
        String::from_utf8(bytes)
            .with_context(|| format!("Invalid UTF-8 in {}", path_ref.display()))?
    };

    let tree = parse_yaml(&content)
        .with_context(|| format!("Failed to parse YAML in {}", path_ref.display()))?;
    debug!(path = %path_ref.display(), documents = tree.len(), "loaded manifest");
    Ok(tree)
}

/// Loads and parses manifests from standard input.
pub fn load_manifest_from_stdin() -> Result<YamlTree> {
    load_manifest_from_reader(std::io::stdin().lock()).context("Failed to load stdin")
}

/// Reads a manifest from any reader, decompressing gzip input.
pub fn load_manifest_from_reader<R: Read>(mut reader: R) -> Result<YamlTree> {
    let mut buffer = Vec::new();
    reader
        .read_to_end(&mut buffer)
        .context("Failed to read input")?;

    let content = if buffer.starts_with(&GZIP_MAGIC) {
        decompress_gzip_bytes(&buffer)?
    } else {
        String::from_utf8(buffer).context("Invalid UTF-8 in input")?
    };

    let tree = parse_yaml(&content).context("Failed to parse YAML")?;
    debug!(documents = tree.len(), "loaded manifest from reader");
    Ok(tree)
}

/// Decompresses gzip-encoded bytes to a UTF-8 string.
///
/// # Errors
///
/// Returns an error if:
/// - The bytes are not valid gzip format
/// - The decompressed content is not valid UTF-8
fn decompress_gzip_bytes(bytes: &[u8]) -> Result<String> {
    use flate2::read::GzDecoder;

    let mut decoder = GzDecoder::new(bytes);
    let mut content = String::new();
    decoder
        .read_to_string(&mut content)
        .context("Failed to decompress gzipped input - it may be corrupted")?;
    Ok(content)
}
