//! Container image references: `repository/image:tag@digest`.
//!
//! Parsing never fails. The reference is split right to left: everything
//! after the last `@` is the digest, then everything after the last `:` is
//! the tag, then everything after the last `/` is the image name and whatever
//! precedes it is the repository.
//!
//! # Example
//!
//! ```
//! use kubequill::image::ImageName;
//!
//! let name = ImageName::parse("gcr.io/team/nginx:1.25");
//! assert_eq!(name.repository(), Some("gcr.io/team"));
//! assert_eq!(name.tag(), Some("1.25"));
//!
//! let pattern = ImageName::parse("gcr.io/*/nginx:*");
//! assert!(name.matches(&pattern).unwrap());
//! ```

use std::fmt;
use std::str::FromStr;

use glob::{MatchOptions, Pattern};

/// Errors raised while matching image names against patterns.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    #[error("Invalid {component} pattern '{pattern}': {message}")]
    InvalidPattern {
        component: &'static str,
        pattern: String,
        message: String,
    },
}

/// The components of a container image reference. Any of them may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ImageName {
    repository: Option<String>,
    image: Option<String>,
    tag: Option<String>,
    digest: Option<String>,
}

impl ImageName {
    pub fn new(
        repository: Option<String>,
        image: Option<String>,
        tag: Option<String>,
        digest: Option<String>,
    ) -> Self {
        Self {
            repository,
            image,
            tag,
            digest,
        }
    }

    /// Splits a reference into its components.
    pub fn parse(reference: &str) -> Self {
        let mut rest = reference;

        let digest = rest.rfind('@').map(|idx| {
            let digest = &rest[idx + 1..];
            rest = &rest[..idx];
            digest.to_string()
        });

        let tag = rest.rfind(':').map(|idx| {
            let tag = &rest[idx + 1..];
            rest = &rest[..idx];
            tag.to_string()
        });

        let (repository, image) = match rest.rfind('/') {
            Some(idx) => {
                let repository = &rest[..idx];
                let repository = (!repository.is_empty()).then(|| repository.to_string());
                (repository, &rest[idx + 1..])
            }
            None => (None, rest),
        };

        Self {
            repository,
            image: Some(image.to_string()),
            tag,
            digest,
        }
    }

    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    pub fn has_digest(&self) -> bool {
        self.digest.as_deref().map_or(false, |d| !d.is_empty())
    }

    pub fn with_repository(&self, repository: Option<String>) -> Self {
        Self {
            repository,
            ..self.clone()
        }
    }

    pub fn with_image(&self, image: Option<String>) -> Self {
        Self {
            image,
            ..self.clone()
        }
    }

    pub fn with_tag(&self, tag: Option<String>) -> Self {
        Self {
            tag,
            ..self.clone()
        }
    }

    pub fn with_digest(&self, digest: Option<String>) -> Self {
        Self {
            digest,
            ..self.clone()
        }
    }

    /// Returns true if every component of this name matches the same
    /// component of `pattern`.
    ///
    /// A pattern component matches when it equals the candidate, is `*`, or
    /// is a glob matching it. Within a glob, `*` stays inside one `/`
    /// separated segment and `**` spans segments. An absent candidate
    /// component is matched as the empty string; an absent pattern component
    /// only matches an absent candidate.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidPattern`] if a pattern component is not a
    /// valid glob.
    pub fn matches(&self, pattern: &ImageName) -> Result<bool, ImageError> {
        Ok(
            component_matches("repository", self.repository(), pattern.repository())?
                && component_matches("image", self.image(), pattern.image())?
                && component_matches("tag", self.tag(), pattern.tag())?
                && component_matches("digest", self.digest(), pattern.digest())?,
        )
    }
}

fn component_matches(
    component: &'static str,
    candidate: Option<&str>,
    pattern: Option<&str>,
) -> Result<bool, ImageError> {
    let pattern = match (candidate, pattern) {
        (None, None) => return Ok(true),
        (_, None) => return Ok(false),
        (_, Some("*")) => return Ok(true),
        (Some(c), Some(p)) if c == p => return Ok(true),
        (_, Some(p)) => p,
    };

    let compiled = Pattern::new(pattern).map_err(|e| ImageError::InvalidPattern {
        component,
        pattern: pattern.to_string(),
        message: e.msg.to_string(),
    })?;
    let options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::new()
    };
    Ok(compiled.matches_with(candidate.unwrap_or(""), options))
}

impl fmt::Display for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(repository) = self.repository().filter(|r| !r.is_empty()) {
            write!(f, "{}/", repository)?;
        }
        write!(f, "{}", self.image().unwrap_or(""))?;
        if let Some(tag) = self.tag().filter(|t| !t.is_empty()) {
            write!(f, ":{}", tag)?;
        }
        if let Some(digest) = self.digest().filter(|d| !d.is_empty() && *d != "*") {
            write!(f, "@{}", digest)?;
        }
        Ok(())
    }
}

impl FromStr for ImageName {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
