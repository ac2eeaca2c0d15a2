//! YAMLPath query string parser.
//!
//! Two dialects are accepted and produce the same [`YamlPath`]:
//!
//! - JSONPath style: `$.spec.containers[*].image`, `..metadata.labels.*`,
//!   `.requests.memory`, `metadata.annotations['kubernetes.io/ingress.class']`
//! - Slash style: `/spec/containers[*]/image`, `//metadata/labels/*`,
//!   `spec/containers`
//!
//! [`Parser::parse`] picks the dialect: expressions starting with `$`, or with
//! no `/` outside brackets, are JSONPath style. This module holds the shared
//! scanning helpers, bracket predicates and the JSONPath front end; the slash
//! front end lives in `xpath.rs`.

use super::ast::{Anchor, Filter, FilterOp, PathSegment, YamlPath};
use super::error::YamlPathError;

/// Parser for YAMLPath query strings.
pub struct Parser {
    pub(super) input: Vec<char>,
    pub(super) position: usize,
}

impl Parser {
    /// Creates a new parser for the given query string.
    pub fn new(query: &str) -> Self {
        Self {
            input: query.chars().collect(),
            position: 0,
        }
    }

    /// Parses a query string in whichever dialect it is written in.
    pub fn parse(query: &str) -> Result<YamlPath, YamlPathError> {
        if is_slash_dialect(query) {
            Self::parse_slash(query)
        } else {
            Self::parse_jsonpath(query)
        }
    }

    /// Parses a JSONPath-style query string.
    pub fn parse_jsonpath(query: &str) -> Result<YamlPath, YamlPathError> {
        let mut parser = Parser::new(query);
        parser.parse_jsonpath_path()
    }

    fn parse_jsonpath_path(&mut self) -> Result<YamlPath, YamlPathError> {
        let mut segments = Vec::new();

        self.skip_whitespace();
        let anchor = match self.peek() {
            None => {
                return Err(YamlPathError::UnexpectedEnd {
                    expected: "a path expression".to_string(),
                })
            }
            Some('$') => {
                self.next();
                Anchor::Root
            }
            // `..name` searches the whole document
            Some('.') if self.peek_at(1) == Some('.') => Anchor::Root,
            Some('.') | Some('[') => Anchor::Relative,
            Some('*') => {
                self.next();
                segments.push(PathSegment::Wildcard);
                Anchor::Relative
            }
            Some(_) => {
                segments.push(PathSegment::Child(self.parse_identifier()?));
                Anchor::Relative
            }
        };

        loop {
            self.skip_whitespace();
            let pos = self.position;
            match self.peek() {
                None => break,
                Some('.') => {
                    self.next();
                    if self.peek() == Some('.') {
                        self.next();
                        segments.push(PathSegment::RecursiveDescent);
                        if self.peek() == Some('[') {
                            continue;
                        }
                    }
                    if self.peek() == Some('*') {
                        self.next();
                        segments.push(PathSegment::Wildcard);
                    } else {
                        segments.push(PathSegment::Child(self.parse_identifier()?));
                    }
                }
                Some('[') => {
                    segments.push(self.parse_bracket_expression()?);
                }
                Some(ch) => {
                    return Err(YamlPathError::UnexpectedToken {
                        position: pos,
                        found: ch.to_string(),
                        expected: "'.' or '['".to_string(),
                    })
                }
            }
        }

        Ok(YamlPath::new(anchor, segments))
    }

    /// Returns the current character without advancing.
    pub(super) fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    pub(super) fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    /// Returns the next character and advances position.
    pub(super) fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        Some(ch)
    }

    /// Skips whitespace characters.
    pub(super) fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.next();
            } else {
                break;
            }
        }
    }

    /// Checks if we've reached the end of input.
    pub(super) fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Expects a specific character and advances, or returns an error.
    pub(super) fn expect(&mut self, expected: char) -> Result<(), YamlPathError> {
        self.skip_whitespace();
        let pos = self.position;
        match self.next() {
            Some(ch) if ch == expected => Ok(()),
            Some(ch) => Err(YamlPathError::UnexpectedToken {
                position: pos,
                found: ch.to_string(),
                expected: format!("'{}'", expected),
            }),
            None => Err(YamlPathError::UnexpectedEnd {
                expected: format!("'{}'", expected),
            }),
        }
    }

    /// Parses an identifier (property name).
    fn parse_identifier(&mut self) -> Result<String, YamlPathError> {
        self.skip_whitespace();
        let pos = self.position;
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '-' {
                name.push(ch);
                self.next();
            } else {
                break;
            }
        }
        if !name.is_empty() {
            return Ok(name);
        }
        match self.peek() {
            Some(ch) => Err(YamlPathError::UnexpectedToken {
                position: pos,
                found: ch.to_string(),
                expected: "identifier".to_string(),
            }),
            None => Err(YamlPathError::UnexpectedEnd {
                expected: "identifier".to_string(),
            }),
        }
    }

    /// Parses bracket expression: [index], [start:end], ['key'], [*], [?(...)]
    pub(super) fn parse_bracket_expression(&mut self) -> Result<PathSegment, YamlPathError> {
        self.expect('[')?;
        self.skip_whitespace();

        let pos = self.position;
        let segment = match self.peek() {
            Some('*') => {
                self.next();
                self.expect(']')?;
                PathSegment::AnyIndex
            }
            Some('\'') | Some('"') => {
                let mut properties = self.parse_bracket_strings()?;
                self.expect(']')?;
                if properties.len() == 1 {
                    PathSegment::Child(properties.remove(0))
                } else {
                    PathSegment::MultiProperty(properties)
                }
            }
            Some('?') => {
                let filter = self.parse_filter()?;
                self.expect(']')?;
                PathSegment::Filter(filter)
            }
            Some('-') | Some('0'..='9') => {
                if self.bracket_contains(':') {
                    self.parse_slice()?
                } else {
                    let idx = self.parse_bracket_number()?;
                    self.expect(']')?;
                    PathSegment::Index(idx)
                }
            }
            Some(':') => self.parse_slice()?,
            Some(ch) => {
                return Err(YamlPathError::UnexpectedToken {
                    position: pos,
                    found: ch.to_string(),
                    expected: "'*', index, slice, quoted name or filter".to_string(),
                })
            }
            None => {
                return Err(YamlPathError::UnexpectedEnd {
                    expected: "']'".to_string(),
                })
            }
        };

        Ok(segment)
    }

    /// Looks ahead, without consuming, for `target` before the closing `]`.
    fn bracket_contains(&self, target: char) -> bool {
        self.input[self.position..]
            .iter()
            .take_while(|&&c| c != ']')
            .any(|&c| c == target)
    }

    /// Parses string(s) inside brackets: ['key'] or ['key1','key2']
    fn parse_bracket_strings(&mut self) -> Result<Vec<String>, YamlPathError> {
        let mut properties = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('\'') | Some('"') => properties.push(self.parse_quoted()?),
                _ => break,
            }
            self.skip_whitespace();
            if self.peek() == Some(',') {
                self.next();
            } else {
                break;
            }
        }
        Ok(properties)
    }

    /// Parses one quoted string, handling escapes.
    pub(super) fn parse_quoted(&mut self) -> Result<String, YamlPathError> {
        let quote = match self.next() {
            Some(q @ ('\'' | '"')) => q,
            Some(ch) => {
                return Err(YamlPathError::UnexpectedToken {
                    position: self.position - 1,
                    found: ch.to_string(),
                    expected: "quote".to_string(),
                })
            }
            None => {
                return Err(YamlPathError::UnexpectedEnd {
                    expected: "quote".to_string(),
                })
            }
        };

        let mut value = String::new();
        loop {
            match self.next() {
                Some(ch) if ch == quote => break,
                Some('\\') => match self.next() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('\\') => value.push('\\'),
                    Some('\'') => value.push('\''),
                    Some('"') => value.push('"'),
                    Some(_) | None => {
                        return Err(YamlPathError::InvalidSyntax {
                            message: "Invalid escape sequence".to_string(),
                        })
                    }
                },
                Some(ch) => value.push(ch),
                None => {
                    return Err(YamlPathError::UnexpectedEnd {
                        expected: format!("closing quote '{}'", quote),
                    })
                }
            }
        }
        Ok(value)
    }

    /// Parses a filter: ?(@.key), ?(@.key == 'v'), ?(@.key != 'v')
    fn parse_filter(&mut self) -> Result<Filter, YamlPathError> {
        self.expect('?')?;
        self.expect('(')?;
        self.expect('@')?;
        self.skip_whitespace();
        let key = match self.peek() {
            Some('[') => {
                self.next();
                self.skip_whitespace();
                let key = self.parse_quoted()?;
                self.expect(']')?;
                key
            }
            _ => {
                self.expect('.')?;
                self.parse_identifier()?
            }
        };

        self.skip_whitespace();
        let pos = self.position;
        let op = match (self.peek(), self.peek_at(1)) {
            (Some(')'), _) => FilterOp::Exists,
            (Some('='), Some('=')) => {
                self.position += 2;
                FilterOp::Eq(self.parse_filter_value()?)
            }
            (Some('!'), Some('=')) => {
                self.position += 2;
                FilterOp::Ne(self.parse_filter_value()?)
            }
            (Some(ch), _) => {
                return Err(YamlPathError::UnexpectedToken {
                    position: pos,
                    found: ch.to_string(),
                    expected: "'==', '!=' or ')'".to_string(),
                })
            }
            (None, _) => {
                return Err(YamlPathError::UnexpectedEnd {
                    expected: "')'".to_string(),
                })
            }
        };
        self.expect(')')?;

        Ok(Filter { key, op })
    }

    /// A filter operand: quoted string or bare word.
    fn parse_filter_value(&mut self) -> Result<String, YamlPathError> {
        self.skip_whitespace();
        if matches!(self.peek(), Some('\'') | Some('"')) {
            return self.parse_quoted();
        }
        let mut value = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.' | '/') {
                value.push(ch);
                self.next();
            } else {
                break;
            }
        }
        if value.is_empty() {
            Err(YamlPathError::InvalidSyntax {
                message: "Expected filter value".to_string(),
            })
        } else {
            Ok(value)
        }
    }

    /// Parses a number inside brackets
    fn parse_bracket_number(&mut self) -> Result<isize, YamlPathError> {
        self.skip_whitespace();
        let mut num = String::new();
        if self.peek() == Some('-') {
            num.push('-');
            self.next();
        }
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                num.push(ch);
                self.next();
            } else {
                break;
            }
        }
        if num.is_empty() || num == "-" {
            return Err(YamlPathError::InvalidSyntax {
                message: "Expected number".to_string(),
            });
        }
        num.parse::<isize>()
            .map_err(|_| YamlPathError::InvalidSyntax {
                message: format!("Invalid number: {}", num),
            })
    }

    /// Parses array slice: [start:end], [start:], [:end], [:]
    fn parse_slice(&mut self) -> Result<PathSegment, YamlPathError> {
        self.skip_whitespace();
        let start = if self.peek() == Some(':') {
            None
        } else {
            Some(self.parse_bracket_number()?)
        };

        self.expect(':')?;
        self.skip_whitespace();

        let end = if self.peek() == Some(']') {
            None
        } else {
            Some(self.parse_bracket_number()?)
        };

        self.expect(']')?;

        if let (Some(s), Some(e)) = (start, end) {
            if s >= 0 && e >= 0 && s > e {
                return Err(YamlPathError::InvalidSyntax {
                    message: format!("Invalid slice: start ({}) > end ({})", s, e),
                });
            }
        }

        Ok(PathSegment::Slice(start, end))
    }
}

/// True when `query` should be read as a slash-style path.
fn is_slash_dialect(query: &str) -> bool {
    let trimmed = query.trim_start();
    if trimmed.starts_with('$') || trimmed.starts_with('.') {
        return false;
    }

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for ch in trimmed.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, '/') if depth == 0 => return true,
            _ => {}
        }
    }
    false
}
