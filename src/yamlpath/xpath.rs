//! Slash-style front end: `/spec/containers[*]/image`, `//metadata/labels/*`.
//!
//! Step names run up to the next `/`, `[` or whitespace, so dotted keys such as
//! `app.kubernetes.io` need no quoting here. Bracket predicates are shared with
//! the JSONPath front end.

use super::ast::{Anchor, PathSegment, YamlPath};
use super::error::YamlPathError;
use super::parser::Parser;

impl Parser {
    /// Parses a slash-style query string.
    pub fn parse_slash(query: &str) -> Result<YamlPath, YamlPathError> {
        let mut parser = Parser::new(query);
        parser.parse_slash_path()
    }

    fn parse_slash_path(&mut self) -> Result<YamlPath, YamlPathError> {
        let mut segments = Vec::new();

        self.skip_whitespace();
        if self.is_eof() {
            return Err(YamlPathError::UnexpectedEnd {
                expected: "a path expression".to_string(),
            });
        }

        let anchor = if self.peek() == Some('/') {
            self.next();
            if self.peek() == Some('/') {
                self.next();
                segments.push(PathSegment::RecursiveDescent);
            } else if self.is_eof() {
                return Ok(YamlPath::new(Anchor::Root, segments));
            }
            Anchor::Root
        } else {
            Anchor::Relative
        };

        loop {
            self.parse_step(&mut segments)?;
            self.skip_whitespace();

            match self.peek() {
                None => break,
                Some('/') => {
                    self.next();
                    if self.peek() == Some('/') {
                        self.next();
                        segments.push(PathSegment::RecursiveDescent);
                    }
                }
                Some(ch) => {
                    return Err(YamlPathError::UnexpectedToken {
                        position: self.position,
                        found: ch.to_string(),
                        expected: "'/'".to_string(),
                    })
                }
            }
        }

        Ok(YamlPath::new(anchor, segments))
    }

    /// One step: a name or `*`, followed by any number of bracket predicates.
    fn parse_step(&mut self, segments: &mut Vec<PathSegment>) -> Result<(), YamlPathError> {
        self.skip_whitespace();
        let pos = self.position;

        match self.peek() {
            None => {
                return Err(YamlPathError::UnexpectedEnd {
                    expected: "path step".to_string(),
                })
            }
            Some('[') => {}
            Some(_) => {
                let name = self.parse_step_name();
                match name.as_str() {
                    "" => {
                        let found = self.peek().map(String::from).unwrap_or_default();
                        return Err(YamlPathError::UnexpectedToken {
                            position: pos,
                            found,
                            expected: "path step".to_string(),
                        });
                    }
                    "*" => segments.push(PathSegment::Wildcard),
                    _ => segments.push(PathSegment::Child(name)),
                }
            }
        }

        while self.peek() == Some('[') {
            segments.push(self.parse_bracket_expression()?);
        }
        Ok(())
    }

    fn parse_step_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch == '/' || ch == '[' || ch == ']' || ch == '\'' || ch == '"' || ch.is_whitespace()
            {
                break;
            }
            name.push(ch);
            self.next();
        }
        name
    }
}
