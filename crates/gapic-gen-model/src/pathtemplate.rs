//! HTTP path templates: literal segments and captured variables.
//!
//! Templates are built either fluently or by parsing the `google.api.http`
//! grammar:
//!
//! ```text
//! Template = "/" Segments [ Verb ] ;
//! Segments = Segment { "/" Segment } ;
//! Segment  = LITERAL | Variable ;
//! Variable = "{" FieldPath [ "=" Captures ] "}" ;
//! Captures = Capture { "/" Capture } ;
//! Capture  = "*" | "**" | LITERAL ;
//! FieldPath = IDENT { "." IDENT } ;
//! Verb     = ":" LITERAL ;
//! ```
//!
//! No validation beyond this shape happens here: whether a template makes
//! sense for a given wire format is decided by its consumers.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// Capture matching exactly one path segment (no `/`).
pub const SINGLE_SEGMENT_WILDCARD: &str = "*";

/// Capture matching any number of path segments, `/` included.
pub const MULTI_SEGMENT_WILDCARD: &str = "**";

/// An ordered list of path segments plus an optional trailing `:verb`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PathTemplate {
    /// Literal and variable segments, in path order.
    pub segments: Vec<PathSegment>,
    /// Custom verb suffix (e.g. `cancel` in `/v1/{name}:cancel`).
    pub verb: Option<String>,
}

/// One `/`-separated piece of a [`PathTemplate`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSegment {
    /// Matched verbatim.
    Literal(String),
    /// Captured into a request field.
    Variable(PathVariable),
}

/// A `{field.path=captures}` variable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PathVariable {
    /// Dotted field path the capture binds, split on `.`.
    pub field_path: Vec<String>,
    /// Capture segments: literals, [`SINGLE_SEGMENT_WILDCARD`] or [`MULTI_SEGMENT_WILDCARD`].
    pub segments: Vec<String>,
    /// Whether reserved characters (`/`) may appear unescaped in the value.
    pub allow_reserved: bool,
}

impl PathTemplate {
    /// Create an empty template.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a literal segment.
    #[must_use]
    pub fn with_literal(mut self, literal: &str) -> Self {
        self.segments.push(PathSegment::Literal(literal.to_string()));
        self
    }

    /// Append a variable segment.
    #[must_use]
    pub fn with_variable(mut self, variable: PathVariable) -> Self {
        self.segments.push(PathSegment::Variable(variable));
        self
    }

    /// Append a variable bound to `fields` that captures a single segment.
    #[must_use]
    pub fn with_variable_named(self, fields: &[&str]) -> Self {
        self.with_variable(PathVariable::new(fields).with_match())
    }

    /// Set the trailing custom verb.
    #[must_use]
    pub fn with_verb(mut self, verb: &str) -> Self {
        self.verb = Some(verb.to_string());
        self
    }

    /// Iterate over the variables of this template, in path order.
    pub fn variables(&self) -> impl Iterator<Item = &PathVariable> {
        self.segments.iter().filter_map(|s| match s {
            PathSegment::Variable(v) => Some(v),
            PathSegment::Literal(_) => None,
        })
    }

    /// Parse a `google.api.http` path template such as
    /// `/v1/{name=projects/*/secrets/*}:access`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathTemplate`] if the template does not start with
    /// `/`, has unbalanced braces, empty segments, an unnamed top-level
    /// wildcard, or a malformed field path.
    pub fn parse(template: &str) -> Result<Self> {
        let Some(body) = template.strip_prefix('/') else {
            return Err(Error::path_template(template, "must start with '/'"));
        };
        let (body, verb) = split_verb(template, body)?;

        let mut result = Self::new();
        for segment in split_top_level(template, body)? {
            if segment.is_empty() {
                return Err(Error::path_template(template, "empty segment"));
            }
            if let Some(inner) = segment.strip_prefix('{') {
                let Some(inner) = inner.strip_suffix('}') else {
                    return Err(Error::path_template(template, "unterminated variable"));
                };
                result = result.with_variable(parse_variable(template, inner)?);
                continue;
            }
            if segment == SINGLE_SEGMENT_WILDCARD || segment == MULTI_SEGMENT_WILDCARD {
                return Err(Error::path_template(
                    template,
                    "wildcards must be captured by a named variable",
                ));
            }
            if segment.contains(['{', '}']) {
                return Err(Error::path_template(template, "unbalanced braces"));
            }
            result = result.with_literal(segment);
        }
        result.verb = verb.map(ToString::to_string);
        Ok(result)
    }

    /// Parse a Discovery-style relative path such as
    /// `projects/{project}/zones/{zone}/instances/{+resource}:stop`.
    ///
    /// `{name}` captures one segment; `{+name}` captures any number of
    /// segments and allows reserved characters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathTemplate`] on empty segments or unbalanced braces.
    pub fn parse_discovery(path: &str) -> Result<Self> {
        let body = path.strip_prefix('/').unwrap_or(path);
        let (body, verb) = split_verb(path, body)?;

        let mut result = Self::new();
        for segment in split_top_level(path, body)? {
            if segment.is_empty() {
                return Err(Error::path_template(path, "empty segment"));
            }
            match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => {
                    let variable = match name.strip_prefix('+') {
                        Some(name) => PathVariable::new(&[name])
                            .with_match_recursive()
                            .with_allow_reserved(),
                        None => PathVariable::new(&[name]).with_match(),
                    };
                    result = result.with_variable(variable);
                }
                None if segment.contains(['{', '}']) => {
                    return Err(Error::path_template(path, "unbalanced braces"));
                }
                None => result = result.with_literal(segment),
            }
        }
        result.verb = verb.map(ToString::to_string);
        Ok(result)
    }
}

impl PathVariable {
    /// Create a variable bound to `fields` with no capture segments yet.
    #[must_use]
    pub fn new(fields: &[&str]) -> Self {
        Self {
            field_path: fields.iter().map(ToString::to_string).collect(),
            segments: Vec::new(),
            allow_reserved: false,
        }
    }

    /// Append a literal capture segment.
    #[must_use]
    pub fn with_literal(mut self, literal: &str) -> Self {
        self.segments.push(literal.to_string());
        self
    }

    /// Append a single-segment wildcard capture.
    #[must_use]
    pub fn with_match(mut self) -> Self {
        self.segments.push(SINGLE_SEGMENT_WILDCARD.to_string());
        self
    }

    /// Append a multi-segment wildcard capture.
    #[must_use]
    pub fn with_match_recursive(mut self) -> Self {
        self.segments.push(MULTI_SEGMENT_WILDCARD.to_string());
        self
    }

    /// Allow reserved characters in the captured value.
    #[must_use]
    pub fn with_allow_reserved(mut self) -> Self {
        self.allow_reserved = true;
        self
    }

    /// The dotted field path, e.g. `resource.name`.
    #[must_use]
    pub fn field_name(&self) -> String {
        self.field_path.join(".")
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            f.write_str("/")?;
            match segment {
                PathSegment::Literal(l) => f.write_str(l)?,
                PathSegment::Variable(v) => write!(f, "{v}")?,
            }
        }
        if let Some(verb) = &self.verb {
            write!(f, ":{verb}")?;
        }
        Ok(())
    }
}

impl fmt::Display for PathVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.field_name();
        if self.segments.len() == 1 && self.segments[0] == SINGLE_SEGMENT_WILDCARD {
            write!(f, "{{{name}}}")
        } else {
            write!(f, "{{{name}={}}}", self.segments.join("/"))
        }
    }
}

/// Split a trailing `:verb` that sits after the last top-level `/`.
fn split_verb<'a>(template: &str, body: &'a str) -> Result<(&'a str, Option<&'a str>)> {
    let mut depth = 0_usize;
    let mut verb_at = None;
    for (i, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| Error::path_template(template, "unbalanced braces"))?;
            }
            '/' if depth == 0 => verb_at = None,
            ':' if depth == 0 => verb_at = Some(i),
            _ => {}
        }
    }
    if depth != 0 {
        return Err(Error::path_template(template, "unbalanced braces"));
    }
    Ok(match verb_at {
        Some(i) if i + 1 < body.len() => (&body[..i], Some(&body[i + 1..])),
        Some(_) => return Err(Error::path_template(template, "empty verb")),
        None => (body, None),
    })
}

/// Split on `/` outside of `{...}`.
fn split_top_level<'a>(template: &str, body: &'a str) -> Result<Vec<&'a str>> {
    let mut segments = Vec::new();
    let mut depth = 0_usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| Error::path_template(template, "unbalanced braces"))?;
            }
            '/' if depth == 0 => {
                segments.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&body[start..]);
    Ok(segments)
}

fn parse_variable(template: &str, inner: &str) -> Result<PathVariable> {
    let (field_path, captures) = match inner.split_once('=') {
        Some((path, captures)) => (path, Some(captures)),
        None => (inner, None),
    };

    let fields: Vec<&str> = field_path.split('.').collect();
    let valid_ident = |s: &&str| {
        !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    };
    if !fields.iter().all(valid_ident) {
        return Err(Error::path_template(
            template,
            format!("invalid field path {field_path:?}"),
        ));
    }

    let mut variable = PathVariable::new(&fields);
    match captures {
        None => variable = variable.with_match(),
        Some(captures) => {
            for capture in captures.split('/') {
                variable = match capture {
                    "" => return Err(Error::path_template(template, "empty capture segment")),
                    SINGLE_SEGMENT_WILDCARD => variable.with_match(),
                    MULTI_SEGMENT_WILDCARD => variable.with_match_recursive(),
                    c if c.contains(['{', '}', '=']) => {
                        return Err(Error::path_template(template, "nested variables"));
                    }
                    c => variable.with_literal(c),
                };
            }
        }
    }
    Ok(variable)
}
