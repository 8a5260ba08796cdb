use std::fmt;
use crate::core::error::Result;
use crate::core::types::PATH_SEPARATOR;
use crate::query::ast::{Query, QueryValue};
use crate::query::matcher::Pattern;

/// One step of a path through the index.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Key(String),
    /// A key written as `/body/flags`. A literal child with the same raw
    /// name still wins during traversal.
    Pattern(Pattern),
}

impl Segment {
    pub fn compile(key: &str) -> Result<Segment> {
        Ok(match Pattern::parse(key)? {
            Some(pattern) => Segment::Pattern(pattern),
            None => Segment::Key(key.to_string()),
        })
    }

    pub fn raw(&self) -> &str {
        match self {
            Segment::Key(key) => key,
            Segment::Pattern(pattern) => pattern.as_str(),
        }
    }

    pub fn key_part(&self) -> KeyPart {
        match self {
            Segment::Key(key) => KeyPart::Key(key.clone()),
            Segment::Pattern(pattern) => KeyPart::Pattern(pattern.as_str().to_string()),
        }
    }
}

/// What the value at the end of a path must be.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Exact(String),
    Pattern(Pattern),
    /// An empty object or empty list.
    Empty,
}

impl Target {
    pub fn key_part(&self) -> KeyPart {
        match self {
            Target::Exact(value) => KeyPart::Exact(value.clone()),
            Target::Pattern(pattern) => KeyPart::Pattern(pattern.as_str().to_string()),
            Target::Empty => KeyPart::Empty,
        }
    }
}

/// Tagged component of a predicate key.
///
/// Keys, exact values and patterns with the same text stay distinct, and a
/// value containing the path separator cannot pose as a deeper path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyPart {
    Key(String),
    Pattern(String),
    Exact(String),
    Empty,
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeyPart::Key(text) | KeyPart::Pattern(text) | KeyPart::Exact(text) => f.write_str(text),
            KeyPart::Empty => f.write_str("{}"),
        }
    }
}

/// Structured identity of one predicate: its path and its target.
pub type PredicateKey = (Vec<KeyPart>, KeyPart);

/// Flattened leaf of a query: a path and the value expected there.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub path: Vec<Segment>,
    pub target: Target,
}

impl Predicate {
    /// Cache key component. Unlike the display form it cannot collide.
    pub fn key(&self) -> PredicateKey {
        (
            self.path.iter().map(Segment::key_part).collect(),
            self.target.key_part(),
        )
    }
}

/// `a__.b__.value`, for logs.
impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for segment in &self.path {
            write!(f, "{}{}", segment.raw(), PATH_SEPARATOR)?;
        }
        write!(f, "{}", self.target.key_part())
    }
}

/// Flattens a sub-query into its leaf predicates, depth first.
pub fn compile(query: &Query) -> Result<Vec<Predicate>> {
    let mut predicates = Vec::new();
    let mut path = Vec::new();
    compile_into(query, &mut path, &mut predicates)?;
    Ok(predicates)
}

/// Compiles each sub-query into its own predicate group.
pub fn compile_all(queries: &[Query]) -> Result<Vec<Vec<Predicate>>> {
    queries.iter().map(compile).collect()
}

fn compile_into(
    query: &Query,
    path: &mut Vec<Segment>,
    predicates: &mut Vec<Predicate>,
) -> Result<()> {
    for (key, value) in &query.fields {
        path.push(Segment::compile(key)?);

        match value {
            QueryValue::Literal(literal) => predicates.push(Predicate {
                path: path.clone(),
                target: Target::Exact(literal.clone()),
            }),
            QueryValue::Pattern(pattern) => predicates.push(Predicate {
                path: path.clone(),
                target: Target::Pattern(pattern.clone()),
            }),
            QueryValue::Nested(nested) if nested.is_empty() => predicates.push(Predicate {
                path: path.clone(),
                target: Target::Empty,
            }),
            QueryValue::Nested(nested) => compile_into(nested, path, predicates)?,
        }

        path.pop();
    }
    Ok(())
}
