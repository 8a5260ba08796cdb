use std::fmt;
use regex::{Regex, RegexBuilder};
use crate::core::error::{Error, Result};

const FLAGS: &str = "dgimsuy";

/// Compiled `/body/flags` pattern used to match index keys.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Splits `/body/flags` into its parts, or `None` when `text` is not pattern syntax.
    pub fn split(text: &str) -> Option<(&str, &str)> {
        if !text.starts_with('/') {
            return None;
        }
        let end = text.rfind('/')?;
        if end == 0 {
            return None;
        }

        let flags = &text[end + 1..];
        if !flags.chars().all(|c| FLAGS.contains(c)) {
            return None;
        }
        Some((&text[1..end], flags))
    }

    pub fn is_pattern(text: &str) -> bool {
        Self::split(text).is_some()
    }

    /// Compiles `text` when it uses pattern syntax.
    ///
    /// Returns `Ok(None)` for plain literals and an error when the syntax is
    /// recognized but the pattern itself is malformed.
    pub fn parse(text: &str) -> Result<Option<Pattern>> {
        match Self::split(text) {
            Some((body, flags)) => Self::compile(text, body, flags).map(Some),
            None => Ok(None),
        }
    }

    fn compile(source: &str, body: &str, flags: &str) -> Result<Pattern> {
        let mut builder = RegexBuilder::new(body);
        let mut seen = String::new();

        for flag in flags.chars() {
            if seen.contains(flag) {
                return Err(Error::invalid_pattern(format!(
                    "duplicate flag '{}' in {}", flag, source
                )));
            }
            seen.push(flag);

            match flag {
                'i' => { builder.case_insensitive(true); }
                'm' => { builder.multi_line(true); }
                's' => { builder.dot_matches_new_line(true); }
                // d, g, u, y: no effect on key matching
                _ => {}
            }
        }

        let regex = builder
            .build()
            .map_err(|e| Error::invalid_pattern(format!("{}: {}", source, e)))?;

        Ok(Pattern {
            source: source.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }

    /// The `/body/flags` text as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.source)
    }
}
