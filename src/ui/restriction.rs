use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which values a text input accepts.
///
/// A string in `/.../` form is a full pattern; anything else is the body of a
/// character class. Both normalize to a pattern anchored on the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Restriction {
    Pattern(String),
    CharClass(String),
}

impl Restriction {
    pub fn normalized(&self) -> String {
        match self {
            Restriction::Pattern(pattern) => {
                let mut anchored = String::with_capacity(pattern.len() + 2);
                if !pattern.starts_with('^') {
                    anchored.push('^');
                }
                anchored.push_str(pattern);
                if !pattern.ends_with('$') {
                    anchored.push('$');
                }
                anchored
            }
            Restriction::CharClass(class) => match class.as_str() {
                // An empty class matches nothing, a lone negation matches anything.
                "" => "^$".to_string(),
                "^" => "^(?s:.)*$".to_string(),
                _ => format!("^[{}]*$", escape_class_body(class)),
            },
        }
    }

    pub fn compile(&self) -> Result<Regex> {
        Ok(Regex::new(&self.normalized())?)
    }
}

/// Escapes what the regex class syntax reads as nesting, set operations or
/// `--` differences, so every other character of the body stays literal.
/// Single `-` ranges, a leading `^` and existing escapes pass through.
fn escape_class_body(class: &str) -> String {
    let mut body = String::with_capacity(class.len() + 4);
    let mut chars = class.chars().peekable();
    let mut previous = None;
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                body.push('\\');
                body.push(chars.next().unwrap_or('\\'));
                previous = None;
                continue;
            }
            '[' | ']' | '&' | '~' => {
                body.push('\\');
                body.push(ch);
            }
            '-' if previous == Some('-') || chars.peek() == Some(&'-') => body.push_str("\\-"),
            _ => body.push(ch),
        }
        previous = Some(ch);
    }
    body
}

impl From<&str> for Restriction {
    fn from(value: &str) -> Self {
        match value
            .strip_prefix('/')
            .and_then(|rest| rest.strip_suffix('/'))
        {
            Some(pattern) if value.len() >= 2 => Restriction::Pattern(pattern.to_string()),
            _ => Restriction::CharClass(value.to_string()),
        }
    }
}

impl From<String> for Restriction {
    fn from(value: String) -> Self {
        Restriction::from(value.as_str())
    }
}

impl From<Restriction> for String {
    fn from(value: Restriction) -> Self {
        match value {
            Restriction::Pattern(pattern) => format!("/{pattern}/"),
            Restriction::CharClass(class) => class,
        }
    }
}

/// A compiled restriction plus the last value that satisfied it.
#[derive(Debug, Clone)]
pub struct RestrictionGuard {
    source: Restriction,
    regex: Regex,
    accepted: String,
}

impl RestrictionGuard {
    pub fn new(source: Restriction, current: &str) -> Result<Self> {
        let regex = source.compile()?;
        let accepted = if regex.is_match(current) {
            current.to_string()
        } else {
            String::new()
        };
        Ok(Self {
            source,
            regex,
            accepted,
        })
    }

    pub fn source(&self) -> &Restriction {
        &self.source
    }

    pub fn accepted(&self) -> &str {
        &self.accepted
    }

    /// Records `value` when it matches. Otherwise returns the value to revert to.
    pub fn check(&mut self, value: &str) -> Option<&str> {
        if self.accept_if_match(value) {
            None
        } else {
            Some(&self.accepted)
        }
    }

    /// Records `value` as the last accepted value when it matches.
    pub fn accept_if_match(&mut self, value: &str) -> bool {
        if !self.regex.is_match(value) {
            return false;
        }
        self.accepted.clear();
        self.accepted.push_str(value);
        true
    }
}
