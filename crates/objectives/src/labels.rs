//! Label Sets and Selector Encoding

use crate::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// Ordered set of label name/value pairs identifying an objective or alert
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Labels(BTreeMap<String, String>);

impl Labels {
    /// Create an empty label set
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert a label, returning the previous value if any
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Union of both sets; labels in `other` win on conflict
    pub fn merge(&self, other: &Labels) -> Labels {
        let mut merged = self.clone();
        for (name, value) in other.iter() {
            merged.insert(name, value);
        }
        merged
    }

    /// Encode as a selector: `{name="value", other="value"}`
    pub fn selector(&self) -> String {
        let matchers: Vec<String> = self
            .iter()
            .map(|(name, value)| format!("{}=\"{}\"", name, escape(value)))
            .collect();
        format!("{{{}}}", matchers.join(", "))
    }

    /// Parse a selector made of equality matchers only
    pub fn parse_selector(input: &str) -> Result<Self, ModelError> {
        let invalid = || ModelError::InvalidSelector(input.to_string());

        let inner = input
            .trim()
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .ok_or_else(invalid)?;

        let mut labels = Labels::new();
        let mut chars = inner.chars().peekable();

        loop {
            skip_whitespace(&mut chars);
            if chars.peek().is_none() {
                break;
            }

            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    name.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            skip_whitespace(&mut chars);

            if name.is_empty() || chars.next() != Some('=') {
                return Err(invalid());
            }
            // Only `=` is supported; `=~` would start with a tilde here
            skip_whitespace(&mut chars);
            if chars.next() != Some('"') {
                return Err(invalid());
            }

            let value = read_quoted(&mut chars).ok_or_else(invalid)?;
            labels.insert(name, value);

            skip_whitespace(&mut chars);
            match chars.next() {
                None => break,
                Some(',') => continue,
                Some(_) => return Err(invalid()),
            }
        }

        Ok(labels)
    }
}

impl fmt::Display for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.selector())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Labels {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Human-readable form of a series label.
///
/// Selector-shaped labels are reduced to their values (`{long="1h"}` becomes
/// `1h`); anything else is returned trimmed.
pub fn display_label(raw: &str) -> String {
    match Labels::parse_selector(raw) {
        Ok(labels) if !labels.is_empty() => labels
            .iter()
            .map(|(_, value)| value)
            .collect::<Vec<_>>()
            .join(", "),
        _ => raw.trim().to_string(),
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
        chars.next();
    }
}

fn read_quoted(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    let mut value = String::new();
    loop {
        match chars.next()? {
            '"' => return Some(value),
            '\\' => value.push(chars.next()?),
            c => value.push(c),
        }
    }
}
