//! lookup/pattern.rs – **Regex substitution**
//! * Applied to the whole string once per bundle, never per character
//! * The replacement may use `$1` / `${name}` capture references
//! * A placeholder marker in the replacement becomes the whole match
//! * Zero-copy when the pattern does not match

use crate::placeholder::{contains_placeholder, fill};
use regex::{Captures, Regex};
use std::borrow::Cow;

#[derive(Debug, Clone)]
pub struct PatternRule {
    regex: Regex,
    replacement: String,
}

impl PatternRule {
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self::from_regex(Regex::new(pattern)?, replacement))
    }

    pub fn from_regex(regex: Regex, replacement: impl Into<String>) -> Self {
        Self {
            regex,
            replacement: replacement.into(),
        }
    }

    #[inline]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    #[inline]
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Substitute every match in `text`.
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if !contains_placeholder(&self.replacement) {
            return self.regex.replace_all(text, self.replacement.as_str());
        }
        self.regex.replace_all(text, |caps: &Captures<'_>| {
            let mut expanded = String::new();
            caps.expand(&self.replacement, &mut expanded);
            // group 0 always participates in a match
            let whole = caps.get(0).map_or("", |m| m.as_str());
            fill(&expanded, whole).into_owned()
        })
    }
}

impl PartialEq for PatternRule {
    fn eq(&self, other: &Self) -> bool {
        self.regex.as_str() == other.regex.as_str() && self.replacement == other.replacement
    }
}

impl Eq for PatternRule {}
