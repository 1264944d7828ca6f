//! Parsed rule definitions.
//!
//! A [`RuleSet`] is one named set of translation rules as stored in a
//! repository, before any lookup objects are built. Its entries are
//! classified once, at parse time, into the [`Rule`] sum type:
//!
//! | key                       | value                          | rule            |
//! |---------------------------|--------------------------------|-----------------|
//! | `""`                      | `"\u{FFFC}\u{20E0}"`          | default output  |
//! | `"a"`                     | `"4"` or `["4", "∆"]`          | [`Rule::Char`]  |
//! | `"\u{F811} name"`         | `[start, end, offset]`         | [`Rule::Offset`]|
//! | `"\u{F812} name"`         | `[pattern, replacement]`       | [`Rule::Pattern`]|
//! | `"\u{F813} name"`         | `[[bounds..], [values..]]`     | [`Rule::Range`] |
//!
//! Any value may instead be an array of alternatives; see [`Alternates`].

use crate::lookup::BuildError;
use crate::lookup::LookupError;
use phf::phf_map;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Key prefix selecting an offset rule.
pub const SENTINEL_OFFSET: char = '\u{F811}';
/// Key prefix selecting a regex rule.
pub const SENTINEL_PATTERN: char = '\u{F812}';
/// Key prefix selecting a range rule.
pub const SENTINEL_RANGE: char = '\u{F813}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Char,
    Offset,
    Pattern,
    Range,
}

static SENTINELS: phf::Map<char, RuleKind> = phf_map! {
    '\u{F811}' => RuleKind::Offset,
    '\u{F812}' => RuleKind::Pattern,
    '\u{F813}' => RuleKind::Range,
};

impl RuleKind {
    /// Classify an entry key by its first character.
    pub fn of_key(key: &str) -> Self {
        key.chars()
            .next()
            .and_then(|c| SENTINELS.get(&c).copied())
            .unwrap_or(RuleKind::Char)
    }
}

// ──────────────────────────────────────────────────────────────
//  Errors and warnings
// ──────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule set `{bundle}` is not valid: {source}")]
    Json {
        bundle: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{bundle}: entry {key:?} is malformed: {source}")]
    Entry {
        bundle: String,
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{bundle}: entry {key:?}: {source}")]
    Build {
        bundle: String,
        key: String,
        #[source]
        source: BuildError,
    },

    #[error("{bundle}: entry {key:?}: invalid pattern: {source}")]
    Pattern {
        bundle: String,
        key: String,
        #[source]
        source: regex::Error,
    },

    #[error("{bundle}: {source}")]
    Lookup {
        bundle: String,
        #[source]
        source: LookupError,
    },
}

/// Non-fatal problems found while loading rules. The offending entry is
/// skipped and loading carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleWarning {
    #[error("{bundle}: default translations cannot be reversed, skipped")]
    ReversedDefault { bundle: String },

    #[error("{bundle}: deletion of {key:?} cannot be reversed, skipped")]
    ReversedDeletion { bundle: String, key: String },

    #[error("{bundle}: reverse range translations unsupported, `{name}` skipped")]
    ReversedRange { bundle: String, name: String },

    #[error("{bundle}: reverse regex translations unsupported, `{name}` skipped")]
    ReversedPattern { bundle: String, name: String },

    #[error("{bundle}: use reverse-trans to specify reverse translations")]
    DeprecatedReverse { bundle: String },

    #[error("{bundle}: multi-char key {key:?} cannot be matched per character, dropped")]
    MultiCharKey { bundle: String, key: String },

    #[error("{bundle}: entry {key:?} lists no alternatives, skipped")]
    EmptyAlternates { bundle: String, key: String },

    #[error("trans-include: {bundle}: cannot include self")]
    SelfInclude { bundle: String },

    #[error("trans-include: {from} to {to}: inclusion loop detected")]
    IncludeLoop { from: String, to: String },
}

impl RuleWarning {
    /// Log the warning and hand it back for collection.
    pub(crate) fn emit(self) -> Self {
        tracing::warn!(warning = %self, "rule loading");
        self
    }
}

// ──────────────────────────────────────────────────────────────
//  Rule values
// ──────────────────────────────────────────────────────────────

/// A single value, or an ordered list of alternatives for the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Alternates<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Alternates<T> {
    /// Pick alternative `n`, falling back to the first when `n` is out of
    /// range. `None` only for an empty list.
    pub fn select(&self, n: usize) -> Option<&T> {
        match self {
            Alternates::One(v) => Some(v),
            Alternates::Many(vs) => vs.get(n).or_else(|| vs.first()),
        }
    }

    pub fn all(&self) -> &[T] {
        match self {
            Alternates::One(v) => std::slice::from_ref(v),
            Alternates::Many(vs) => vs,
        }
    }

    pub fn len(&self) -> usize {
        self.all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.all().is_empty()
    }
}

impl<T> From<T> for Alternates<T> {
    fn from(v: T) -> Self {
        Alternates::One(v)
    }
}

/// `[start, end, offset]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetSpec(pub u32, pub u32, pub i64);

/// `[[bounds..], [values..]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSpec(pub Vec<u32>, pub Vec<String>);

/// `[pattern, replacement]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSpec(pub String, pub String);

/// One classified entry of a rule set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// A character entry. The empty key holds the default output.
    Char {
        key: String,
        value: Alternates<String>,
    },
    Offset {
        name: String,
        spec: Alternates<OffsetSpec>,
    },
    Range {
        name: String,
        spec: Alternates<RangeSpec>,
    },
    Pattern {
        name: String,
        spec: Alternates<PatternSpec>,
    },
}

impl Rule {
    /// Classify and decode one `trans` entry.
    pub fn parse(key: String, value: Value) -> Result<Self, serde_json::Error> {
        let kind = RuleKind::of_key(&key);
        let name = || key.chars().skip(1).collect::<String>().trim_start().to_owned();
        Ok(match kind {
            RuleKind::Char => Rule::Char {
                value: serde_json::from_value(value)?,
                key,
            },
            RuleKind::Offset => Rule::Offset {
                name: name(),
                spec: serde_json::from_value(value)?,
            },
            RuleKind::Pattern => Rule::Pattern {
                name: name(),
                spec: serde_json::from_value(value)?,
            },
            RuleKind::Range => Rule::Range {
                name: name(),
                spec: serde_json::from_value(value)?,
            },
        })
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Char { .. } => RuleKind::Char,
            Rule::Offset { .. } => RuleKind::Offset,
            Rule::Range { .. } => RuleKind::Range,
            Rule::Pattern { .. } => RuleKind::Pattern,
        }
    }

    /// The entry's key, or the name following its sentinel.
    pub fn name(&self) -> &str {
        match self {
            Rule::Char { key, .. } => key,
            Rule::Offset { name, .. } | Rule::Range { name, .. } | Rule::Pattern { name, .. } => {
                name
            }
        }
    }
}

// ──────────────────────────────────────────────────────────────
//  Rule sets
// ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleMeta {
    /// Swap keys and values of character entries when loading.
    #[serde(rename = "reverse-trans", skip_serializing_if = "Option::is_none")]
    pub reverse_trans: Option<bool>,

    /// Legacy spelling of `reverse-trans`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse: Option<bool>,

    /// Apply character substitutions from the end of the string.
    #[serde(rename = "reverse-out")]
    pub reverse_out: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Descriptions keyed by language tag.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub desc: BTreeMap<String, String>,
}

impl RuleMeta {
    #[inline]
    pub fn reverses_entries(&self) -> bool {
        self.reverse_trans.or(self.reverse).unwrap_or(false)
    }

    #[inline]
    pub fn uses_legacy_reverse(&self) -> bool {
        self.reverse == Some(true)
    }
}

#[derive(Deserialize)]
struct RawRuleSet {
    #[serde(default)]
    meta: RuleMeta,
    #[serde(default)]
    trans: serde_json::Map<String, Value>,
    #[serde(rename = "trans-include", default)]
    includes: Vec<String>,
}

/// One named set of rules, as a repository stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    name: String,
    meta: RuleMeta,
    rules: Vec<Rule>,
    includes: Vec<String>,
}

impl RuleSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta: RuleMeta::default(),
            rules: Vec::new(),
            includes: Vec::new(),
        }
    }

    /// Parse a rule set from its JSON form.
    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Self, RuleError> {
        let name = name.into();
        let raw: RawRuleSet = serde_json::from_str(json).map_err(|source| RuleError::Json {
            bundle: name.clone(),
            source,
        })?;
        let rules = raw
            .trans
            .into_iter()
            .map(|(key, value)| {
                Rule::parse(key.clone(), value).map_err(|source| RuleError::Entry {
                    bundle: name.clone(),
                    key,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name,
            meta: raw.meta,
            rules,
            includes: raw.includes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Names of the rule sets this one includes, highest precedence first.
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    // ── builder ──

    #[must_use]
    pub fn with_meta(mut self, meta: RuleMeta) -> Self {
        self.meta = meta;
        self
    }

    #[must_use]
    pub fn reverse_entries(mut self, on: bool) -> Self {
        self.meta.reverse_trans = Some(on);
        self
    }

    #[must_use]
    pub fn reverse_out(mut self, on: bool) -> Self {
        self.meta.reverse_out = on;
        self
    }

    #[must_use]
    pub fn describe(mut self, lang: impl Into<String>, text: impl Into<String>) -> Self {
        self.meta.desc.insert(lang.into(), text.into());
        self
    }

    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    #[must_use]
    pub fn char(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.rule(Rule::Char {
            key: key.into(),
            value: Alternates::One(value.into()),
        })
    }

    #[must_use]
    pub fn char_alternates<S: Into<String>>(
        self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        self.rule(Rule::Char {
            key: key.into(),
            value: Alternates::Many(values.into_iter().map(Into::into).collect()),
        })
    }

    #[must_use]
    pub fn default_output(self, value: impl Into<String>) -> Self {
        self.char("", value)
    }

    #[must_use]
    pub fn offset(self, name: impl Into<String>, start: u32, end: u32, offset: i64) -> Self {
        self.rule(Rule::Offset {
            name: name.into(),
            spec: OffsetSpec(start, end, offset).into(),
        })
    }

    #[must_use]
    pub fn range<S: Into<String>>(
        self,
        name: impl Into<String>,
        bounds: impl Into<Vec<u32>>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.rule(Rule::Range {
            name: name.into(),
            spec: RangeSpec(bounds.into(), values).into(),
        })
    }

    #[must_use]
    pub fn pattern(
        self,
        name: impl Into<String>,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        self.rule(Rule::Pattern {
            name: name.into(),
            spec: PatternSpec(pattern.into(), replacement.into()).into(),
        })
    }

    #[must_use]
    pub fn include(mut self, name: impl Into<String>) -> Self {
        self.includes.push(name.into());
        self
    }
}
