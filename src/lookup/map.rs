//! lookup/map.rs – **Translation map**
//! * Code point → replacement entries with dict-like override semantics
//! * The empty-string key sets the default output, returned for any key
//!   without an entry (the placeholder alone when unset, i.e. identity)
//! * One-character string keys are stored as their code point
//! * Placeholder markers in a result become a copy of the looked-up key

use super::{Flatten, Lookup, LookupError};
use crate::placeholder::{PLACEHOLDER_STR, fill, fill_code_point};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

/// A key as written in a rule set, after coercion.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    /// The empty-string key: the default output.
    Default,
    CodePoint(u32),
    /// A multi-character key. Kept for metadata, never matched per char.
    Named(String),
}

impl From<&str> for MapKey {
    fn from(key: &str) -> Self {
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (None, _) => MapKey::Default,
            (Some(c), None) => MapKey::CodePoint(c as u32),
            _ => MapKey::Named(key.to_owned()),
        }
    }
}

impl From<String> for MapKey {
    fn from(key: String) -> Self {
        match MapKey::from(key.as_str()) {
            MapKey::Named(_) => MapKey::Named(key),
            other => other,
        }
    }
}

impl From<&String> for MapKey {
    fn from(key: &String) -> Self {
        MapKey::from(key.as_str())
    }
}

impl From<char> for MapKey {
    fn from(c: char) -> Self {
        MapKey::CodePoint(c as u32)
    }
}

impl From<u32> for MapKey {
    fn from(code_point: u32) -> Self {
        MapKey::CodePoint(code_point)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationMap {
    chars: HashMap<u32, String>,
    named: HashMap<String, String>,
    default: Option<String>,
}

impl TranslationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, returning the value it replaces.
    ///
    /// Setting [`MapKey::Default`] changes the fallback for every key
    /// without an entry, effective immediately.
    pub fn set(&mut self, key: impl Into<MapKey>, value: impl Into<String>) -> Option<String> {
        let value = value.into();
        match key.into() {
            MapKey::Default => self.default.replace(value),
            MapKey::CodePoint(cp) => self.chars.insert(cp, value),
            MapKey::Named(name) => self.named.insert(name, value),
        }
    }

    pub fn set_default(&mut self, value: impl Into<String>) -> Option<String> {
        self.set(MapKey::Default, value)
    }

    pub fn remove(&mut self, key: impl Into<MapKey>) -> Option<String> {
        match key.into() {
            MapKey::Default => self.default.take(),
            MapKey::CodePoint(cp) => self.chars.remove(&cp),
            MapKey::Named(name) => self.named.remove(&name),
        }
    }

    /// The stored default entry, if one was set.
    #[inline]
    pub fn default_entry(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// What a key without an entry resolves to, before placeholder filling.
    #[inline]
    pub fn default_output(&self) -> &str {
        self.default.as_deref().unwrap_or(PLACEHOLDER_STR)
    }

    pub fn contains_key(&self, key: impl Into<MapKey>) -> bool {
        match key.into() {
            MapKey::Default => self.default.is_some(),
            MapKey::CodePoint(cp) => self.chars.contains_key(&cp),
            MapKey::Named(name) => self.named.contains_key(&name),
        }
    }

    /// Resolve `key`: its entry or the default output, with every
    /// placeholder replaced by the key (as a character for code points).
    pub fn get(&self, key: impl Into<MapKey>) -> Cow<'_, str> {
        match key.into() {
            MapKey::Default => Cow::Borrowed(self.default_output()),
            MapKey::CodePoint(cp) => self.get_code_point(cp),
            MapKey::Named(name) => {
                let template = self.named.get(&name).map_or(self.default_output(), String::as_str);
                fill(template, &name)
            }
        }
    }

    #[inline]
    pub fn get_code_point(&self, cp: u32) -> Cow<'_, str> {
        let template = self.chars.get(&cp).map_or(self.default_output(), String::as_str);
        fill_code_point(template, cp)
    }

    /// True when no character can come out different from how it went in.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.chars.is_empty() && self.default.is_none()
    }

    /// Number of stored entries, the default entry included.
    pub fn len(&self) -> usize {
        self.chars.len() + self.named.len() + usize::from(self.default.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored code point entries, unexpanded.
    pub fn code_points(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.chars.iter().map(|(&cp, v)| (cp, v.as_str()))
    }

    /// Stored multi-character entries, unexpanded.
    pub fn named(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.named.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Export a plain key → value mapping, default entry included.
    ///
    /// Values are exported as stored: placeholders are left for the caller
    /// to fill at apply time, when the matched key is known.
    pub fn to_dict(&self) -> BTreeMap<MapKey, String> {
        let mut out: BTreeMap<MapKey, String> = self
            .chars
            .iter()
            .map(|(&cp, v)| (MapKey::CodePoint(cp), v.clone()))
            .chain(self.named.iter().map(|(k, v)| (MapKey::Named(k.clone()), v.clone())))
            .collect();
        if let Some(default) = &self.default {
            out.insert(MapKey::Default, default.clone());
        }
        out
    }

    /// Apply the map to every character of `text` in one left-to-right pass.
    ///
    /// Borrows `text` back when the map cannot change anything.
    pub fn translate<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.is_identity() {
            return Cow::Borrowed(text);
        }
        if self.default.is_none() && !text.chars().any(|c| self.chars.contains_key(&(c as u32))) {
            return Cow::Borrowed(text);
        }
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            out.push_str(&self.get_code_point(c as u32));
        }
        Cow::Owned(out)
    }
}

impl<K: Into<MapKey>, V: Into<String>> FromIterator<(K, V)> for TranslationMap {
    /// Replays every pair through [`TranslationMap::set`], so key coercion
    /// and default tracking apply exactly as for direct mutation.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = Self::new();
        out.extend(iter);
        out
    }
}

impl<K: Into<MapKey>, V: Into<String>> Extend<(K, V)> for TranslationMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl Lookup for TranslationMap {
    /// The default output answers every key.
    #[inline]
    fn covers(&self, _key: u32) -> bool {
        true
    }

    fn lookup(&self, key: u32) -> Result<Cow<'_, str>, LookupError> {
        Ok(self.get_code_point(key))
    }
}

impl Flatten for TranslationMap {
    fn flatten_into(&self, target: &mut TranslationMap) -> Result<(), LookupError> {
        for (&cp, v) in &self.chars {
            target.chars.insert(cp, v.clone());
        }
        for (k, v) in &self.named {
            target.named.insert(k.clone(), v.clone());
        }
        if let Some(default) = &self.default {
            target.default = Some(default.clone());
        }
        Ok(())
    }
}
