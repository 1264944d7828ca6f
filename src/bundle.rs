//! bundle.rs – **One loaded translation**
//! * Built from a rule set and everything it includes, lowest precedence first
//! * Character entries land in a single head map, later layers override
//! * Offset, range and regex rules form an ordered tail after the head
//! * Per character the newest covering tail lookup wins, then the head map
//! * Regex rules run over the whole string before the character pass
//! * Implements [`Stage`] so the composer can chain bundles

use crate::lookup::{Flatten, Lookup, LookupError, OffsetLookup, PatternRule, RangeTable, TranslationMap};
use crate::rule::{Rule, RuleError, RuleMeta, RuleSet, RuleWarning};
use crate::stage::{Stage, StageError};
use smallvec::SmallVec;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// How a bundle is built from its rule sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Which alternative to pick for entries that list several.
    pub alternate: usize,
    /// Materialise offset rules into the head map.
    pub flatten: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            alternate: 0,
            flatten: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailLookup {
    Offset(OffsetLookup),
    Range(RangeTable),
    Pattern(PatternRule),
}

impl TailLookup {
    /// The per-character view of this lookup; `None` for regex rules.
    #[inline]
    fn as_char_lookup(&self) -> Option<&dyn Lookup> {
        match self {
            TailLookup::Offset(l) => Some(l),
            TailLookup::Range(l) => Some(l),
            TailLookup::Pattern(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    name: String,
    meta: RuleMeta,
    head: TranslationMap,
    tail: SmallVec<[TailLookup; 4]>,
    warnings: Vec<RuleWarning>,
}

impl Bundle {
    /// Build a bundle from `layers`, ordered lowest precedence first.
    ///
    /// The bundle's metadata is the last layer's. Each layer's own metadata
    /// decides whether its entries are reversed.
    pub fn build(
        name: impl Into<String>,
        layers: &[RuleSet],
        options: BuildOptions,
    ) -> Result<Self, RuleError> {
        let name = name.into();
        let mut bundle = Self {
            meta: layers.last().map(|l| l.meta().clone()).unwrap_or_default(),
            name,
            head: TranslationMap::new(),
            tail: SmallVec::new(),
            warnings: Vec::new(),
        };
        // multi-char key -> rule set that last wrote it
        let mut origins = BTreeMap::new();
        for layer in layers {
            bundle.add_layer(layer, options.alternate, &mut origins)?;
        }
        if options.flatten {
            bundle.flatten(&origins).map_err(|source| RuleError::Lookup {
                bundle: bundle.name.clone(),
                source,
            })?;
        }
        tracing::debug!(
            bundle = %bundle.name,
            layers = layers.len(),
            head = bundle.head.len(),
            tail = bundle.tail.len(),
            warnings = bundle.warnings.len(),
            "bundle built"
        );
        Ok(bundle)
    }

    fn add_layer(
        &mut self,
        layer: &RuleSet,
        alternate: usize,
        origins: &mut BTreeMap<String, String>,
    ) -> Result<(), RuleError> {
        let set = layer.name();
        let reverse = layer.meta().reverses_entries();
        if layer.meta().uses_legacy_reverse() {
            self.warn(RuleWarning::DeprecatedReverse { bundle: set.into() });
        }
        let build_err = |key: &str, source| RuleError::Build {
            bundle: set.into(),
            key: key.into(),
            source,
        };

        for rule in layer.rules() {
            match rule {
                Rule::Char { key, value } => {
                    let Some(selected) = value.select(alternate) else {
                        self.warn(RuleWarning::EmptyAlternates {
                            bundle: set.into(),
                            key: key.clone(),
                        });
                        continue;
                    };
                    if !reverse {
                        self.set_entry(origins, set, key, selected);
                    } else if key.is_empty() {
                        self.warn(RuleWarning::ReversedDefault { bundle: set.into() });
                    } else {
                        // every alternative maps back onto the key
                        for alt in value.all() {
                            if alt.is_empty() {
                                // would land on the default key
                                self.warn(RuleWarning::ReversedDeletion {
                                    bundle: set.into(),
                                    key: key.clone(),
                                });
                                continue;
                            }
                            self.set_entry(origins, set, alt, key);
                        }
                    }
                }
                Rule::Offset { name, spec } => {
                    let Some(s) = spec.select(alternate) else {
                        self.warn(RuleWarning::EmptyAlternates {
                            bundle: set.into(),
                            key: name.clone(),
                        });
                        continue;
                    };
                    let lookup = if reverse {
                        OffsetLookup::reversed(s.0, s.1, s.2)
                    } else {
                        OffsetLookup::new(s.0, s.1, s.2)
                    }
                    .map_err(|e| build_err(name, e))?;
                    self.tail.push(TailLookup::Offset(lookup));
                }
                Rule::Range { name, spec } => {
                    if reverse {
                        self.warn(RuleWarning::ReversedRange {
                            bundle: set.into(),
                            name: name.clone(),
                        });
                        continue;
                    }
                    let Some(s) = spec.select(alternate) else {
                        self.warn(RuleWarning::EmptyAlternates {
                            bundle: set.into(),
                            key: name.clone(),
                        });
                        continue;
                    };
                    let table = RangeTable::new(s.0.clone(), s.1.clone())
                        .map_err(|e| build_err(name, e))?
                        .with_copy_key(true);
                    self.tail.push(TailLookup::Range(table));
                }
                Rule::Pattern { name, spec } => {
                    if reverse {
                        self.warn(RuleWarning::ReversedPattern {
                            bundle: set.into(),
                            name: name.clone(),
                        });
                        continue;
                    }
                    let Some(s) = spec.select(alternate) else {
                        self.warn(RuleWarning::EmptyAlternates {
                            bundle: set.into(),
                            key: name.clone(),
                        });
                        continue;
                    };
                    let pattern = PatternRule::new(&s.0, s.1.as_str()).map_err(|source| {
                        RuleError::Pattern {
                            bundle: set.into(),
                            key: name.clone(),
                            source,
                        }
                    })?;
                    self.tail.push(TailLookup::Pattern(pattern));
                }
            }
        }
        Ok(())
    }

    /// Fold offsets into the head map and drop entries a per-character pass
    /// can never match.
    ///
    /// Only offsets ahead of every range table are folded: a later tail
    /// lookup outranks the head, so folding one that follows a range would
    /// let the range win where they overlap.
    fn flatten(&mut self, origins: &BTreeMap<String, String>) -> Result<(), LookupError> {
        let mut flat = TranslationMap::new();
        self.head.flatten_into(&mut flat)?;

        let dropped: Vec<String> = self.head.named().map(|(k, _)| k.to_owned()).collect();
        for key in dropped {
            flat.remove(key.as_str());
            let bundle = origins.get(&key).unwrap_or(&self.name).clone();
            self.warn(RuleWarning::MultiCharKey { bundle, key });
        }

        let mut rest = SmallVec::new();
        let mut past_range = false;
        for lookup in self.tail.drain(..) {
            match lookup {
                TailLookup::Offset(offset) if !past_range => offset.flatten_into(&mut flat)?,
                other => {
                    past_range |= matches!(other, TailLookup::Range(_));
                    rest.push(other);
                }
            }
        }
        self.head = flat;
        self.tail = rest;
        Ok(())
    }

    fn set_entry(
        &mut self,
        origins: &mut BTreeMap<String, String>,
        set: &str,
        key: &str,
        value: &str,
    ) {
        if key.chars().nth(1).is_some() {
            origins.insert(key.to_owned(), set.to_owned());
        }
        self.head.set(key, value);
    }

    fn warn(&mut self, warning: RuleWarning) {
        self.warnings.push(warning.emit());
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    #[inline]
    pub fn head(&self) -> &TranslationMap {
        &self.head
    }

    #[inline]
    pub fn tail(&self) -> &[TailLookup] {
        &self.tail
    }

    /// Problems found while loading; each names a skipped entry.
    #[inline]
    pub fn warnings(&self) -> &[RuleWarning] {
        &self.warnings
    }

    /// Translate a single character.
    pub fn resolve(&self, c: char) -> Result<Cow<'_, str>, LookupError> {
        let key = c as u32;
        for lookup in self.tail.iter().rev().filter_map(TailLookup::as_char_lookup) {
            if lookup.covers(key) {
                return lookup.lookup(key);
            }
        }
        Ok(self.head.get_code_point(key))
    }

    /// True when the character pass may change `c`.
    #[inline]
    fn touches(&self, c: char) -> bool {
        let key = c as u32;
        self.head.default_entry().is_some()
            || self.head.contains_key(key)
            || self
                .tail
                .iter()
                .filter_map(TailLookup::as_char_lookup)
                .any(|l| l.covers(key))
    }

    fn patterns(&self) -> impl Iterator<Item = &PatternRule> + '_ {
        self.tail.iter().filter_map(|l| match l {
            TailLookup::Pattern(p) => Some(p),
            _ => None,
        })
    }

    fn lookup_failed(&self, source: LookupError) -> StageError {
        StageError::Lookup {
            stage: self.name.clone(),
            source,
        }
    }
}

/// Run one regex rule, keeping `text` borrowed when nothing matches.
fn apply_pattern<'a>(pattern: &PatternRule, text: Cow<'a, str>) -> Cow<'a, str> {
    match text {
        Cow::Borrowed(s) => pattern.apply(s),
        Cow::Owned(s) => {
            let replaced = match pattern.apply(&s) {
                Cow::Owned(new) => Some(new),
                Cow::Borrowed(_) => None,
            };
            Cow::Owned(replaced.unwrap_or(s))
        }
    }
}

impl Stage for Bundle {
    fn name(&self) -> &str {
        &self.name
    }

    fn needs_apply(&self, text: &str) -> Result<bool, StageError> {
        if self.patterns().any(|p| p.regex().is_match(text)) {
            return Ok(true);
        }
        // reversal alone changes anything longer than one character
        if self.meta.reverse_out && text.chars().nth(1).is_some() {
            return Ok(true);
        }
        Ok(text.chars().any(|c| self.touches(c)))
    }

    fn apply<'a>(&self, text: Cow<'a, str>) -> Result<Cow<'a, str>, StageError> {
        let mut text = text;
        for pattern in self.patterns() {
            text = apply_pattern(pattern, text);
        }

        if self.meta.reverse_out {
            // prepending each result while walking forward
            let mut out = String::with_capacity(text.len());
            for c in text.chars().rev() {
                out.push_str(&self.resolve(c).map_err(|e| self.lookup_failed(e))?);
            }
            return Ok(Cow::Owned(out));
        }

        if !text.chars().any(|c| self.touches(c)) {
            return Ok(text);
        }
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            out.push_str(&self.resolve(c).map_err(|e| self.lookup_failed(e))?);
        }
        if out == *text {
            return Ok(text);
        }
        Ok(Cow::Owned(out))
    }
}
