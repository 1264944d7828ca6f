//! Rule set storage.
//!
//! A [`Repository`] hands out rule sets by name and resolves their
//! `trans-include` lists into a flat, precedence-ordered layer list.
//!
//! Inclusion order: a rule set overrides everything it includes, and among
//! the includes of one set the earlier-listed override the later-listed.
//! The resolved layers are ordered lowest precedence first, ready for
//! [`Bundle::build`](crate::bundle::Bundle::build).

use crate::rule::{RuleError, RuleSet, RuleWarning};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("rule set `{bundle}` not found")]
    NotFound { bundle: String },

    #[error("rule set `{bundle}` includes `{missing}`, which does not exist")]
    MissingInclude { bundle: String, missing: String },

    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// A rule set and everything it pulls in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    /// Lowest precedence first; the requested set is last.
    pub layers: Vec<RuleSet>,
    /// Self-inclusions and inclusion loops that were cut.
    pub warnings: Vec<RuleWarning>,
}

pub trait Repository: Send + Sync {
    /// Names of every rule set available, sorted.
    fn list(&self) -> Vec<String>;

    fn contains(&self, bundle: &str) -> bool {
        self.list().iter().any(|n| n == bundle)
    }

    /// Resolve `bundle` and its includes into layers.
    fn resolve(&self, bundle: &str) -> Result<Resolved, RepositoryError>;
}

/// Rule sets held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    sets: BTreeMap<String, RuleSet>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule set, replacing any with the same name.
    pub fn insert(&mut self, set: RuleSet) -> Option<RuleSet> {
        self.sets.insert(set.name().to_owned(), set)
    }

    /// Parse and add a rule set from its JSON form.
    pub fn insert_json(&mut self, name: &str, json: &str) -> Result<(), RuleError> {
        self.insert(RuleSet::from_json(name, json)?);
        Ok(())
    }

    #[must_use]
    pub fn with(mut self, set: RuleSet) -> Self {
        self.insert(set);
        self
    }

    pub fn get(&self, name: &str) -> Option<&RuleSet> {
        self.sets.get(name)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Depth-first walk: each set is recorded before its includes, so the
    /// reversed record puts includers above what they include.
    fn walk(
        &self,
        name: &str,
        seen: &mut Vec<String>,
        loaded: &mut Vec<RuleSet>,
        warnings: &mut Vec<RuleWarning>,
    ) -> Result<(), RepositoryError> {
        let set = self.sets.get(name).ok_or_else(|| RepositoryError::NotFound {
            bundle: name.to_owned(),
        })?;
        seen.push(name.to_owned());
        loaded.push(set.clone());

        for include in set.includes() {
            if include == name {
                warnings.push(RuleWarning::SelfInclude { bundle: name.to_owned() }.emit());
                continue;
            }
            if seen.iter().any(|s| s == include) {
                warnings.push(
                    RuleWarning::IncludeLoop {
                        from: name.to_owned(),
                        to: include.clone(),
                    }
                    .emit(),
                );
                continue;
            }
            if !self.sets.contains_key(include) {
                return Err(RepositoryError::MissingInclude {
                    bundle: name.to_owned(),
                    missing: include.clone(),
                });
            }
            self.walk(include, seen, loaded, warnings)?;
        }
        Ok(())
    }
}

impl FromIterator<RuleSet> for MemoryRepository {
    fn from_iter<I: IntoIterator<Item = RuleSet>>(iter: I) -> Self {
        let mut repo = Self::new();
        for set in iter {
            repo.insert(set);
        }
        repo
    }
}

impl Repository for MemoryRepository {
    fn list(&self) -> Vec<String> {
        self.sets.keys().cloned().collect()
    }

    fn contains(&self, bundle: &str) -> bool {
        self.sets.contains_key(bundle)
    }

    fn resolve(&self, bundle: &str) -> Result<Resolved, RepositoryError> {
        let mut seen = Vec::new();
        let mut layers = Vec::new();
        let mut warnings = Vec::new();
        self.walk(bundle, &mut seen, &mut layers, &mut warnings)?;
        layers.reverse();
        tracing::debug!(bundle, layers = layers.len(), "rule set resolved");
        Ok(Resolved { layers, warnings })
    }
}
