//! composer.rs – **Main entry point**
//!
//! A [`Composer`] binds named repositories, loads bundles out of them into a
//! cache, and chains the loaded bundles in a user-controlled operations
//! list. Translating runs the text through every bundle of the list in
//! order.
//!
//! ```
//! use glyphic::{Composer, preset};
//!
//! let mut composer = Composer::builder()
//!     .repository("builtin", preset::repository())
//!     .build();
//! let wide = composer.load("wide", 0).unwrap();
//! composer.push_op(&wide, None).unwrap();
//! assert_eq!(composer.translate("Hi!").unwrap(), "Ｈｉ！");
//! ```

use crate::bundle::{BuildOptions, Bundle};
use crate::pipeline::Pipeline;
use crate::repository::{Repository, RepositoryError};
use crate::rule::{RuleError, RuleMeta, RuleWarning};
use crate::stage::{Stage, StageError};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Separates the repository from the bundle name in qualified keys.
pub const FQ_SEPARATOR: char = ':';
/// Separates the bundle name from the alternate index in qualified keys.
pub const ALTERNATE_SEPARATOR: char = '.';

#[derive(Debug, Error)]
pub enum ComposerError {
    #[error("translation `{bundle}` not found in any bound repository")]
    NotFound { bundle: String },

    #[error("repository `{repository}` is not bound")]
    UnknownRepository { repository: String },

    #[error("bundle `{key}` is not loaded")]
    NotLoaded { key: String },

    #[error("bundle `{key}` is not in the operations list")]
    NotInOrder { key: String },

    #[error("index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("operations list is empty")]
    EmptyOrder,

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Stage(#[from] StageError),
}

/// Fully-qualified identity of a loaded bundle, shown as `repo:name.n`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BundleKey {
    pub repository: String,
    pub bundle: String,
    pub alternate: usize,
}

impl BundleKey {
    pub fn new(repository: impl Into<String>, bundle: impl Into<String>, alternate: usize) -> Self {
        Self {
            repository: repository.into(),
            bundle: bundle.into(),
            alternate,
        }
    }
}

impl fmt::Display for BundleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{FQ_SEPARATOR}{}{ALTERNATE_SEPARATOR}{}",
            self.repository, self.bundle, self.alternate
        )
    }
}

impl FromStr for BundleKey {
    type Err = ComposerError;

    /// Parse `repo:name.n`. A missing `.n` means alternate 0.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (repository, rest) = s.split_once(FQ_SEPARATOR).ok_or_else(|| ComposerError::NotLoaded {
            key: s.to_owned(),
        })?;
        let (bundle, alternate) = match rest.rsplit_once(ALTERNATE_SEPARATOR) {
            Some((bundle, n)) => match n.parse() {
                Ok(n) => (bundle, n),
                Err(_) => (rest, 0),
            },
            None => (rest, 0),
        };
        Ok(Self::new(repository, bundle, alternate))
    }
}

/// A way to name a loaded bundle or a slot in the operations list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleRef<'a> {
    /// Position in the load order (or, for [`Composer::pop_op`], in the
    /// operations list).
    Index(usize),
    /// `repo:name.n`, or a bare name matching the first loaded bundle of
    /// that name.
    Name(&'a str),
    Key(&'a BundleKey),
}

impl From<usize> for BundleRef<'_> {
    fn from(i: usize) -> Self {
        BundleRef::Index(i)
    }
}

impl<'a> From<&'a str> for BundleRef<'a> {
    fn from(s: &'a str) -> Self {
        BundleRef::Name(s)
    }
}

impl<'a> From<&'a String> for BundleRef<'a> {
    fn from(s: &'a String) -> Self {
        BundleRef::Name(s)
    }
}

impl<'a> From<&'a BundleKey> for BundleRef<'a> {
    fn from(k: &'a BundleKey) -> Self {
        BundleRef::Key(k)
    }
}

struct Loaded {
    key: BundleKey,
    bundle: Arc<Bundle>,
    warnings: Vec<RuleWarning>,
}

pub struct Composer {
    repositories: Vec<(String, Box<dyn Repository>)>,
    loaded: Vec<Loaded>,
    ops: Vec<BundleKey>,
    flatten: bool,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Composer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composer")
            .field("repositories", &self.repositories().collect::<Vec<_>>())
            .field("loaded", &self.list_loaded().collect::<Vec<_>>())
            .field("ops", &self.ops)
            .field("flatten", &self.flatten)
            .finish()
    }
}

impl Composer {
    pub fn new() -> Self {
        Self {
            repositories: Vec::new(),
            loaded: Vec::new(),
            ops: Vec::new(),
            flatten: true,
        }
    }

    pub fn builder() -> ComposerBuilder {
        ComposerBuilder::default()
    }

    // ── repositories ──

    /// Bind `repository` under `name`. Rebinding a name replaces the
    /// repository in place and drops every bundle loaded from the old one.
    pub fn bind_repository(&mut self, name: impl Into<String>, repository: impl Repository + 'static) {
        self.bind_boxed(name.into(), Box::new(repository));
    }

    fn bind_boxed(&mut self, name: String, repository: Box<dyn Repository>) {
        match self.repositories.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => {
                slot.1 = repository;
                self.loaded.retain(|l| l.key.repository != name);
                self.ops.retain(|k| k.repository != name);
                tracing::debug!(repository = %name, "repository rebound");
            }
            None => {
                tracing::debug!(repository = %name, "repository bound");
                self.repositories.push((name, repository));
            }
        }
    }

    /// Bound repository names, in binding order.
    pub fn repositories(&self) -> impl Iterator<Item = &str> + '_ {
        self.repositories.iter().map(|(n, _)| n.as_str())
    }

    /// Every bundle any bound repository offers, as `repo:name`.
    pub fn list_available(&self) -> Vec<String> {
        self.repositories
            .iter()
            .flat_map(|(repo, r)| {
                r.list()
                    .into_iter()
                    .map(move |name| format!("{repo}{FQ_SEPARATOR}{name}"))
            })
            .collect()
    }

    fn find_repository(&self, name: &str) -> Result<(&str, &dyn Repository), ComposerError> {
        if let Some((repo, bundle)) = name.split_once(FQ_SEPARATOR) {
            let (repo_name, r) = self
                .repositories
                .iter()
                .find(|(n, _)| n == repo)
                .ok_or_else(|| ComposerError::UnknownRepository {
                    repository: repo.to_owned(),
                })?;
            if !r.contains(bundle) {
                return Err(ComposerError::NotFound { bundle: name.to_owned() });
            }
            return Ok((repo_name.as_str(), r.as_ref()));
        }
        self.repositories
            .iter()
            .find(|(_, r)| r.contains(name))
            .map(|(n, r)| (n.as_str(), r.as_ref()))
            .ok_or_else(|| ComposerError::NotFound { bundle: name.to_owned() })
    }

    // ── loading ──

    /// Load `name` (bare, or `repo:name`) with the given alternate.
    ///
    /// Bare names are searched in binding order. A bundle already loaded
    /// under the same key is served from the cache.
    pub fn load(&mut self, name: &str, alternate: usize) -> Result<BundleKey, ComposerError> {
        let (repo_name, repository) = self.find_repository(name)?;
        let bundle_name = name.split_once(FQ_SEPARATOR).map_or(name, |(_, b)| b);
        let key = BundleKey::new(repo_name, bundle_name, alternate);

        if self.position(&key).is_some() {
            tracing::debug!(%key, "bundle served from cache");
            return Ok(key);
        }

        let resolved = repository.resolve(bundle_name)?;
        let bundle = Bundle::build(
            bundle_name,
            &resolved.layers,
            BuildOptions {
                alternate,
                flatten: self.flatten,
            },
        )?;
        let mut warnings = resolved.warnings;
        warnings.extend_from_slice(bundle.warnings());
        tracing::debug!(%key, warnings = warnings.len(), "bundle loaded");
        self.loaded.push(Loaded {
            key: key.clone(),
            bundle: Arc::new(bundle),
            warnings,
        });
        Ok(key)
    }

    /// Loaded bundle keys, in load order.
    pub fn list_loaded(&self) -> impl Iterator<Item = &BundleKey> + '_ {
        self.loaded.iter().map(|l| &l.key)
    }

    fn position(&self, key: &BundleKey) -> Option<usize> {
        self.loaded.iter().position(|l| l.key == *key)
    }

    fn entry(&self, key: &BundleKey) -> Option<&Loaded> {
        self.loaded.iter().find(|l| l.key == *key)
    }

    /// Turn a reference into the key of a loaded bundle.
    pub fn resolve_ref(&self, r: BundleRef<'_>) -> Result<BundleKey, ComposerError> {
        match r {
            BundleRef::Index(index) => self
                .loaded
                .get(index)
                .map(|l| l.key.clone())
                .ok_or(ComposerError::IndexOutOfRange {
                    index,
                    len: self.loaded.len(),
                }),
            BundleRef::Key(key) => self
                .entry(key)
                .map(|l| l.key.clone())
                .ok_or_else(|| ComposerError::NotLoaded { key: key.to_string() }),
            BundleRef::Name(name) if name.contains(FQ_SEPARATOR) => {
                let key: BundleKey = name.parse()?;
                self.resolve_ref(BundleRef::Key(&key))
            }
            BundleRef::Name(name) => self
                .loaded
                .iter()
                .find(|l| l.key.bundle == name)
                .map(|l| l.key.clone())
                .ok_or_else(|| ComposerError::NotLoaded { key: name.to_owned() }),
        }
    }

    pub fn bundle(&self, key: &BundleKey) -> Option<&Bundle> {
        self.entry(key).map(|l| l.bundle.as_ref())
    }

    pub fn meta(&self, key: &BundleKey) -> Option<&RuleMeta> {
        self.bundle(key).map(Bundle::meta)
    }

    /// Warnings from loading `key`: include problems first, then skipped
    /// entries.
    pub fn warnings(&self, key: &BundleKey) -> &[RuleWarning] {
        self.entry(key).map_or(&[], |l| l.warnings.as_slice())
    }

    // ── operations list ──

    pub fn order(&self) -> &[BundleKey] {
        &self.ops
    }

    /// Replace the operations list. Nothing changes if any reference fails.
    pub fn set_order<'r, I>(&mut self, refs: I) -> Result<(), ComposerError>
    where
        I: IntoIterator,
        I::Item: Into<BundleRef<'r>>,
    {
        let ops = refs
            .into_iter()
            .map(|r| self.resolve_ref(r.into()))
            .collect::<Result<Vec<_>, _>>()?;
        self.ops = ops;
        Ok(())
    }

    /// Insert a loaded bundle into the operations list at `position`, or
    /// append it.
    pub fn push_op<'r>(
        &mut self,
        r: impl Into<BundleRef<'r>>,
        position: Option<usize>,
    ) -> Result<(), ComposerError> {
        let key = self.resolve_ref(r.into())?;
        match position {
            Some(index) if index > self.ops.len() => Err(ComposerError::IndexOutOfRange {
                index,
                len: self.ops.len(),
            }),
            Some(index) => {
                self.ops.insert(index, key);
                Ok(())
            }
            None => {
                self.ops.push(key);
                Ok(())
            }
        }
    }

    /// Remove an entry from the operations list: by position, or the first
    /// occurrence of a bundle.
    pub fn pop_op<'r>(&mut self, r: impl Into<BundleRef<'r>>) -> Result<BundleKey, ComposerError> {
        if self.ops.is_empty() {
            return Err(ComposerError::EmptyOrder);
        }
        let index = match r.into() {
            BundleRef::Index(index) if index >= self.ops.len() => {
                return Err(ComposerError::IndexOutOfRange {
                    index,
                    len: self.ops.len(),
                });
            }
            BundleRef::Index(index) => index,
            other => {
                let key = self.resolve_ref(other)?;
                self.ops
                    .iter()
                    .position(|k| *k == key)
                    .ok_or_else(|| ComposerError::NotInOrder { key: key.to_string() })?
            }
        };
        Ok(self.ops.remove(index))
    }

    // ── cache ──

    /// Drop one bundle from the cache and the operations list.
    pub fn invalidate(&mut self, key: &BundleKey) -> bool {
        let before = self.loaded.len();
        self.loaded.retain(|l| l.key != *key);
        self.ops.retain(|k| k != key);
        before != self.loaded.len()
    }

    /// Drop every loaded bundle and empty the operations list.
    pub fn clear(&mut self) {
        self.loaded.clear();
        self.ops.clear();
    }

    pub fn invalidate_all(&mut self) {
        self.clear();
    }

    // ── translation ──

    fn pipeline(&self, keys: &[BundleKey]) -> Result<Pipeline, ComposerError> {
        let stages = keys
            .iter()
            .map(|key| {
                self.entry(key)
                    .map(|l| Arc::clone(&l.bundle) as Arc<dyn Stage>)
                    .ok_or_else(|| ComposerError::NotLoaded { key: key.to_string() })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Pipeline::new(stages))
    }

    /// Run `text` through the operations list.
    pub fn translate<'a>(&self, text: &'a str) -> Result<Cow<'a, str>, ComposerError> {
        Ok(self.pipeline(&self.ops)?.process(Cow::Borrowed(text))?)
    }

    /// Run `text` through the given bundles instead of the operations list.
    /// An empty `order` falls back to the operations list.
    pub fn translate_with<'a>(
        &self,
        text: &'a str,
        order: &[BundleRef<'_>],
    ) -> Result<Cow<'a, str>, ComposerError> {
        if order.is_empty() {
            return self.translate(text);
        }
        let keys = order
            .iter()
            .map(|&r| self.resolve_ref(r))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.pipeline(&keys)?.process(Cow::Borrowed(text))?)
    }
}

pub struct ComposerBuilder {
    repositories: Vec<(String, Box<dyn Repository>)>,
    flatten: bool,
}

impl Default for ComposerBuilder {
    fn default() -> Self {
        Self {
            repositories: Vec::new(),
            flatten: true,
        }
    }
}

impl ComposerBuilder {
    #[must_use]
    pub fn repository(mut self, name: impl Into<String>, repository: impl Repository + 'static) -> Self {
        self.repositories.push((name.into(), Box::new(repository)));
        self
    }

    /// Fold offset rules into explicit entries when loading (default on).
    #[must_use]
    pub fn flatten(mut self, on: bool) -> Self {
        self.flatten = on;
        self
    }

    pub fn build(self) -> Composer {
        let mut composer = Composer {
            flatten: self.flatten,
            ..Composer::new()
        };
        for (name, repository) in self.repositories {
            composer.bind_boxed(name, repository);
        }
        composer
    }
}
