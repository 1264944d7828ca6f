pub mod bundle;
pub mod composer;
pub mod lookup;
pub mod pipeline;
pub mod placeholder;
pub mod preset;
pub mod repository;
pub mod rule;
pub mod stage;

#[cfg(test)]
mod testing;

pub use bundle::{BuildOptions, Bundle};
pub use composer::{BundleKey, BundleRef, Composer, ComposerBuilder, ComposerError};
pub use lookup::{
    BuildError, Flatten, Lookup, LookupError, MapKey, OffsetLookup, PatternRule, RangeTable,
    TranslationMap,
};
pub use placeholder::PLACEHOLDER;
pub use repository::{MemoryRepository, Repository, RepositoryError};
pub use rule::{Alternates, Rule, RuleError, RuleMeta, RuleSet, RuleWarning};
pub use stage::{Stage, StageError};
