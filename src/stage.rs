//! Core translation stage abstraction.
//!
//! A stage is one loaded bundle seen from the composer: a `Cow<str>` in, a
//! `Cow<str>` out. Stages that would not change the input report so through
//! [`Stage::needs_apply`] and the pipeline skips them, so text nothing
//! touches is never copied.

use crate::lookup::LookupError;
use std::borrow::Cow;
use thiserror::Error;

/// Public error type for every stage.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("Translation failed at stage `{stage}`: {source}")]
    Lookup {
        stage: String,
        #[source]
        source: LookupError,
    },
}

/// A single translation step.
pub trait Stage: Send + Sync {
    /// Human-readable name, used in error messages.
    fn name(&self) -> &str;

    /// Fast pre-check. Returning `Ok(false)` skips the whole stage.
    fn needs_apply(&self, text: &str) -> Result<bool, StageError>;

    /// Allocation-aware transformation. Must always be correct.
    fn apply<'a>(&self, text: Cow<'a, str>) -> Result<Cow<'a, str>, StageError>;
}
