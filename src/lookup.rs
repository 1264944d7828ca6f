//! Code point lookup objects.
//!
//! Four kinds of lookup make up a bundle:
//!
//! * [`TranslationMap`] – explicit code point → replacement entries with a
//!   default output. Always the head of a bundle.
//! * [`OffsetLookup`] – a contiguous range shifted by a constant offset.
//! * [`RangeTable`] – disjoint ranges answered by binary search.
//! * [`PatternRule`] – a regex applied to the whole string, not per char.
//!
//! The first three answer single code points through [`Lookup`]. Those
//! that can be expanded into explicit entries also implement [`Flatten`];
//! range tables and patterns do not.

pub mod map;
pub mod offset;
pub mod pattern;
pub mod range;

pub use map::{MapKey, TranslationMap};
pub use offset::OffsetLookup;
pub use pattern::PatternRule;
pub use range::RangeTable;

use std::borrow::Cow;
use thiserror::Error;

/// Highest Unicode code point.
pub const MAX_CODE_POINT: u32 = 0x10FFFF;

/// Per-lookup failure. Never leaves the queried object modified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("key {key:#X} is outside the lookup range")]
    OutOfRange { key: u32 },

    #[error("key {key:#X} resolves to negative code point {result}")]
    InvalidResult { key: u32, result: i64 },

    #[error("key {key:#X} resolves to {code_point:#X}, which is not a character")]
    NotACharacter { key: u32, code_point: u32 },

    #[error("key {key:#X} is smaller than the smallest bound")]
    BelowFirst { key: u32 },

    #[error("key {key:#X} is larger than the largest bound")]
    AboveLast { key: u32 },

    #[error("key {key:#X} falls in a gap between ranges")]
    Gap { key: u32 },
}

/// Construction and mutation failure. The object is either never created
/// or left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("start {start} and offset {offset} would produce a negative code point")]
    NegativeStart { start: u32, offset: i64 },

    #[error("start {start} comes after end {end}")]
    StartAfterEnd { start: u32, end: u32 },

    #[error("bounds list must have an even number of bounds, got {len}")]
    OddBounds { len: usize },

    #[error("expected one value or one value per range ({ranges}), got {values}")]
    ValueCount { ranges: usize, values: usize },

    #[error("bounds[{index}] must be larger than the bound before it")]
    NotIncreasing { index: usize },

    #[error("range {index}: new ranges must not overlap existing ranges")]
    Overlap { index: usize },

    #[error("range {index}: cannot create a range within or touching another")]
    InsideRange { index: usize },

    #[error("range {index}: ranges must have a length of one or more")]
    ZeroLength { index: usize },

    #[error("bound {bound} shifted by {offset} does not fit a code point")]
    ShiftOverflow { bound: u32, offset: i64 },

    #[error("range removal is not supported")]
    RemovalUnsupported,
}

/// A single code point lookup.
pub trait Lookup {
    /// Whether `key` is inside this lookup's domain.
    fn covers(&self, key: u32) -> bool;

    /// Resolve `key`, expanding the placeholder marker where the lookup
    /// kind calls for it.
    fn lookup(&self, key: u32) -> Result<Cow<'_, str>, LookupError>;

    #[inline]
    fn lookup_char(&self, c: char) -> Result<Cow<'_, str>, LookupError> {
        self.lookup(c as u32)
    }
}

/// Lookups that can be expanded into explicit dictionary entries.
///
/// Entries are written into `target` in key order; an entry already in
/// `target` is overridden, which is how "later wins" is realised when a
/// bundle is condensed into one dictionary.
pub trait Flatten {
    fn flatten_into(&self, target: &mut TranslationMap) -> Result<(), LookupError>;

    fn flatten(&self) -> Result<TranslationMap, LookupError> {
        let mut out = TranslationMap::new();
        self.flatten_into(&mut out)?;
        Ok(out)
    }
}
