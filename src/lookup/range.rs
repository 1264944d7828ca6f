//! lookup/range.rs – **Range-indexed table**
//!
//! Answers a key with the value of the range it falls in. Ranges are
//! stored as a flat, strictly increasing `bounds` list where
//! `(bounds[2i], bounds[2i + 1])` is the `i`-th inclusive range:
//!
//! ```text
//! bounds: [ 7,  9,  12, 14,  17, 21 ]
//! values: [ '☕',   '🍜',    '🍖'   ]
//!
//! 7..=9 → '☕'   12..=14 → '🍜'   17..=21 → '🍖'   anything else → error
//! ```
//!
//! A single value may be shared by every range. With `copy_key` set, the
//! placeholder marker inside a value is replaced by the key's character.

use super::{BuildError, Lookup, LookupError};
use crate::placeholder::KeyCopy;
use std::borrow::Cow;
use std::ops::RangeInclusive;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeTable<V = String> {
    bounds: Vec<u32>,
    values: Vec<V>,
    copy_key: bool,
}

impl<V: Clone> RangeTable<V> {
    /// Build a table with one value per range, or one value shared by all.
    pub fn new(bounds: impl Into<Vec<u32>>, values: impl Into<Vec<V>>) -> Result<Self, BuildError> {
        let table = Self {
            bounds: bounds.into(),
            values: values.into(),
            copy_key: false,
        };
        table.validate()?;
        Ok(table)
    }

    /// Build a table answering `default` for every key in every range.
    pub fn with_default(bounds: impl Into<Vec<u32>>, default: V) -> Result<Self, BuildError> {
        Self::new(bounds, vec![default])
    }

    /// Enable or disable placeholder expansion on lookup.
    #[must_use]
    pub fn with_copy_key(mut self, copy_key: bool) -> Self {
        self.copy_key = copy_key;
        self
    }

    /// Create a bounds list from inclusive ranges, checking order as it goes.
    pub fn bounds_from_ranges(ranges: &[RangeInclusive<u32>]) -> Result<Vec<u32>, BuildError> {
        let mut out = Vec::with_capacity(ranges.len() * 2);
        let mut last_end = None;
        for (index, r) in ranges.iter().enumerate() {
            let (start, end) = (*r.start(), *r.end());
            if start > end {
                return Err(BuildError::StartAfterEnd { start, end });
            }
            if start == end {
                return Err(BuildError::ZeroLength { index });
            }
            if last_end.is_some_and(|last| start <= last) {
                return Err(BuildError::NotIncreasing { index: index * 2 });
            }
            out.extend([start, end]);
            last_end = Some(end);
        }
        Ok(out)
    }

    /// Check the table is well formed:
    ///
    /// 1. every range has a start and an end (even number of bounds),
    /// 2. there is one value, or one value per range,
    /// 3. bounds are strictly increasing, so ranges never overlap.
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.bounds.len() % 2 != 0 {
            return Err(BuildError::OddBounds { len: self.bounds.len() });
        }
        let ranges = self.range_count();
        if self.values.len() != 1 && self.values.len() != ranges {
            return Err(BuildError::ValueCount {
                ranges,
                values: self.values.len(),
            });
        }
        if let Some(index) = self
            .bounds
            .windows(2)
            .position(|pair| pair[1] <= pair[0])
        {
            return Err(BuildError::NotIncreasing { index: index + 1 });
        }
        Ok(())
    }

    #[inline]
    pub fn bounds(&self) -> &[u32] {
        &self.bounds
    }

    #[inline]
    pub fn values(&self) -> &[V] {
        &self.values
    }

    #[inline]
    pub fn copy_key(&self) -> bool {
        self.copy_key
    }

    #[inline]
    pub fn range_count(&self) -> usize {
        self.bounds.len() / 2
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Iterate ranges with the value each one answers.
    pub fn ranges(&self) -> impl Iterator<Item = (RangeInclusive<u32>, &V)> + '_ {
        self.bounds
            .chunks_exact(2)
            .enumerate()
            .map(|(i, pair)| (pair[0]..=pair[1], self.value_at(i * 2)))
    }

    /// Locate `key` in `bounds`: `(index, found)`.
    ///
    /// When `key` is a bound, `index` is its position. Otherwise `index` is
    /// where `key` would be inserted to keep `bounds` sorted: `0` means
    /// below the first range, `len` means above the last, an odd index
    /// means inside a range and an even one means in a gap between ranges.
    pub fn locate(&self, key: u32) -> (usize, bool) {
        let len = self.bounds.len();
        if len == 0 {
            return (0, false);
        }
        let mut i_start = 0;
        let mut i_end = len - 1;
        if key > self.bounds[i_end] {
            return (len, false);
        }
        while i_end - i_start > 1 {
            let i = i_start + (i_end - i_start) / 2;
            let bound = self.bounds[i];
            if key == bound {
                return (i, true);
            }
            if key < bound {
                i_end = i;
            } else {
                i_start = i;
            }
        }
        // The loop stops once the ends meet, so a key sitting exactly on
        // one of them has not been flagged yet.
        if key > self.bounds[i_start] {
            (i_end, key == self.bounds[i_end])
        } else {
            (i_start, key == self.bounds[i_start])
        }
    }

    /// Whether `key` lies inside any range.
    #[inline]
    pub fn contains(&self, key: u32) -> bool {
        let (index, found) = self.locate(key);
        found || index % 2 == 1
    }

    /// Insert one or more ranges, packed pairwise in `new_bounds`, with one
    /// value each.
    ///
    /// Every range is checked against the table as it stands after the
    /// ranges before it went in. The call is all-or-nothing: on error the
    /// table is exactly as it was.
    pub fn insert(&mut self, new_bounds: &[u32], new_values: Vec<V>) -> Result<(), BuildError> {
        if new_bounds.len() % 2 != 0 {
            return Err(BuildError::OddBounds { len: new_bounds.len() });
        }
        if new_values.len() != new_bounds.len() / 2 {
            return Err(BuildError::ValueCount {
                ranges: new_bounds.len() / 2,
                values: new_values.len(),
            });
        }

        let mut scratch = self.clone();
        scratch.spread_shared_value();
        for (index, (pair, value)) in new_bounds.chunks_exact(2).zip(new_values).enumerate() {
            let (ks, ke) = (pair[0], pair[1]);
            let (i_start, ks_found) = scratch.locate(ks);
            let (i_end, ke_found) = scratch.locate(ke);
            if i_start != i_end {
                return Err(BuildError::Overlap { index });
            }
            if i_start % 2 == 1 || ks_found || ke_found {
                return Err(BuildError::InsideRange { index });
            }
            if ke <= ks {
                return Err(BuildError::ZeroLength { index });
            }
            scratch.bounds.insert(i_start, ke);
            scratch.bounds.insert(i_start, ks);
            scratch.values.insert(i_start / 2, value);
        }
        *self = scratch;
        Ok(())
    }

    /// Range removal is not available; always fails and leaves the table
    /// untouched.
    pub fn remove(&mut self, _key: u32) -> Result<(), BuildError> {
        Err(BuildError::RemovalUnsupported)
    }

    // A shared value becomes one copy per range so a new range can carry
    // its own value.
    fn spread_shared_value(&mut self) {
        let ranges = self.range_count();
        if self.values.len() != ranges {
            let shared = self.values.first().cloned();
            self.values = shared.map(|v| vec![v; ranges]).unwrap_or_default();
        }
    }

    #[inline]
    fn value_at(&self, index: usize) -> &V {
        if self.values.len() == 1 {
            &self.values[0]
        } else {
            &self.values[index / 2]
        }
    }
}

impl<V: KeyCopy> RangeTable<V> {
    /// Look up the value of the range containing `key`.
    pub fn get(&self, key: u32) -> Result<Cow<'_, V>, LookupError> {
        let (index, found) = self.locate(key);
        if !found {
            if index == 0 {
                return Err(LookupError::BelowFirst { key });
            }
            if index == self.bounds.len() {
                return Err(LookupError::AboveLast { key });
            }
            if index % 2 == 0 {
                return Err(LookupError::Gap { key });
            }
        }
        let value = self.value_at(index);
        if !self.copy_key {
            return Ok(Cow::Borrowed(value));
        }
        Ok(match value.copy_key(key) {
            Some(filled) => Cow::Owned(filled),
            None => Cow::Borrowed(value),
        })
    }
}

impl Lookup for RangeTable<String> {
    #[inline]
    fn covers(&self, key: u32) -> bool {
        self.contains(key)
    }

    fn lookup(&self, key: u32) -> Result<Cow<'_, str>, LookupError> {
        Ok(match self.get(key)? {
            Cow::Borrowed(s) => Cow::Borrowed(s.as_str()),
            Cow::Owned(s) => Cow::Owned(s),
        })
    }
}
