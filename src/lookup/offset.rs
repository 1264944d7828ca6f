//! lookup/offset.rs – **Code point offset lookup**
//! * Maps `start..=end` onto another range by adding a constant offset
//! * `OffsetLookup::new(65, 90, 65248)` turns `A` into `Ａ`
//! * Reversible: [`OffsetLookup::reversed`] inverts the mapping exactly
//! * Flattenable into explicit map entries

use super::{BuildError, Flatten, Lookup, LookupError, MAX_CODE_POINT, TranslationMap};
use std::borrow::Cow;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetLookup {
    start: u32,
    end: u32,
    offset: i64,
}

impl OffsetLookup {
    pub fn new(start: u32, end: u32, offset: i64) -> Result<Self, BuildError> {
        if start > end {
            return Err(BuildError::StartAfterEnd { start, end });
        }
        if i64::from(start) + offset < 0 {
            return Err(BuildError::NegativeStart { start, offset });
        }
        Ok(Self { start, end, offset })
    }

    /// Build the inverse of `new(start, end, offset)`.
    ///
    /// The bounds are shifted by the original offset and the offset is
    /// negated, so the result maps every output of the forward lookup back
    /// onto its key.
    pub fn reversed(start: u32, end: u32, offset: i64) -> Result<Self, BuildError> {
        Self::new(start, end, offset)?.reverse()
    }

    /// The inverse of this lookup.
    ///
    /// Fails with [`BuildError::ShiftOverflow`] when a shifted bound does not
    /// fit in a `u32`.
    pub fn reverse(&self) -> Result<Self, BuildError> {
        // `new` guarantees start + offset >= 0, and end >= start.
        let shift = |bound: u32| {
            u32::try_from(i64::from(bound) + self.offset).map_err(|_| BuildError::ShiftOverflow {
                bound,
                offset: self.offset,
            })
        };
        Ok(Self {
            start: shift(self.start)?,
            end: shift(self.end)?,
            offset: -self.offset,
        })
    }

    #[inline(always)]
    pub const fn start(&self) -> u32 {
        self.start
    }

    #[inline(always)]
    pub const fn end(&self) -> u32 {
        self.end
    }

    #[inline(always)]
    pub const fn offset(&self) -> i64 {
        self.offset
    }

    #[inline(always)]
    pub const fn contains(&self, key: u32) -> bool {
        key >= self.start && key <= self.end
    }

    /// The character `key` maps to.
    pub fn map(&self, key: u32) -> Result<char, LookupError> {
        if !self.contains(key) {
            return Err(LookupError::OutOfRange { key });
        }
        let result = i64::from(key) + self.offset;
        if result < 0 {
            return Err(LookupError::InvalidResult { key, result });
        }
        if result > i64::from(MAX_CODE_POINT) {
            return Err(LookupError::OutOfRange { key });
        }
        // 0 <= result <= MAX_CODE_POINT, so the cast is lossless.
        let code_point = result as u32;
        char::from_u32(code_point).ok_or(LookupError::NotACharacter { key, code_point })
    }

    /// Materialise every key in `start..=end`.
    pub fn to_map(&self) -> Result<BTreeMap<u32, char>, LookupError> {
        (self.start..=self.end)
            .map(|key| self.map(key).map(|c| (key, c)))
            .collect()
    }
}

impl Lookup for OffsetLookup {
    #[inline]
    fn covers(&self, key: u32) -> bool {
        self.contains(key)
    }

    fn lookup(&self, key: u32) -> Result<Cow<'_, str>, LookupError> {
        self.map(key).map(|c| Cow::Owned(c.to_string()))
    }
}

impl Flatten for OffsetLookup {
    fn flatten_into(&self, target: &mut TranslationMap) -> Result<(), LookupError> {
        for (key, c) in self.to_map()? {
            target.set(key, c.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_lookup_contract;

    const WIDE: i64 = 65248;

    #[test]
    fn test_eq() {
        let a = OffsetLookup::new(33, 127, WIDE).unwrap();
        let b = OffsetLookup::new(33, 127, WIDE).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_eq_not_equal() {
        let a = OffsetLookup::new(33, 127, WIDE).unwrap();
        let b = OffsetLookup::new(65, 90, 119473).unwrap();
        // nearly identical to b
        let c = OffsetLookup::new(65, 90, 119951).unwrap();
        assert_ne!(a, b);
        assert_ne!(b, c);
    }

    #[test]
    fn test_wide_letters() {
        let wide = OffsetLookup::new(65, 90, WIDE).unwrap();
        assert_eq!(wide.map('A' as u32).unwrap(), 'Ａ');
        assert_eq!(wide.lookup('Z' as u32).unwrap(), "Ｚ");
    }

    #[test]
    fn test_out_of_domain() {
        let wide = OffsetLookup::new(65, 90, WIDE).unwrap();
        assert_eq!(wide.map(64), Err(LookupError::OutOfRange { key: 64 }));
        assert_eq!(wide.map(91), Err(LookupError::OutOfRange { key: 91 }));
    }

    #[test]
    fn test_result_past_max_code_point() {
        let lookup = OffsetLookup::new(0x10FF00, 0x10FFFF, 0x80).unwrap();
        assert!(lookup.map(0x10FF7F).is_ok());
        assert_eq!(
            lookup.map(0x10FF80),
            Err(LookupError::OutOfRange { key: 0x10FF80 })
        );
    }

    #[test]
    fn test_result_in_surrogates() {
        let lookup = OffsetLookup::new(0xD000, 0xD100, 0x800).unwrap();
        assert_eq!(
            lookup.map(0xD000),
            Err(LookupError::NotACharacter { key: 0xD000, code_point: 0xD800 })
        );
    }

    #[test]
    fn test_construction_errors() {
        assert_eq!(
            OffsetLookup::new(10, 5, 0),
            Err(BuildError::StartAfterEnd { start: 10, end: 5 })
        );
        assert_eq!(
            OffsetLookup::new(10, 20, -11),
            Err(BuildError::NegativeStart { start: 10, offset: -11 })
        );
        assert!(OffsetLookup::new(10, 20, -10).is_ok());
    }

    #[test]
    fn test_reverse_round_trip() {
        let forward = OffsetLookup::new(33, 126, WIDE).unwrap();
        let backward = OffsetLookup::reversed(33, 126, WIDE).unwrap();
        assert_eq!(backward.start(), 33 + WIDE as u32);
        assert_eq!(backward.end(), 126 + WIDE as u32);
        assert_eq!(backward.offset(), -WIDE);
        for key in 33..=126 {
            let wide = forward.map(key).unwrap();
            assert_eq!(backward.map(wide as u32).unwrap() as u32, key);
        }
    }

    #[test]
    fn test_reverse_of_reverse() {
        let forward = OffsetLookup::new(0x61, 0x7A, 0x1D41A - 0x61).unwrap();
        assert_eq!(forward.reverse().unwrap().reverse().unwrap(), forward);
    }

    #[test]
    fn test_reverse_rejects_bounds_past_u32() {
        let offset = i64::from(u32::MAX);
        let forward = OffsetLookup::new(0, 10, offset).unwrap();
        assert_eq!(
            forward.reverse(),
            Err(BuildError::ShiftOverflow { bound: 10, offset })
        );
        assert_eq!(
            OffsetLookup::reversed(0, 10, offset),
            Err(BuildError::ShiftOverflow { bound: 10, offset })
        );
    }

    #[test]
    fn test_to_map() {
        let lookup = OffsetLookup::new(0x30, 0x32, 0x2460 - 0x31).unwrap();
        let map = lookup.to_map().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map[&0x31], '①');
    }

    #[test]
    fn test_flatten_contract() {
        let lookup = OffsetLookup::new(65, 90, WIDE).unwrap();
        assert_lookup_contract!(lookup, 60..=95);
    }
}
