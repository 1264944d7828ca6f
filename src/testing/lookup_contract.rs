use crate::lookup::{Flatten, Lookup};
use std::ops::RangeInclusive;

/// Flattening must not change what any key in `keys` translates to.
///
/// Keys the lookup answers must map to the same output in the flattened
/// map; keys it rejects must be absent from it.
pub fn assert_flatten_preserves_lookups<L: Lookup + Flatten>(lookup: &L, keys: RangeInclusive<u32>) {
    let flat = lookup.flatten().unwrap();
    for key in keys {
        match lookup.lookup(key) {
            Ok(expected) => assert_eq!(
                flat.get_code_point(key),
                expected,
                "flattened output differs for key {key:#X}"
            ),
            Err(_) => assert!(
                !flat.contains_key(key),
                "flattened map gained key {key:#X} the lookup rejects"
            ),
        }
    }
}

/// Every covered key must answer, and every answer must come from a covered key.
pub fn assert_covers_matches_lookup<L: Lookup>(lookup: &L, keys: RangeInclusive<u32>) {
    for key in keys {
        if !lookup.covers(key) {
            assert!(
                lookup.lookup(key).is_err(),
                "key {key:#X} answered but is not covered"
            );
        }
    }
}

#[macro_export]
macro_rules! assert_lookup_contract {
    ($lookup:expr, $keys:expr) => {
        $crate::testing::lookup_contract::assert_covers_matches_lookup(&$lookup, $keys);
        $crate::testing::lookup_contract::assert_flatten_preserves_lookups(&$lookup, $keys);
    };
}
