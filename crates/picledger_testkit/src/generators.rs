//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random test data
//! that maintains required invariants.

use proptest::prelude::*;

/// Strategy for generating valid record ids.
///
/// Ids never start with the composite key namespace character, so they are
/// always plain state keys.
pub fn record_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9]{0,7}").expect("Invalid regex")
}

/// Strategy for generating normalized categories.
pub fn category_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["blue", "red", "green", "yellow"]).prop_map(str::to_string)
}

/// Strategy for generating owners, in mixed case.
pub fn owner_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z]{1,8}").expect("Invalid regex")
}

/// Strategy for generating quantities as the decimal strings callers send.
pub fn quantity_strategy() -> impl Strategy<Value = String> {
    any::<u32>().prop_map(|q| q.to_string())
}

/// Strategy for generating composite key attributes.
///
/// Any printable text without the reserved code points `U+0000` and
/// `U+10FFFF`.
pub fn key_part_strategy() -> impl Strategy<Value = String> {
    "\\PC{0,8}".prop_filter("reserved code point", |s| {
        !s.contains(['\u{0}', char::MAX])
    })
}

/// Strategy for generating a picture as `(id, category, quantity, owner)`.
pub fn picture_strategy() -> impl Strategy<Value = (String, String, String, String)> {
    (
        record_id_strategy(),
        category_strategy(),
        quantity_strategy(),
        owner_strategy(),
    )
}

/// Strategy for generating pictures with distinct ids.
pub fn pictures_strategy(
    max: usize,
) -> impl Strategy<Value = Vec<(String, String, String, String)>> {
    prop::collection::btree_map(
        record_id_strategy(),
        (category_strategy(), quantity_strategy(), owner_strategy()),
        0..max,
    )
    .prop_map(|pictures| {
        pictures
            .into_iter()
            .map(|(id, (category, quantity, owner))| (id, category, quantity, owner))
            .collect()
    })
}
