//! Shared proptest generators for interface types.

use dip721_interface::{
    GenericValue, Int, Nat, Principal, PropertyBag, SupportedInterface, TokenMetadata,
};
use proptest::prelude::*;

/// Generate arbitrary principals, including the empty and anonymous ones.
pub fn principal_strategy() -> impl Strategy<Value = Principal> {
    prop_oneof![
        1 => Just(Principal::anonymous()),
        1 => Just(Principal::management()),
        8 => prop::collection::vec(any::<u8>(), 1..=29).prop_map(|bytes| {
            Principal::try_from_slice(&bytes).unwrap_or_else(|_| Principal::anonymous())
        }),
    ]
}

/// Generate `n` distinct principals.
pub fn distinct_principals_strategy(n: usize) -> impl Strategy<Value = Vec<Principal>> {
    let bytes = prop::collection::vec(any::<u8>(), 10);
    prop::collection::hash_set(bytes, n).prop_map(|set| {
        set.into_iter()
            .filter_map(|bytes| Principal::try_from_slice(&bytes).ok())
            .collect()
    })
}

/// Generate token identifiers in a small range so collisions happen.
pub fn token_id_strategy() -> impl Strategy<Value = Nat> {
    (0u64..64).prop_map(Nat::from)
}

/// Generate property keys.
pub fn property_key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

/// Generate property values, nesting up to three levels.
pub fn generic_value_strategy() -> impl Strategy<Value = GenericValue> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(GenericValue::BoolContent),
        "[ -~]{0,24}".prop_map(GenericValue::TextContent),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(GenericValue::BlobContent),
        principal_strategy().prop_map(GenericValue::Principal),
        any::<u8>().prop_map(GenericValue::Nat8Content),
        any::<u16>().prop_map(GenericValue::Nat16Content),
        any::<u32>().prop_map(GenericValue::Nat32Content),
        any::<u64>().prop_map(GenericValue::Nat64Content),
        any::<u128>().prop_map(|n| GenericValue::NatContent(Nat(n))),
        any::<i8>().prop_map(GenericValue::Int8Content),
        any::<i16>().prop_map(GenericValue::Int16Content),
        any::<i32>().prop_map(GenericValue::Int32Content),
        any::<i64>().prop_map(GenericValue::Int64Content),
        any::<i128>().prop_map(|n| GenericValue::IntContent(Int(n))),
        prop::num::f64::NORMAL.prop_map(GenericValue::FloatContent),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop::collection::vec((property_key_strategy(), inner), 0..4)
            .prop_map(GenericValue::NestedContent)
    })
}

/// Generate property bags.
pub fn property_bag_strategy() -> impl Strategy<Value = PropertyBag> {
    prop::collection::vec((property_key_strategy(), generic_value_strategy()), 0..6)
}

/// Generate non-empty capability sets.
pub fn supported_interfaces_strategy() -> impl Strategy<Value = Vec<SupportedInterface>> {
    prop::sample::subsequence(SupportedInterface::ALL.to_vec(), 1..=4)
}

/// Generate live tokens owned by `owner`.
pub fn token_strategy(owner: Principal) -> impl Strategy<Value = TokenMetadata> {
    (token_id_strategy(), property_bag_strategy(), any::<u64>()).prop_map(
        move |(id, properties, minted_at)| TokenMetadata {
            token_identifier: id,
            owner: Some(owner),
            operator: None,
            is_burned: false,
            properties,
            minted_at,
            minted_by: Principal::management(),
            transferred_at: None,
            transferred_by: None,
            approved_at: None,
            approved_by: None,
            burned_at: None,
            burned_by: None,
        },
    )
}
