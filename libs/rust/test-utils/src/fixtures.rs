//! Test fixtures with sample data.

use dip721_interface::{
    BareCanisterInitData, CanisterInitData, GenericValue, Nat, Principal, PropertyBag,
    SupportedInterface, TokenMetadata,
};

/// Principal that administers the registry in tests.
#[must_use]
pub fn custodian() -> Principal {
    principal("zrrb4-gyxmq-nx67d-wmbky-k6xyt-byhmw-tr5ct-vsxu4-nuv2g-6rr65-aae")
}

/// First token holder.
#[must_use]
pub fn alice() -> Principal {
    principal("be2us-64aaa-aaaaa-qaabq-cai")
}

/// Second token holder.
#[must_use]
pub fn bob() -> Principal {
    principal("bs5l3-6b3zu-dpqyj-p2x4a-jyg4k-goneb-afof2-y5d62-skt67-3756q-dqe")
}

/// Principal with no role at all.
#[must_use]
pub fn mallory() -> Principal {
    Principal::try_from_slice(&[7; 29]).unwrap_or_else(|_| Principal::anonymous())
}

fn principal(text: &str) -> Principal {
    Principal::from_text(text).unwrap_or_else(|e| panic!("fixture principal {text}: {e}"))
}

/// Init payload with every capability enabled and [`custodian`] in charge.
#[must_use]
pub fn init_data() -> CanisterInitData {
    CanisterInitData {
        custodians: vec![custodian()],
        supported_interfaces: SupportedInterface::ALL.to_vec(),
        name: "nft".to_string(),
        symbol: "NFT".to_string(),
        logo: Some("logo".to_string()),
    }
}

/// Init payload of the bare flavor.
#[must_use]
pub fn bare_init_data() -> BareCanisterInitData {
    BareCanisterInitData {
        custodians: vec![custodian()],
        supported_interfaces: SupportedInterface::ALL.to_vec(),
        name: "nft".to_string(),
        symbol: "NFT".to_string(),
        logo: "logo".to_string(),
    }
}

/// Small property bag.
#[must_use]
pub fn sample_properties() -> PropertyBag {
    let rarity = GenericValue::TextContent("rare".to_string());
    vec![
        ("rarity".to_string(), rarity),
        ("level".to_string(), GenericValue::Nat8Content(3)),
    ]
}

/// Live token `id` owned by `owner`.
#[must_use]
pub fn mock_token(id: u64, owner: Principal) -> TokenMetadata {
    TokenMetadata {
        token_identifier: Nat::from(id),
        owner: Some(owner),
        operator: None,
        is_burned: false,
        properties: vec![],
        minted_at: 0,
        minted_by: custodian(),
        transferred_at: None,
        transferred_by: None,
        approved_at: None,
        approved_by: None,
        burned_at: None,
        burned_by: None,
    }
}

/// Live token `id` owned by `owner`, adjusted by `f`.
#[must_use]
pub fn mock_token_with<F>(id: u64, owner: Principal, f: F) -> TokenMetadata
where
    F: FnOnce(&mut TokenMetadata),
{
    let mut token = mock_token(id, owner);
    f(&mut token);
    token
}
