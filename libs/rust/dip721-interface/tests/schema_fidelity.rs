//! Schema fidelity between the Rust declarations and the interface factory.
//!
//! Every operation's argument and return types, as reported by the Rust
//! types, must be structurally identical to what the factory builds, and
//! every serialized value must validate against the factory's schema.

use dip721_interface::idl::{validate_values, IdlArgs};
use dip721_interface::{
    idl_factory, init_args, BareCanisterInitData, CanisterInitData, GenericValue, IdlSchema,
    IdlType, Int, InterfaceFlavor, Metadata, Nat, NftError, Operation, Principal, PropertyBag,
    Stats, SupportedInterface, TokenIdentifier, TokenMetadata, TxEvent, TypeEnv,
};
use proptest::prelude::*;
use serde_json::Value;

const FLAVORS: [InterfaceFlavor; 2] = [InterfaceFlavor::Namespaced, InterfaceFlavor::Bare];

type NftResult<T> = Result<T, NftError>;

fn declared<A: IdlArgs, R: IdlArgs>(env: &mut TypeEnv) -> (Vec<IdlType>, Vec<IdlType>) {
    (A::idl_args(env), R::idl_args(env))
}

/// Signature of each operation as declared by the Rust types.
fn declared_signature(op: Operation, env: &mut TypeEnv) -> (Vec<IdlType>, Vec<IdlType>) {
    use Operation as Op;

    match op {
        Op::Approve | Op::Transfer => {
            declared::<(Principal, TokenIdentifier), (NftResult<Nat>,)>(env)
        }
        Op::BalanceOf => declared::<(Principal,), (NftResult<Nat>,)>(env),
        Op::Burn => declared::<(TokenIdentifier,), (NftResult<Nat>,)>(env),
        Op::Custodians => declared::<(), (Vec<Principal>,)>(env),
        Op::Cycles | Op::TotalSupply | Op::TotalTransactions | Op::TotalUniqueHolders => {
            declared::<(), (Nat,)>(env)
        }
        Op::IsApprovedForAll => declared::<(Principal, Principal), (NftResult<bool>,)>(env),
        Op::Logo | Op::Name | Op::Symbol => declared::<(), (Option<String>,)>(env),
        Op::Metadata => declared::<(), (Metadata,)>(env),
        Op::Mint => declared::<(Principal, TokenIdentifier, PropertyBag), (NftResult<Nat>,)>(env),
        Op::OperatorOf | Op::OwnerOf => {
            declared::<(TokenIdentifier,), (NftResult<Option<Principal>>,)>(env)
        }
        Op::OperatorTokenIdentifiers | Op::OwnerTokenIdentifiers => {
            declared::<(Principal,), (NftResult<Vec<TokenIdentifier>>,)>(env)
        }
        Op::OperatorTokenMetadata | Op::OwnerTokenMetadata => {
            declared::<(Principal,), (NftResult<Vec<TokenMetadata>>,)>(env)
        }
        Op::SetApprovalForAll => declared::<(Principal, bool), (NftResult<Nat>,)>(env),
        Op::SetCustodians => declared::<(Vec<Principal>,), ()>(env),
        Op::SetLogo | Op::SetName | Op::SetSymbol => declared::<(String,), ()>(env),
        Op::SetTokenProperty => {
            declared::<(TokenIdentifier, String, GenericValue), (NftResult<()>,)>(env)
        }
        Op::Stats => declared::<(), (Stats,)>(env),
        Op::SupportedInterfaces => declared::<(), (Vec<SupportedInterface>,)>(env),
        Op::TokenMetadata => declared::<(TokenIdentifier,), (NftResult<TokenMetadata>,)>(env),
        Op::Transaction => declared::<(Nat,), (NftResult<TxEvent>,)>(env),
        Op::TransferFrom => {
            declared::<(Principal, Principal, TokenIdentifier), (NftResult<Nat>,)>(env)
        }
    }
}

fn all_equivalent(a: &[IdlType], env_a: &TypeEnv, b: &[IdlType], env_b: &TypeEnv) -> bool {
    let same = |(x, y): (&IdlType, &IdlType)| x.equivalent(env_a, y, env_b);
    a.len() == b.len() && a.iter().zip(b).all(same)
}

#[test]
fn test_every_operation_matches_declarations() {
    for flavor in FLAVORS {
        let schema = idl_factory(flavor);
        let mut declared_env = TypeEnv::new();

        for op in Operation::ALL {
            let method = schema
                .method(&op.method_name(flavor))
                .unwrap_or_else(|| panic!("{op} missing from {flavor} schema"));
            let (args, rets) = declared_signature(*op, &mut declared_env);

            assert!(
                all_equivalent(&method.args, &schema.env, &args, &declared_env),
                "{flavor} {op}: argument types differ"
            );
            assert!(
                all_equivalent(&method.rets, &schema.env, &rets, &declared_env),
                "{flavor} {op}: return types differ"
            );
            assert_eq!(method.mode, op.mode());
        }
    }
}

#[test]
fn test_named_definitions_are_identical() {
    let schema = idl_factory(InterfaceFlavor::Namespaced);
    let mut declared_env = TypeEnv::new();
    for op in Operation::ALL {
        declared_signature(*op, &mut declared_env);
    }
    CanisterInitData::idl_type(&mut declared_env);

    assert_eq!(schema.env.len(), declared_env.len());
    for (name, ty) in schema.env.iter() {
        let declared = declared_env
            .get(name)
            .unwrap_or_else(|| panic!("{name} not declared"));
        assert_eq!(ty, declared, "definition of {name} differs");
    }
}

#[test]
fn test_init_matches_declarations() {
    let (env, init) = init_args(InterfaceFlavor::Namespaced);
    let mut declared_env = TypeEnv::new();
    let declared = CanisterInitData::idl_type(&mut declared_env);
    assert!(init[0].equivalent(&env, &declared, &declared_env));

    let (env, init) = init_args(InterfaceFlavor::Bare);
    let mut declared_env = TypeEnv::new();
    let declared = BareCanisterInitData::idl_type(&mut declared_env);
    assert!(init[0].equivalent(&env, &declared, &declared_env));

    let mut namespaced_env = TypeEnv::new();
    let namespaced = CanisterInitData::idl_type(&mut namespaced_env);
    assert!(!init[0].equivalent(&env, &namespaced, &namespaced_env));
}

#[test]
fn test_flavors_differ_only_in_names_and_init() {
    let namespaced = idl_factory(InterfaceFlavor::Namespaced);
    let bare = idl_factory(InterfaceFlavor::Bare);

    assert_eq!(namespaced.methods.len(), bare.methods.len());
    for op in Operation::ALL {
        let a = namespaced.method(&op.method_name(InterfaceFlavor::Namespaced));
        let b = bare.method(&op.method_name(InterfaceFlavor::Bare));
        let (Some(a), Some(b)) = (a, b) else {
            panic!("{op} missing from a flavor");
        };
        assert_eq!(a.args, b.args);
        assert_eq!(a.rets, b.rets);
        assert_eq!(a.mode, b.mode);
    }
    assert_ne!(namespaced.init, Vec::<IdlType>::new());
    assert_ne!(
        namespaced.env.get("CanisterInitData"),
        bare.env.get("CanisterInitData")
    );
}

fn validate_as<T: serde::Serialize>(value: &T, type_name: &str) -> Result<(), String> {
    let schema = idl_factory(InterfaceFlavor::Namespaced);
    let json = serde_json::to_value(value).map_err(|e| e.to_string())?;
    IdlType::named(type_name)
        .validate(&json, &schema.env)
        .map_err(|e| e.to_string())
}

#[test]
fn test_serialized_results_validate() {
    let schema = idl_factory(InterfaceFlavor::Namespaced);
    let method = schema.method("dip721_owner_of").expect("owner_of present");

    let ok: NftResult<Option<Principal>> = Ok(Some(Principal::anonymous()));
    let none: NftResult<Option<Principal>> = Ok(None);
    let err: NftResult<Option<Principal>> = Err(NftError::TokenNotFound);
    for reply in [ok, none, err] {
        let json = serde_json::to_value(&reply).expect("serializable");
        assert!(validate_values(&method.rets, &[json], &schema.env).is_ok());
    }

    let unit: NftResult<()> = Ok(());
    let method = schema.method("set_token_property").expect("present");
    let json = serde_json::to_value(unit).expect("serializable");
    assert!(validate_values(&method.rets, &[json], &schema.env).is_ok());
}

#[test]
fn test_invalid_values_are_reported() {
    let schema = idl_factory(InterfaceFlavor::Namespaced);
    let method = schema.method("dip721_transfer").expect("present");

    let args: Vec<Value> = vec![serde_json::json!("2vxsx-fae"), serde_json::json!("x")];
    assert!(validate_values(&method.args, &args, &schema.env).is_err());

    let args: Vec<Value> = vec![serde_json::json!("2vxsx-fae")];
    assert!(validate_values(&method.args, &args, &schema.env).is_err());
}

fn arb_principal() -> impl Strategy<Value = Principal> {
    prop::collection::vec(any::<u8>(), 0..=29)
        .prop_map(|bytes| Principal::try_from_slice(&bytes).expect("length bounded"))
}

fn arb_generic_value() -> impl Strategy<Value = GenericValue> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(GenericValue::BoolContent),
        "[a-z]{0,12}".prop_map(GenericValue::TextContent),
        prop::collection::vec(any::<u8>(), 0..8).prop_map(GenericValue::BlobContent),
        arb_principal().prop_map(GenericValue::Principal),
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
        (-1.0e9..1.0e9_f64).prop_map(GenericValue::FloatContent),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop::collection::vec(("[a-z]{1,6}", inner), 0..4).prop_map(GenericValue::NestedContent)
    })
}

fn arb_token() -> impl Strategy<Value = TokenMetadata> {
    (
        any::<u64>(),
        prop::option::of(arb_principal()),
        prop::option::of(arb_principal()),
        any::<bool>(),
        prop::collection::vec(("[a-z]{1,6}", arb_generic_value()), 0..4),
        arb_principal(),
        prop::option::of(any::<u64>()),
    )
        .prop_map(|(id, owner, operator, is_burned, properties, minted_by, stamp)| TokenMetadata {
            token_identifier: Nat::from(id),
            owner,
            operator,
            is_burned,
            properties,
            minted_at: 0,
            minted_by,
            transferred_at: stamp,
            transferred_by: owner,
            approved_at: stamp,
            approved_by: operator,
            burned_at: None,
            burned_by: None,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Serialized property values always validate against the factory's GenericValue.
    #[test]
    fn prop_generic_values_validate(value in arb_generic_value()) {
        prop_assert_eq!(validate_as(&value, "GenericValue"), Ok(()));
    }

    /// Serialized tokens validate against the factory's TokenMetadata.
    #[test]
    fn prop_token_metadata_validates(token in arb_token()) {
        prop_assert_eq!(validate_as(&token, "TokenMetadata"), Ok(()));
    }

    /// Serialized tx events validate against the factory's TxEvent.
    #[test]
    fn prop_tx_event_validates(
        time in any::<u64>(),
        caller in arb_principal(),
        details in prop::collection::vec(("[a-z]{1,6}", arb_generic_value()), 0..4),
    ) {
        let event = TxEvent { time, caller, operation: "mint".to_string(), details };
        prop_assert_eq!(validate_as(&event, "TxEvent"), Ok(()));
    }

    /// Principals survive a text round trip.
    #[test]
    fn prop_principal_text_round_trip(principal in arb_principal()) {
        let text = principal.to_text();
        prop_assert_eq!(Principal::from_text(&text), Ok(principal));
    }
}
