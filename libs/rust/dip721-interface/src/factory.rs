//! Interface factory.
//!
//! Builds the registry's service description as runtime schema objects.
//! The definitions here are written out declaratively; the Rust declarations
//! in [`crate::types`] must stay structurally identical to them.

use std::fmt;
use std::str::FromStr;

use crate::idl::{FuncMode, IdlType, Method, ServiceSchema, TypeEnv};

/// Prefix carried by operation names in the namespaced flavor.
pub const NAMESPACE_PREFIX: &str = "dip721_";

/// Naming convention of the interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InterfaceFlavor {
    /// Operations prefixed with `dip721_`; optional logo at init
    #[default]
    Namespaced,
    /// Unprefixed operations; required logo at init
    Bare,
}

impl InterfaceFlavor {
    /// Configuration name of the flavor.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Namespaced => "namespaced",
            Self::Bare => "bare",
        }
    }
}

impl fmt::Display for InterfaceFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterfaceFlavor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "namespaced" | "dip721" | "prefixed" => Ok(Self::Namespaced),
            "bare" | "unprefixed" => Ok(Self::Bare),
            other => Err(format!("unknown interface flavor: {other}")),
        }
    }
}

macro_rules! operations {
    ($($variant:ident => $name:literal, $mode:ident;)*) => {
        /// Remote operations of the registry.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Operation {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant,
            )*
        }

        impl Operation {
            /// Every operation, in name order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)*];

            /// Unprefixed operation name.
            #[must_use]
            pub const fn base_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            /// Query or update.
            #[must_use]
            pub const fn mode(&self) -> FuncMode {
                match self {
                    $(Self::$variant => FuncMode::$mode,)*
                }
            }
        }
    };
}

operations! {
    Approve => "approve", Update;
    BalanceOf => "balance_of", Query;
    Burn => "burn", Update;
    Custodians => "custodians", Query;
    Cycles => "cycles", Query;
    IsApprovedForAll => "is_approved_for_all", Update;
    Logo => "logo", Query;
    Metadata => "metadata", Query;
    Mint => "mint", Update;
    Name => "name", Query;
    OperatorOf => "operator_of", Query;
    OperatorTokenIdentifiers => "operator_token_identifiers", Query;
    OperatorTokenMetadata => "operator_token_metadata", Query;
    OwnerOf => "owner_of", Query;
    OwnerTokenIdentifiers => "owner_token_identifiers", Query;
    OwnerTokenMetadata => "owner_token_metadata", Query;
    SetApprovalForAll => "set_approval_for_all", Update;
    SetCustodians => "set_custodians", Update;
    SetLogo => "set_logo", Update;
    SetName => "set_name", Update;
    SetSymbol => "set_symbol", Update;
    SetTokenProperty => "set_token_property", Update;
    Stats => "stats", Query;
    SupportedInterfaces => "supported_interfaces", Query;
    Symbol => "symbol", Query;
    TokenMetadata => "token_metadata", Query;
    TotalSupply => "total_supply", Query;
    TotalTransactions => "total_transactions", Query;
    TotalUniqueHolders => "total_unique_holders", Query;
    Transaction => "transaction", Query;
    Transfer => "transfer", Update;
    TransferFrom => "transfer_from", Update;
}

impl Operation {
    /// Wire name of the operation in `flavor`.
    ///
    /// `set_token_property` is an extension outside the DIP721 namespace and
    /// is never prefixed.
    #[must_use]
    pub fn method_name(&self, flavor: InterfaceFlavor) -> String {
        match (flavor, self) {
            (InterfaceFlavor::Namespaced, Self::SetTokenProperty) | (InterfaceFlavor::Bare, _) => {
                self.base_name().to_string()
            }
            (InterfaceFlavor::Namespaced, _) => format!("{NAMESPACE_PREFIX}{}", self.base_name()),
        }
    }

    /// Resolve a wire name in `flavor`.
    #[must_use]
    pub fn from_method_name(flavor: InterfaceFlavor, name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.method_name(flavor) == name)
    }

    /// Whether the operation changes state.
    #[must_use]
    pub fn is_update(&self) -> bool {
        self.mode() == FuncMode::Update
    }

    /// Argument and return types, with named types registered in `env`.
    #[must_use]
    pub fn signature(&self, env: &mut TypeEnv) -> (Vec<IdlType>, Vec<IdlType>) {
        use IdlType as T;

        let nft_error = nft_error(env);
        let result = |ok: IdlType| T::result(ok, nft_error.clone());

        match self {
            Self::Approve => (vec![T::Principal, T::Nat], vec![result(T::Nat)]),
            Self::BalanceOf => (vec![T::Principal], vec![result(T::Nat)]),
            Self::Burn => (vec![T::Nat], vec![result(T::Nat)]),
            Self::Custodians => (vec![], vec![T::vec(T::Principal)]),
            Self::Cycles
            | Self::TotalSupply
            | Self::TotalTransactions
            | Self::TotalUniqueHolders => (vec![], vec![T::Nat]),
            Self::IsApprovedForAll => (vec![T::Principal, T::Principal], vec![result(T::Bool)]),
            Self::Logo | Self::Name | Self::Symbol => (vec![], vec![T::opt(T::Text)]),
            Self::Metadata => (vec![], vec![metadata(env)]),
            Self::Mint => {
                let bag = property_bag(env);
                (vec![T::Principal, T::Nat, bag], vec![result(T::Nat)])
            }
            Self::OperatorOf | Self::OwnerOf => (vec![T::Nat], vec![result(T::opt(T::Principal))]),
            Self::OperatorTokenIdentifiers | Self::OwnerTokenIdentifiers => {
                (vec![T::Principal], vec![result(T::vec(T::Nat))])
            }
            Self::OperatorTokenMetadata | Self::OwnerTokenMetadata => {
                let token = token_metadata(env);
                (vec![T::Principal], vec![result(T::vec(token))])
            }
            Self::SetApprovalForAll => (vec![T::Principal, T::Bool], vec![result(T::Nat)]),
            Self::SetCustodians => (vec![T::vec(T::Principal)], vec![]),
            Self::SetLogo | Self::SetName | Self::SetSymbol => (vec![T::Text], vec![]),
            Self::SetTokenProperty => {
                let value = generic_value(env);
                (vec![T::Nat, T::Text, value], vec![result(T::Null)])
            }
            Self::Stats => (vec![], vec![stats(env)]),
            Self::SupportedInterfaces => (vec![], vec![T::vec(supported_interface(env))]),
            Self::TokenMetadata => (vec![T::Nat], vec![result(token_metadata(env))]),
            Self::Transaction => (vec![T::Nat], vec![result(tx_event(env))]),
            Self::Transfer => (vec![T::Principal, T::Nat], vec![result(T::Nat)]),
            Self::TransferFrom => (
                vec![T::Principal, T::Principal, T::Nat],
                vec![result(T::Nat)],
            ),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_name())
    }
}

/// Build the service description for `flavor`.
#[must_use]
pub fn idl_factory(flavor: InterfaceFlavor) -> ServiceSchema {
    let (mut env, init) = init_args(flavor);
    let mut methods: Vec<Method> = Operation::ALL
        .iter()
        .map(|op| {
            let (args, rets) = op.signature(&mut env);
            Method {
                name: op.method_name(flavor),
                args,
                rets,
                mode: op.mode(),
            }
        })
        .collect();
    methods.sort_by(|a, b| a.name.cmp(&b.name));

    ServiceSchema { env, init, methods }
}

/// Build the initialization argument list for `flavor`.
#[must_use]
pub fn init_args(flavor: InterfaceFlavor) -> (TypeEnv, Vec<IdlType>) {
    let mut env = TypeEnv::new();
    let interfaces = supported_interface(&mut env);
    let logo = match flavor {
        InterfaceFlavor::Namespaced => IdlType::opt(IdlType::Text),
        InterfaceFlavor::Bare => IdlType::Text,
    };
    let init = env.define("CanisterInitData", |_| {
        IdlType::record([
            ("logo", logo),
            ("name", IdlType::Text),
            ("custodians", IdlType::vec(IdlType::Principal)),
            ("symbol", IdlType::Text),
            ("supported_interfaces", IdlType::vec(interfaces)),
        ])
    });
    (env, vec![init])
}

fn supported_interface(env: &mut TypeEnv) -> IdlType {
    env.define("SupportedInterface", |_| {
        IdlType::variant([
            ("Burn", IdlType::Null),
            ("Mint", IdlType::Null),
            ("Approval", IdlType::Null),
            ("TransactionHistory", IdlType::Null),
        ])
    })
}

fn nft_error(env: &mut TypeEnv) -> IdlType {
    env.define("NftError", |_| {
        IdlType::variant([
            ("UnauthorizedOperator", IdlType::Null),
            ("SelfTransfer", IdlType::Null),
            ("TokenNotFound", IdlType::Null),
            ("UnauthorizedOwner", IdlType::Null),
            ("TxNotFound", IdlType::Null),
            ("SelfApprove", IdlType::Null),
            ("OperatorNotFound", IdlType::Null),
            ("ExistedNFT", IdlType::Null),
            ("OwnerNotFound", IdlType::Null),
            ("Other", IdlType::Text),
        ])
    })
}

fn generic_value(env: &mut TypeEnv) -> IdlType {
    env.define("GenericValue", |env| {
        let nested = IdlType::vec(IdlType::tuple([IdlType::Text, generic_value(env)]));
        IdlType::variant([
            ("Nat64Content", IdlType::Nat64),
            ("Nat32Content", IdlType::Nat32),
            ("BoolContent", IdlType::Bool),
            ("Nat8Content", IdlType::Nat8),
            ("Int64Content", IdlType::Int64),
            ("IntContent", IdlType::Int),
            ("NatContent", IdlType::Nat),
            ("Nat16Content", IdlType::Nat16),
            ("Int32Content", IdlType::Int32),
            ("Int8Content", IdlType::Int8),
            ("FloatContent", IdlType::Float64),
            ("Int16Content", IdlType::Int16),
            ("BlobContent", IdlType::vec(IdlType::Nat8)),
            ("NestedContent", nested),
            ("Principal", IdlType::Principal),
            ("TextContent", IdlType::Text),
        ])
    })
}

fn property_bag(env: &mut TypeEnv) -> IdlType {
    IdlType::vec(IdlType::tuple([IdlType::Text, generic_value(env)]))
}

fn metadata(env: &mut TypeEnv) -> IdlType {
    env.define("Metadata", |_| {
        IdlType::record([
            ("logo", IdlType::opt(IdlType::Text)),
            ("name", IdlType::opt(IdlType::Text)),
            ("created_at", IdlType::Nat64),
            ("upgraded_at", IdlType::Nat64),
            ("custodians", IdlType::vec(IdlType::Principal)),
            ("symbol", IdlType::opt(IdlType::Text)),
        ])
    })
}

fn token_metadata(env: &mut TypeEnv) -> IdlType {
    env.define("TokenMetadata", |env| {
        let properties = property_bag(env);
        IdlType::record([
            ("transferred_at", IdlType::opt(IdlType::Nat64)),
            ("transferred_by", IdlType::opt(IdlType::Principal)),
            ("owner", IdlType::opt(IdlType::Principal)),
            ("operator", IdlType::opt(IdlType::Principal)),
            ("approved_at", IdlType::opt(IdlType::Nat64)),
            ("approved_by", IdlType::opt(IdlType::Principal)),
            ("properties", properties),
            ("is_burned", IdlType::Bool),
            ("token_identifier", IdlType::Nat),
            ("burned_at", IdlType::opt(IdlType::Nat64)),
            ("burned_by", IdlType::opt(IdlType::Principal)),
            ("minted_at", IdlType::Nat64),
            ("minted_by", IdlType::Principal),
        ])
    })
}

fn stats(env: &mut TypeEnv) -> IdlType {
    env.define("Stats", |_| {
        IdlType::record([
            ("cycles", IdlType::Nat),
            ("total_transactions", IdlType::Nat),
            ("total_unique_holders", IdlType::Nat),
            ("total_supply", IdlType::Nat),
        ])
    })
}

fn tx_event(env: &mut TypeEnv) -> IdlType {
    env.define("TxEvent", |env| {
        let details = property_bag(env);
        IdlType::record([
            ("time", IdlType::Nat64),
            ("operation", IdlType::Text),
            ("details", details),
            ("caller", IdlType::Principal),
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_count_and_order() {
        assert_eq!(Operation::ALL.len(), 32);
        let names: Vec<_> = Operation::ALL.iter().map(Operation::base_name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_method_names_per_flavor() {
        assert_eq!(
            Operation::TransferFrom.method_name(InterfaceFlavor::Namespaced),
            "dip721_transfer_from"
        );
        assert_eq!(
            Operation::TransferFrom.method_name(InterfaceFlavor::Bare),
            "transfer_from"
        );
        assert_eq!(
            Operation::SetTokenProperty.method_name(InterfaceFlavor::Namespaced),
            "set_token_property"
        );
    }

    #[test]
    fn test_from_method_name() {
        assert_eq!(
            Operation::from_method_name(InterfaceFlavor::Namespaced, "dip721_mint"),
            Some(Operation::Mint)
        );
        assert_eq!(
            Operation::from_method_name(InterfaceFlavor::Namespaced, "mint"),
            None
        );
        assert_eq!(
            Operation::from_method_name(InterfaceFlavor::Bare, "mint"),
            Some(Operation::Mint)
        );
        assert_eq!(
            Operation::from_method_name(InterfaceFlavor::Bare, "dip721_mint"),
            None
        );
    }

    #[test]
    fn test_flavor_parsing() {
        assert_eq!("namespaced".parse(), Ok(InterfaceFlavor::Namespaced));
        assert_eq!("BARE".parse(), Ok(InterfaceFlavor::Bare));
        assert!("other".parse::<InterfaceFlavor>().is_err());
    }

    #[test]
    fn test_factory_defines_named_types() {
        let schema = idl_factory(InterfaceFlavor::Namespaced);
        let names: Vec<_> = schema.env.iter().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            vec![
                "CanisterInitData",
                "GenericValue",
                "Metadata",
                "NftError",
                "Stats",
                "SupportedInterface",
                "TokenMetadata",
                "TxEvent",
            ]
        );
        assert_eq!(schema.methods.len(), 32);
    }

    #[test]
    fn test_query_and_update_modes() {
        let schema = idl_factory(InterfaceFlavor::Namespaced);
        let mode = |name: &str| schema.method(name).map(|m| m.mode);
        assert_eq!(mode("dip721_balance_of"), Some(FuncMode::Query));
        assert_eq!(mode("dip721_is_approved_for_all"), Some(FuncMode::Update));
        assert_eq!(mode("dip721_transaction"), Some(FuncMode::Query));
        assert_eq!(mode("set_token_property"), Some(FuncMode::Update));
        assert_eq!(mode("balance_of"), None);
    }

    #[test]
    fn test_init_logo_optionality() {
        let init_data = serde_json::json!({
            "name": "n",
            "symbol": "s",
            "custodians": [],
            "supported_interfaces": ["Mint"]
        });

        let (env, init) = init_args(InterfaceFlavor::Namespaced);
        assert!(init[0].validate(&init_data, &env).is_ok());

        let (env, init) = init_args(InterfaceFlavor::Bare);
        assert!(init[0].validate(&init_data, &env).is_err());
    }
}
