//! Data types carried by the registry interface.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::idl::{IdlSchema, IdlType, TypeEnv};
use crate::nat::{Int, Nat};
use crate::principal::Principal;

/// Token identifier (`nat`).
pub type TokenIdentifier = Nat;

/// Ordered list of named, typed values attached to a token or event.
pub type PropertyBag = Vec<(String, GenericValue)>;

/// Dynamically typed property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GenericValue {
    /// Boolean
    BoolContent(bool),
    /// UTF-8 text
    TextContent(String),
    /// Raw bytes
    BlobContent(Vec<u8>),
    /// Actor identity
    Principal(Principal),
    /// 8-bit natural
    Nat8Content(u8),
    /// 16-bit natural
    Nat16Content(u16),
    /// 32-bit natural
    Nat32Content(u32),
    /// 64-bit natural
    Nat64Content(u64),
    /// Unbounded natural
    NatContent(Nat),
    /// 8-bit integer
    Int8Content(i8),
    /// 16-bit integer
    Int16Content(i16),
    /// 32-bit integer
    Int32Content(i32),
    /// 64-bit integer
    Int64Content(i64),
    /// Unbounded integer
    IntContent(Int),
    /// 64-bit float
    FloatContent(f64),
    /// Nested property bag
    NestedContent(PropertyBag),
}

/// Optional capabilities a registry can advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportedInterface {
    /// Operator approvals
    Approval,
    /// Minting
    Mint,
    /// Burning
    Burn,
    /// Transaction log lookup
    TransactionHistory,
}

impl SupportedInterface {
    /// All capabilities in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Approval,
        Self::Mint,
        Self::Burn,
        Self::TransactionHistory,
    ];

    /// Tag used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Approval => "Approval",
            Self::Mint => "Mint",
            Self::Burn => "Burn",
            Self::TransactionHistory => "TransactionHistory",
        }
    }

    /// Parse a wire tag, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|interface| interface.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

/// Failure conditions returned by registry operations.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NftError {
    /// Caller is not the token owner
    #[error("unauthorized owner")]
    UnauthorizedOwner,
    /// Caller is neither owner nor operator
    #[error("unauthorized operator")]
    UnauthorizedOperator,
    /// Owner has no tokens or does not match
    #[error("owner not found")]
    OwnerNotFound,
    /// Operator manages no tokens
    #[error("operator not found")]
    OperatorNotFound,
    /// No token with this identifier
    #[error("token not found")]
    TokenNotFound,
    /// Token already exists or is burned
    #[error("token already exists")]
    ExistedNFT,
    /// Owner tried to approve themself
    #[error("self approve")]
    SelfApprove,
    /// Transfer to the current owner
    #[error("self transfer")]
    SelfTransfer,
    /// No transaction with this identifier
    #[error("transaction not found")]
    TxNotFound,
    /// Any other failure
    #[error("{0}")]
    Other(String),
}

impl NftError {
    /// Failure returned when a capability is not enabled.
    #[must_use]
    pub fn not_implemented() -> Self {
        Self::Other("Not implemented".to_string())
    }
}

/// State of a single token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Token identifier
    pub token_identifier: TokenIdentifier,
    /// Current owner, `None` once burned
    pub owner: Option<Principal>,
    /// Approved operator
    pub operator: Option<Principal>,
    /// Whether the token is burned
    pub is_burned: bool,
    /// Token properties
    pub properties: PropertyBag,
    /// Mint timestamp (ns)
    pub minted_at: u64,
    /// Minting actor
    pub minted_by: Principal,
    /// Last transfer timestamp (ns)
    pub transferred_at: Option<u64>,
    /// Last transferring actor
    pub transferred_by: Option<Principal>,
    /// Last approval timestamp (ns)
    pub approved_at: Option<u64>,
    /// Last approving actor
    pub approved_by: Option<Principal>,
    /// Burn timestamp (ns)
    pub burned_at: Option<u64>,
    /// Burning actor
    pub burned_by: Option<Principal>,
}

/// Transaction log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxEvent {
    /// Event timestamp (ns)
    pub time: u64,
    /// Actor that triggered the event
    pub caller: Principal,
    /// Operation name: `mint`, `transfer`, `burn` or `approve`
    pub operation: String,
    /// Token properties at the time of the event
    pub details: PropertyBag,
}

/// Registry aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Resource balance
    pub cycles: Nat,
    /// Tokens ever minted, burned ones included
    pub total_supply: Nat,
    /// Transaction log length
    pub total_transactions: Nat,
    /// Distinct current owners
    pub total_unique_holders: Nat,
}

/// Registry-level metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Display image
    pub logo: Option<String>,
    /// Collection name
    pub name: Option<String>,
    /// Collection symbol
    pub symbol: Option<String>,
    /// Administrators
    pub custodians: Vec<Principal>,
    /// Creation timestamp (ns)
    pub created_at: u64,
    /// Last upgrade timestamp (ns)
    pub upgraded_at: u64,
}

/// Initialization payload of the namespaced flavor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanisterInitData {
    /// Administrators
    pub custodians: Vec<Principal>,
    /// Enabled capabilities
    pub supported_interfaces: Vec<SupportedInterface>,
    /// Collection name
    pub name: String,
    /// Collection symbol
    pub symbol: String,
    /// Display image
    #[serde(default)]
    pub logo: Option<String>,
}

/// Initialization payload of the bare flavor, where the logo is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BareCanisterInitData {
    /// Administrators
    pub custodians: Vec<Principal>,
    /// Enabled capabilities
    pub supported_interfaces: Vec<SupportedInterface>,
    /// Collection name
    pub name: String,
    /// Collection symbol
    pub symbol: String,
    /// Display image
    pub logo: String,
}

impl From<BareCanisterInitData> for CanisterInitData {
    fn from(data: BareCanisterInitData) -> Self {
        Self {
            custodians: data.custodians,
            supported_interfaces: data.supported_interfaces,
            name: data.name,
            symbol: data.symbol,
            logo: Some(data.logo),
        }
    }
}

impl IdlSchema for GenericValue {
    fn idl_type(env: &mut TypeEnv) -> IdlType {
        env.define("GenericValue", |env| {
            IdlType::variant([
                ("BoolContent", bool::idl_type(env)),
                ("TextContent", String::idl_type(env)),
                ("BlobContent", <Vec<u8>>::idl_type(env)),
                ("Principal", Principal::idl_type(env)),
                ("Nat8Content", u8::idl_type(env)),
                ("Nat16Content", u16::idl_type(env)),
                ("Nat32Content", u32::idl_type(env)),
                ("Nat64Content", u64::idl_type(env)),
                ("NatContent", Nat::idl_type(env)),
                ("Int8Content", i8::idl_type(env)),
                ("Int16Content", i16::idl_type(env)),
                ("Int32Content", i32::idl_type(env)),
                ("Int64Content", i64::idl_type(env)),
                ("IntContent", Int::idl_type(env)),
                ("FloatContent", f64::idl_type(env)),
                ("NestedContent", PropertyBag::idl_type(env)),
            ])
        })
    }
}

impl IdlSchema for SupportedInterface {
    fn idl_type(env: &mut TypeEnv) -> IdlType {
        env.define("SupportedInterface", |_| {
            let cases = Self::ALL.map(|interface| (interface.as_str(), IdlType::Null));
            IdlType::variant(cases)
        })
    }
}

impl IdlSchema for NftError {
    fn idl_type(env: &mut TypeEnv) -> IdlType {
        env.define("NftError", |_| {
            IdlType::variant([
                ("UnauthorizedOwner", IdlType::Null),
                ("UnauthorizedOperator", IdlType::Null),
                ("OwnerNotFound", IdlType::Null),
                ("OperatorNotFound", IdlType::Null),
                ("TokenNotFound", IdlType::Null),
                ("ExistedNFT", IdlType::Null),
                ("SelfApprove", IdlType::Null),
                ("SelfTransfer", IdlType::Null),
                ("TxNotFound", IdlType::Null),
                ("Other", IdlType::Text),
            ])
        })
    }
}

impl IdlSchema for TokenMetadata {
    fn idl_type(env: &mut TypeEnv) -> IdlType {
        env.define("TokenMetadata", |env| {
            IdlType::record([
                ("token_identifier", TokenIdentifier::idl_type(env)),
                ("owner", <Option<Principal>>::idl_type(env)),
                ("operator", <Option<Principal>>::idl_type(env)),
                ("is_burned", bool::idl_type(env)),
                ("properties", PropertyBag::idl_type(env)),
                ("minted_at", u64::idl_type(env)),
                ("minted_by", Principal::idl_type(env)),
                ("transferred_at", <Option<u64>>::idl_type(env)),
                ("transferred_by", <Option<Principal>>::idl_type(env)),
                ("approved_at", <Option<u64>>::idl_type(env)),
                ("approved_by", <Option<Principal>>::idl_type(env)),
                ("burned_at", <Option<u64>>::idl_type(env)),
                ("burned_by", <Option<Principal>>::idl_type(env)),
            ])
        })
    }
}

impl IdlSchema for TxEvent {
    fn idl_type(env: &mut TypeEnv) -> IdlType {
        env.define("TxEvent", |env| {
            IdlType::record([
                ("time", u64::idl_type(env)),
                ("caller", Principal::idl_type(env)),
                ("operation", String::idl_type(env)),
                ("details", PropertyBag::idl_type(env)),
            ])
        })
    }
}

impl IdlSchema for Stats {
    fn idl_type(env: &mut TypeEnv) -> IdlType {
        env.define("Stats", |env| {
            IdlType::record([
                ("cycles", Nat::idl_type(env)),
                ("total_supply", Nat::idl_type(env)),
                ("total_transactions", Nat::idl_type(env)),
                ("total_unique_holders", Nat::idl_type(env)),
            ])
        })
    }
}

impl IdlSchema for Metadata {
    fn idl_type(env: &mut TypeEnv) -> IdlType {
        env.define("Metadata", |env| {
            IdlType::record([
                ("logo", <Option<String>>::idl_type(env)),
                ("name", <Option<String>>::idl_type(env)),
                ("symbol", <Option<String>>::idl_type(env)),
                ("custodians", <Vec<Principal>>::idl_type(env)),
                ("created_at", u64::idl_type(env)),
                ("upgraded_at", u64::idl_type(env)),
            ])
        })
    }
}

impl IdlSchema for CanisterInitData {
    fn idl_type(env: &mut TypeEnv) -> IdlType {
        env.define("CanisterInitData", |env| {
            IdlType::record([
                ("custodians", <Vec<Principal>>::idl_type(env)),
                (
                    "supported_interfaces",
                    <Vec<SupportedInterface>>::idl_type(env),
                ),
                ("name", String::idl_type(env)),
                ("symbol", String::idl_type(env)),
                ("logo", <Option<String>>::idl_type(env)),
            ])
        })
    }
}

impl IdlSchema for BareCanisterInitData {
    fn idl_type(env: &mut TypeEnv) -> IdlType {
        env.define("CanisterInitData", |env| {
            IdlType::record([
                ("custodians", <Vec<Principal>>::idl_type(env)),
                (
                    "supported_interfaces",
                    <Vec<SupportedInterface>>::idl_type(env),
                ),
                ("name", String::idl_type(env)),
                ("symbol", String::idl_type(env)),
                ("logo", String::idl_type(env)),
            ])
        })
    }
}
