//! Interface definitions for the DIP721 token registry.
//!
//! This crate provides:
//! - Rust declarations of every type on the registry's call surface
//! - A runtime schema model (`idl`) with JSON value validation
//! - The interface factory for both naming flavors (`factory`)
//! - Candid text rendering of a service schema (`did`)
//! - The `Dip721` trait implemented by registry backends

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod did;
pub mod factory;
pub mod idl;
pub mod nat;
pub mod principal;
pub mod service;
pub mod types;

pub use factory::{idl_factory, init_args, InterfaceFlavor, Operation};
pub use idl::{FuncMode, IdlSchema, IdlType, Method, SchemaError, ServiceSchema, TypeEnv};
pub use nat::{Int, Nat};
pub use principal::{Principal, PrincipalError};
pub use service::{CallResult, Dip721, Rejection};
pub use types::{
    BareCanisterInitData, CanisterInitData, GenericValue, Metadata, NftError, PropertyBag, Stats,
    SupportedInterface, TokenIdentifier, TokenMetadata, TxEvent,
};
