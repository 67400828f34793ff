//! Shared test utilities for the token registry crates.
//!
//! This crate provides:
//! - Proptest generators for interface types
//! - Test fixtures with well-known principals, tokens and init payloads

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

pub use generators::*;
