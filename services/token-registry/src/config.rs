//! Centralized configuration for the token registry.
//!
//! All configuration is loaded from environment variables and validated
//! at startup.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use dip721_interface::{CanisterInitData, InterfaceFlavor, Principal, SupportedInterface};

use crate::error::RegistryError;
use crate::tracing_config::TracingConfig;

/// Default resource balance reported by `cycles`.
pub const DEFAULT_CYCLES: u128 = 30_000_000_000;

/// What the binary does once configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Print the Candid description of the configured flavor
    #[default]
    Describe,
    /// Serve newline-delimited JSON calls on stdin
    Run,
}

impl RunMode {
    /// Mode name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Describe => "describe",
            Self::Run => "run",
        }
    }
}

impl FromStr for RunMode {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "describe" => Ok(Self::Describe),
            "run" | "serve" => Ok(Self::Run),
            _ => Err(RegistryError::config(format!("Invalid run mode: {}", s))),
        }
    }
}

/// Token registry configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface flavor served
    pub flavor: InterfaceFlavor,
    /// Binary mode
    pub mode: RunMode,
    /// Snapshot file; state is kept in memory only when unset
    pub state_file: Option<PathBuf>,
    /// Resource balance reported by `cycles`
    pub cycles: u128,
    /// Payload used when no snapshot exists
    pub init: CanisterInitData,
    /// Logging settings
    pub tracing: TracingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_env() -> Result<Self, RegistryError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RegistryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let flavor = parse_var(&lookup, "REGISTRY_FLAVOR", InterfaceFlavor::default())?;
        let mode = parse_var(&lookup, "REGISTRY_MODE", RunMode::default())?;
        let state_file = lookup("REGISTRY_STATE_FILE")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);
        let cycles = parse_var(&lookup, "REGISTRY_CYCLES", DEFAULT_CYCLES)?;

        let custodians = match lookup("REGISTRY_CUSTODIANS") {
            Some(value) => parse_custodians(&value)?,
            None => Vec::new(),
        };
        let supported_interfaces = match lookup("REGISTRY_INTERFACES") {
            Some(value) => parse_interfaces(&value)?,
            None => SupportedInterface::ALL.to_vec(),
        };

        let init = CanisterInitData {
            custodians,
            supported_interfaces,
            name: lookup("REGISTRY_NAME").unwrap_or_else(|| "DIP721".to_string()),
            symbol: lookup("REGISTRY_SYMBOL").unwrap_or_else(|| "NFT".to_string()),
            logo: lookup("REGISTRY_LOGO"),
        };

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let mut tracing = TracingConfig::default().with_log_level(log_level);
        if parse_var(&lookup, "LOG_JSON", false)? {
            tracing = tracing.with_json_output();
        }

        Ok(Self {
            flavor,
            mode,
            state_file,
            cycles,
            init,
            tracing,
        })
    }
}

/// Parse variable `name` through `lookup`, falling back to `default`.
fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, RegistryError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = lookup(name) else {
        return Ok(default);
    };
    value
        .trim()
        .parse()
        .map_err(|e| RegistryError::config(format!("Invalid {}: {}", name, e)))
}

/// Parse a comma-separated principal list.
fn parse_custodians(value: &str) -> Result<Vec<Principal>, RegistryError> {
    let parse = |text: &str| {
        Principal::from_text(text).map_err(|e| {
            let detail = format!("Invalid REGISTRY_CUSTODIANS entry {}: {}", text, e);
            RegistryError::config(detail)
        })
    };
    split_list(value).map(parse).collect()
}

/// Parse a comma-separated capability list.
fn parse_interfaces(value: &str) -> Result<Vec<SupportedInterface>, RegistryError> {
    let mut interfaces = Vec::new();
    for name in split_list(value) {
        let interface = SupportedInterface::parse(name).ok_or_else(|| {
            RegistryError::config(format!("Invalid REGISTRY_INTERFACES entry: {}", name))
        })?;
        if !interfaces.contains(&interface) {
            interfaces.push(interface);
        }
    }
    Ok(interfaces)
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}
