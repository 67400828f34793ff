//! Registry-level settings.

use dip721_interface::{CanisterInitData, Metadata, Principal, SupportedInterface};
use serde::{Deserialize, Serialize};

/// Registry metadata, custodians and enabled capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Administrators
    pub custodians: Vec<Principal>,
    /// Enabled capabilities
    pub supported_interfaces: Vec<SupportedInterface>,
    /// Collection name
    pub name: Option<String>,
    /// Collection symbol
    pub symbol: Option<String>,
    /// Display image
    pub logo: Option<String>,
    /// Creation timestamp (ns)
    pub created_at: u64,
    /// Last upgrade timestamp (ns)
    pub upgraded_at: u64,
}

impl Configuration {
    /// Build the configuration of a freshly initialized registry.
    #[must_use]
    pub fn new(init_data: CanisterInitData, now: u64) -> Self {
        let mut configuration = Self {
            custodians: Vec::new(),
            supported_interfaces: Vec::new(),
            name: Some(init_data.name),
            symbol: Some(init_data.symbol),
            logo: init_data.logo,
            created_at: now,
            upgraded_at: now,
        };
        configuration.set_custodians(init_data.custodians);
        configuration.set_supported_interfaces(init_data.supported_interfaces);
        configuration
    }

    /// Whether `caller` administers the registry.
    #[must_use]
    pub fn is_custodian(&self, caller: Principal) -> bool {
        self.custodians.contains(&caller)
    }

    /// Whether `interface` is enabled.
    #[must_use]
    pub fn has_interface(&self, interface: SupportedInterface) -> bool {
        self.supported_interfaces.contains(&interface)
    }

    /// Replace the custodians, dropping duplicates.
    pub fn set_custodians(&mut self, custodians: Vec<Principal>) {
        self.custodians = dedup(custodians);
    }

    /// Replace the enabled capabilities, dropping duplicates.
    pub fn set_supported_interfaces(&mut self, interfaces: Vec<SupportedInterface>) {
        self.supported_interfaces = dedup(interfaces);
    }

    /// Record an upgrade at `now`.
    pub fn set_upgraded_at(&mut self, now: u64) {
        self.upgraded_at = now;
    }

    /// Registry metadata view.
    #[must_use]
    pub fn metadata(&self) -> Metadata {
        Metadata {
            logo: self.logo.clone(),
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            custodians: self.custodians.clone(),
            created_at: self.created_at,
            upgraded_at: self.upgraded_at,
        }
    }
}

fn dedup<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut unique = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}
