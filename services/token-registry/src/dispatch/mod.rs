//! Schema-checked JSON dispatch of registry calls.
//!
//! A call names a method of the configured interface flavor and carries
//! positional JSON arguments. The dispatcher resolves the method, checks the
//! arguments against the interface schema, runs the pre-dispatch guard for
//! update calls, invokes the registry and checks the reply before returning
//! it.

pub mod call;
pub mod stdio;

pub use call::Call;
pub use stdio::serve;

use std::time::Instant;

use dip721_interface::idl::validate_values;
use dip721_interface::{idl_factory, InterfaceFlavor, Method, Operation, Principal, ServiceSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::RegistryError;
use crate::metrics;
use crate::registry::App;

/// An incoming call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRequest {
    /// Authenticated caller
    pub caller: Principal,
    /// Wire method name
    pub method: String,
    /// Positional arguments
    #[serde(default)]
    pub args: Vec<Value>,
}

/// Outcome of a call as written back to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallReply {
    /// Positional return values
    Reply(Vec<Value>),
    /// Call refused or failed before producing a reply
    Reject(String),
}

/// Routes calls of one interface flavor to a registry.
pub struct Dispatcher {
    app: App,
    flavor: InterfaceFlavor,
    schema: ServiceSchema,
}

impl Dispatcher {
    /// Create a dispatcher serving `flavor`.
    #[must_use]
    pub fn new(app: App, flavor: InterfaceFlavor) -> Self {
        Self {
            app,
            flavor,
            schema: idl_factory(flavor),
        }
    }

    /// The registry behind this dispatcher.
    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Interface flavor served.
    #[must_use]
    pub const fn flavor(&self) -> InterfaceFlavor {
        self.flavor
    }

    /// Schema calls are checked against.
    #[must_use]
    pub fn schema(&self) -> &ServiceSchema {
        &self.schema
    }

    /// Serve `request` and return its positional results.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Rejected`] when a guard refuses the call,
    /// and a client error for unknown methods or ill-typed arguments.
    pub async fn call(&self, request: &CallRequest) -> Result<Vec<Value>, RegistryError> {
        let start = Instant::now();
        let result = self.route(request).await;

        let status = match &result {
            Ok(_) => "ok",
            Err(e) if e.is_rejection() => "rejected",
            Err(e) if e.is_client_error() => "invalid",
            Err(_) => "error",
        };
        let label = match &result {
            Err(RegistryError::UnknownMethod(_)) => "unknown",
            _ => request.method.as_str(),
        };
        metrics::record_call(label, status, start.elapsed().as_secs_f64());

        result
    }

    /// Serve `request`, folding errors into a rejection reply.
    pub async fn handle(&self, request: &CallRequest) -> CallReply {
        match self.call(request).await {
            Ok(values) => CallReply::Reply(values),
            Err(e) => CallReply::Reject(e.to_string()),
        }
    }

    /// Whether `method` changes state.
    #[must_use]
    pub fn is_update(&self, method: &str) -> bool {
        Operation::from_method_name(self.flavor, method).is_some_and(|op| op.is_update())
    }

    async fn route(&self, request: &CallRequest) -> Result<Vec<Value>, RegistryError> {
        let (operation, method) = self.resolve(&request.method)?;
        validate_values(&method.args, &request.args, &self.schema.env)?;
        let call = Call::decode(operation, &request.args)?;

        if operation.is_update() && !self.inspect(operation, request.caller, &call).await {
            metrics::record_rejection(&method.name);
            warn!(
                caller = %request.caller,
                method = %method.name,
                "Call refused by inspection"
            );
            let reason = format!("Unauthorized call to {}", method.name);
            return Err(RegistryError::rejected(&method.name, reason));
        }

        debug!(caller = %request.caller, method = %method.name, "Dispatching call");
        let values = call
            .execute(&self.app, request.caller)
            .await
            .map_err(|rejection| {
                metrics::record_rejection(&method.name);
                RegistryError::rejected(&method.name, rejection.reason)
            })??;

        validate_values(&method.rets, &values, &self.schema.env)?;
        Ok(values)
    }

    async fn inspect(&self, operation: Operation, caller: Principal, call: &Call) -> bool {
        let token_identifier = call.token_identifier();
        self.app
            .inspect_message(self.flavor, operation, caller, token_identifier)
            .await
    }

    fn resolve(&self, name: &str) -> Result<(Operation, &Method), RegistryError> {
        let operation = Operation::from_method_name(self.flavor, name)
            .ok_or_else(|| RegistryError::UnknownMethod(name.to_string()))?;
        let method = self
            .schema
            .method(name)
            .ok_or_else(|| RegistryError::UnknownMethod(name.to_string()))?;
        Ok((operation, method))
    }
}
