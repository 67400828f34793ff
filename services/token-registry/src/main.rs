//! Token registry binary: describes the interface or serves calls on stdio.

use std::sync::Arc;

use anyhow::Context;
use dip721_interface::did::render_service;
use dip721_interface::{idl_factory, InterfaceFlavor, Nat};
use tokio::io::BufReader;
use tracing::{info, warn};

use token_registry::config::RunMode;
use token_registry::dispatch::serve;
use token_registry::registry::SystemClock;
use token_registry::storage::Snapshot;
use token_registry::tracing_config::init_tracing;
use token_registry::{App, Config, Dispatcher, RegistryError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.tracing)?;

    match config.mode {
        RunMode::Describe => {
            println!("{}", render_service(&idl_factory(config.flavor)));
            Ok(())
        }
        RunMode::Run => run(config).await,
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    info!(
        flavor = config.flavor.as_str(),
        state_file = ?config.state_file,
        "Starting token registry"
    );

    let clock = Arc::new(SystemClock);
    let snapshot = match &config.state_file {
        Some(path) => Snapshot::load(path)
            .await
            .with_context(|| format!("loading snapshot {}", path.display()))?,
        None => None,
    };

    let app = match snapshot {
        Some(snapshot) => App::restore(snapshot, clock),
        None => {
            // the bare init record carries a mandatory logo
            if config.flavor == InterfaceFlavor::Bare && config.init.logo.is_none() {
                let err = RegistryError::config("REGISTRY_LOGO is required for the bare flavor");
                return Err(err.into());
            }
            if config.init.custodians.is_empty() {
                warn!("No custodians configured; custodian-only calls will be refused");
            }
            App::init(config.init.clone(), clock)
        }
    }
    .with_cycles(Nat(config.cycles));

    let dispatcher = Dispatcher::new(app, config.flavor);
    let served = serve(
        &dispatcher,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        config.state_file.as_deref(),
    )
    .await?;

    info!(served, "Token registry stopped");
    Ok(())
}
