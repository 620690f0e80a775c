mod actor_framework;
mod app_system;
mod clients;
mod config;
mod domain;
mod error;
mod orchestrator;
mod product_actor;
mod server;
mod user_actor;
mod validation;
mod wire;
mod workload;

#[cfg(test)]
mod mock_framework;

use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::{info, Instrument};

use crate::app_system::{setup_tracing, Role, ServiceSystem};
use crate::clients::DownstreamProxy;
use crate::config::{ServiceConfig, ORDER_SERVICE};

const USAGE: &str =
    "usage: order_orchestrator <user|product|order|gateway|workload FILE> [--config PATH]";

/// What the binary was asked to do.
enum Invocation {
    Serve(Role),
    Workload(PathBuf),
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<(Invocation, PathBuf)> {
    let mut config = PathBuf::from("config.json");
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        if arg == "--config" {
            config = args.next().map(PathBuf::from).context("--config needs a path")?;
        } else {
            positional.push(arg);
        }
    }

    let invocation = match positional.as_slice() {
        [command, file] if command == "workload" => Invocation::Workload(PathBuf::from(file)),
        [role] => Invocation::Serve(role.parse()?),
        _ => bail!(USAGE),
    };
    Ok((invocation, config))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup tracing once for the entire application
    setup_tracing();

    let (invocation, config_path) = parse_args(std::env::args().skip(1))?;
    let config = ServiceConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    match invocation {
        Invocation::Serve(role) => {
            let endpoint = config.endpoint(role.config_key())?;
            let system = ServiceSystem::for_role(role, &config)?;
            let span = tracing::info_span!("service", role = ?role);
            async {
                info!(%endpoint, "Starting service");
                system.serve(&endpoint).await
            }
            .instrument(span)
            .await?;
        }
        Invocation::Workload(file) => {
            let target = config.endpoint(ORDER_SERVICE)?;
            let proxy = DownstreamProxy::new(config.downstream_timeout(ORDER_SERVICE))?;
            let summary = workload::run_workload(&file, &proxy, &target)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            info!(?summary, "Workload complete");
        }
    }

    info!("Application completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> impl Iterator<Item = String> {
        raw.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_roles_and_config_flag() {
        let (invocation, config) = parse_args(args(&["order", "--config", "conf/dev.json"])).unwrap();
        assert!(matches!(invocation, Invocation::Serve(Role::Order)));
        assert_eq!(config, PathBuf::from("conf/dev.json"));

        let (invocation, config) = parse_args(args(&["workload", "load.txt"])).unwrap();
        assert!(matches!(invocation, Invocation::Workload(ref file) if file == &PathBuf::from("load.txt")));
        assert_eq!(config, PathBuf::from("config.json"));
    }

    #[test]
    fn rejects_bad_invocations() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["billing"])).is_err());
        assert!(parse_args(args(&["user", "--config"])).is_err());
    }
}
