// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use stackup::cli::{Action, Cli};
use stackup::config::Config;
use stackup::deploy::{
    cancellation, forward, CliImageBuilder, GitSubmodules, KubectlForwarder, Orchestrator,
    TeardownCoordinator,
};
use stackup::kubernetes::KubeCluster;
use stackup::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration and start logging
    let config = Config::from_env()?;
    logging::init(&config.log_dir)?;

    let actions = cli.ordered_actions();
    if actions.is_empty() {
        info!("Nothing to do, pass one or more of: clean, deploy, forward");
        return Ok(());
    }
    info!(
        "Running {:?} against namespace {} from {}",
        actions,
        config.namespace,
        config.project_root.display()
    );

    // Create Kubernetes client
    let cluster = KubeCluster::try_default().await?;
    info!("Connected to Kubernetes cluster");

    let (cancel_handle, cancel) = cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current step");
            cancel_handle.cancel();
        }
    });

    for action in actions {
        cancel.check()?;
        match action {
            Action::Clean => {
                let coordinator = TeardownCoordinator::new(
                    &cluster,
                    config.owned_objects.clone(),
                    config.delete_namespace,
                );
                coordinator.teardown(&config.namespace).await;
            }
            Action::Deploy => {
                let builder = CliImageBuilder::new(&config.container_builder);
                let source = GitSubmodules::new();
                let mut orchestrator =
                    Orchestrator::new(&config, &cluster, &builder, &source, cancel.clone());
                let report = orchestrator.deploy().await?;
                for failure in &report.apply_errors {
                    warn!("{}", failure);
                }
            }
            Action::Forward => {
                let forwarder = KubectlForwarder::new(&config.kubectl, &config.forward_address);
                if let Err(e) = forward(
                    &cluster,
                    &forwarder,
                    &config.namespace,
                    &config.forward_selector,
                    config.forward_local_port,
                    config.forward_remote_port,
                )
                .await
                {
                    error!("Port forward failed: {}", e);
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}
