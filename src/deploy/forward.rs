// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Debug port forwarding to a running pod.

use crate::error::{DeployError, Result};
use crate::kubernetes::ClusterApi;
use async_trait::async_trait;
use kube::ResourceExt;
use tokio::process::Command;
use tracing::{error, info, instrument};

#[async_trait]
pub trait PortForwarder: Send + Sync {
    /// Forward `local_port` to `remote_port` of `pod`. Blocks for the whole session.
    async fn port_forward(
        &self,
        namespace: &str,
        pod: &str,
        local_port: u16,
        remote_port: u16,
    ) -> Result<()>;
}

/// Runs `kubectl port-forward`
pub struct KubectlForwarder {
    kubectl: String,
    address: String,
}

impl KubectlForwarder {
    pub fn new(kubectl: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            kubectl: kubectl.into(),
            address: address.into(),
        }
    }

    fn args(&self, namespace: &str, pod: &str, local_port: u16, remote_port: u16) -> Vec<String> {
        vec![
            "port-forward".to_string(),
            "--address".to_string(),
            self.address.clone(),
            pod.to_string(),
            format!("{}:{}", local_port, remote_port),
            "-n".to_string(),
            namespace.to_string(),
        ]
    }
}

#[async_trait]
impl PortForwarder for KubectlForwarder {
    async fn port_forward(
        &self,
        namespace: &str,
        pod: &str,
        local_port: u16,
        remote_port: u16,
    ) -> Result<()> {
        let status = Command::new(&self.kubectl)
            .args(self.args(namespace, pod, local_port, remote_port))
            .status()
            .await
            .map_err(|e| DeployError::ProcessError(format!("{} port-forward: {}", self.kubectl, e)))?;

        if !status.success() {
            return Err(DeployError::ProcessError(format!(
                "{} port-forward exited with {}",
                self.kubectl, status
            )));
        }
        Ok(())
    }
}

/// Forward to the first pod matching `label_selector`.
///
/// No matching pod is logged, not returned as an error.
#[instrument(skip(cluster, forwarder))]
pub async fn forward<C, F>(
    cluster: &C,
    forwarder: &F,
    namespace: &str,
    label_selector: &str,
    local_port: u16,
    remote_port: u16,
) -> Result<()>
where
    C: ClusterApi + ?Sized,
    F: PortForwarder + ?Sized,
{
    let pods = cluster.list_pods(namespace, label_selector).await?;
    let Some(pod) = pods.first() else {
        error!("could not find any pods matching {}", label_selector);
        return Ok(());
    };

    let pod_name = pod.name_any();
    info!(
        "forwarding port {} to {}:{} in {}",
        local_port, pod_name, remote_port, namespace
    );
    forwarder
        .port_forward(namespace, &pod_name, local_port, remote_port)
        .await
}
