// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The deployment sequence: credentials, images, namespace, persistence,
//! database barrier, dependent tier and exposure.

use crate::config::Config;
use crate::constants::{credential, manifests};
use crate::deploy::cancel::CancelSignal;
use crate::deploy::credentials::generate_credential;
use crate::deploy::env_file;
use crate::deploy::images::{build_all, ImageBuilder};
use crate::deploy::manifest::{ApplyError, ApplyReport, ManifestApplier};
use crate::deploy::poller::{Backoff, Readiness, ReadinessPoller};
use crate::deploy::source::SourceSync;
use crate::error::Result;
use crate::kubernetes::{claims_bound, pod_readiness, ClusterApi};
use crate::types::ResourceKind;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployState {
    Idle,
    CredentialsIssued,
    SubmoduleReady,
    ImagesBuilt,
    NamespaceReady,
    SecretApplied,
    PersistenceApplied,
    DatabaseReady,
    ComputeApplied,
    ServiceExposed,
    Done,
    Failed,
}

impl fmt::Display for DeployState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What a finished deployment left behind
#[derive(Debug)]
pub struct DeployReport {
    pub state: DeployState,
    /// Manifest documents that failed without stopping the run
    pub apply_errors: Vec<ApplyError>,
    /// Other recoverable problems
    pub warnings: Vec<String>,
}

pub struct Orchestrator<'a> {
    config: &'a Config,
    cluster: &'a dyn ClusterApi,
    builder: &'a dyn ImageBuilder,
    source: &'a dyn SourceSync,
    cancel: CancelSignal,
    backoff: Backoff,
    state: DeployState,
    apply_errors: Vec<ApplyError>,
    warnings: Vec<String>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a Config,
        cluster: &'a dyn ClusterApi,
        builder: &'a dyn ImageBuilder,
        source: &'a dyn SourceSync,
        cancel: CancelSignal,
    ) -> Self {
        Self {
            config,
            cluster,
            builder,
            source,
            cancel,
            backoff: Backoff::with_ceiling(config.readiness_ceiling),
            state: DeployState::Idle,
            apply_errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn state(&self) -> DeployState {
        self.state
    }

    /// Run the whole deployment.
    ///
    /// Build failures, readiness timeouts, environment file errors, namespace
    /// errors and cancellation stop the run in `Failed`. Manifest failures are
    /// collected in the report.
    #[instrument(skip(self), fields(namespace = %self.config.namespace))]
    pub async fn deploy(&mut self) -> Result<DeployReport> {
        match self.run().await {
            Ok(()) => {
                self.advance(DeployState::Done);
                if self.apply_errors.is_empty() {
                    info!("deployment complete");
                } else {
                    warn!(
                        "deployment complete with {} failed manifest documents",
                        self.apply_errors.len()
                    );
                }
                Ok(DeployReport {
                    state: self.state,
                    apply_errors: std::mem::take(&mut self.apply_errors),
                    warnings: std::mem::take(&mut self.warnings),
                })
            }
            Err(e) => {
                error!("deployment failed after {}: {}", self.state, e);
                self.state = DeployState::Failed;
                Err(e)
            }
        }
    }

    async fn run(&mut self) -> Result<()> {
        self.cancel.check()?;
        let credential = generate_credential(credential::LENGTH);
        self.propagate_credential(&credential)?;
        self.advance(DeployState::CredentialsIssued);

        self.cancel.check()?;
        if let Err(e) = self.source.sync(&self.config.project_root).await {
            warn!("source dependencies not synchronised: {}", e);
            self.warnings.push(e.to_string());
        }
        self.advance(DeployState::SubmoduleReady);

        self.cancel.check()?;
        build_all(self.builder, &self.config.project_root).await?;
        self.advance(DeployState::ImagesBuilt);

        self.cancel.check()?;
        self.ensure_namespace().await?;
        self.advance(DeployState::NamespaceReady);

        self.cancel.check()?;
        self.apply_credential_secret(&credential).await;
        let secret_manifest = self.config.manifest(manifests::SECRET);
        if secret_manifest.exists() {
            self.apply_manifest(manifests::SECRET).await;
        } else {
            debug!("no {} found, skipping", manifests::SECRET);
        }
        self.advance(DeployState::SecretApplied);

        self.cancel.check()?;
        let persistence = self.apply_manifest(manifests::PERSISTENCE).await;
        self.wait_for_claims(persistence.names_of(ResourceKind::PersistentVolumeClaim))
            .await?;
        self.advance(DeployState::PersistenceApplied);

        self.cancel.check()?;
        self.apply_manifest(manifests::DATABASE).await;
        self.wait_for_database().await?;
        self.advance(DeployState::DatabaseReady);

        self.cancel.check()?;
        self.apply_manifest(manifests::DEPENDENT).await;
        self.advance(DeployState::ComputeApplied);

        self.cancel.check()?;
        self.apply_manifest(manifests::EXPOSURE).await;
        self.advance(DeployState::ServiceExposed);

        Ok(())
    }

    fn advance(&mut self, next: DeployState) {
        debug!("{} -> {}", self.state, next);
        self.state = next;
    }

    fn propagate_credential(&self, credential: &str) -> Result<()> {
        for target in self.config.env_targets() {
            let mut overrides = target.overrides;
            if let Some(key) = target.credential_key {
                overrides.insert(key, credential.to_string());
            }
            env_file::merge(&target.path, &overrides)?;
            info!("updated {}", target.path.display());
        }
        Ok(())
    }

    async fn ensure_namespace(&self) -> Result<()> {
        let namespace = &self.config.namespace;
        if self.cluster.namespace_exists(namespace).await? {
            debug!("namespace {} already exists", namespace);
            return Ok(());
        }
        self.cluster.create_namespace(namespace).await
    }

    async fn apply_credential_secret(&mut self, credential: &str) {
        let secret = credential_secret(credential);
        match self
            .cluster
            .apply_secret(&self.config.namespace, &secret)
            .await
        {
            Ok(()) => info!("applied secret {}", credential::SECRET_NAME),
            Err(e) => {
                error!("could not apply secret {}: {}", credential::SECRET_NAME, e);
                self.warnings
                    .push(format!("secret {}: {}", credential::SECRET_NAME, e));
            }
        }
    }

    async fn apply_manifest(&mut self, file_name: &str) -> ApplyReport {
        let path = self.config.manifest(file_name);
        let report = ManifestApplier::new(self.cluster, &self.config.namespace)
            .apply(&path)
            .await;
        if !report.is_clean() {
            warn!("{} failed documents in {}", report.errors.len(), file_name);
        }
        self.apply_errors.extend(report.errors.iter().cloned());
        report
    }

    async fn wait_for_claims(&self, expected: Vec<String>) -> Result<()> {
        if expected.is_empty() {
            return Ok(());
        }
        let cluster = self.cluster;
        let namespace = self.config.namespace.as_str();
        let expected = &expected;

        self.poller()
            .wait_until_ready("persistent volume claims", || async move {
                match cluster.list_claims(namespace).await {
                    Ok(claims) => claims_bound(&claims, expected),
                    Err(e) => {
                        warn!("could not read claim status: {}", e);
                        Readiness::Unknown
                    }
                }
            })
            .await?;
        Ok(())
    }

    async fn wait_for_database(&self) -> Result<()> {
        let cluster = self.cluster;
        let namespace = self.config.namespace.as_str();
        let selector = self.config.database_selector.as_str();

        self.poller()
            .wait_until_ready(selector, || async move {
                match cluster.list_pods(namespace, selector).await {
                    Ok(pods) => pod_readiness(&pods),
                    Err(e) => {
                        warn!("could not read pod status: {}", e);
                        Readiness::Unknown
                    }
                }
            })
            .await?;
        info!("database ready, deploying dependent services");
        Ok(())
    }

    fn poller(&self) -> ReadinessPoller {
        ReadinessPoller::new(self.backoff, self.cancel.clone())
    }
}

/// The cluster secret carrying the generated database credential
fn credential_secret(credential: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(credential::SECRET_NAME.to_string()),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(
            credential::SECRET_KEY.to_string(),
            ByteString(credential.as_bytes().to_vec()),
        )])),
        type_: Some("Opaque".to_string()),
        ..Default::default()
    }
}
