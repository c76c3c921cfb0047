// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! `ClusterApi` backed by a live Kubernetes client

use crate::constants::MANAGER_NAME;
use crate::error::{DeployError, Result};
use crate::kubernetes::cluster::ClusterApi;
use crate::kubernetes::namespaces;
use crate::types::{ResourceDefinition, ResourceKind};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{
    PersistentVolume, PersistentVolumeClaim, Pod, Secret, Service,
};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::NamespaceResourceScope;
use kube::{
    api::{DeleteParams, ListParams, Patch, PatchParams, PostParams},
    Api, Client, Resource, ResourceExt,
};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use tracing::{debug, instrument};

/// Cluster access through the kube API client
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using the local kubeconfig or in-cluster service account
    pub async fn try_default() -> Result<Self> {
        Ok(Self::new(Client::try_default().await?))
    }

    fn namespaced<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn volumes(&self) -> Api<PersistentVolume> {
        Api::all(self.client.clone())
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn namespace_exists(&self, namespace: &str) -> Result<bool> {
        namespaces::namespace_exists(&self.client, namespace).await
    }

    async fn create_namespace(&self, namespace: &str) -> Result<()> {
        namespaces::create_namespace(&self.client, namespace).await
    }

    async fn delete_namespace(&self, namespace: &str) -> Result<()> {
        namespaces::delete_namespace(&self.client, namespace).await
    }

    #[instrument(skip(self, definition), fields(kind = %definition.kind, name = %definition.name))]
    async fn create(&self, namespace: &str, definition: &ResourceDefinition) -> Result<()> {
        match definition.kind {
            ResourceKind::Deployment => {
                create_from(self.namespaced::<Deployment>(namespace), definition).await
            }
            ResourceKind::Service => {
                create_from(self.namespaced::<Service>(namespace), definition).await
            }
            ResourceKind::PersistentVolume => create_from(self.volumes(), definition).await,
            ResourceKind::PersistentVolumeClaim => {
                create_from(self.namespaced::<PersistentVolumeClaim>(namespace), definition).await
            }
            ResourceKind::Secret => {
                create_from(self.namespaced::<Secret>(namespace), definition).await
            }
            ResourceKind::Ingress => {
                create_from(self.namespaced::<Ingress>(namespace), definition).await
            }
        }
    }

    async fn list_names(&self, kind: ResourceKind, namespace: &str) -> Result<Vec<String>> {
        match kind {
            ResourceKind::Deployment => names_of(self.namespaced::<Deployment>(namespace)).await,
            ResourceKind::Service => names_of(self.namespaced::<Service>(namespace)).await,
            ResourceKind::PersistentVolume => names_of(self.volumes()).await,
            ResourceKind::PersistentVolumeClaim => {
                names_of(self.namespaced::<PersistentVolumeClaim>(namespace)).await
            }
            ResourceKind::Secret => names_of(self.namespaced::<Secret>(namespace)).await,
            ResourceKind::Ingress => names_of(self.namespaced::<Ingress>(namespace)).await,
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, kind: ResourceKind, namespace: &str, name: &str) -> Result<()> {
        match kind {
            ResourceKind::Deployment => {
                delete_from(self.namespaced::<Deployment>(namespace), name).await
            }
            ResourceKind::Service => delete_from(self.namespaced::<Service>(namespace), name).await,
            ResourceKind::PersistentVolume => delete_from(self.volumes(), name).await,
            ResourceKind::PersistentVolumeClaim => {
                delete_from(self.namespaced::<PersistentVolumeClaim>(namespace), name).await
            }
            ResourceKind::Secret => delete_from(self.namespaced::<Secret>(namespace), name).await,
            ResourceKind::Ingress => delete_from(self.namespaced::<Ingress>(namespace), name).await,
        }
    }

    #[instrument(skip(self, secret), fields(secret = %secret.name_any()))]
    async fn apply_secret(&self, namespace: &str, secret: &Secret) -> Result<()> {
        let secrets: Api<Secret> = self.namespaced(namespace);
        let pp = PatchParams::apply(MANAGER_NAME).force();
        secrets
            .patch(&secret.name_any(), &pp, &Patch::Apply(secret))
            .await?;
        Ok(())
    }

    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>> {
        let pods: Api<Pod> = self.namespaced(namespace);
        let list = pods
            .list(&ListParams::default().labels(label_selector))
            .await?;
        Ok(list.items)
    }

    async fn list_claims(&self, namespace: &str) -> Result<Vec<PersistentVolumeClaim>> {
        let claims: Api<PersistentVolumeClaim> = self.namespaced(namespace);
        Ok(claims.list(&ListParams::default()).await?.items)
    }
}

/// Turn a manifest document into the typed object for `api` and create it
async fn create_from<K>(api: Api<K>, definition: &ResourceDefinition) -> Result<()>
where
    K: Clone + DeserializeOwned + Serialize + Debug,
{
    let object: K = serde_json::from_value(definition.body.clone()).map_err(|e| {
        DeployError::InvalidDefinition(format!(
            "{} {} does not match the {} schema: {}",
            definition.kind, definition.name, definition.kind, e
        ))
    })?;

    api.create(&PostParams::default(), &object).await?;
    debug!("Created {} {}", definition.kind, definition.name);
    Ok(())
}

async fn names_of<K>(api: Api<K>) -> Result<Vec<String>>
where
    K: Resource + Clone + DeserializeOwned + Debug,
{
    let list = api.list(&ListParams::default()).await?;
    Ok(list.items.iter().map(|item| item.name_any()).collect())
}

async fn delete_from<K>(api: Api<K>, name: &str) -> Result<()>
where
    K: Clone + DeserializeOwned + Debug,
{
    api.delete(name, &DeleteParams::default()).await?;
    Ok(())
}
