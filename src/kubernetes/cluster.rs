// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The narrow slice of the control-plane API the deployment engine relies on.

use crate::error::Result;
use crate::types::{ResourceDefinition, ResourceKind};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{PersistentVolumeClaim, Pod, Secret};

#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn namespace_exists(&self, namespace: &str) -> Result<bool>;

    async fn create_namespace(&self, namespace: &str) -> Result<()>;

    async fn delete_namespace(&self, namespace: &str) -> Result<()>;

    /// Create the object described by `definition`. Persistent volumes ignore `namespace`.
    async fn create(&self, namespace: &str, definition: &ResourceDefinition) -> Result<()>;

    /// Names of the live objects of `kind`. Persistent volumes are listed cluster-wide.
    async fn list_names(&self, kind: ResourceKind, namespace: &str) -> Result<Vec<String>>;

    async fn delete(&self, kind: ResourceKind, namespace: &str, name: &str) -> Result<()>;

    /// Create or update a secret with server-side apply
    async fn apply_secret(&self, namespace: &str, secret: &Secret) -> Result<()>;

    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>>;

    async fn list_claims(&self, namespace: &str) -> Result<Vec<PersistentVolumeClaim>>;
}
