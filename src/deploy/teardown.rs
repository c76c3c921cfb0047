// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Best-effort removal of the objects this tool owns.

use crate::kubernetes::ClusterApi;
use crate::types::{ClusterInventory, OwnedObjectSet, ResourceKind};
use tracing::{debug, info, instrument, warn};

/// Deletes owned objects that are live, and nothing else
pub struct TeardownCoordinator<'a, C: ClusterApi + ?Sized> {
    cluster: &'a C,
    owned: OwnedObjectSet,
    delete_namespace: bool,
}

impl<'a, C: ClusterApi + ?Sized> TeardownCoordinator<'a, C> {
    pub fn new(cluster: &'a C, owned: OwnedObjectSet, delete_namespace: bool) -> Self {
        Self {
            cluster,
            owned,
            delete_namespace,
        }
    }

    /// Snapshot the live names of every managed kind. A kind that cannot be
    /// listed is recorded as an error and treated as empty.
    async fn inventory(&self, namespace: &str, errors: &mut Vec<String>) -> ClusterInventory {
        let mut inventory = ClusterInventory::default();
        for kind in ResourceKind::ALL {
            match self.cluster.list_names(kind, namespace).await {
                Ok(names) => inventory.insert(kind, names),
                Err(e) => errors.push(format!("could not list {}: {}", kind, e)),
            }
        }
        inventory
    }

    /// Tear down everything owned in `namespace`, returning every failure message.
    ///
    /// Individual failures never stop the rest of the teardown.
    #[instrument(skip(self))]
    pub async fn teardown(&self, namespace: &str) -> Vec<String> {
        let mut errors = Vec::new();

        let inventory = self.inventory(namespace, &mut errors).await;
        for (kind, name) in inventory.owned_and_live(&self.owned) {
            debug!("deleting {} {}", kind, name);
            if let Err(e) = self.cluster.delete(kind, namespace, &name).await {
                errors.push(format!("could not delete {} {}: {}", kind, name, e));
            }
        }

        if self.delete_namespace {
            match self.cluster.namespace_exists(namespace).await {
                Ok(true) => {
                    if let Err(e) = self.cluster.delete_namespace(namespace).await {
                        errors.push(format!("could not delete namespace {}: {}", namespace, e));
                    }
                }
                Ok(false) => debug!("namespace {} already gone", namespace),
                Err(e) => errors.push(e.to_string()),
            }
        }

        if errors.is_empty() {
            info!("successfully tore down deployment in {}", namespace);
        } else {
            warn!("tore down deployment with errors: {}", errors.join(", "));
        }

        errors
    }
}
