// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{DeployError, Result};
use serde_json::Value;
use std::fmt;

/// The cluster object kinds this tool knows how to create and delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Deployment,
    Service,
    PersistentVolume,
    PersistentVolumeClaim,
    Secret,
    Ingress,
}

impl ResourceKind {
    /// Every kind, in teardown order
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Deployment,
        ResourceKind::Service,
        ResourceKind::PersistentVolume,
        ResourceKind::PersistentVolumeClaim,
        ResourceKind::Secret,
        ResourceKind::Ingress,
    ];

    /// Resolve a manifest `kind`, ignoring case. Unknown kinds yield `None`.
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind.to_ascii_lowercase().as_str() {
            "deployment" => Some(ResourceKind::Deployment),
            "service" => Some(ResourceKind::Service),
            "persistentvolume" => Some(ResourceKind::PersistentVolume),
            "persistentvolumeclaim" => Some(ResourceKind::PersistentVolumeClaim),
            "secret" => Some(ResourceKind::Secret),
            "ingress" => Some(ResourceKind::Ingress),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Deployment => "Deployment",
            ResourceKind::Service => "Service",
            ResourceKind::PersistentVolume => "PersistentVolume",
            ResourceKind::PersistentVolumeClaim => "PersistentVolumeClaim",
            ResourceKind::Secret => "Secret",
            ResourceKind::Ingress => "Ingress",
        }
    }

    /// Persistent volumes live outside any namespace
    pub fn is_cluster_scoped(&self) -> bool {
        matches!(self, ResourceKind::PersistentVolume)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single manifest document with a recognised kind
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDefinition {
    pub kind: ResourceKind,
    pub name: String,
    /// The full document, with `kind` normalised to its canonical spelling
    pub body: Value,
}

impl ResourceDefinition {
    /// Interpret a parsed manifest document.
    ///
    /// Returns `Ok(None)` for kinds this tool does not manage, so callers can
    /// skip them without treating them as failures.
    pub fn from_document(mut body: Value) -> Result<Option<Self>> {
        let raw_kind = body
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| DeployError::InvalidDefinition("document has no kind".to_string()))?;

        let Some(kind) = ResourceKind::from_kind(raw_kind) else {
            return Ok(None);
        };

        let name = body
            .pointer("/metadata/name")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                DeployError::InvalidDefinition(format!("{} has no metadata.name", kind))
            })?
            .to_string();

        body["kind"] = Value::String(kind.as_str().to_string());

        Ok(Some(ResourceDefinition { kind, name, body }))
    }
}
