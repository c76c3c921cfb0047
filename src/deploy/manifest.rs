// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Applying multi-document manifest files to the cluster.

use crate::error::DeployError;
use crate::kubernetes::ClusterApi;
use crate::types::{ResourceDefinition, ResourceKind};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

/// A manifest document that could not be applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyError {
    pub file: PathBuf,
    /// Kind and name, when the document got far enough to have them
    pub object: Option<(ResourceKind, String)>,
    pub message: String,
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.object {
            Some((kind, name)) => write!(
                f,
                "{}: could not create {} {}: {}",
                self.file.display(),
                kind,
                name,
                self.message
            ),
            None => write!(f, "{}: {}", self.file.display(), self.message),
        }
    }
}

/// Result of applying one manifest file
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Objects created, in document order
    pub applied: Vec<(ResourceKind, String)>,
    pub errors: Vec<ApplyError>,
}

impl ApplyReport {
    /// Names of the created objects of one kind
    pub fn names_of(&self, kind: ResourceKind) -> Vec<String> {
        self.applied
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, name)| name.clone())
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Creates every recognised document of a manifest file in a target namespace
pub struct ManifestApplier<'a, C: ClusterApi + ?Sized> {
    cluster: &'a C,
    namespace: &'a str,
}

impl<'a, C: ClusterApi + ?Sized> ManifestApplier<'a, C> {
    pub fn new(cluster: &'a C, namespace: &'a str) -> Self {
        Self { cluster, namespace }
    }

    /// Apply every document in `path`.
    ///
    /// A failing document is recorded and the rest of the file still runs.
    /// Unrecognised kinds are skipped without error.
    #[instrument(skip(self), fields(namespace = %self.namespace, file = %path.display()))]
    pub async fn apply(&self, path: &Path) -> ApplyReport {
        let mut report = ApplyReport::default();

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(source) => {
                let err = DeployError::ManifestReadError {
                    path: path.to_path_buf(),
                    source,
                };
                error!("{}", err);
                report.errors.push(ApplyError {
                    file: path.to_path_buf(),
                    object: None,
                    message: err.to_string(),
                });
                return report;
            }
        };

        for document in serde_yaml::Deserializer::from_str(&contents) {
            let value = match serde_json::Value::deserialize(document) {
                Ok(serde_json::Value::Null) => continue,
                Ok(value) => value,
                Err(e) => {
                    error!("could not parse document in {}: {}", path.display(), e);
                    report.errors.push(ApplyError {
                        file: path.to_path_buf(),
                        object: None,
                        message: format!("invalid YAML document: {}", e),
                    });
                    // the parser cannot resume past a syntax error
                    break;
                }
            };

            let definition = match ResourceDefinition::from_document(value) {
                Ok(Some(definition)) => definition,
                Ok(None) => {
                    debug!("skipping document of unmanaged kind");
                    continue;
                }
                Err(e) => {
                    error!("could not create object from definition: {}", e);
                    report.errors.push(ApplyError {
                        file: path.to_path_buf(),
                        object: None,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            match self.cluster.create(self.namespace, &definition).await {
                Ok(()) => {
                    info!("successfully created {} {}", definition.kind, definition.name);
                    report.applied.push((definition.kind, definition.name));
                }
                Err(e) => {
                    if e.is_conflict() {
                        warn!("{} {} already exists", definition.kind, definition.name);
                    } else {
                        error!(
                            "could not create {} {}: {}",
                            definition.kind, definition.name, e
                        );
                    }
                    report.errors.push(ApplyError {
                        file: path.to_path_buf(),
                        object: Some((definition.kind, definition.name)),
                        message: e.to_string(),
                    });
                }
            }
        }

        report
    }
}
