// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Invalid resource definition: {0}")]
    InvalidDefinition(String),

    #[error("Namespace creation failed: {0}")]
    NamespaceError(String),

    #[error("Docker image build for {image} failed: {message}")]
    BuildError { image: String, message: String },

    #[error("{target} took too long to initialise (gave up after {waited:?})")]
    ReadinessTimeout { target: String, waited: Duration },

    #[error("Failed to update environment file {}: {source}", path.display())]
    EnvFileError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read manifest {}: {source}", path.display())]
    ManifestReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Process failed: {0}")]
    ProcessError(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DeployError {
    /// True when the API rejected a create because the object is already there.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DeployError::KubeError(kube::Error::Api(err)) if err.code == 409)
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;
