// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Container image builds for every `Dockerfile.<image>` in the project root.

use crate::constants::BUILD_FILE_PREFIX;
use crate::error::{DeployError, Result};
use async_trait::async_trait;
use std::fs;
use std::path::Path;
use tokio::process::Command;
use tracing::{error, info, instrument};

/// A build file and the image tag derived from its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDefinition {
    pub file_name: String,
    pub image: String,
}

impl BuildDefinition {
    /// `Dockerfile.api` builds image `api`; anything else is not a build file
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let image = file_name.strip_prefix(BUILD_FILE_PREFIX)?;
        if image.is_empty() {
            return None;
        }
        Some(Self {
            file_name: file_name.to_string(),
            image: image.to_string(),
        })
    }
}

#[async_trait]
pub trait ImageBuilder: Send + Sync {
    /// Build `definition_file` with `context` as build context and tag it `tag`
    async fn build(&self, context: &Path, definition_file: &str, tag: &str) -> Result<()>;
}

/// Builds through a docker-compatible CLI (docker or podman)
pub struct CliImageBuilder {
    binary: String,
}

impl CliImageBuilder {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl ImageBuilder for CliImageBuilder {
    async fn build(&self, context: &Path, definition_file: &str, tag: &str) -> Result<()> {
        let status = Command::new(&self.binary)
            .arg("build")
            .arg("--file")
            .arg(context.join(definition_file))
            .arg("--tag")
            .arg(tag)
            .arg(context)
            .status()
            .await
            .map_err(|e| DeployError::BuildError {
                image: tag.to_string(),
                message: format!("could not run {}: {}", self.binary, e),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(DeployError::BuildError {
                image: tag.to_string(),
                message: format!("{} build exited with {}", self.binary, status),
            })
        }
    }
}

/// Build files in `root`, sorted by file name
pub fn discover_build_definitions(root: &Path) -> Result<Vec<BuildDefinition>> {
    let entries = fs::read_dir(root).map_err(|e| DeployError::BuildError {
        image: "*".to_string(),
        message: format!("could not list {}: {}", root.display(), e),
    })?;

    let mut definitions: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter_map(|entry| BuildDefinition::from_file_name(&entry.file_name().to_string_lossy()))
        .collect();
    definitions.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(definitions)
}

/// Build every image under `root`, stopping at the first failure
#[instrument(skip(builder), fields(root = %root.display()))]
pub async fn build_all<B: ImageBuilder + ?Sized>(builder: &B, root: &Path) -> Result<Vec<String>> {
    let definitions = discover_build_definitions(root)?;
    let mut built = Vec::with_capacity(definitions.len());

    for definition in definitions {
        info!("building docker image: {}", definition.image);
        if let Err(e) = builder
            .build(root, &definition.file_name, &definition.image)
            .await
        {
            error!("docker image build for {} failed: {}", definition.image, e);
            return Err(e);
        }
        info!("successfully built {}", definition.image);
        built.push(definition.image);
    }

    Ok(built)
}
