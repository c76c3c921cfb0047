// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{self, env_files, readiness};
use crate::types::inventory::OwnedObjectSet;
use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// An environment file to patch during deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvFileTarget {
    pub path: PathBuf,
    pub overrides: BTreeMap<String, String>,
    /// Key that receives the generated database credential, if any
    pub credential_key: Option<String>,
}

/// Tool configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace the stack is deployed into and torn down from
    pub namespace: String,
    /// Directory holding manifests, build files and service checkouts
    pub project_root: PathBuf,
    pub log_dir: PathBuf,
    pub owned_objects: OwnedObjectSet,
    /// Also delete the whole namespace on clean
    pub delete_namespace: bool,
    /// Container build binary (docker or podman)
    pub container_builder: String,
    pub kubectl: String,
    /// Label selector for the database pods gating the dependent tier
    pub database_selector: String,
    pub forward_selector: String,
    pub forward_local_port: u16,
    pub forward_remote_port: u16,
    pub forward_address: String,
    pub readiness_ceiling: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let owned_objects = match lookup("OWNED_OBJECTS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .collect(),
            None => constants::DEFAULT_OWNED_OBJECTS.iter().copied().collect(),
        };

        let delete_namespace: bool = var("DELETE_NAMESPACE_ON_CLEAN", "false")
            .parse()
            .context("DELETE_NAMESPACE_ON_CLEAN must be true or false")?;

        let (forward_local_port, forward_remote_port) =
            parse_port_pair(&var("FORWARD_PORTS", "80:8000"))?;

        let ceiling_secs: u64 = var("READINESS_CEILING_SECS", &readiness::CEILING_SECS.to_string())
            .parse()
            .context("READINESS_CEILING_SECS must be a number of seconds")?;

        Ok(Config {
            namespace: var("DEPLOY_NAMESPACE", constants::DEFAULT_NAMESPACE),
            project_root: PathBuf::from(var("PROJECT_ROOT", ".")),
            log_dir: PathBuf::from(var("LOG_DIR", "log")),
            owned_objects,
            delete_namespace,
            container_builder: var("CONTAINER_BUILDER", "docker"),
            kubectl: var("KUBECTL", "kubectl"),
            database_selector: var("DATABASE_SELECTOR", "app=mysql"),
            forward_selector: var("FORWARD_SELECTOR", "app=web"),
            forward_local_port,
            forward_remote_port,
            forward_address: var("FORWARD_ADDRESS", "0.0.0.0"),
            readiness_ceiling: Duration::from_secs(ceiling_secs),
        })
    }

    /// Environment files of the dependent services, resolved against the project root
    pub fn env_targets(&self) -> Vec<EnvFileTarget> {
        let overrides = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };

        vec![
            EnvFileTarget {
                path: self.project_root.join(env_files::API),
                overrides: overrides(env_files::API_OVERRIDES),
                credential_key: Some(env_files::API_CREDENTIAL_KEY.to_string()),
            },
            EnvFileTarget {
                path: self.project_root.join(env_files::WEB),
                overrides: overrides(env_files::WEB_OVERRIDES),
                credential_key: None,
            },
        ]
    }

    pub fn manifest(&self, file_name: &str) -> PathBuf {
        self.project_root.join(file_name)
    }
}

fn parse_port_pair(value: &str) -> Result<(u16, u16)> {
    let (local, remote) = value
        .split_once(':')
        .ok_or_else(|| anyhow!("FORWARD_PORTS must look like LOCAL:REMOTE, got {}", value))?;
    let local = local
        .trim()
        .parse()
        .with_context(|| format!("Invalid local port in FORWARD_PORTS: {}", value))?;
    let remote = remote
        .trim()
        .parse()
        .with_context(|| format!("Invalid remote port in FORWARD_PORTS: {}", value))?;
    Ok((local, remote))
}
