// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Checking out the service sources the images are built from.

use crate::error::{DeployError, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, instrument};

#[async_trait]
pub trait SourceSync: Send + Sync {
    /// Bring every source dependency under `root` to a clean, up to date checkout
    async fn sync(&self, root: &Path) -> Result<()>;
}

/// Refreshes git submodules and discards local changes inside them
pub struct GitSubmodules {
    git: String,
}

impl GitSubmodules {
    pub fn new() -> Self {
        Self {
            git: "git".to_string(),
        }
    }

    /// The git invocations performed by `sync`, in order
    pub fn steps() -> [&'static [&'static str]; 5] {
        [
            &["submodule", "init"],
            &["submodule", "foreach", "git", "pull"],
            &["submodule", "update", "--init"],
            &["submodule", "foreach", "git", "clean", "-df"],
            &["submodule", "foreach", "git", "reset", "HEAD", "--hard"],
        ]
    }
}

impl Default for GitSubmodules {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceSync for GitSubmodules {
    #[instrument(skip(self), fields(root = %root.display()))]
    async fn sync(&self, root: &Path) -> Result<()> {
        for args in Self::steps() {
            debug!("git {}", args.join(" "));
            let status = Command::new(&self.git)
                .args(args)
                .current_dir(root)
                .status()
                .await
                .map_err(|e| DeployError::ProcessError(format!("git {}: {}", args.join(" "), e)))?;
            if !status.success() {
                return Err(DeployError::ProcessError(format!(
                    "git {} exited with {}",
                    args.join(" "),
                    status
                )));
            }
        }
        Ok(())
    }
}
