// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! In-place merging of `KEY=VALUE` environment files.

use crate::error::{DeployError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

/// Parsed environment file, keeping the order keys first appeared in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    entries: Vec<(String, String)>,
}

impl EnvFile {
    /// Parse file contents. Blank lines, `#` comments and lines without `=` are dropped.
    pub fn parse(contents: &str) -> Self {
        let mut env = EnvFile::default();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            env.set(key.trim(), value.trim());
        }
        env
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Overwrite an existing key in place or append a new one
    pub fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}={}\n", k, v))
            .collect()
    }
}

/// Merge `overrides` into the environment file at `path`.
///
/// The file is rewritten through a temporary file in the same directory and
/// renamed over the target, so a crash leaves either the old or new content.
#[instrument(skip(overrides), fields(path = %path.display(), keys = overrides.len()))]
pub fn merge(path: &Path, overrides: &BTreeMap<String, String>) -> Result<()> {
    let io_error = |source: std::io::Error| DeployError::EnvFileError {
        path: path.to_path_buf(),
        source,
    };

    let contents = fs::read_to_string(path).map_err(io_error)?;
    let mut env = EnvFile::parse(&contents);
    for (key, value) in overrides {
        env.set(key, value);
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_error)?;
    tmp.write_all(env.render().as_bytes()).map_err(io_error)?;
    tmp.as_file()
        .set_permissions(fs::metadata(path).map_err(io_error)?.permissions())
        .map_err(io_error)?;
    tmp.as_file().sync_all().map_err(io_error)?;
    tmp.persist(path).map_err(|e| io_error(e.error))?;

    debug!("Wrote {} entries", env.entries.len());
    Ok(())
}
