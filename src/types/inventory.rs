// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::resource::ResourceKind;
use std::collections::{BTreeMap, BTreeSet};

/// Exact names of the cluster objects this tool is allowed to delete
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedObjectSet {
    names: BTreeSet<String>,
}

impl OwnedObjectSet {
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for OwnedObjectSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        OwnedObjectSet {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Live object names per kind, captured at one point in time
#[derive(Debug, Clone, Default)]
pub struct ClusterInventory {
    live: BTreeMap<ResourceKind, Vec<String>>,
}

impl ClusterInventory {
    pub fn insert(&mut self, kind: ResourceKind, names: Vec<String>) {
        self.live.insert(kind, names);
    }

    pub fn names(&self, kind: ResourceKind) -> &[String] {
        self.live.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Objects that are both live and owned, in teardown order.
    /// Anything not in `owned` by exact name is left out.
    pub fn owned_and_live(&self, owned: &OwnedObjectSet) -> Vec<(ResourceKind, String)> {
        ResourceKind::ALL
            .iter()
            .flat_map(|kind| {
                self.names(*kind)
                    .iter()
                    .filter(|name| owned.contains(name))
                    .map(move |name| (*kind, name.clone()))
            })
            .collect()
    }
}
