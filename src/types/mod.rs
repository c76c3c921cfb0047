// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource definitions and cluster inventory types.

pub mod inventory;
pub mod resource;

pub use inventory::{ClusterInventory, OwnedObjectSet};
pub use resource::{ResourceDefinition, ResourceKind};
