// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes access: the cluster seam, its kube-backed implementation and readiness checks.

pub mod client;
pub mod cluster;
pub mod namespaces;
pub mod readiness;

pub use client::KubeCluster;
pub use cluster::ClusterApi;
pub use readiness::{claims_bound, pod_readiness};
