// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Readiness checks over live pod and claim state

use crate::deploy::poller::Readiness;
use k8s_openapi::api::core::v1::{PersistentVolumeClaim, Pod};
use kube::ResourceExt;

/// Readiness of the first pod matched by a label selector.
///
/// No matching pod yet is `Unknown`: the workload may not be scheduled.
pub fn pod_readiness(pods: &[Pod]) -> Readiness {
    let Some(pod) = pods.first() else {
        return Readiness::Unknown;
    };

    let ready = pod
        .status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .is_some_and(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == "Ready" && c.status == "True")
        });

    if ready {
        Readiness::Ready
    } else {
        Readiness::NotReady
    }
}

/// Readiness of a set of claims: every expected claim must be live and `Bound`.
pub fn claims_bound(claims: &[PersistentVolumeClaim], expected: &[String]) -> Readiness {
    let mut all_bound = true;

    for name in expected {
        let Some(claim) = claims.iter().find(|c| c.name_any() == *name) else {
            return Readiness::Unknown;
        };
        let phase = claim.status.as_ref().and_then(|s| s.phase.as_deref());
        if phase != Some("Bound") {
            all_bound = false;
        }
    }

    if all_bound {
        Readiness::Ready
    } else {
        Readiness::NotReady
    }
}
