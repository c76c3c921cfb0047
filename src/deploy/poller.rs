// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Exponential-backoff readiness polling.

use crate::constants::readiness::{CEILING_SECS, INITIAL_DELAY_SECS};
use crate::deploy::cancel::CancelSignal;
use crate::error::{DeployError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

/// Outcome of a single readiness check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    NotReady,
    /// The watched object does not exist (yet)
    Unknown,
}

/// Delay schedule: starts at `initial`, doubles after every failed check,
/// and gives up once it exceeds `ceiling`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub ceiling: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(INITIAL_DELAY_SECS),
            ceiling: Duration::from_secs(CEILING_SECS),
        }
    }
}

impl Backoff {
    pub fn with_ceiling(ceiling: Duration) -> Self {
        Self {
            ceiling,
            ..Self::default()
        }
    }
}

/// What a successful wait cost
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollStats {
    pub checks: u32,
    /// Every sleep taken between checks, in order
    pub delays: Vec<Duration>,
}

impl PollStats {
    pub fn waited(&self) -> Duration {
        self.delays.iter().sum()
    }
}

pub struct ReadinessPoller {
    backoff: Backoff,
    cancel: CancelSignal,
}

impl ReadinessPoller {
    pub fn new(backoff: Backoff, cancel: CancelSignal) -> Self {
        Self { backoff, cancel }
    }

    /// Block until `check` reports ready.
    ///
    /// Fails with `ReadinessTimeout` once the delay exceeds the ceiling, and
    /// with `Cancelled` as soon as the cancel signal fires.
    pub async fn wait_until_ready<F, Fut>(&self, target: &str, mut check: F) -> Result<PollStats>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Readiness>,
    {
        let mut delay = self.backoff.initial;
        let mut stats = PollStats::default();

        loop {
            self.cancel.check()?;

            stats.checks += 1;
            if check().await == Readiness::Ready {
                info!("{} ready after {:?}", target, stats.waited());
                return Ok(stats);
            }

            if delay > self.backoff.ceiling {
                error!("{} took too long to initialise, giving up", target);
                return Err(DeployError::ReadinessTimeout {
                    target: target.to_string(),
                    waited: stats.waited(),
                });
            }

            tokio::select! {
                _ = sleep(delay) => {}
                _ = self.cancel.cancelled() => return Err(DeployError::Cancelled),
            }
            stats.delays.push(delay);
            delay *= 2;
            info!("polling {}...", target);
        }
    }
}
