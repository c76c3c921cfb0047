// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use clap::{Parser, ValueEnum};

/// A step requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Action {
    /// Tear down owned objects
    Clean,
    /// Build images and roll out the stack
    Deploy,
    /// Forward a local port to the web tier
    Forward,
}

#[derive(Debug, Parser)]
#[command(
    name = "stackup",
    about = "Deploy a multi-tier stack into Kubernetes",
    disable_version_flag = true
)]
pub struct Cli {
    /// Actions to run; always executed as clean, deploy, forward
    #[arg(value_enum, ignore_case = true)]
    pub actions: Vec<Action>,
}

impl Cli {
    /// Requested actions without duplicates, in execution order
    pub fn ordered_actions(&self) -> Vec<Action> {
        let mut actions = self.actions.clone();
        actions.sort();
        actions.dedup();
        actions
    }
}
