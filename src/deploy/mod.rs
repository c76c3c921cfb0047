// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod cancel;
pub mod credentials;
pub mod env_file;
pub mod forward;
pub mod images;
pub mod manifest;
pub mod orchestrator;
pub mod poller;
pub mod source;
pub mod teardown;

pub use cancel::{cancellation, CancelHandle, CancelSignal};
pub use forward::{forward, KubectlForwarder, PortForwarder};
pub use images::{CliImageBuilder, ImageBuilder};
pub use orchestrator::{DeployReport, DeployState, Orchestrator};
pub use source::{GitSubmodules, SourceSync};
pub use teardown::TeardownCoordinator;
