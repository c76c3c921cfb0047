// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Field manager name used for server-side apply
pub const MANAGER_NAME: &str = "stackup";

/// Default namespace the stack is deployed into
pub const DEFAULT_NAMESPACE: &str = "cai";

/// Cluster objects this tool creates and is allowed to delete
pub const DEFAULT_OWNED_OBJECTS: &[&str] = &[
    "web-service",
    "api-service",
    "devops-test-api",
    "devops-test-web",
    "mysql-pv-claim",
    "mysql-pv",
    "mysql-service",
    "redis-service",
    "redis",
    "mysql",
    "cai-ingress",
    "cai-secrets",
];

/// Generated database credential
pub mod credential {
    pub const LENGTH: usize = 20;
    /// Name of the secret object holding the credential
    pub const SECRET_NAME: &str = "cai-secrets";
    /// Key inside the secret's data map
    pub const SECRET_KEY: &str = "root-password";
}

/// Manifest files, relative to the project root, in the order they are applied
pub mod manifests {
    pub const SECRET: &str = "secret.yaml";
    pub const PERSISTENCE: &str = "persistence.yaml";
    pub const DATABASE: &str = "deployment.yaml";
    pub const DEPENDENT: &str = "api-deployment.yaml";
    pub const EXPOSURE: &str = "service.yaml";
}

/// Build definitions are discovered by this file name prefix
pub const BUILD_FILE_PREFIX: &str = "Dockerfile.";

/// Readiness polling configuration
pub mod readiness {
    /// Initial polling delay in seconds
    pub const INITIAL_DELAY_SECS: u64 = 2;
    /// Polling gives up once the delay exceeds this many seconds
    pub const CEILING_SECS: u64 = 256;
}

/// Environment files patched with service addresses and the credential
pub mod env_files {
    pub const API: &str = "devops-test-api/.env";
    pub const API_OVERRIDES: &[(&str, &str)] = &[
        ("DB_HOST", "mysql-service"),
        ("REDIS_HOST", "redis-service"),
        ("DB_USERNAME", "root"),
        ("APP_URL", "http://api-service"),
    ];
    pub const API_CREDENTIAL_KEY: &str = "DB_PASSWORD";

    pub const WEB: &str = "devops-test-web/.env";
    pub const WEB_OVERRIDES: &[(&str, &str)] = &[
        ("REDIS_HOST", "redis-service"),
        ("APP_URL", "http://web-service"),
        ("API_APP_URL", "http://api-service"),
    ];
}

/// Log file written next to console output
pub const LOG_FILE_NAME: &str = "stackup.log";
