// ABOUTME: Shared HTTP client with connection pooling for snapshot delivery
// ABOUTME: Singleton pattern with configurable timeouts initialized at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::OnceLock;
use std::time::Duration;

use health_sync_core::constants::service_names;
use reqwest::{Client, ClientBuilder};

use crate::config::HttpClientConfig;

/// Configured timeout values for the shared client
static CLIENT_TIMEOUTS: OnceLock<HttpClientConfig> = OnceLock::new();

/// Global shared HTTP client with configured timeouts
static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

/// Initialize the shared HTTP client timeout configuration
///
/// Must be called once at startup before the first delivery. If not called,
/// defaults are used (30s timeout, 10s connect timeout). Later calls are ignored.
pub fn initialize_shared_client(config: HttpClientConfig) {
    let _ = CLIENT_TIMEOUTS.set(config);
}

/// Get the shared HTTP client for deliveries
///
/// No timeout is imposed by the sync pipeline itself; these client timeouts
/// surface as transport failures.
pub fn shared_client() -> &'static Client {
    SHARED_CLIENT.get_or_init(|| {
        let config = CLIENT_TIMEOUTS.get().copied().unwrap_or_default();

        ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(format!(
                "{}/{}",
                service_names::HEALTH_SYNC,
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}
