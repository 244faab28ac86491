//! HTTP client utilities
//!
//! reqwest picks up HTTP_PROXY / HTTPS_PROXY / NO_PROXY from the environment
//! on its own, so only timeouts and identification are configured here.

use crate::error::AppError;
use reqwest::Client;
use std::time::Duration;

/// Default per-request timeout for calls to the table store
pub const STORE_TIMEOUT: Duration = Duration::from_secs(30);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a reqwest Client with the given overall request timeout
pub fn client_with_timeout(timeout: Duration) -> Result<Client, AppError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .user_agent(concat!("tablesearch/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds() {
        assert!(client_with_timeout(STORE_TIMEOUT).is_ok());
        assert!(client_with_timeout(Duration::from_millis(50)).is_ok());
    }
}
