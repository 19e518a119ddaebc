//! Common test utilities and helpers

pub mod fixtures;

use cleanly::api::BackendClient;
use cleanly::models::Config;
use wiremock::MockServer;

/// Client pointed at a mock backend
pub fn client_for(server: &MockServer) -> BackendClient {
    BackendClient::new(&Config::for_backend(&server.uri())).expect("mock server uri is a valid base url")
}

/// Logging utilities for tests
pub mod logging {
    use std::sync::Once;
    use tracing::{debug, info};

    static INIT: Once = Once::new();

    /// Initialize test logging
    pub fn init_test_logging() {
        INIT.call_once(|| {
            // Another subscriber may already be installed by the test harness
            let _ = tracing::subscriber::set_global_default(
                tracing_subscriber::fmt()
                    .with_env_filter("cleanly=debug,wiremock=info")
                    .with_test_writer()
                    .finish(),
            );
        });
    }

    /// Log test step
    pub fn log_test_step(step: &str) {
        info!("🧪 Test Step: {}", step);
    }

    /// Log test data
    pub fn log_test_data<T: std::fmt::Debug>(label: &str, data: &T) {
        debug!("📊 {}: {:?}", label, data);
    }
}
