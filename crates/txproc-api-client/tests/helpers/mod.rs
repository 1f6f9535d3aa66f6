pub mod fixtures;

use std::time::Duration;

use mockito::ServerGuard;
use txproc_api_client::{ApiClient, MonitorOptions, UploadStatusPolicy, WorkflowOptions};
use txproc_core::ClientConfig;

pub const TEST_API_KEY: &str = "K";

/// Config pointing at a mockito server over plain http.
pub fn config_for(server: &ServerGuard) -> ClientConfig {
    let host_with_port = server.host_with_port();
    let (host, port) = host_with_port
        .rsplit_once(':')
        .expect("mockito address has a port");
    ClientConfig {
        api_host: host.to_string(),
        api_port: port.to_string(),
        api_proto: "http".to_string(),
        api_key: TEST_API_KEY.to_string(),
    }
}

pub fn client_for(server: &ServerGuard) -> ApiClient {
    ApiClient::new(config_for(server)).expect("valid test config")
}

/// Config for a local port nothing is listening on.
pub fn unreachable_config() -> ClientConfig {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    ClientConfig {
        api_host: "127.0.0.1".to_string(),
        api_port: port.to_string(),
        api_proto: "http".to_string(),
        api_key: TEST_API_KEY.to_string(),
    }
}

/// Workflow options without the settle wait, polling every few milliseconds.
pub fn fast_options(monitor: bool) -> WorkflowOptions {
    WorkflowOptions {
        settle_delay: Duration::ZERO,
        upload_policy: UploadStatusPolicy::Strict,
        monitor: monitor.then(|| MonitorOptions {
            interval: Duration::from_millis(5),
            max_polls: Some(20),
            timeout: None,
        }),
        ..WorkflowOptions::default()
    }
}
