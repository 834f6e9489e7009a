use envmon_common::MonitorConfig;

/// Configuration baked in at build time. Secrets come from the build
/// environment so they never land in the repository.
pub fn compiled_config() -> MonitorConfig {
    let mut config = MonitorConfig::default();

    config.network.wifi_ssid = option_env!("WIFI_SSID").unwrap_or("CHANGE_ME").to_string();
    config.network.wifi_pass = option_env!("WIFI_PASS").unwrap_or("CHANGE_ME").to_string();
    if let Some(host) = option_env!("INGEST_HOST") {
        config.network.ingest_host = host.to_string();
    }
    config.network.api_key = option_env!("INGEST_API_KEY").unwrap_or_default().to_string();

    config
}
