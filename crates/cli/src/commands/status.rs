//! `parley status` — Show configured endpoints and their health.

use std::time::Duration;

use parley_client::HttpAnsweringService;
use parley_config::{AppConfig, EndpointConfig};
use parley_core::error::ServiceError;
use parley_core::service::HealthReport;

const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("💬 Parley Status");
    println!("================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Query path:   {}", config.service.query_path);
    println!("  Health path:  {}", config.service.health_path);
    println!("  Id prefix:    {}", config.widget.conversation_prefix);
    println!();

    for (label, endpoint) in [("primary", &config.primary), ("fallback", &config.fallback)] {
        report_endpoint(label, endpoint, &config).await;
    }

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `parley config init` to create one");
    }

    Ok(())
}

async fn report_endpoint(label: &str, endpoint: &EndpointConfig, config: &AppConfig) {
    let timeout = match endpoint.timeout_secs {
        Some(secs) => format!("{secs}s"),
        None => "none".into(),
    };
    let service = match HttpAnsweringService::from_config(label, endpoint, &config.service) {
        Ok(service) => service,
        Err(e) => {
            println!("  {label:<9} {} (timeout: {timeout})", endpoint.url);
            println!("            ❌ {e}");
            return;
        }
    };
    println!("  {label:<9} {} (timeout: {timeout})", service.base_url());

    match tokio::time::timeout(HEALTH_TIMEOUT, service.health_report()).await {
        Err(_) => println!("            ❌ no answer within {}s", HEALTH_TIMEOUT.as_secs()),
        Ok(result) => print_health(result),
    }
}

fn print_health(result: Result<HealthReport, ServiceError>) {
    match result {
        Ok(report) if report.is_healthy() => {
            let store = if report.vector_store_loaded { "loaded" } else { "not loaded" };
            println!("            ✅ {} (vector store {store})", report.message);
        }
        Ok(report) => println!("            ⚠️  {}: {}", report.status, report.message),
        Err(e) => println!("            ❌ {e}"),
    }
}
