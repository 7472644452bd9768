use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global tracing subscriber.
///
/// - `RUST_LOG` selects the filter (default `info`).
/// - `LOG_FORMAT=json` switches to flattened JSON lines.
///
/// Later calls are ignored, which keeps tests that share a process safe.
pub fn init_telemetry(service_name: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");

    let registry = Registry::default().with(env_filter);
    let installed = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    match installed {
        Ok(()) => tracing::info!(service = service_name, json, "Telemetry initialised"),
        Err(e) => eprintln!("Tracing subscriber already installed for {service_name}: {e}"),
    }
}
