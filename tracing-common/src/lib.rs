use std::{collections::HashMap, time::Duration};

use color_eyre::{eyre::WrapErr, Result};
use opentelemetry_otlp::WithExportConfig;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{prelude::*, EnvFilter, Registry};
use tracing_tree::HierarchicalLayer;

/// Starts sentry when `SENTRY_DSN` is set. Keep the guard alive for the life
/// of the process so queued events get flushed on exit.
pub fn setup_sentry() -> Option<sentry::ClientInitGuard> {
    let Ok(dsn) = std::env::var("SENTRY_DSN") else {
        println!("Sentry not configured");

        return None;
    };

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            traces_sample_rate: 0.5,
            ..Default::default()
        },
    ));
    println!("Sentry configured");

    Some(guard)
}

fn default_filter(crate_name: &str) -> String {
    let target = crate_name.replace('-', "_");

    format!("warn,{target}=trace,tower_http=debug")
}

pub fn setup_tracing(crate_name: &str) -> Result<()> {
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter(crate_name));

    let env_filter = EnvFilter::builder()
        .parse(&rust_log)
        .wrap_err_with(|| format!("Couldn't create env filter from {rust_log}"))?;

    let opentelemetry_layer = if let Ok(honeycomb_key) = std::env::var("HONEYCOMB_API_KEY") {
        let mut map = HashMap::<String, String>::new();
        map.insert("x-honeycomb-team".to_string(), honeycomb_key);
        map.insert("x-honeycomb-dataset".to_string(), crate_name.to_string());

        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(
                opentelemetry_otlp::new_exporter()
                    .http()
                    .with_endpoint("https://api.honeycomb.io/v1/traces")
                    .with_timeout(Duration::from_secs(3))
                    .with_headers(map),
            )
            .install_batch(opentelemetry_sdk::runtime::Tokio)
            .wrap_err("Couldn't install the Honeycomb exporter")?;

        let opentelemetry_layer = OpenTelemetryLayer::new(tracer);
        println!("Honeycomb layer configured");

        Some(opentelemetry_layer)
    } else {
        println!("Skipping Honeycomb layer");

        None
    };

    let heirarchical = HierarchicalLayer::default()
        .with_writer(std::io::stdout)
        .with_indent_lines(true)
        .with_indent_amount(2)
        .with_thread_names(true)
        .with_thread_ids(true)
        .with_verbose_exit(true)
        .with_verbose_entry(true)
        .with_targets(true);

    Registry::default()
        .with(heirarchical)
        .with(opentelemetry_layer)
        .with(sentry_tracing::layer())
        .with(env_filter)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_uses_the_crate_target() {
        assert_eq!(
            default_filter("fridge-to-plate"),
            "warn,fridge_to_plate=trace,tower_http=debug"
        );
    }

    #[test]
    fn default_filter_parses() {
        assert!(EnvFilter::builder()
            .parse(default_filter("fridge-to-plate"))
            .is_ok());
    }
}
