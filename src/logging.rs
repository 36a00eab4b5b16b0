//! # Structured Logging Module
//!
//! Environment-aware structured logging for fan-out runs. Human-readable
//! console output in development and test, JSON lines in production.

use chrono::Utc;
use std::process;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use uuid::Uuid;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// `RUST_LOG` takes precedence over the per-environment level. Safe to call
/// more than once, and tolerant of a subscriber installed by the host.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));

        let registry = tracing_subscriber::registry();
        let initialized = if environment == "production" {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_thread_names(true)
                        .with_filter(filter),
                )
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_names(true)
                        .with_level(true)
                        .with_ansi(true)
                        .with_filter(filter),
                )
                .try_init()
        };

        if initialized.is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        }

        tracing::info!(
            pid = process::id(),
            environment = %environment,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("FANOUT_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for a run lifecycle event
pub fn log_execution_event(
    operation: &str,
    label: &str,
    run_id: Option<Uuid>,
    status: &str,
    details: Option<&str>,
) {
    let run_id = run_id.map(|id| id.to_string());
    tracing::info!(
        operation = %operation,
        label = %label,
        run_id = run_id.as_deref(),
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "📋 EXECUTION_EVENT"
    );
}
