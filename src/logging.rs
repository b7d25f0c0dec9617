//! Structured logging for the interception engine.
//!
//! Helper functions keep field names consistent across modules. Nothing is
//! printed unless the embedding test binary installs a subscriber, e.g. via
//! [`init`].

use crate::runtime::{ObjectId, SymbolKey};
use std::fmt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable switching [`init`] to JSON output
pub const JSON_ENV_VAR: &str = "INTERPOSE_LOG_JSON";

/// Install a stderr subscriber filtered by `RUST_LOG`, falling back to
/// `interpose=<level>`.
///
/// Returns `false` if a global subscriber was already set, which makes
/// repeated calls from several tests harmless.
pub fn init(level: &str, json: bool) -> bool {
    let fallback_filter = format!("interpose={}", level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| fallback_filter.into());
    let use_json = json || std::env::var(JSON_ENV_VAR).is_ok();

    if use_json {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .try_init()
            .is_ok()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .is_ok()
    }
}

/// Log a class-level or free function mock being installed.
pub fn log_mock_installed(key: &SymbolKey, behavior: &str) {
    tracing::debug!(symbol = %key, behavior, "Mock installed");
}

/// Log an object-level mock being installed.
pub fn log_object_mock_installed(key: &SymbolKey, object: ObjectId, behavior: &str) {
    tracing::debug!(symbol = %key, object = %object, behavior, "Object mock installed");
}

pub fn log_mock_removed(key: &SymbolKey, calls: usize) {
    tracing::debug!(symbol = %key, calls, "Mock removed");
}

/// Log a call routed to a substitute.
pub fn log_dispatch(key: &SymbolKey, object: Option<ObjectId>, behavior: &str) {
    match object {
        Some(object) => tracing::trace!(symbol = %key, object = %object, behavior, "Dispatching call"),
        None => tracing::trace!(symbol = %key, behavior, "Dispatching static call"),
    }
}

pub fn log_pass_through(key: &SymbolKey) {
    tracing::trace!(symbol = %key, "No mock applies, passing through");
}

/// Log a registry prune pass.
pub fn log_registry_pruned(before: usize, after: usize) {
    tracing::debug!(before, after, "Pruned deactivated mocks from registry");
}

/// Log suite teardown.
pub fn log_deactivate_all(count: usize) {
    tracing::info!(count, "Deactivating all registered mocks");
}

/// Log a scoped handle that failed to deactivate on drop.
pub fn log_scoped_deactivate_failed<E: fmt::Display>(error: E) {
    tracing::warn!(error = %error, "Failed to deactivate scoped mock");
}

pub fn log_config_fallback<E: fmt::Display>(error: E) {
    tracing::warn!(error = %error, "Failed to load config, using defaults");
}
