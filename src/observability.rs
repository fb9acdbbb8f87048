//! Tracing setup and auth operation metrics.

use once_cell::sync::Lazy;
use prometheus::{opts, Encoder, IntCounterVec, Registry, TextEncoder};

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// Auth operations by operation name and outcome (`ok` / error code).
pub static AUTH_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        opts!("auth_attempts_total", "Auth gateway operations"),
        &["operation", "outcome"],
    )
    .unwrap();
    REGISTRY.register(Box::new(counter.clone())).ok();
    counter
});

/// Initialize tracing subscriber with env filter
pub fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();
}

/// Return metrics as text/plain for Prometheus
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    let mf = REGISTRY.gather();
    encoder.encode(&mf, &mut buffer).ok();
    String::from_utf8(buffer).unwrap_or_default()
}
