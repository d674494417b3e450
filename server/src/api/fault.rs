//! Random fault injection for inbound requests
//!
//! The gate rejects a configurable share of requests with a synthetic 500
//! before they reach any handler, so clients can exercise their retry paths.
//! `/health` is never rejected, and neither is anything once the server has
//! started draining for shutdown.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use super::types::SimulatedFaultResponse;
use crate::config::FaultConfig;

pub const HEALTH_PATH: &str = "/health";

#[derive(Clone)]
pub struct FaultGate {
    config: FaultConfig,
    draining: CancellationToken,
    rng: Arc<Mutex<StdRng>>,
}

impl FaultGate {
    pub fn new(config: FaultConfig, draining: CancellationToken) -> Self {
        Self::with_rng(config, draining, StdRng::from_entropy())
    }

    /// Gate with a caller-supplied generator (deterministic in tests)
    pub fn with_rng(config: FaultConfig, draining: CancellationToken, rng: StdRng) -> Self {
        Self {
            config,
            draining,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    pub fn config(&self) -> &FaultConfig {
        &self.config
    }

    /// Whether requests can currently be rejected at all
    pub fn is_active(&self) -> bool {
        self.config.enabled && !self.draining.is_cancelled()
    }

    /// Decide the fate of one request. Returns the random draw when the
    /// request must be rejected.
    pub fn roll(&self, path: &str) -> Option<f64> {
        if path == HEALTH_PATH || !self.is_active() {
            return None;
        }

        let draw: f64 = {
            let mut rng = self
                .rng
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            rng.gen()
        };

        (draw < self.config.failure_rate).then_some(draw)
    }
}

/// Middleware entry point, installed with `axum::middleware::from_fn_with_state`
pub async fn fault_injection(
    State(gate): State<FaultGate>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if let Some(draw) = gate.roll(&path) {
        let method = request.method().to_string();
        log::warn!("🚨 Simulated error for {} {} (random: {:.3})", method, path, draw);
        return simulated_fault(path, method);
    }

    next.run(request).await
}

fn simulated_fault(path: String, method: String) -> Response {
    let body = SimulatedFaultResponse {
        error: "Internal server error (simulated)".to_string(),
        message: "This is a simulated error to test error handling".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        path,
        method,
    };

    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
