//! `/health/ready` and `/health/live` for process supervisors.
//!
//! The server moves through three phases: starting, serving and draining.
//! Readiness holds only while serving; liveness holds until draining begins.

use std::sync::atomic::{AtomicU8, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;
use utoipa::ToSchema;

/// Lifecycle phase reported by the health endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Starting,
    Serving,
    Draining,
}

impl Phase {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Starting,
            1 => Self::Serving,
            _ => Self::Draining,
        }
    }

    const fn as_raw(self) -> u8 {
        match self {
            Self::Starting => 0,
            Self::Serving => 1,
            Self::Draining => 2,
        }
    }
}

/// Current [`Phase`], shared by `main` and the health handlers.
#[derive(Debug)]
pub struct HealthState(AtomicU8);

impl Default for HealthState {
    fn default() -> Self {
        Self(AtomicU8::new(Phase::Starting.as_raw()))
    }
}

impl HealthState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        Phase::from_raw(self.0.load(Ordering::Acquire))
    }

    /// Enter [`Phase::Serving`] once the listener is bound. Has no effect
    /// after draining has begun.
    pub fn mark_ready(&self) {
        let _already_draining = self.0.compare_exchange(
            Phase::Starting.as_raw(),
            Phase::Serving.as_raw(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    pub fn mark_unhealthy(&self) {
        self.0.store(Phase::Draining.as_raw(), Ordering::Release);
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.phase() == Phase::Serving
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.phase() != Phase::Draining
    }
}

/// Body of both health responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthReport {
    pub phase: Phase,
}

fn report(healthy: bool, phase: Phase) -> HttpResponse {
    let mut builder = if healthy {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    builder
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(HealthReport { phase })
}

/// 200 while serving; 503 while starting or draining.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Accepting traffic", body = HealthReport),
        (status = 503, description = "Starting up or draining", body = HealthReport)
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    let phase = state.phase();
    report(phase == Phase::Serving, phase)
}

/// 200 until shutdown begins.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Process is alive", body = HealthReport),
        (status = 503, description = "Draining for shutdown", body = HealthReport)
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    let phase = state.phase();
    report(phase != Phase::Draining, phase)
}
