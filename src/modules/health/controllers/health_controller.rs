use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::config::CaptureMode;

/// Static facts about the running service, reported by the liveness probe
#[derive(Debug, Clone)]
pub struct HealthState {
    /// "mysql" or "memory"
    pub store: &'static str,
    pub gateway: &'static str,
    pub capture_mode: CaptureMode,
}

/// Health check response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    pub store: String,
    pub gateway: String,
    pub capture_mode: String,
}

/// GET /health - Liveness probe
/// Does not call the gateway or the database
pub async fn health_check(state: web::Data<HealthState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        checks: HealthChecks {
            store: state.store.to_string(),
            gateway: state.gateway.to_string(),
            capture_mode: state.capture_mode.to_string(),
        },
    })
}

/// Configure health check routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
