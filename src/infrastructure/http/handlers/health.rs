//! Health check handler module

use std::sync::Arc;

use warp::reply::{Json, WithStatus};

use crate::domain::health::{HealthResponse, HealthStatus};
use crate::infrastructure::adapters::MonitoringAdapter;

/// Handle health check requests
pub async fn handle_health_request(
    monitoring: Arc<MonitoringAdapter>,
) -> Result<WithStatus<Json>, warp::reject::Rejection> {
    let snapshot = monitoring.snapshot();
    let response = HealthResponse::new(
        HealthStatus::Healthy,
        serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "uptime_seconds": snapshot.uptime_seconds,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }),
    );

    let status = warp::http::StatusCode::from_u16(response.http_status_code())
        .unwrap_or(warp::http::StatusCode::OK);
    Ok(warp::reply::with_status(warp::reply::json(&response), status))
}
