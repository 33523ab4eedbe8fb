//! Metrics handlers for monitoring

use std::sync::Arc;

use warp::Reply;

use crate::infrastructure::adapters::MonitoringAdapter;
use crate::infrastructure::http::responses::ResponseFormatter;

/// Handle Prometheus metrics requests
pub async fn handle_prometheus_request(
    monitoring: Arc<MonitoringAdapter>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let metrics = monitoring.get_prometheus_metrics();
    Ok(warp::reply::with_header(
        warp::reply::with_status(metrics, warp::http::StatusCode::OK),
        "Content-Type",
        "text/plain; version=0.0.4; charset=utf-8",
    ))
}

/// Handle JSON counter snapshot requests
pub async fn handle_metrics_json_request(
    monitoring: Arc<MonitoringAdapter>,
) -> Result<impl Reply, warp::reject::Rejection> {
    Ok(ResponseFormatter::ok(&monitoring.snapshot()))
}
