//! Metrics routes

use std::sync::Arc;
use warp::Filter;

use crate::infrastructure::adapters::MonitoringAdapter;
use crate::infrastructure::http::handlers::{
    handle_metrics_json_request, handle_prometheus_request,
};

pub struct MetricsRoutes;

impl MetricsRoutes {
    pub fn create_prometheus_route(
        monitoring: Arc<MonitoringAdapter>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        warp::path("metrics")
            .and(warp::path::end())
            .and(warp::get())
            .and(warp::any().map(move || monitoring.clone()))
            .and_then(handle_prometheus_request)
    }

    pub fn create_json_route(
        monitoring: Arc<MonitoringAdapter>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        warp::path("metrics")
            .and(warp::path("json"))
            .and(warp::path::end())
            .and(warp::get())
            .and(warp::any().map(move || monitoring.clone()))
            .and_then(handle_metrics_json_request)
    }
}
