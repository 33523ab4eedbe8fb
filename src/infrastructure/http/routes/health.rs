//! Health routes

use std::sync::Arc;
use warp::Filter;

use crate::infrastructure::adapters::MonitoringAdapter;
use crate::infrastructure::http::handlers::handle_health_request;

pub struct HealthRoutes;

impl HealthRoutes {
    pub fn create_health_route(
        monitoring: Arc<MonitoringAdapter>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        warp::path("health")
            .and(warp::path::end())
            .and(warp::get())
            .and(warp::any().map(move || monitoring.clone()))
            .and_then(handle_health_request)
    }
}
