//! Route builder module
//!
//! This module contains the main route builder that orchestrates the
//! creation of all application routes.

use warp::Filter;

use crate::infrastructure::http::routes::{
    HealthRoutes, MetricsRoutes, PaymentsRoutes, WebhooksRoutes,
};
use crate::infrastructure::http::server::AppContext;

/// Route builder that orchestrates the creation of all application routes
pub struct RouteBuilder;

impl RouteBuilder {
    /// Build all application routes
    pub fn build_routes(
        context: &AppContext,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let payments_route = PaymentsRoutes::create_routes(
            (*context.config).clone(),
            context.payments_service.clone(),
            context.authenticator.clone(),
        );

        let webhooks_route = WebhooksRoutes::create_routes(
            (*context.config).clone(),
            context.ingestion_service.clone(),
            context.webhook_service.clone(),
            context.payments_store.clone(),
            context.authenticator.clone(),
        );

        let health_route = HealthRoutes::create_health_route(context.monitoring.clone());
        let metrics_json_route = MetricsRoutes::create_json_route(context.monitoring.clone());
        let prometheus_route = MetricsRoutes::create_prometheus_route(context.monitoring.clone());

        // More specific paths first: /metrics/json before /metrics
        webhooks_route
            .or(payments_route)
            .or(health_route)
            .or(metrics_json_route)
            .or(prometheus_route)
    }
}
