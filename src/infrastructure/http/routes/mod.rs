//! HTTP routes module

pub mod builder;
pub mod health;
pub mod metrics;
pub mod payments;
pub mod webhooks;

pub use builder::RouteBuilder;
pub use health::HealthRoutes;
pub use metrics::MetricsRoutes;
pub use payments::PaymentsRoutes;
pub use webhooks::WebhooksRoutes;

use warp::Filter;

/// Extract the API key header, defaulting to empty so the authentication
/// adapter reports the missing credential uniformly.
pub fn api_key_header() -> impl Filter<Extract = (String,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("x-api-key").map(|key: Option<String>| key.unwrap_or_default())
}
