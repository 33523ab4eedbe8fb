//! Webhook routes: inbound ingestion, audit trail, and diagnosis utilities

use std::sync::Arc;
use warp::Filter;

use crate::application::services::ingestion_service::IngestionService;
use crate::application::services::webhook_service::WebhookService;
use crate::config::AppConfig;
use crate::infrastructure::adapters::{ApiKeyAuthenticator, PaymentsStore};
use crate::infrastructure::http::handlers::{
    handle_inbound_payment_update, handle_list_my_webhooks, handle_test_webhook,
    handle_verify_signature,
};
use crate::infrastructure::http::routes::api_key_header;

pub struct WebhooksRoutes;

impl WebhooksRoutes {
    pub fn create_routes(
        config: AppConfig,
        ingestion: Arc<IngestionService>,
        webhooks: Arc<WebhookService>,
        store: Arc<PaymentsStore>,
        auth: Arc<ApiKeyAuthenticator>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let inbound = warp::path("api")
            .and(warp::path("webhooks"))
            .and(warp::path("payment"))
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::content_length_limit(
                config.server.max_request_size as u64,
            ))
            .and(warp::body::bytes())
            .and(Self::with_ingestion(ingestion))
            .and_then(handle_inbound_payment_update);

        let my = warp::path("api")
            .and(warp::path("webhooks"))
            .and(warp::path("my"))
            .and(warp::path::end())
            .and(warp::get())
            .and(api_key_header())
            .and(Self::with_auth(auth.clone()))
            .and(Self::with_store(store))
            .and_then(handle_list_my_webhooks);

        let verify = warp::path("api")
            .and(warp::path("webhooks"))
            .and(warp::path("verify"))
            .and(warp::path::end())
            .and(warp::post())
            .and(api_key_header())
            .and(warp::body::content_length_limit(
                config.server.max_request_size as u64,
            ))
            .and(warp::body::json())
            .and(Self::with_auth(auth.clone()))
            .and(Self::with_webhooks(webhooks.clone()))
            .and_then(handle_verify_signature);

        let test = warp::path("api")
            .and(warp::path("webhooks"))
            .and(warp::path("test"))
            .and(warp::path::end())
            .and(warp::post())
            .and(api_key_header())
            .and(Self::with_auth(auth))
            .and(Self::with_webhooks(webhooks))
            .and_then(handle_test_webhook);

        inbound.or(my).or(verify).or(test)
    }

    fn with_ingestion(
        service: Arc<IngestionService>,
    ) -> impl Filter<Extract = (Arc<IngestionService>,), Error = std::convert::Infallible> + Clone
    {
        warp::any().map(move || service.clone())
    }

    fn with_webhooks(
        service: Arc<WebhookService>,
    ) -> impl Filter<Extract = (Arc<WebhookService>,), Error = std::convert::Infallible> + Clone
    {
        warp::any().map(move || service.clone())
    }

    fn with_store(
        store: Arc<PaymentsStore>,
    ) -> impl Filter<Extract = (Arc<PaymentsStore>,), Error = std::convert::Infallible> + Clone
    {
        warp::any().map(move || store.clone())
    }

    fn with_auth(
        auth: Arc<ApiKeyAuthenticator>,
    ) -> impl Filter<Extract = (Arc<ApiKeyAuthenticator>,), Error = std::convert::Infallible> + Clone
    {
        warp::any().map(move || auth.clone())
    }
}
