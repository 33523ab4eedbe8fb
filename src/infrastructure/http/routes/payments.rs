//! Payments routes

use std::sync::Arc;
use warp::Filter;

use crate::application::services::payments_service::PaymentsService;
use crate::config::AppConfig;
use crate::infrastructure::adapters::ApiKeyAuthenticator;
use crate::infrastructure::http::handlers::{
    handle_create_payment, handle_get_payment_status, handle_list_payments,
};
use crate::infrastructure::http::routes::api_key_header;

pub struct PaymentsRoutes;

impl PaymentsRoutes {
    pub fn create_routes(
        config: AppConfig,
        service: Arc<PaymentsService>,
        auth: Arc<ApiKeyAuthenticator>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let create = warp::path("api")
            .and(warp::path("payments"))
            .and(warp::path::end())
            .and(warp::post())
            .and(api_key_header())
            .and(warp::body::content_length_limit(
                config.server.max_request_size as u64,
            ))
            .and(warp::body::json())
            .and(Self::with_auth(auth.clone()))
            .and(Self::with_service(service.clone()))
            .and_then(handle_create_payment);

        let list = warp::path("api")
            .and(warp::path("payments"))
            .and(warp::path::end())
            .and(warp::get())
            .and(api_key_header())
            .and(Self::with_auth(auth.clone()))
            .and(Self::with_service(service.clone()))
            .and_then(handle_list_payments);

        let status = warp::path("api")
            .and(warp::path("payments"))
            .and(warp::path::param::<String>())
            .and(warp::path::end())
            .and(warp::get())
            .and(api_key_header())
            .and(Self::with_auth(auth))
            .and(Self::with_service(service))
            .and_then(handle_get_payment_status);

        create.or(list).or(status)
    }

    fn with_service(
        service: Arc<PaymentsService>,
    ) -> impl Filter<Extract = (Arc<PaymentsService>,), Error = std::convert::Infallible> + Clone
    {
        warp::any().map(move || service.clone())
    }

    fn with_auth(
        auth: Arc<ApiKeyAuthenticator>,
    ) -> impl Filter<Extract = (Arc<ApiKeyAuthenticator>,), Error = std::convert::Infallible> + Clone
    {
        warp::any().map(move || auth.clone())
    }
}
