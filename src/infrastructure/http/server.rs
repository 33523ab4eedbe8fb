//! HTTP server implementation
//!
//! Wires stores, services, and routes together and runs the warp server.
//! TLS, compression, and CORS are expected to be handled by a reverse
//! proxy in front of this service.

use std::sync::Arc;

use redis::aio::ConnectionManager;
use tracing::{info, instrument};
use warp::{Filter, Reply};

use crate::application::services::{
    IngestionService, MerchantsService, PaymentsService, SweeperService, WebhookService,
};
use crate::config::AppConfig;
use crate::infrastructure::adapters::{
    ApiKeyAuthenticator, HttpWebhookSender, MerchantsStore, MonitoringAdapter, PaymentsStore,
    WebhookSender,
};
use crate::infrastructure::http::routes::RouteBuilder;
use crate::shared::error::{AppError, AppResult};

/// Shared wiring for stores, adapters, and services.
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub payments_store: Arc<PaymentsStore>,
    pub merchants_store: Arc<MerchantsStore>,
    pub monitoring: Arc<MonitoringAdapter>,
    pub authenticator: Arc<ApiKeyAuthenticator>,
    pub webhook_service: Arc<WebhookService>,
    pub payments_service: Arc<PaymentsService>,
    pub ingestion_service: Arc<IngestionService>,
    pub sweeper_service: Arc<SweeperService>,
    pub merchants_service: Arc<MerchantsService>,
}

impl AppContext {
    /// Build the full context with the production HTTP sender, connecting
    /// the Redis mirror when configured.
    pub async fn new(config: AppConfig) -> AppResult<Self> {
        let redis = if config.store.redis_enabled {
            let client = redis::Client::open(config.store.redis_url.as_str())
                .map_err(|e| AppError::Config(format!("Invalid Redis URL: {}", e)))?;
            let manager = ConnectionManager::new(client)
                .await
                .map_err(|e| AppError::Config(format!("Redis connection failed: {}", e)))?;
            Some(Arc::new(manager))
        } else {
            None
        };

        let sender: Arc<dyn WebhookSender> = Arc::new(HttpWebhookSender::new(
            config.webhook.request_timeout_seconds,
        )?);

        Ok(Self::with_sender(config, redis, sender))
    }

    /// Build the context around an explicit sender implementation.
    pub fn with_sender(
        config: AppConfig,
        redis: Option<Arc<ConnectionManager>>,
        sender: Arc<dyn WebhookSender>,
    ) -> Self {
        let config = Arc::new(config);
        let record_ttl = config.store.record_ttl_seconds;

        let payments_store = Arc::new(PaymentsStore::new(redis.clone(), record_ttl));
        let merchants_store = Arc::new(MerchantsStore::new(redis, record_ttl));
        let monitoring = Arc::new(MonitoringAdapter::new());
        let authenticator = Arc::new(ApiKeyAuthenticator::new(
            config.clone(),
            merchants_store.clone(),
        ));

        let webhook_service = Arc::new(WebhookService::new(
            config.clone(),
            payments_store.clone(),
            merchants_store.clone(),
            sender,
            monitoring.clone(),
        ));
        let payments_service = Arc::new(PaymentsService::new(
            config.clone(),
            payments_store.clone(),
            webhook_service.clone(),
            monitoring.clone(),
        ));
        let ingestion_service = Arc::new(IngestionService::new(
            payments_store.clone(),
            payments_service.clone(),
        ));
        let sweeper_service = Arc::new(SweeperService::new(
            payments_store.clone(),
            payments_service.clone(),
        ));
        let merchants_service = Arc::new(MerchantsService::new(
            config.clone(),
            merchants_store.clone(),
        ));

        Self {
            config,
            payments_store,
            merchants_store,
            monitoring,
            authenticator,
            webhook_service,
            payments_service,
            ingestion_service,
            sweeper_service,
            merchants_service,
        }
    }
}

/// HTTP server for the payment gateway
pub struct HttpServer {
    context: AppContext,
}

impl HttpServer {
    /// Create a new server instance
    pub async fn new(config: AppConfig) -> AppResult<Self> {
        let context = AppContext::new(config).await?;
        Ok(Self { context })
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &AppConfig {
        &self.context.config
    }

    /// Run the HTTP server
    #[instrument(skip(self))]
    pub async fn run(self) -> AppResult<()> {
        let addr = self.context.config.server_address();
        let addr: std::net::SocketAddr = addr
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid server address: {}", e)))?;

        if self.context.config.sweeper.enabled {
            let interval = self.context.config.sweeper.interval_seconds;
            self.context.sweeper_service.clone().spawn(interval);
            info!(interval_seconds = %interval, "Expiry sweeper started");
        }

        let routes = RouteBuilder::build_routes(&self.context);

        info!("Starting HTTP server (reverse proxy mode)");
        warp::serve(routes).run(addr).await;

        Ok(())
    }

    /// Build the route tree without binding a socket
    pub fn create_routes(
        &self,
    ) -> impl Filter<Extract = impl Reply, Error = warp::Rejection> + Clone {
        RouteBuilder::build_routes(&self.context)
    }
}
