//! Webhook HTTP handlers: inbound ingestion, audit trail listing, and the
//! merchant self-diagnosis utilities.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;
use warp::reply::{Json, WithStatus};

use crate::application::services::ingestion_service::IngestionService;
use crate::application::services::webhook_service::WebhookService;
use crate::infrastructure::adapters::{ApiKeyAuthenticator, PaymentsStore};
use crate::infrastructure::http::models::{
    VerifySignatureRequest, VerifySignatureResponse, WebhookLogSummary,
};
use crate::infrastructure::http::responses::ResponseFormatter;
use crate::shared::error::AppError;

/// Inbound status update pushed by the upstream processor.
pub async fn handle_inbound_payment_update(
    body: bytes::Bytes,
    service: Arc<IngestionService>,
) -> Result<WithStatus<Json>, warp::reject::Rejection> {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            return Ok(ResponseFormatter::from_app_error(&AppError::Validation(
                format!("invalid JSON body: {}", e),
            )))
        }
    };

    match service.ingest(&value).await {
        Ok(payment) => {
            info!(payment_id = %payment.id, "Webhook received");
            Ok(ResponseFormatter::ok(&serde_json::json!({
                "message": "Webhook processed successfully"
            })))
        }
        Err(e) => Ok(ResponseFormatter::from_app_error(&e)),
    }
}

/// Webhook audit trail for the authenticated merchant.
pub async fn handle_list_my_webhooks(
    api_key: String,
    auth: Arc<ApiKeyAuthenticator>,
    store: Arc<PaymentsStore>,
) -> Result<WithStatus<Json>, warp::reject::Rejection> {
    let merchant_id = match auth.resolve(&api_key).await {
        Ok(id) => id,
        Err(e) => return Ok(ResponseFormatter::from_app_error(&e)),
    };

    match store.list_webhook_logs_by_merchant(&merchant_id).await {
        Ok(logs) => {
            let summaries: Vec<WebhookLogSummary> =
                logs.iter().map(WebhookLogSummary::from).collect();
            Ok(ResponseFormatter::ok(&summaries))
        }
        Err(e) => Ok(ResponseFormatter::from_app_error(&e)),
    }
}

/// Verify a webhook signature against the process secret.
pub async fn handle_verify_signature(
    api_key: String,
    body: VerifySignatureRequest,
    auth: Arc<ApiKeyAuthenticator>,
    service: Arc<WebhookService>,
) -> Result<WithStatus<Json>, warp::reject::Rejection> {
    if let Err(e) = auth.resolve(&api_key).await {
        return Ok(ResponseFormatter::from_app_error(&e));
    }

    if body.signature.is_empty() {
        return Ok(ResponseFormatter::from_app_error(&AppError::Validation(
            "Missing payload or signature".to_string(),
        )));
    }

    let payload_string = match &body.payload {
        Value::String(s) => s.clone(),
        Value::Null => {
            return Ok(ResponseFormatter::from_app_error(&AppError::Validation(
                "Missing payload or signature".to_string(),
            )))
        }
        other => match serde_json::to_string(other) {
            Ok(s) => s,
            Err(e) => return Ok(ResponseFormatter::from_app_error(&AppError::Json(e.to_string()))),
        },
    };

    let is_valid = service.verify_signature(&payload_string, &body.signature);
    Ok(ResponseFormatter::ok(&VerifySignatureResponse {
        is_valid,
        message: if is_valid {
            "Signature is valid".to_string()
        } else {
            "Signature is invalid".to_string()
        },
    }))
}

/// Generate a signed sample payload for integration testing.
pub async fn handle_test_webhook(
    api_key: String,
    auth: Arc<ApiKeyAuthenticator>,
    service: Arc<WebhookService>,
) -> Result<WithStatus<Json>, warp::reject::Rejection> {
    let merchant_id = match auth.resolve(&api_key).await {
        Ok(id) => id,
        Err(e) => return Ok(ResponseFormatter::from_app_error(&e)),
    };

    match service.build_test_payload(&merchant_id) {
        Ok(payload) => {
            info!(merchant_id = %merchant_id, "Test webhook generated");
            Ok(ResponseFormatter::ok(&payload))
        }
        Err(e) => Ok(ResponseFormatter::from_app_error(&e)),
    }
}
