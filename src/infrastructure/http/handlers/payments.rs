//! Payments HTTP handlers

use std::sync::Arc;

use validator::Validate;
use warp::reply::{Json, WithStatus};

use crate::application::services::payments_service::{CreatePaymentRequest, PaymentsService};
use crate::infrastructure::adapters::ApiKeyAuthenticator;
use crate::infrastructure::http::models::{is_valid_payment_id, PaymentStatusResponse};
use crate::infrastructure::http::responses::ResponseFormatter;
use crate::shared::error::AppError;
use crate::shared::logging::LoggingUtils;

pub async fn handle_create_payment(
    api_key: String,
    body: CreatePaymentRequest,
    auth: Arc<ApiKeyAuthenticator>,
    service: Arc<PaymentsService>,
) -> Result<WithStatus<Json>, warp::reject::Rejection> {
    let merchant_id = match auth.resolve(&api_key).await {
        Ok(id) => id,
        Err(e) => return Ok(ResponseFormatter::from_app_error(&e)),
    };

    if let Err(e) = body.validate() {
        LoggingUtils::log_rejected_request("schema_validation", &e.to_string());
        return Ok(ResponseFormatter::from_app_error(&AppError::Validation(
            e.to_string(),
        )));
    }

    match service.create_payment(&merchant_id, body).await {
        Ok(payment) => Ok(ResponseFormatter::created(&payment)),
        Err(e) => Ok(ResponseFormatter::from_app_error(&e)),
    }
}

pub async fn handle_get_payment_status(
    payment_id: String,
    api_key: String,
    auth: Arc<ApiKeyAuthenticator>,
    service: Arc<PaymentsService>,
) -> Result<WithStatus<Json>, warp::reject::Rejection> {
    let merchant_id = match auth.resolve(&api_key).await {
        Ok(id) => id,
        Err(e) => return Ok(ResponseFormatter::from_app_error(&e)),
    };

    if !is_valid_payment_id(&payment_id) {
        return Ok(ResponseFormatter::from_app_error(&AppError::Validation(
            "invalid payment id".to_string(),
        )));
    }

    match service.get_payment(&payment_id).await {
        Ok(payment) => {
            if payment.merchant_id != merchant_id {
                return Ok(ResponseFormatter::from_app_error(&AppError::AccessDenied(
                    "payment belongs to another merchant".to_string(),
                )));
            }
            Ok(ResponseFormatter::ok(&PaymentStatusResponse::from(&payment)))
        }
        Err(e) => Ok(ResponseFormatter::from_app_error(&e)),
    }
}

pub async fn handle_list_payments(
    api_key: String,
    auth: Arc<ApiKeyAuthenticator>,
    service: Arc<PaymentsService>,
) -> Result<WithStatus<Json>, warp::reject::Rejection> {
    let merchant_id = match auth.resolve(&api_key).await {
        Ok(id) => id,
        Err(e) => return Ok(ResponseFormatter::from_app_error(&e)),
    };

    match service.list_by_merchant(&merchant_id).await {
        Ok(payments) => Ok(ResponseFormatter::ok(&payments)),
        Err(e) => Ok(ResponseFormatter::from_app_error(&e)),
    }
}
