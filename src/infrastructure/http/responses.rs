//! HTTP responses module
//!
//! This module contains HTTP response formatting utilities.

use serde::Serialize;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};

use crate::infrastructure::http::models::ErrorBody;
use crate::shared::error::AppError;

/// Response formatter for HTTP responses
pub struct ResponseFormatter;

impl ResponseFormatter {
    /// Format a successful JSON response
    pub fn ok<T: Serialize>(body: &T) -> WithStatus<Json> {
        warp::reply::with_status(warp::reply::json(body), StatusCode::OK)
    }

    /// Format a resource-created JSON response
    pub fn created<T: Serialize>(body: &T) -> WithStatus<Json> {
        warp::reply::with_status(warp::reply::json(body), StatusCode::CREATED)
    }

    /// Format an application error with its mapped status code
    pub fn from_app_error(error: &AppError) -> WithStatus<Json> {
        warp::reply::with_status(
            warp::reply::json(&ErrorBody::from_error(error)),
            error.http_status_code(),
        )
    }
}
