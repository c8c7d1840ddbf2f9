// src/errors.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Email,
    Sms,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Email => f.write_str("Email"),
            Channel::Sms => f.write_str("SMS"),
        }
    }
}

/// Failures talking to the user store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("More than one user matches {column}")]
    MultipleRows { column: &'static str },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Failures handing a code to a delivery provider.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider rejected the request with {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("{0}")]
    MissingField(&'static str),

    #[error("User not found")]
    UserNotFound,

    #[error("Database query failed: {0}")]
    Lookup(#[source] StoreError),

    #[error("Failed to save OTP: {0}")]
    Persist(#[source] StoreError),

    #[error("{channel} sending failed: {source}")]
    Dispatch {
        channel: Channel,
        #[source]
        source: DeliveryError,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidBody(_) | AppError::MissingField(_) => StatusCode::BAD_REQUEST,
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::Lookup(_)
            | AppError::Persist(_)
            | AppError::Dispatch { .. }
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller. Server-side detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::InvalidBody(_) => "Invalid request body".to_string(),
            AppError::MissingField(message) => message.to_string(),
            AppError::UserNotFound => "User not found".to_string(),
            AppError::Lookup(_) => "Database query failed".to_string(),
            AppError::Persist(_) => "Failed to save OTP".to_string(),
            AppError::Dispatch { channel, .. } => format!("{} sending failed", channel),
            AppError::Internal(_) => "Internal Server Error".to_string(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }

        let body = Json(json!({ "error": self.public_message() }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
