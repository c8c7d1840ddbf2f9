use axum::{body::Bytes, extract::State, Json};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::dtos::otp_dtos::{EmailOtpRequest, OtpSentResponse, SmsOtpRequest};
use crate::errors::{AppError, Result};
use crate::models::user::{EmailMatch, UserLookup};
use crate::state::AppState;

/// Decodes a JSON body whatever the Content-Type header says.
fn parse<T: DeserializeOwned>(body: &Bytes) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| AppError::InvalidBody(e.to_string()))
}

async fn issue_email_otp(
    state: &AppState,
    body: Bytes,
    matching: EmailMatch,
) -> Result<Json<OtpSentResponse>> {
    let req: EmailOtpRequest = parse(&body)?;
    req.validate().map_err(|_| AppError::MissingField("Missing email"))?;
    let email = req.email.ok_or(AppError::MissingField("Missing email"))?;

    let lookup = UserLookup::email(email, matching);
    state
        .otp_service
        .issue(&lookup, state.email_service.as_ref())
        .await?;

    Ok(Json(OtpSentResponse::sent()))
}

// POST /send-otp
pub async fn send_otp(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<OtpSentResponse>> {
    issue_email_otp(&state, body, EmailMatch::Exact).await
}

// POST /send-reset-otp
pub async fn send_reset_otp(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<OtpSentResponse>> {
    issue_email_otp(&state, body, EmailMatch::CaseInsensitive).await
}

// POST /send-sms-otp
pub async fn send_sms_otp(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<OtpSentResponse>> {
    let req: SmsOtpRequest = parse(&body)?;
    req.validate().map_err(|_| AppError::MissingField("Missing phone number"))?;
    let phone_number = req
        .phone_number
        .ok_or(AppError::MissingField("Missing phone number"))?;

    let lookup = UserLookup::phone(phone_number);
    state
        .otp_service
        .issue(&lookup, state.sms_service.as_ref())
        .await?;

    Ok(Json(OtpSentResponse::sent()))
}
