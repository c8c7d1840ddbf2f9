use async_trait::async_trait;

use crate::errors::{Channel, DeliveryError};

pub mod email_service;
pub mod otp_service;
pub mod sms_service;

/// A transport that delivers a code to a recipient address.
#[async_trait]
pub trait OtpSender: Send + Sync {
    fn channel(&self) -> Channel;

    async fn send_otp(&self, destination: &str, code: &str) -> Result<(), DeliveryError>;
}

/// Turns a non-2xx provider response into a `DeliveryError`, keeping the
/// body for the logs.
pub(crate) async fn ensure_delivered(response: reqwest::Response) -> Result<(), DeliveryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    Err(DeliveryError::Rejected {
        status: status.as_u16(),
        body,
    })
}
