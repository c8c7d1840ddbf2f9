use async_trait::async_trait;
use chrono::{Datelike, Utc};
use reqwest::Client;
use serde::Serialize;

use crate::errors::{Channel, DeliveryError};
use crate::models::otp::IssuedOtp;
use crate::services::{ensure_delivered, OtpSender};

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: String,
    html: String,
}

/// Sends codes through the Resend transactional email API.
#[derive(Clone)]
pub struct EmailService {
    base_url: String,
    api_key: String,
    from: String,
    app_name: String,
    client: Client,
}

impl EmailService {
    pub fn new(base_url: &str, api_key: String, from: String, app_name: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            from,
            app_name,
            client: Client::new(),
        }
    }

    pub fn subject(&self) -> String {
        format!("Your {} Password Reset Code", self.app_name)
    }

    pub fn html_body(&self, otp: &str) -> String {
        format!(
            r#"<div style="font-family: Arial, sans-serif; padding: 20px;">
  <h2>Reset Your {app} Password</h2>
  <p>Here is your 6-digit OTP code:</p>
  <h1 style="color: #007BFF; letter-spacing: 4px;">{otp}</h1>
  <p>This code will expire in {minutes} minutes.</p>
  <p>If you didn't request this, you can safely ignore this email.</p>
  <hr>
  <p style="font-size: 12px; color: #888;">&copy; {year} {app}</p>
</div>"#,
            app = self.app_name,
            otp = otp,
            minutes = IssuedOtp::ttl_minutes(),
            year = Utc::now().year(),
        )
    }
}

#[async_trait]
impl OtpSender for EmailService {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn send_otp(&self, email: &str, otp: &str) -> Result<(), DeliveryError> {
        let payload = SendEmailRequest {
            from: &self.from,
            to: email,
            subject: self.subject(),
            html: self.html_body(otp),
        };

        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        ensure_delivered(response).await.map_err(|e| {
            tracing::error!("Failed to send email: {}", e);
            e
        })
    }
}
