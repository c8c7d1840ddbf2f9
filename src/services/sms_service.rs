use async_trait::async_trait;
use reqwest::Client;

use crate::errors::{Channel, DeliveryError};
use crate::models::otp::IssuedOtp;
use crate::services::{ensure_delivered, OtpSender};

/// Sends codes through the Twilio Messages API.
#[derive(Clone)]
pub struct SMSService {
    base_url: String,
    account_sid: String,
    auth_token: String,
    from: String,
    app_name: String,
    client: Client,
}

impl SMSService {
    pub fn new(
        base_url: &str,
        account_sid: String,
        auth_token: String,
        from: String,
        app_name: String,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            account_sid,
            auth_token,
            from,
            app_name,
            client: Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        )
    }

    pub fn message_body(&self, otp: &str) -> String {
        format!(
            "Your {} OTP code is: {}. It will expire in {} minutes.",
            self.app_name,
            otp,
            IssuedOtp::ttl_minutes()
        )
    }
}

#[async_trait]
impl OtpSender for SMSService {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    async fn send_otp(&self, phone: &str, otp: &str) -> Result<(), DeliveryError> {
        let message = self.message_body(otp);

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", phone),
                ("From", self.from.as_str()),
                ("Body", message.as_str()),
            ])
            .send()
            .await?;

        ensure_delivered(response).await.map_err(|e| {
            tracing::error!("Twilio SMS failed: {}", e);
            e
        })
    }
}
