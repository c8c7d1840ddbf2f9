//! User store backed by the Supabase REST interface (PostgREST).

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};

use crate::database::UserStore;
use crate::errors::StoreError;
use crate::models::otp::{IssuedOtp, ResetOtpUpdate};
use crate::models::user::{EmailMatch, UserId, UserLookup, UserRow};

const USERS_PATH: &str = "/rest/v1/users";

#[derive(Clone)]
pub struct PostgrestUserStore {
    base_url: String,
    service_role_key: String,
    client: Client,
}

impl PostgrestUserStore {
    pub fn new(base_url: &str, service_role_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_role_key,
            client: Client::new(),
        }
    }

    fn users_url(&self) -> Result<String, StoreError> {
        if self.base_url.is_empty() {
            return Err(StoreError::Unavailable("SUPABASE_URL is not configured".into()));
        }
        Ok(format!("{}{}", self.base_url, USERS_PATH))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
    }

    /// PostgREST filter value for the lookup column.
    fn filter(lookup: &UserLookup) -> String {
        match lookup {
            UserLookup::Email {
                address,
                matching: EmailMatch::CaseInsensitive,
            } => format!("ilike.{}", escape_like(address)),
            UserLookup::Email { address, .. } => format!("eq.{}", address),
            UserLookup::Phone(number) => format!("eq.{}", number),
        }
    }
}

/// Escapes LIKE metacharacters so `ilike` behaves as case-insensitive equality.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl UserStore for PostgrestUserStore {
    async fn find_user(&self, lookup: &UserLookup) -> Result<Option<UserId>, StoreError> {
        let url = self.users_url()?;
        let column = lookup.column();

        let response = self
            .authorized(self.client.get(url))
            .query(&[
                ("select", "id".to_string()),
                (column, Self::filter(lookup)),
                ("limit", "2".to_string()),
            ])
            .send()
            .await?;

        let mut rows: Vec<UserRow> = error_for_status(response).await?.json().await?;

        if rows.len() > 1 {
            return Err(StoreError::MultipleRows { column });
        }

        Ok(rows.pop().map(|row| row.id))
    }

    async fn save_reset_otp(&self, user_id: &UserId, otp: &IssuedOtp) -> Result<(), StoreError> {
        let url = self.users_url()?;

        let response = self
            .authorized(self.client.patch(url))
            .query(&[("id", format!("eq.{}", user_id))])
            .header("Prefer", "return=minimal")
            .json(&ResetOtpUpdate::from(otp))
            .send()
            .await?;

        error_for_status(response).await?;
        tracing::debug!("Stored reset OTP for user {}", user_id);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgrest"
    }
}
