// config.rs
use std::env;

pub const DEFAULT_FROM_EMAIL: &str = "no-reply@yourapp.com";
pub const DEFAULT_RESEND_BASE_URL: &str = "https://api.resend.com";
pub const DEFAULT_TWILIO_BASE_URL: &str = "https://api.twilio.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_role_key: String,
    pub database_url: Option<String>,
    pub resend_api_key: String,
    pub resend_base_url: String,
    pub from_email: String,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_phone_number: String,
    pub twilio_base_url: String,
    pub app_name: String,
    pub port: u16,
    pub host: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        AppConfig {
            supabase_url: var("SUPABASE_URL").unwrap_or_default(),
            supabase_service_role_key: var("SUPABASE_SERVICE_ROLE_KEY").unwrap_or_default(),
            database_url: var("DATABASE_URL"),
            resend_api_key: var("RESEND_API_KEY").unwrap_or_default(),
            resend_base_url: var("RESEND_BASE_URL")
                .unwrap_or_else(|| DEFAULT_RESEND_BASE_URL.to_string()),
            from_email: var("FROM_EMAIL").unwrap_or_else(|| DEFAULT_FROM_EMAIL.to_string()),
            twilio_account_sid: var("TWILIO_ACCOUNT_SID").unwrap_or_default(),
            twilio_auth_token: var("TWILIO_AUTH_TOKEN").unwrap_or_default(),
            twilio_phone_number: var("TWILIO_PHONE_NUMBER").unwrap_or_default(),
            twilio_base_url: var("TWILIO_BASE_URL")
                .unwrap_or_else(|| DEFAULT_TWILIO_BASE_URL.to_string()),
            app_name: var("APP_NAME").unwrap_or_else(|| "MediSafe".to_string()),
            port: var("PORT").and_then(|p| p.parse().ok()).unwrap_or(10000),
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
        }
    }

    /// Credential groups that are not configured. Startup only logs these;
    /// requests that need them fail downstream.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        let has_rest = !self.supabase_url.is_empty() && !self.supabase_service_role_key.is_empty();
        if !has_rest && self.database_url.is_none() {
            missing.push("Supabase");
        }
        if self.resend_api_key.is_empty() {
            missing.push("Resend");
        }
        if self.twilio_account_sid.is_empty()
            || self.twilio_auth_token.is_empty()
            || self.twilio_phone_number.is_empty()
        {
            missing.push("Twilio");
        }

        missing
    }

    pub fn get_config_info(&self) -> serde_json::Value {
        serde_json::json!({
            "store": if self.database_url.is_some() { "postgres" } else { "postgrest" },
            "supabase_url": self.supabase_url,
            "service_role_key_set": !self.supabase_service_role_key.is_empty(),
            "resend_api_key_set": !self.resend_api_key.is_empty(),
            "from_email": self.from_email,
            "twilio_account_sid_set": !self.twilio_account_sid.is_empty(),
            "twilio_phone_number": self.twilio_phone_number,
            "app_name": self.app_name,
            "port": self.port,
            "host": self.host,
        })
    }
}
