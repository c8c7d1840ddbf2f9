use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::postgres::PgUserStore;
use crate::database::postgrest::PostgrestUserStore;
use crate::database::UserStore;
use crate::errors::StoreError;
use crate::services::email_service::EmailService;
use crate::services::otp_service::OTPService;
use crate::services::sms_service::SMSService;
use crate::services::OtpSender;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub otp_service: OTPService,
    pub email_service: Arc<dyn OtpSender>,
    pub sms_service: Arc<dyn OtpSender>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn UserStore>,
        email_service: Arc<dyn OtpSender>,
        sms_service: Arc<dyn OtpSender>,
    ) -> Self {
        AppState {
            config: Arc::new(config),
            otp_service: OTPService::new(store),
            email_service,
            sms_service,
        }
    }

    /// Wires the production store and providers from `config`.
    pub fn from_config(config: AppConfig) -> Result<Self, StoreError> {
        let store: Arc<dyn UserStore> = match &config.database_url {
            Some(url) => Arc::new(PgUserStore::connect_lazy(url)?),
            None => Arc::new(PostgrestUserStore::new(
                &config.supabase_url,
                config.supabase_service_role_key.clone(),
            )),
        };

        let email_service = Arc::new(EmailService::new(
            &config.resend_base_url,
            config.resend_api_key.clone(),
            config.from_email.clone(),
            config.app_name.clone(),
        ));

        let sms_service = Arc::new(SMSService::new(
            &config.twilio_base_url,
            config.twilio_account_sid.clone(),
            config.twilio_auth_token.clone(),
            config.twilio_phone_number.clone(),
            config.app_name.clone(),
        ));

        Ok(Self::new(config, store, email_service, sms_service))
    }
}
