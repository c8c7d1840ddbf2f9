use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct EmailOtpRequest {
    #[validate(required, length(min = 1))]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SmsOtpRequest {
    #[validate(required, length(min = 1))]
    pub phone_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OtpSentResponse {
    pub success: bool,
    pub message: String,
}

impl OtpSentResponse {
    pub fn sent() -> Self {
        Self {
            success: true,
            message: "OTP sent successfully".to_string(),
        }
    }
}
