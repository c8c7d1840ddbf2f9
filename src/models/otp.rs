use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Serialize;

/// How long an issued code stays valid.
pub const OTP_TTL_SECONDS: i64 = 600;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedOtp {
    pub code: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl IssuedOtp {
    pub fn new(code: String, issued_at: DateTime<Utc>) -> Self {
        Self {
            code,
            issued_at,
            expires_at: issued_at + Duration::seconds(OTP_TTL_SECONDS),
        }
    }

    pub fn ttl_minutes() -> i64 {
        OTP_TTL_SECONDS / 60
    }
}

/// Column values written to the user row.
#[derive(Debug, Serialize)]
pub struct ResetOtpUpdate {
    pub reset_otp: String,
    pub reset_otp_expiry: String,
}

impl From<&IssuedOtp> for ResetOtpUpdate {
    fn from(otp: &IssuedOtp) -> Self {
        Self {
            reset_otp: otp.code.clone(),
            reset_otp_expiry: otp.expires_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
