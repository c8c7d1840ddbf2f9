use axum::{routing::post, Router};

use crate::{handlers::otp, state::AppState};

pub fn otp_routes() -> Router<AppState> {
    Router::new()
        // Email OTP, exact address match
        .route("/send-otp", post(otp::send_otp))
        // Email OTP, case-insensitive address match
        .route("/send-reset-otp", post(otp::send_reset_otp))
        .route("/send-sms-otp", post(otp::send_sms_otp))
}
