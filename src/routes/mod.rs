pub mod otp_routes;
