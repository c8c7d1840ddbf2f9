pub mod otp_dtos;
