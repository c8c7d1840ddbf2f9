pub(crate) mod otp;
