use async_trait::async_trait;

use crate::errors::StoreError;
use crate::models::otp::IssuedOtp;
use crate::models::user::{UserId, UserLookup};

#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod postgrest;

/// Access to the `users` table with a service-role credential.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Returns the id of the single row matching `lookup`, `None` when no row
    /// matches. Several matches are an error.
    async fn find_user(&self, lookup: &UserLookup) -> Result<Option<UserId>, StoreError>;

    /// Overwrites `reset_otp` and `reset_otp_expiry` on the row.
    async fn save_reset_otp(&self, user_id: &UserId, otp: &IssuedOtp) -> Result<(), StoreError>;

    fn backend(&self) -> &'static str;
}
