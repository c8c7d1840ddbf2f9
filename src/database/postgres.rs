//! User store talking to Postgres directly, for deployments that expose the
//! database URL instead of the REST gateway.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;

use crate::database::UserStore;
use crate::errors::StoreError;
use crate::models::otp::IssuedOtp;
use crate::models::user::{EmailMatch, UserId, UserLookup};

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Builds a pool that connects on first use, so a database that is down
    /// at boot only fails the requests that need it.
    pub fn connect_lazy(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_lazy(database_url)?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    fn lookup_query(lookup: &UserLookup) -> &'static str {
        match lookup {
            UserLookup::Email {
                matching: EmailMatch::Exact,
                ..
            } => "SELECT id::text AS id FROM users WHERE email = $1 LIMIT 2",
            UserLookup::Email {
                matching: EmailMatch::CaseInsensitive,
                ..
            } => "SELECT id::text AS id FROM users WHERE lower(email) = lower($1) LIMIT 2",
            UserLookup::Phone(_) => {
                "SELECT id::text AS id FROM users WHERE phone_number = $1 LIMIT 2"
            }
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_user(&self, lookup: &UserLookup) -> Result<Option<UserId>, StoreError> {
        let rows = sqlx::query(Self::lookup_query(lookup))
            .bind(lookup.destination())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("User lookup failed: {}", e);
                StoreError::Sql(e)
            })?;

        if rows.len() > 1 {
            return Err(StoreError::MultipleRows {
                column: lookup.column(),
            });
        }

        match rows.first() {
            Some(row) => Ok(Some(UserId(row.try_get("id")?))),
            None => Ok(None),
        }
    }

    async fn save_reset_otp(&self, user_id: &UserId, otp: &IssuedOtp) -> Result<(), StoreError> {
        let query = r#"
            UPDATE users
            SET reset_otp = $1, reset_otp_expiry = $2
            WHERE id::text = $3
        "#;

        sqlx::query(query)
            .bind(&otp.code)
            .bind(otp.expires_at)
            .bind(&user_id.0)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Stored reset OTP for user {}", user_id);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
