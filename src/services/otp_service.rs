use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;

use crate::database::UserStore;
use crate::errors::{AppError, Result};
use crate::models::otp::IssuedOtp;
use crate::models::user::UserLookup;
use crate::services::OtpSender;

/// Issues password-reset codes: lookup, generate, persist, dispatch.
#[derive(Clone)]
pub struct OTPService {
    store: Arc<dyn UserStore>,
}

impl OTPService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    // Generate 6-digit OTP
    pub fn generate_otp() -> String {
        let mut rng = rand::thread_rng();
        rng.gen_range(100_000..=999_999u32).to_string()
    }

    pub async fn issue(&self, lookup: &UserLookup, sender: &dyn OtpSender) -> Result<IssuedOtp> {
        self.issue_at(lookup, sender, Utc::now()).await
    }

    /// Runs the issuance steps in order, stopping at the first failure.
    ///
    /// The code is persisted before dispatch and is not rolled back if the
    /// provider fails, so the caller sees a 500 while the row holds a code
    /// that was never delivered.
    pub async fn issue_at(
        &self,
        lookup: &UserLookup,
        sender: &dyn OtpSender,
        now: DateTime<Utc>,
    ) -> Result<IssuedOtp> {
        let user_id = self
            .store
            .find_user(lookup)
            .await
            .map_err(AppError::Lookup)?
            .ok_or(AppError::UserNotFound)?;

        let otp = IssuedOtp::new(Self::generate_otp(), now);

        self.store
            .save_reset_otp(&user_id, &otp)
            .await
            .map_err(AppError::Persist)?;

        if let Err(source) = sender.send_otp(lookup.destination(), &otp.code).await {
            tracing::warn!(
                "{} delivery failed for user {}; stored OTP left in place",
                sender.channel(),
                user_id
            );
            return Err(AppError::Dispatch {
                channel: sender.channel(),
                source,
            });
        }

        tracing::info!("{} OTP issued for user {}", sender.channel(), user_id);
        Ok(otp)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::database::memory::MemoryUserStore;
    use crate::errors::{Channel, DeliveryError};
    use crate::models::otp::OTP_TTL_SECONDS;
    use crate::models::user::EmailMatch;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// Records every send; optionally rejects them.
    pub(crate) struct RecordingSender {
        pub channel: Channel,
        pub reject: bool,
        pub sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingSender {
        pub fn new(channel: Channel) -> Self {
            Self {
                channel,
                reject: false,
                sent: Mutex::new(Vec::new()),
            }
        }

        pub fn rejecting(channel: Channel) -> Self {
            Self {
                reject: true,
                ..Self::new(channel)
            }
        }

        pub fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OtpSender for RecordingSender {
        fn channel(&self) -> Channel {
            self.channel
        }

        async fn send_otp(
            &self,
            destination: &str,
            code: &str,
        ) -> std::result::Result<(), DeliveryError> {
            self.sent
                .lock()
                .unwrap()
                .push((destination.to_string(), code.to_string()));
            if self.reject {
                return Err(DeliveryError::Rejected {
                    status: 500,
                    body: "provider down".into(),
                });
            }
            Ok(())
        }
    }

    fn store() -> Arc<MemoryUserStore> {
        Arc::new(
            MemoryUserStore::default()
                .with_user("u-1", "Ann@Example.com", "+15551234567")
                .with_user("u-2", "bob@example.com", "+15559876543"),
        )
    }

    #[test]
    fn generated_codes_are_six_digits_in_range() {
        for _ in 0..10_000 {
            let otp = OTPService::generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.bytes().all(|b| b.is_ascii_digit()));
            let value: u32 = otp.parse().unwrap();
            assert!((100_000..=999_999).contains(&value));
        }
    }

    #[tokio::test]
    async fn expiry_is_exactly_ten_minutes_after_issue() {
        let store = store();
        let service = OTPService::new(store.clone());
        let sender = RecordingSender::new(Channel::Sms);
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap();

        let otp = service
            .issue_at(&UserLookup::phone("+15551234567"), &sender, now)
            .await
            .unwrap();

        assert_eq!(otp.issued_at, now);
        assert_eq!((otp.expires_at - now).num_seconds(), OTP_TTL_SECONDS);
        assert_eq!(store.user("u-1").unwrap().reset_otp, Some(otp.clone()));
        assert_eq!(sender.sent(), vec![("+15551234567".to_string(), otp.code)]);
    }

    #[tokio::test]
    async fn email_matching_policy_is_respected() {
        let service = OTPService::new(store());
        let sender = RecordingSender::new(Channel::Email);

        let exact = service
            .issue(&UserLookup::email("ann@example.com", EmailMatch::Exact), &sender)
            .await;
        assert!(matches!(exact, Err(AppError::UserNotFound)));

        let relaxed = service
            .issue(&UserLookup::email("ann@example.com", EmailMatch::CaseInsensitive), &sender)
            .await;
        assert!(relaxed.is_ok());

        // delivered to the address as typed
        assert_eq!(sender.sent()[0].0, "ann@example.com");
    }

    #[tokio::test]
    async fn unknown_user_leaves_store_untouched() {
        let store = store();
        let service = OTPService::new(store.clone());
        let sender = RecordingSender::new(Channel::Email);

        let result = service
            .issue(&UserLookup::email("a@x.com", EmailMatch::Exact), &sender)
            .await;

        assert!(matches!(result, Err(AppError::UserNotFound)));
        assert!(!store.mutated());
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn lookup_failure_is_a_server_error() {
        let store = Arc::new(MemoryUserStore::default().failing_lookup());
        let service = OTPService::new(store);
        let sender = RecordingSender::new(Channel::Sms);

        let result = service.issue(&UserLookup::phone("+1"), &sender).await;

        assert!(matches!(result, Err(AppError::Lookup(_))));
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn save_failure_skips_dispatch() {
        let store = Arc::new(
            MemoryUserStore::default()
                .failing_save()
                .with_user("u-1", "a@x.com", "+15551234567"),
        );
        let service = OTPService::new(store);
        let sender = RecordingSender::new(Channel::Sms);

        let result = service.issue(&UserLookup::phone("+15551234567"), &sender).await;

        assert!(matches!(result, Err(AppError::Persist(_))));
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn dispatch_failure_keeps_stored_code() {
        let store = store();
        let service = OTPService::new(store.clone());
        let sender = RecordingSender::rejecting(Channel::Email);

        let result = service
            .issue(&UserLookup::email("bob@example.com", EmailMatch::Exact), &sender)
            .await;

        assert!(matches!(
            result,
            Err(AppError::Dispatch {
                channel: Channel::Email,
                ..
            })
        ));
        let stored = store.user("u-2").unwrap().reset_otp.expect("otp persisted");
        assert_eq!(sender.sent(), vec![("bob@example.com".to_string(), stored.code)]);
    }

    #[tokio::test]
    async fn reissue_overwrites_previous_code() {
        let store = store();
        let service = OTPService::new(store.clone());
        let sender = RecordingSender::new(Channel::Sms);
        let first_at = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let second_at = Utc.with_ymd_and_hms(2025, 6, 1, 8, 1, 0).unwrap();

        service
            .issue_at(&UserLookup::phone("+15559876543"), &sender, first_at)
            .await
            .unwrap();
        let second = service
            .issue_at(&UserLookup::phone("+15559876543"), &sender, second_at)
            .await
            .unwrap();

        assert_eq!(store.user("u-2").unwrap().reset_otp, Some(second));
    }
}
