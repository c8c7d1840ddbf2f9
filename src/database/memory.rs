//! In-process store for exercising handlers without a database.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::database::UserStore;
use crate::errors::StoreError;
use crate::models::otp::IssuedOtp;
use crate::models::user::{EmailMatch, UserId, UserLookup};

#[derive(Debug, Clone)]
pub struct MemoryUser {
    pub id: UserId,
    pub email: String,
    pub phone_number: String,
    pub reset_otp: Option<IssuedOtp>,
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<MemoryUser>>,
    fail_lookup: bool,
    fail_save: bool,
}

impl MemoryUserStore {
    pub fn failing_lookup(mut self) -> Self {
        self.fail_lookup = true;
        self
    }

    pub fn failing_save(mut self) -> Self {
        self.fail_save = true;
        self
    }

    pub fn with_user(self, id: &str, email: &str, phone_number: &str) -> Self {
        self.users.lock().unwrap().push(MemoryUser {
            id: UserId(id.to_string()),
            email: email.to_string(),
            phone_number: phone_number.to_string(),
            reset_otp: None,
        });
        self
    }

    pub fn user(&self, id: &str) -> Option<MemoryUser> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id.0 == id)
            .cloned()
    }

    pub fn mutated(&self) -> bool {
        self.users.lock().unwrap().iter().any(|u| u.reset_otp.is_some())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_user(&self, lookup: &UserLookup) -> Result<Option<UserId>, StoreError> {
        if self.fail_lookup {
            return Err(StoreError::Unavailable("lookup disabled".into()));
        }

        let users = self.users.lock().unwrap();
        let matches: Vec<&MemoryUser> = users
            .iter()
            .filter(|u| match lookup {
                UserLookup::Email {
                    address,
                    matching: EmailMatch::Exact,
                } => &u.email == address,
                UserLookup::Email {
                    address,
                    matching: EmailMatch::CaseInsensitive,
                } => u.email.to_lowercase() == address.to_lowercase(),
                UserLookup::Phone(number) => &u.phone_number == number,
            })
            .collect();

        if matches.len() > 1 {
            return Err(StoreError::MultipleRows {
                column: lookup.column(),
            });
        }
        Ok(matches.first().map(|u| u.id.clone()))
    }

    async fn save_reset_otp(&self, user_id: &UserId, otp: &IssuedOtp) -> Result<(), StoreError> {
        if self.fail_save {
            return Err(StoreError::Unavailable("save disabled".into()));
        }

        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| &u.id == user_id) {
            user.reset_otp = Some(otp.clone());
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
