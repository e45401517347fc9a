//! Account use-cases: registration, privileged creation, and
//! credential verification.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::debug;

use super::email::EmailAddress;
use super::error::Error;
use super::ports::{PasswordHasher, UserPersistenceError, UserRepository};
use super::user::{User, UserId};

/// Domain service for the identity model.
///
/// Owns the two invariants of account creation: the email is mandatory
/// and normalized before storage, and the password survives only as a
/// one-way hash.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AccountService {
    /// Construct the service over repository and hasher ports.
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// Create a regular account: normalize the email, reject empty or
    /// malformed addresses, hash the password, and persist with the
    /// staff and superuser flags unset.
    pub async fn create_user(&self, email: &str, password: &str) -> Result<User, Error> {
        self.create(email, password, false).await
    }

    /// Privileged creation: like [`Self::create_user`] but the result
    /// carries `is_staff` and `is_superuser` set.
    pub async fn create_superuser(&self, email: &str, password: &str) -> Result<User, Error> {
        self.create(email, password, true).await
    }

    async fn create(&self, email: &str, password: &str, privileged: bool) -> Result<User, Error> {
        let email = EmailAddress::new(email).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "email", "code": "invalid_email" }))
        })?;
        if self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_persistence_error)?
            .is_some()
        {
            return Err(email_taken(&email));
        }
        let password_hash = self
            .hasher
            .hash(password)
            .map_err(|err| Error::internal(err.to_string()))?;
        let user = User {
            id: UserId::random(),
            email,
            password_hash,
            is_active: true,
            is_staff: privileged,
            is_superuser: privileged,
            created_at: Utc::now(),
        };
        match self.users.insert(&user).await {
            Ok(()) => Ok(user),
            // Lost the race against a concurrent registration.
            Err(UserPersistenceError::EmailTaken { .. }) => Err(email_taken(&user.email)),
            Err(err) => Err(map_user_persistence_error(err)),
        }
    }

    /// Verify credentials against the stored hash. Succeeds only for
    /// active accounts whose hash matches; unknown addresses, wrong
    /// passwords, and inactive accounts are indistinguishable to the
    /// caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, Error> {
        let email = EmailAddress::new(email).map_err(|_| invalid_credentials())?;
        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(invalid_credentials)?;
        let matches = self
            .hasher
            .verify(password, &user.password_hash)
            .map_err(|err| Error::internal(err.to_string()))?;
        if !matches || !user.is_active {
            debug!(email = %user.email, "credential verification failed");
            return Err(invalid_credentials());
        }
        Ok(user)
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

fn email_taken(email: &EmailAddress) -> Error {
    Error::invalid_request(format!("email {email} is already registered"))
        .with_details(json!({ "field": "email", "code": "email_taken" }))
}

fn map_user_persistence_error(err: UserPersistenceError) -> Error {
    Error::internal(err.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::Argon2PasswordHasher;
    use crate::domain::ErrorCode;

    /// Minimal stateful double for the user repository port.
    #[derive(Default)]
    struct InMemoryUsers {
        rows: Mutex<HashMap<String, User>>,
    }

    #[async_trait]
    impl UserRepository for InMemoryUsers {
        async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
            let mut rows = self.rows.lock().expect("lock");
            if rows.contains_key(user.email.as_ref()) {
                return Err(UserPersistenceError::email_taken(user.email.as_ref()));
            }
            rows.insert(user.email.as_ref().to_owned(), user.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
            let rows = self.rows.lock().expect("lock");
            Ok(rows.values().find(|user| user.id == id).cloned())
        }

        async fn find_by_email(
            &self,
            email: &EmailAddress,
        ) -> Result<Option<User>, UserPersistenceError> {
            let rows = self.rows.lock().expect("lock");
            Ok(rows.get(email.as_ref()).cloned())
        }
    }

    fn service() -> AccountService {
        AccountService::new(
            Arc::new(InMemoryUsers::default()),
            Arc::new(Argon2PasswordHasher),
        )
    }

    #[tokio::test]
    async fn create_user_normalizes_email_and_hashes_password() {
        let accounts = service();
        let user = accounts
            .create_user("b123@TEST.IR", "test_123")
            .await
            .expect("create");
        assert_eq!(user.email.as_ref(), "b123@test.ir");
        assert_ne!(user.password_hash, "test_123");
        assert!(!user.is_staff);
        assert!(!user.is_superuser);
        assert!(user.is_active);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("not-an-address")]
    #[tokio::test]
    async fn create_user_rejects_missing_or_malformed_email(#[case] email: &str) {
        let accounts = service();
        let err = accounts
            .create_user(email, "test_123")
            .await
            .expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details["field"], "email");
    }

    #[tokio::test]
    async fn create_superuser_sets_both_flags() {
        let accounts = service();
        let user = accounts
            .create_superuser("admin@test.com", "2222")
            .await
            .expect("create");
        assert!(user.is_staff);
        assert!(user.is_superuser);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_validation_failure() {
        let accounts = service();
        accounts
            .create_user("dup@test.ir", "first")
            .await
            .expect("first create");
        let err = accounts
            .create_user("DUP@test.ir", "second")
            .await
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.details().expect("details")["code"], "email_taken");
    }

    #[tokio::test]
    async fn authenticate_accepts_matching_credentials_only() {
        let accounts = service();
        accounts
            .create_user("login@test.ir", "passTest")
            .await
            .expect("create");

        let user = accounts
            .authenticate("LOGIN@test.ir", "passTest")
            .await
            .expect("authenticate");
        assert_eq!(user.email.as_ref(), "login@test.ir");

        let err = accounts
            .authenticate("login@test.ir", "wrong")
            .await
            .expect_err("wrong password");
        assert_eq!(err.code(), ErrorCode::Unauthorized);

        let err = accounts
            .authenticate("unknown@test.ir", "passTest")
            .await
            .expect_err("unknown address");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
