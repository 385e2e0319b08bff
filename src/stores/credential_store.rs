use argon2::{
    password_hash::SaltString, Algorithm, Argon2, Params, PasswordHash, PasswordHasher,
    PasswordVerifier, Version,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::errors::internal::CredentialError;
use crate::errors::InternalError;
use crate::types::db::user::{self, Entity as User};

/// Lockout threshold: this many failures within the window lock the account
pub const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Rolling lockout window in seconds
pub const LOCKOUT_WINDOW_SECS: i64 = 15 * 60;

/// Result of a credential check.
///
/// `Rejected` covers both unknown usernames and wrong passwords so that the
/// two are indistinguishable to the caller; `Locked` is a distinct state and
/// is reported before any password verification happens.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialCheck {
    Valid(user::Model),
    Locked,
    Rejected,
}

/// CredentialStore manages user records and password verification
pub struct CredentialStore {
    db: DatabaseConnection,
    password_pepper: String,
}

impl CredentialStore {
    /// Create a new CredentialStore with the given database connection and
    /// password pepper
    pub fn new(db: DatabaseConnection, password_pepper: String) -> Self {
        Self {
            db,
            password_pepper,
        }
    }

    fn hasher(&self) -> Result<Argon2<'_>, InternalError> {
        Argon2::new_with_secret(
            self.password_pepper.as_bytes(),
            Algorithm::Argon2id,
            Version::V0x13,
            Params::default(),
        )
        .map_err(|e| CredentialError::Hashing(e.to_string()).into())
    }

    /// Add a new user and return its id
    ///
    /// # Errors
    /// `CredentialError::DuplicateUsername` / `DuplicateEmail` when the unique
    /// constraints would be violated
    pub async fn add_user(
        &self,
        username: String,
        email: String,
        password: String,
        company_id: Option<i64>,
    ) -> Result<i64, InternalError> {
        let existing = User::find()
            .filter(user::Column::Username.eq(&username))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find user by username", e))?;

        if existing.is_some() {
            return Err(CredentialError::DuplicateUsername(username).into());
        }

        let existing_email = User::find()
            .filter(user::Column::Email.eq(&email))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find user by email", e))?;

        if existing_email.is_some() {
            return Err(CredentialError::DuplicateEmail(email).into());
        }

        let salt = SaltString::generate(&mut rand_core::OsRng);
        let password_hash = self
            .hasher()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?
            .to_string();

        let now = Utc::now().timestamp();

        let new_user = user::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            username: Set(username),
            email: Set(email),
            password_hash: Set(password_hash),
            is_active: Set(true),
            company_id: Set(company_id),
            failed_login_count: Set(0),
            last_failed_login_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = new_user
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("insert user", e))?;

        Ok(inserted.id)
    }

    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find user by username", e))
    }

    pub async fn find_by_id(&self, user_id: i64) -> Result<Option<user::Model>, InternalError> {
        User::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find user by id", e))
    }

    /// Whether the user counts as locked at `now`
    pub fn is_locked(user: &user::Model, now: i64) -> bool {
        user.failed_login_count >= MAX_FAILED_ATTEMPTS
            && user
                .last_failed_login_at
                .map(|at| now - at < LOCKOUT_WINDOW_SECS)
                .unwrap_or(false)
    }

    /// Verify a username/password pair.
    ///
    /// The lockout check runs before password verification, so a locked
    /// account reports `Locked` even for the correct password. A failed
    /// verification increments the failure counter; a successful one resets
    /// it.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<CredentialCheck, InternalError> {
        let Some(found) = self.find_by_username(username).await? else {
            return Ok(CredentialCheck::Rejected);
        };

        if !found.is_active {
            return Ok(CredentialCheck::Rejected);
        }

        let now = Utc::now().timestamp();
        if Self::is_locked(&found, now) {
            return Ok(CredentialCheck::Locked);
        }

        let parsed_hash = PasswordHash::new(&found.password_hash)
            .map_err(|_| CredentialError::CorruptHash(found.id))?;

        let verified = self
            .hasher()?
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok();

        if !verified {
            self.record_failed_attempt(&found, now).await?;
            return Ok(CredentialCheck::Rejected);
        }

        if found.failed_login_count > 0 {
            self.reset_lockout(found.id).await?;
        }

        Ok(CredentialCheck::Valid(found))
    }

    /// Clear the failure counter, used on successful login and by the
    /// explicit administrative reset
    pub async fn reset_lockout(&self, user_id: i64) -> Result<(), InternalError> {
        let update = user::ActiveModel {
            id: Set(user_id),
            failed_login_count: Set(0),
            last_failed_login_at: Set(None),
            updated_at: Set(Utc::now().timestamp()),
            ..Default::default()
        };

        update
            .update(&self.db)
            .await
            .map_err(|e| InternalError::database("reset lockout", e))?;

        Ok(())
    }

    async fn record_failed_attempt(
        &self,
        found: &user::Model,
        now: i64,
    ) -> Result<(), InternalError> {
        // A failure after the window elapsed starts a fresh count
        let stale = found
            .last_failed_login_at
            .map(|at| now - at >= LOCKOUT_WINDOW_SECS)
            .unwrap_or(true);

        let next_count = if stale {
            1
        } else {
            found.failed_login_count + 1
        };

        let update = user::ActiveModel {
            id: Set(found.id),
            failed_login_count: Set(next_count),
            last_failed_login_at: Set(Some(now)),
            updated_at: Set(now),
            ..Default::default()
        };

        update
            .update(&self.db)
            .await
            .map_err(|e| InternalError::database("record failed login", e))?;

        Ok(())
    }

    /// Backdate the last failure, used by tests to simulate window expiry
    #[cfg(test)]
    pub async fn backdate_last_failure(
        &self,
        user_id: i64,
        timestamp: i64,
    ) -> Result<(), InternalError> {
        let update = user::ActiveModel {
            id: Set(user_id),
            last_failed_login_at: Set(Some(timestamp)),
            ..Default::default()
        };

        update
            .update(&self.db)
            .await
            .map_err(|e| InternalError::database("backdate last failure", e))?;

        Ok(())
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("db", &"<connection>")
            .field("password_pepper", &"<redacted>")
            .finish()
    }
}
