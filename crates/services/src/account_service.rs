use std::sync::{Arc, OnceLock};

use quiz_core::model::UserId;
use storage::repository::{AccountKind, CredentialRecord, CredentialRepository};
use tracing::{info, warn};

use crate::Clock;
use crate::error::AccountError;
use crate::password::{hash_password, verify_password};

/// Whether `set_password` created a new account or replaced a hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordSet {
    Created,
    Updated,
}

/// Passwords for quiz takers and admins.
#[derive(Clone)]
pub struct AccountService {
    clock: Clock,
    credentials: Arc<dyn CredentialRepository>,
}

impl AccountService {
    #[must_use]
    pub fn new(clock: Clock, credentials: Arc<dyn CredentialRepository>) -> Self {
        Self { clock, credentials }
    }

    /// Set a quiz taker's password, creating the user when missing.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::UserId` for a blank id, `AccountError::EmptyPassword`
    /// for a blank password, and `AccountError::Storage` if persistence fails.
    pub async fn set_password(
        &self,
        user_id: &str,
        password: &str,
    ) -> Result<PasswordSet, AccountError> {
        let user_id = UserId::new(user_id)?;
        let set = self
            .store(AccountKind::User, user_id.as_str(), password)
            .await?;
        info!(user_id = %user_id, ?set, "user password set");
        Ok(set)
    }

    /// Set an admin's password, creating the admin when missing.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::EmptyAccount` or `AccountError::EmptyPassword` for
    /// blank input, and `AccountError::Storage` if persistence fails.
    pub async fn set_admin_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<PasswordSet, AccountError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AccountError::EmptyAccount);
        }
        let set = self.store(AccountKind::Admin, username, password).await?;
        info!(username, ?set, "admin password set");
        Ok(set)
    }

    /// Check a quiz taker's credentials.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidCredentials` for an unknown user or a wrong
    /// password.
    pub async fn verify_user(&self, user_id: &str, password: &str) -> Result<UserId, AccountError> {
        let user_id = UserId::new(user_id).map_err(|_| AccountError::InvalidCredentials)?;
        self.verify(AccountKind::User, user_id.as_str(), password)
            .await?;
        Ok(user_id)
    }

    /// Check an admin's credentials and return the normalized username.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidCredentials` for an unknown admin or a wrong
    /// password.
    pub async fn verify_admin(&self, username: &str, password: &str) -> Result<String, AccountError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AccountError::InvalidCredentials);
        }
        self.verify(AccountKind::Admin, username, password).await?;
        Ok(username.to_string())
    }

    /// Create the first admin account if none exists yet.
    ///
    /// Returns `true` when an account was created.
    ///
    /// # Errors
    ///
    /// Returns `AccountError` for blank input or storage failures.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> Result<bool, AccountError> {
        if self.credentials.count_credentials(AccountKind::Admin).await? > 0 {
            return Ok(false);
        }
        self.set_admin_password(username, password).await?;
        Ok(true)
    }

    async fn store(
        &self,
        kind: AccountKind,
        account: &str,
        password: &str,
    ) -> Result<PasswordSet, AccountError> {
        if password.trim().is_empty() {
            return Err(AccountError::EmptyPassword);
        }
        let password = password.to_string();
        let password_hash = run_blocking(move || hash_password(&password)).await?;
        let record = CredentialRecord {
            account: account.to_string(),
            password_hash,
            updated_at: self.clock.now(),
        };
        let created = self.credentials.upsert_credential(kind, &record).await?;
        Ok(if created {
            PasswordSet::Created
        } else {
            PasswordSet::Updated
        })
    }

    async fn verify(
        &self,
        kind: AccountKind,
        account: &str,
        password: &str,
    ) -> Result<(), AccountError> {
        let stored = self
            .credentials
            .get_credential(kind, account)
            .await?
            .map(|record| record.password_hash);
        let password = password.to_string();
        // Unknown accounts still pay for one verify.
        let matched = run_blocking(move || match stored {
            Some(phc) => verify_password(&password, &phc),
            None => {
                if let Some(phc) = dummy_hash() {
                    verify_password(&password, phc)?;
                }
                Ok(false)
            }
        })
        .await?;
        if matched {
            Ok(())
        } else {
            warn!(?kind, account, "rejected login");
            Err(AccountError::InvalidCredentials)
        }
    }
}

/// Run Argon2 work on the blocking pool.
async fn run_blocking<T, F>(work: F) -> Result<T, AccountError>
where
    F: FnOnce() -> Result<T, AccountError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AccountError::Hash(e.to_string()))?
}

fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_password("no-such-account").ok())
        .as_deref()
}
