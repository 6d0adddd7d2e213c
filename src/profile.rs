use crate::errors::{AppError, AppResult};
use crate::models::{AuthSession, Role};
use crate::seed::DEFAULT_NAME;
use crate::storage::{keys, Storage};

// Import logging macros
use crate::{log_service_success, log_validation};

/// Mock sign-in state, display name and study streak
#[derive(Clone)]
pub struct ProfileService {
    storage: Storage,
}

impl ProfileService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Any non-empty email/password pair is accepted
    pub async fn login(&self, role: Role, email: &str, password: &str) -> AppResult<AuthSession> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            log_validation!(failure, "login", error = "missing credentials");
            return Err(AppError::validation("Please enter email and password"));
        }

        let session = AuthSession {
            user: email.to_string(),
            role,
        };
        self.storage.set(keys::AUTH, &session).await?;
        log_service_success!("profile", "login", format!("signed in as {:?}", role));
        Ok(session)
    }

    pub async fn logout(&self) -> AppResult<()> {
        self.storage.delete(keys::AUTH).await
    }

    pub async fn current(&self) -> Option<AuthSession> {
        self.storage.try_get(keys::AUTH).await
    }

    pub async fn name(&self) -> String {
        self.storage
            .get_text(keys::NAME)
            .await
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_NAME.to_string())
    }

    pub async fn set_name(&self, name: &str) -> AppResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Name is required"));
        }
        self.storage.set(keys::NAME, &name).await?;
        Ok(name.to_string())
    }

    pub async fn streak(&self) -> u32 {
        self.storage.get_or(keys::STREAK, 0).await
    }

    pub async fn check_in(&self) -> AppResult<u32> {
        let streak = self
            .storage
            .update(keys::STREAK, || 0u32, |streak: &mut u32| {
                *streak = streak.saturating_add(1);
                Ok(*streak)
            })
            .await?;
        log_service_success!("profile", "check_in", count = streak, "checked in");
        Ok(streak)
    }

    /// Wipe every persisted key, chat threads included
    pub async fn reset_all(&self) -> AppResult<usize> {
        self.storage.clear_all().await
    }
}
