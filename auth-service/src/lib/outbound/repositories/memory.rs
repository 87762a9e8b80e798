use std::collections::HashMap;

use async_trait::async_trait;
use auth::PasswordHasher;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::identity::errors::StoreError;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Password;
use crate::domain::identity::models::User;
use crate::domain::identity::models::UserId;
use crate::domain::identity::ports::CredentialStore;

struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Default)]
struct State {
    last_id: i64,
    users: HashMap<i64, StoredUser>,
    by_email: HashMap<String, i64>,
}

/// Process-local credential store for tests and local runs.
///
/// Emails are unique exactly as written, like the `users.email` constraint.
pub struct InMemoryCredentialStore {
    hasher: PasswordHasher,
    state: RwLock<State>,
}

impl InMemoryCredentialStore {
    pub fn new(hasher: PasswordHasher) -> Self {
        Self {
            hasher,
            state: RwLock::new(State::default()),
        }
    }

    /// Flip the active flag of a user. Returns false if the user does not exist.
    pub async fn set_active(&self, id: &UserId, active: bool) -> bool {
        let mut state = self.state.write().await;
        match state.users.get_mut(&id.0) {
            Some(stored) => {
                stored.user.is_active = active;
                true
            }
            None => false,
        }
    }

    /// Delete a user. Returns false if the user does not exist.
    pub async fn remove_user(&self, id: &UserId) -> bool {
        let mut state = self.state.write().await;
        match state.users.remove(&id.0) {
            Some(stored) => {
                state.by_email.remove(stored.user.email.as_str());
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .by_email
            .get(email)
            .and_then(|id| state.users.get(id))
            .map(|stored| stored.user.clone()))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.get(&id.0).map(|stored| stored.user.clone()))
    }

    async fn verify_password(&self, id: &UserId, password: &Password) -> Result<bool, StoreError> {
        let stored_hash = {
            let state = self.state.read().await;
            match state.users.get(&id.0) {
                Some(stored) => stored.password_hash.clone(),
                None => return Ok(false),
            }
        };

        let hasher = self.hasher.clone();
        let candidate = password.clone();
        let matched =
            tokio::task::spawn_blocking(move || hasher.verify(candidate.as_str(), &stored_hash))
                .await
                .map_err(|e| StoreError::Hashing(e.to_string()))?
                .map_err(|e| StoreError::Hashing(e.to_string()))?;

        if matched {
            let mut state = self.state.write().await;
            if let Some(stored) = state.users.get_mut(&id.0) {
                stored.user.last_login_at = Some(Utc::now());
            }
        }

        Ok(matched)
    }

    async fn create_user(
        &self,
        email: &EmailAddress,
        password_hash: &str,
    ) -> Result<UserId, StoreError> {
        let mut state = self.state.write().await;

        if state.by_email.contains_key(email.as_str()) {
            return Err(StoreError::Conflict(email.as_str().to_string()));
        }

        state.last_id += 1;
        let id = state.last_id;
        let created_at: DateTime<Utc> = Utc::now();

        state.by_email.insert(email.as_str().to_string(), id);
        state.users.insert(
            id,
            StoredUser {
                user: User {
                    id: UserId(id),
                    email: email.clone(),
                    is_active: true,
                    created_at,
                    last_login_at: None,
                },
                password_hash: password_hash.to_string(),
            },
        );

        Ok(UserId(id))
    }
}
