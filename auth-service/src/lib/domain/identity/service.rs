use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::Claims;
use auth::TokenType;

use crate::domain::identity::errors::AuthError;
use crate::domain::identity::errors::StoreError;
use crate::domain::identity::models::AuthSession;
use crate::domain::identity::models::Credentials;
use crate::domain::identity::models::Deadline;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Password;
use crate::domain::identity::models::RegisterCommand;
use crate::domain::identity::models::RegistrationPolicy;
use crate::domain::identity::models::UserId;
use crate::domain::identity::ports::AuthServicePort;
use crate::domain::identity::ports::CredentialStore;
use crate::domain::identity::ports::RevocationList;

/// Domain service implementation for authentication operations.
///
/// Holds no mutable state; the credential store and the revocation list are
/// the only shared resources it touches.
pub struct AuthService<CS, RL>
where
    CS: CredentialStore,
    RL: RevocationList,
{
    store: Arc<CS>,
    revocations: Arc<RL>,
    authenticator: Arc<Authenticator>,
    policy: RegistrationPolicy,
    revoke_on_rotation: bool,
}

impl<CS, RL> AuthService<CS, RL>
where
    CS: CredentialStore,
    RL: RevocationList,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Credential store implementation
    /// * `revocations` - Revoked token ids
    /// * `authenticator` - Password hashing and token issuance
    /// * `policy` - Registration password rules
    pub fn new(
        store: Arc<CS>,
        revocations: Arc<RL>,
        authenticator: Arc<Authenticator>,
        policy: RegistrationPolicy,
    ) -> Self {
        Self {
            store,
            revocations,
            authenticator,
            policy,
            revoke_on_rotation: false,
        }
    }

    /// Revoke the presented refresh token whenever it is rotated.
    pub fn with_revoke_on_rotation(mut self, enabled: bool) -> Self {
        self.revoke_on_rotation = enabled;
        self
    }

    fn issue_session(&self, user_id: UserId, email: EmailAddress) -> Result<AuthSession, AuthError> {
        let tokens = self.authenticator.issue_pair(user_id).map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Failed to issue token pair");
            AuthError::Internal(format!("Token issuance failed: {}", e))
        })?;

        Ok(AuthSession {
            user_id,
            email,
            tokens,
        })
    }

    /// Hash a password on the blocking pool; Argon2 would stall the async workers.
    async fn hash_password(&self, password: &Password) -> Result<String, AuthError> {
        let authenticator = Arc::clone(&self.authenticator);
        let password = password.clone();

        tokio::task::spawn_blocking(move || authenticator.hash_password(password.as_str()))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing failed");
                AuthError::Hashing(e.to_string())
            })
    }

    /// Spend one Argon2 run on a login that is rejected before any password
    /// check, so unknown and inactive accounts answer as slowly as a wrong password.
    async fn spend_password_cost(&self, password: &Password) {
        if let Err(e) = self.hash_password(password).await {
            tracing::debug!(error = %e, "Cost-equalizing hash failed");
        }
    }

    async fn parse_unrevoked(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let claims = self
            .authenticator
            .validate_token(token, expected)
            .map_err(|e| {
                tracing::info!(token_type = %expected, error = %e, "Token rejected");
                AuthError::InvalidToken
            })?;

        if self.revocations.is_revoked(&claims.jti).await? {
            tracing::info!(token_type = %expected, jti = %claims.jti, "Revoked token presented");
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}

/// Run a credential store call, failing once the deadline passes.
async fn within<T, F>(deadline: Deadline, operation: &'static str, call: F) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout_at(deadline.instant(), call).await {
        Ok(result) => result.map_err(AuthError::from),
        Err(_) => {
            tracing::warn!(operation, "Credential store call exceeded request deadline");
            Err(AuthError::StoreUnavailable(format!("{} timed out", operation)))
        }
    }
}

#[async_trait]
impl<CS, RL> AuthServicePort for AuthService<CS, RL>
where
    CS: CredentialStore,
    RL: RevocationList,
{
    async fn login(
        &self,
        credentials: Credentials,
        deadline: Deadline,
    ) -> Result<AuthSession, AuthError> {
        tracing::debug!(email = %credentials.email, "Attempting login");

        let user = within(
            deadline,
            "find_by_email",
            self.store.find_by_email(&credentials.email),
        )
        .await?;

        let Some(user) = user else {
            tracing::warn!(email = %credentials.email, "Login for unknown email");
            self.spend_password_cost(&credentials.password).await;
            return Err(AuthError::InvalidCredentials);
        };

        if !user.is_active {
            tracing::warn!(user_id = %user.id, "Login for inactive account");
            self.spend_password_cost(&credentials.password).await;
            return Err(AuthError::InvalidCredentials);
        }

        let verified = within(
            deadline,
            "verify_password",
            self.store.verify_password(&user.id, &credentials.password),
        )
        .await?;

        if !verified {
            tracing::warn!(user_id = %user.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::debug!(user_id = %user.id, "Generating tokens");
        self.issue_session(user.id, user.email)
    }

    async fn register(
        &self,
        command: RegisterCommand,
        deadline: Deadline,
    ) -> Result<AuthSession, AuthError> {
        self.policy.check(&command.password)?;

        let password_hash = self.hash_password(&command.password).await?;

        // The store's unique constraint is the only duplicate check.
        let user_id = within(
            deadline,
            "create_user",
            self.store.create_user(&command.email, &password_hash),
        )
        .await
        .map_err(|e| {
            if e == AuthError::RegistrationConflict {
                tracing::info!(email = %command.email, "Registration for existing email");
            }
            e
        })?;

        tracing::info!(user_id = %user_id, "User registered");
        self.issue_session(user_id, command.email)
    }

    async fn refresh(
        &self,
        refresh_token: &str,
        deadline: Deadline,
    ) -> Result<AuthSession, AuthError> {
        let claims = self
            .parse_unrevoked(refresh_token, TokenType::Refresh)
            .await?;

        let user_id = UserId::from_subject(&claims.sub).map_err(|e| {
            tracing::warn!(error = %e, "Refresh token with unusable subject");
            AuthError::InvalidToken
        })?;

        // Claim the token before any await on the store: of two concurrent
        // refreshes with the same token only one may rotate it.
        if self.revoke_on_rotation
            && !self
                .revocations
                .revoke(&claims.jti, claims.expires_at())
                .await?
        {
            tracing::warn!(user_id = %user_id, jti = %claims.jti, "Refresh token replayed");
            return Err(AuthError::InvalidToken);
        }

        let user = within(deadline, "find_by_id", self.store.find_by_id(&user_id))
            .await?
            .ok_or_else(|| {
                tracing::warn!(user_id = %user_id, "Refresh for deleted account");
                AuthError::InvalidCredentials
            })?;

        if !user.is_active {
            tracing::warn!(user_id = %user_id, "Refresh for inactive account");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::debug!(user_id = %user_id, jti = %claims.jti, "Rotating token pair");
        self.issue_session(user.id, user.email)
    }

    async fn logout(
        &self,
        refresh_token: &str,
        access_token: Option<&str>,
    ) -> Result<(), AuthError> {
        let refresh = self
            .parse_unrevoked(refresh_token, TokenType::Refresh)
            .await?;
        if !self
            .revocations
            .revoke(&refresh.jti, refresh.expires_at())
            .await?
        {
            return Err(AuthError::InvalidToken);
        }

        if let Some(token) = access_token {
            match self.authenticator.validate_token(token, TokenType::Access) {
                Ok(access) if access.sub == refresh.sub => {
                    self.revocations
                        .revoke(&access.jti, access.expires_at())
                        .await?;
                }
                Ok(_) => {
                    tracing::warn!(subject = %refresh.sub, "Logout with access token of another subject");
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Ignoring invalid access token on logout");
                }
            }
        }

        tracing::info!(subject = %refresh.sub, jti = %refresh.jti, "Refresh token revoked");
        Ok(())
    }

    async fn parse_access_token(&self, access_token: &str) -> Result<UserId, AuthError> {
        let claims = self
            .parse_unrevoked(access_token, TokenType::Access)
            .await?;

        UserId::from_subject(&claims.sub).map_err(|e| {
            tracing::warn!(error = %e, "Access token with unusable subject");
            AuthError::InvalidToken
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::atomic::Ordering;
    use std::time::Duration as StdDuration;
    use std::time::Instant as StdInstant;

    use auth::HashCost;
    use auth::PasswordHasher;
    use auth::TokenCodec;
    use auth::TokenTtl;
    use chrono::Duration;
    use chrono::Utc;
    use mockall::mock;

    use super::*;
    use crate::domain::identity::models::User;
    use crate::outbound::revocations::InMemoryRevocationList;

    const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

    mock! {
        pub TestCredentialStore {}

        #[async_trait]
        impl CredentialStore for TestCredentialStore {
            async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;
            async fn verify_password(&self, id: &UserId, password: &Password) -> Result<bool, StoreError>;
            async fn create_user(&self, email: &EmailAddress, password_hash: &str) -> Result<UserId, StoreError>;
        }
    }

    /// Store whose every call outlives any reasonable deadline.
    struct HangingStore;

    #[async_trait]
    impl CredentialStore for HangingStore {
        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
            tokio::time::sleep(StdDuration::from_secs(30)).await;
            Ok(None)
        }

        async fn find_by_id(&self, _id: &UserId) -> Result<Option<User>, StoreError> {
            tokio::time::sleep(StdDuration::from_secs(30)).await;
            Ok(None)
        }

        async fn verify_password(
            &self,
            _id: &UserId,
            _password: &Password,
        ) -> Result<bool, StoreError> {
            tokio::time::sleep(StdDuration::from_secs(30)).await;
            Ok(false)
        }

        async fn create_user(
            &self,
            _email: &EmailAddress,
            _password_hash: &str,
        ) -> Result<UserId, StoreError> {
            tokio::time::sleep(StdDuration::from_secs(30)).await;
            Ok(UserId(1))
        }
    }

    /// Store with database-like latency on every lookup.
    struct SlowStore;

    #[async_trait]
    impl CredentialStore for SlowStore {
        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
            tokio::time::sleep(StdDuration::from_millis(10)).await;
            Ok(None)
        }

        async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
            tokio::time::sleep(StdDuration::from_millis(10)).await;
            Ok(Some(user(id.0, "a@x.com")))
        }

        async fn verify_password(
            &self,
            _id: &UserId,
            _password: &Password,
        ) -> Result<bool, StoreError> {
            tokio::time::sleep(StdDuration::from_millis(10)).await;
            Ok(false)
        }

        async fn create_user(
            &self,
            _email: &EmailAddress,
            _password_hash: &str,
        ) -> Result<UserId, StoreError> {
            tokio::time::sleep(StdDuration::from_millis(10)).await;
            Ok(UserId(1))
        }
    }

    /// Service hashing at the production default cost.
    fn default_cost_service<CS: CredentialStore>(
        store: CS,
    ) -> AuthService<CS, InMemoryRevocationList> {
        AuthService::new(
            Arc::new(store),
            Arc::new(InMemoryRevocationList::new()),
            Arc::new(Authenticator::new(
                PasswordHasher::new(),
                TokenCodec::new(SECRET),
                TokenTtl::default(),
            )),
            RegistrationPolicy::default(),
        )
    }

    fn authenticator() -> Arc<Authenticator> {
        let hasher = PasswordHasher::with_cost(HashCost {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .expect("Invalid cost");

        Arc::new(Authenticator::new(
            hasher,
            TokenCodec::new(SECRET),
            TokenTtl::default(),
        ))
    }

    fn service<CS: CredentialStore>(store: CS) -> AuthService<CS, InMemoryRevocationList> {
        AuthService::new(
            Arc::new(store),
            Arc::new(InMemoryRevocationList::new()),
            authenticator(),
            RegistrationPolicy::default(),
        )
    }

    fn deadline() -> Deadline {
        Deadline::after(StdDuration::from_secs(5))
    }

    fn user(id: i64, email: &str) -> User {
        User {
            id: UserId(id),
            email: EmailAddress::new(email.to_string()).unwrap(),
            is_active: true,
            created_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut store = MockTestCredentialStore::new();

        store
            .expect_find_by_email()
            .withf(|email| email == "a@x.com")
            .times(1)
            .returning(|_| Ok(Some(user(7, "a@x.com"))));
        store
            .expect_verify_password()
            .withf(|id, password| *id == UserId(7) && password.as_str() == "password123")
            .times(1)
            .returning(|_, _| Ok(true));

        let service = service(store);
        let session = service
            .login(
                Credentials::new("a@x.com".to_string(), "password123".to_string()),
                deadline(),
            )
            .await
            .expect("Login failed");

        assert_eq!(session.user_id, UserId(7));
        assert_eq!(session.email.as_str(), "a@x.com");

        let subject = service
            .parse_access_token(&session.tokens.access_token)
            .await
            .expect("Access token should verify");
        assert_eq!(subject, UserId(7));
    }

    #[tokio::test]
    async fn test_login_unknown_email_and_wrong_password_are_indistinguishable() {
        let mut store = MockTestCredentialStore::new();

        store
            .expect_find_by_email()
            .withf(|email| email == "ghost@x.com")
            .returning(|_| Ok(None));
        store
            .expect_find_by_email()
            .withf(|email| email == "a@x.com")
            .returning(|_| Ok(Some(user(7, "a@x.com"))));
        store
            .expect_verify_password()
            .times(1)
            .returning(|_, _| Ok(false));

        let service = service(store);

        let unknown = service
            .login(
                Credentials::new("ghost@x.com".to_string(), "password123".to_string()),
                deadline(),
            )
            .await
            .unwrap_err();
        let wrong = service
            .login(
                Credentials::new("a@x.com".to_string(), "wrong".to_string()),
                deadline(),
            )
            .await
            .unwrap_err();

        assert_eq!(unknown, AuthError::InvalidCredentials);
        assert_eq!(wrong, AuthError::InvalidCredentials);
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_login_inactive_account() {
        let mut store = MockTestCredentialStore::new();

        store.expect_find_by_email().returning(|_| {
            let mut inactive = user(7, "a@x.com");
            inactive.is_active = false;
            Ok(Some(inactive))
        });
        store.expect_verify_password().times(0);

        let result = service(store)
            .login(
                Credentials::new("a@x.com".to_string(), "password123".to_string()),
                deadline(),
            )
            .await;

        assert_eq!(result.unwrap_err(), AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_login_store_failure() {
        let mut store = MockTestCredentialStore::new();

        store
            .expect_find_by_email()
            .returning(|_| Err(StoreError::Unavailable("connection refused".to_string())));

        let result = service(store)
            .login(
                Credentials::new("a@x.com".to_string(), "password123".to_string()),
                deadline(),
            )
            .await;

        assert!(matches!(result, Err(AuthError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_login_deadline_elapsed() {
        let result = service(HangingStore)
            .login(
                Credentials::new("a@x.com".to_string(), "password123".to_string()),
                Deadline::after(StdDuration::from_millis(20)),
            )
            .await;

        assert!(matches!(result, Err(AuthError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut store = MockTestCredentialStore::new();

        store
            .expect_create_user()
            .withf(|email, hash| email.as_str() == "a@x.com" && hash.starts_with("$argon2id$"))
            .times(1)
            .returning(|_, _| Ok(UserId(11)));
        store.expect_find_by_email().times(0);

        let service = service(store);
        let session = service
            .register(
                RegisterCommand::new(
                    EmailAddress::new("a@x.com".to_string()).unwrap(),
                    "password123".to_string(),
                ),
                deadline(),
            )
            .await
            .expect("Registration failed");

        assert_eq!(session.user_id, UserId(11));
        assert_eq!(
            service
                .parse_access_token(&session.tokens.access_token)
                .await
                .unwrap(),
            UserId(11)
        );
    }

    #[tokio::test]
    async fn test_register_conflict() {
        let mut store = MockTestCredentialStore::new();

        store
            .expect_create_user()
            .times(1)
            .returning(|email, _| Err(StoreError::Conflict(email.as_str().to_string())));

        let result = service(store)
            .register(
                RegisterCommand::new(
                    EmailAddress::new("a@x.com".to_string()).unwrap(),
                    "password123".to_string(),
                ),
                deadline(),
            )
            .await;

        assert_eq!(result.unwrap_err(), AuthError::RegistrationConflict);
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let mut store = MockTestCredentialStore::new();
        store.expect_create_user().times(0);

        let result = service(store)
            .register(
                RegisterCommand::new(
                    EmailAddress::new("a@x.com".to_string()).unwrap(),
                    "short".to_string(),
                ),
                deadline(),
            )
            .await;

        assert!(matches!(result, Err(AuthError::PasswordPolicy(_))));
    }

    #[tokio::test]
    async fn test_refresh_rotates_pair() {
        let mut store = MockTestCredentialStore::new();

        store
            .expect_find_by_id()
            .withf(|id| *id == UserId(7))
            .times(1)
            .returning(|_| Ok(Some(user(7, "a@x.com"))));

        let service = service(store);
        let original = authenticator().issue_pair(7).unwrap();

        let session = service
            .refresh(&original.refresh_token, deadline())
            .await
            .expect("Refresh failed");

        assert_eq!(session.user_id, UserId(7));
        assert_ne!(session.tokens.access_token, original.access_token);
        assert_ne!(session.tokens.refresh_token, original.refresh_token);
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let mut store = MockTestCredentialStore::new();
        store.expect_find_by_id().times(0);

        let pair = authenticator().issue_pair(7).unwrap();
        let result = service(store).refresh(&pair.access_token, deadline()).await;

        assert_eq!(result.unwrap_err(), AuthError::InvalidToken);
    }

    #[tokio::test]
    async fn test_refresh_rejects_expired_token() {
        let mut store = MockTestCredentialStore::new();
        store.expect_find_by_id().times(0);

        let stale = authenticator()
            .issue_pair_at(7, Utc::now() - Duration::days(15))
            .unwrap();
        let result = service(store).refresh(&stale.refresh_token, deadline()).await;

        assert_eq!(result.unwrap_err(), AuthError::InvalidToken);
    }

    #[tokio::test]
    async fn test_refresh_deleted_account() {
        let mut store = MockTestCredentialStore::new();
        store.expect_find_by_id().times(1).returning(|_| Ok(None));

        let pair = authenticator().issue_pair(7).unwrap();
        let result = service(store).refresh(&pair.refresh_token, deadline()).await;

        assert_eq!(result.unwrap_err(), AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_refresh_keeps_old_token_by_default() {
        let mut store = MockTestCredentialStore::new();
        store
            .expect_find_by_id()
            .times(2)
            .returning(|_| Ok(Some(user(7, "a@x.com"))));

        let service = service(store);
        let pair = authenticator().issue_pair(7).unwrap();

        assert!(service.refresh(&pair.refresh_token, deadline()).await.is_ok());
        assert!(service.refresh(&pair.refresh_token, deadline()).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_revokes_old_token_when_enabled() {
        let mut store = MockTestCredentialStore::new();
        store
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(Some(user(7, "a@x.com"))));

        let service = service(store).with_revoke_on_rotation(true);
        let pair = authenticator().issue_pair(7).unwrap();

        let rotated = service
            .refresh(&pair.refresh_token, deadline())
            .await
            .expect("First refresh failed");
        let replay = service.refresh(&pair.refresh_token, deadline()).await;

        assert_eq!(replay.unwrap_err(), AuthError::InvalidToken);
        assert_ne!(rotated.tokens.refresh_token, pair.refresh_token);
    }

    #[tokio::test]
    async fn test_concurrent_refresh_rotates_once_when_revoking() {
        let service = service(SlowStore).with_revoke_on_rotation(true);
        let pair = authenticator().issue_pair(7).unwrap();

        let (first, second) = tokio::join!(
            service.refresh(&pair.refresh_token, deadline()),
            service.refresh(&pair.refresh_token, deadline())
        );

        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(AuthError::InvalidToken))));
    }

    #[tokio::test]
    async fn test_register_keeps_runtime_responsive() {
        let mut store = MockTestCredentialStore::new();
        store
            .expect_create_user()
            .times(1)
            .returning(|_, _| Ok(UserId(1)));

        let service = default_cost_service(store);

        let timer_fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&timer_fired);
        tokio::spawn(async move {
            tokio::time::sleep(StdDuration::from_millis(1)).await;
            flag.store(true, Ordering::SeqCst);
        });

        service
            .register(
                RegisterCommand::new(
                    EmailAddress::new("a@x.com".to_string()).unwrap(),
                    "password123".to_string(),
                ),
                deadline(),
            )
            .await
            .expect("Registration failed");

        // Hashing ran on the blocking pool, so the timer on this
        // single-threaded runtime got to fire meanwhile.
        assert!(timer_fired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_unknown_email_login_costs_a_hash() {
        let mut store = MockTestCredentialStore::new();
        store.expect_find_by_email().returning(|_| Ok(None));
        store.expect_verify_password().times(0);

        let service = default_cost_service(store);

        let started = StdInstant::now();
        service
            .authenticator
            .hash_password("password123")
            .expect("Failed to hash password");
        let one_hash = started.elapsed();

        let started = StdInstant::now();
        let result = service
            .login(
                Credentials::new("ghost@x.com".to_string(), "password123".to_string()),
                deadline(),
            )
            .await;
        let rejected_after = started.elapsed();

        assert_eq!(result.unwrap_err(), AuthError::InvalidCredentials);
        assert!(
            rejected_after >= one_hash / 4,
            "unknown email rejected in {:?}, one hash takes {:?}",
            rejected_after,
            one_hash
        );
    }

    #[tokio::test]
    async fn test_logout_twice_is_rejected() {
        let service = service(MockTestCredentialStore::new());
        let pair = authenticator().issue_pair(7).unwrap();

        service.logout(&pair.refresh_token, None).await.unwrap();
        assert_eq!(
            service.logout(&pair.refresh_token, None).await.unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[tokio::test]
    async fn test_logout_revokes_tokens() {
        let mut store = MockTestCredentialStore::new();
        store.expect_find_by_id().times(0);

        let service = service(store);
        let pair = authenticator().issue_pair(7).unwrap();

        service
            .logout(&pair.refresh_token, Some(&pair.access_token))
            .await
            .expect("Logout failed");

        assert_eq!(
            service
                .refresh(&pair.refresh_token, deadline())
                .await
                .unwrap_err(),
            AuthError::InvalidToken
        );
        assert_eq!(
            service
                .parse_access_token(&pair.access_token)
                .await
                .unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[tokio::test]
    async fn test_logout_ignores_access_token_of_other_subject() {
        let service = service(MockTestCredentialStore::new());
        let mine = authenticator().issue_pair(7).unwrap();
        let theirs = authenticator().issue_pair(8).unwrap();

        service
            .logout(&mine.refresh_token, Some(&theirs.access_token))
            .await
            .expect("Logout failed");

        assert_eq!(
            service
                .parse_access_token(&theirs.access_token)
                .await
                .unwrap(),
            UserId(8)
        );
    }

    #[tokio::test]
    async fn test_logout_with_invalid_token() {
        let service = service(MockTestCredentialStore::new());

        let result = service.logout("not-a-token", None).await;
        assert_eq!(result.unwrap_err(), AuthError::InvalidToken);
    }

    #[tokio::test]
    async fn test_parse_access_token_rejects_refresh_token() {
        let service = service(MockTestCredentialStore::new());
        let pair = authenticator().issue_pair(7).unwrap();

        assert_eq!(
            service
                .parse_access_token(&pair.refresh_token)
                .await
                .unwrap_err(),
            AuthError::InvalidToken
        );
    }
}
