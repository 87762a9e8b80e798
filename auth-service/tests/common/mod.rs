use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth::HashCost;
use auth::PasswordHasher;
use auth::TokenCodec;
use auth::TokenTtl;
use auth_service::identity::models::RegistrationPolicy;
use auth_service::identity::service::AuthService;
use auth_service::inbound::http::cookies::RefreshCookie;
use auth_service::inbound::http::handlers::health::HealthState;
use auth_service::inbound::http::router::create_router;
use auth_service::inbound::http::router::AppState;
use auth_service::outbound::repositories::InMemoryCredentialStore;
use auth_service::outbound::revocations::InMemoryRevocationList;
use serde_json::json;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Test application that spawns a real server backed by the in-memory store
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    /// Client without a cookie store, for presenting arbitrary refresh tokens
    pub raw_client: reqwest::Client,
    pub store: Arc<InMemoryCredentialStore>,
    pub authenticator: Arc<Authenticator>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with(false).await
    }

    /// Spawn with refresh tokens revoked as soon as they are rotated
    pub async fn spawn_with_revoke_on_rotation() -> Self {
        Self::spawn_with(true).await
    }

    async fn spawn_with(revoke_on_rotation: bool) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        // Cheap cost keeps the suite fast
        let hasher = PasswordHasher::with_cost(HashCost {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .expect("Invalid hash cost");

        let authenticator = Arc::new(Authenticator::new(
            hasher.clone(),
            TokenCodec::new(JWT_SECRET),
            TokenTtl::default(),
        ));
        let store = Arc::new(InMemoryCredentialStore::new(hasher));

        let auth_service = Arc::new(
            AuthService::new(
                Arc::clone(&store),
                Arc::new(InMemoryRevocationList::new()),
                Arc::clone(&authenticator),
                RegistrationPolicy::default(),
            )
            .with_revoke_on_rotation(revoke_on_rotation),
        );

        let health = Arc::new(HealthState::new("test"));
        health.mark_ready();

        let router = create_router(AppState {
            auth_service,
            refresh_cookie: RefreshCookie {
                secure: false,
                ..RefreshCookie::new(authenticator.ttl().refresh())
            },
            store_timeout: Duration::from_secs(5),
            health,
        });

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .expect("Failed to create reqwest client"),
            raw_client: reqwest::Client::new(),
            store,
            authenticator,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request carrying an explicit refresh cookie
    pub fn post_with_refresh_cookie(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.raw_client
            .post(&format!("{}{}", self.address, path))
            .header(
                reqwest::header::COOKIE,
                format!("{}={}", REFRESH_COOKIE, token),
            )
    }

    /// Register a user and return the response
    pub async fn register(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/register")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log a user in and return the response
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

/// Value of the refresh cookie set by a response
pub fn refresh_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .cookies()
        .find(|cookie| cookie.name() == REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_string())
}
