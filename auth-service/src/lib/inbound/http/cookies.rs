use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::SameSite;
use axum_extra::extract::CookieJar;

pub const DEFAULT_REFRESH_COOKIE: &str = "refresh_token";

/// Attributes of the HTTP-only cookie carrying the refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshCookie {
    pub name: String,
    pub secure: bool,
    pub domain: Option<String>,
    /// Tracks the refresh token lifetime.
    pub max_age: chrono::Duration,
}

impl RefreshCookie {
    pub fn new(max_age: chrono::Duration) -> Self {
        Self {
            name: DEFAULT_REFRESH_COOKIE.to_string(),
            secure: true,
            domain: None,
            max_age,
        }
    }

    /// Token presented by the client, if any.
    pub fn read<'a>(&self, jar: &'a CookieJar) -> Option<&'a str> {
        jar.get(&self.name)
            .map(|cookie| cookie.value())
            .filter(|value| !value.is_empty())
    }

    pub fn set(&self, jar: CookieJar, refresh_token: String) -> CookieJar {
        let mut cookie = self.base(refresh_token);
        cookie.set_max_age(time::Duration::seconds(self.max_age.num_seconds()));
        jar.add(cookie)
    }

    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(self.base(String::new()))
    }

    fn base(&self, value: String) -> Cookie<'static> {
        let mut cookie = Cookie::build((self.name.clone(), value))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .path("/")
            .build();

        if let Some(domain) = &self.domain {
            cookie.set_domain(domain.clone());
        }

        cookie
    }
}
