//! Stateless session tokens.
//!
//! A session is an HS256 JWT whose `sub` is the user id. It travels in the
//! HTTP-only `session` cookie, or as a bearer token for non-browser clients.
//! Nothing is stored server side: a token is valid until `exp`.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{config::Config, users::UserId, Error, Result};

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserId,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    max_age: Duration,
    secure_cookies: bool,
}

impl SessionKeys {
    pub fn new(secret: &[u8], max_age_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            max_age: Duration::seconds(max_age_secs),
            secure_cookies: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.session_secret.as_bytes(), config.session_max_age_secs).with_secure_cookies(config.secure_cookies)
    }

    pub fn with_secure_cookies(mut self, secure_cookies: bool) -> Self {
        self.secure_cookies = secure_cookies;
        self
    }

    pub fn issue(&self, user_id: UserId, email: &str) -> Result<IssuedSession> {
        self.issue_at(user_id, email, Utc::now())
    }

    pub fn issue_at(&self, user_id: UserId, email: &str, now: DateTime<Utc>) -> Result<IssuedSession> {
        let expires_at = now + self.max_age;
        let claims = Claims {
            sub: user_id,
            email: email.to_owned(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Unexpected(format!("failed to sign session: {e}")))?;

        Ok(IssuedSession { token, expires_at })
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("rejected session token: {e}");
                Error::Unauthorized
            })
    }

    pub fn cookie(&self, session: &IssuedSession) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, session.token.clone()))
            .path("/")
            .http_only(true)
            .secure(self.secure_cookies)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(self.max_age.num_seconds()))
            .build()
    }
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

/// Session cookie first, then `Authorization: Bearer`.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE).filter(|c| !c.value().is_empty()) {
        return Some(cookie.value().to_owned());
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_owned())
        .filter(|token| !token.is_empty())
}
