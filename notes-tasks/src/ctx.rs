use std::convert::Infallible;

use axum::{
    extract::{Extension, FromRequestParts},
    http::request::Parts,
};
use serde::Serialize;

use crate::{
    auth::session::{token_from_headers, SessionKeys},
    users::UserId,
    Error, Result, DB,
};

#[derive(Clone, Debug, FromRequestParts)]
pub struct BaseParams {
    pub ctx: Ctx,
    #[from_request(via(Extension))]
    pub db: DB,
}

impl BaseParams {
    pub fn new(db: DB, ctx: Ctx) -> Self {
        Self { db, ctx }
    }
}

/// Identity carried by a verified session token.
#[derive(Debug, Serialize, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
}

#[derive(Clone, Debug)]
pub struct Ctx {
    pub user: Option<User>,
}

impl Ctx {
    pub fn new(user: Option<User>) -> Self {
        Self { user }
    }

    pub fn for_user(id: UserId, email: impl Into<String>) -> Self {
        Self::new(Some(User { id, email: email.into() }))
    }

    pub fn get_user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn require_user_id(&self) -> Result<UserId> {
        self.get_user_id().ok_or(Error::Unauthorized)
    }
}

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> std::result::Result<Self, Self::Rejection> {
        // already resolved by `auth::middleware::protected`
        if let Some(ctx) = parts.extensions.get::<Ctx>() {
            return Ok(ctx.clone());
        }

        let Some(token) = token_from_headers(&parts.headers) else {
            return Ok(Self::new(None));
        };

        let Some(keys) = parts.extensions.get::<SessionKeys>() else {
            tracing::error!("session keys are not installed, treating request as anonymous");
            return Ok(Self::new(None));
        };

        let user = keys.verify(&token).ok().map(|claims| User {
            id: claims.sub,
            email: claims.email,
        });

        Ok(Self::new(user))
    }
}
