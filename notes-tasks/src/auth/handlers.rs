use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    ctx::BaseParams,
    db::{self, DB},
    users::{
        repo::{self, CreateUserParameters, GetUserByEmailParameters, GetUserByIdParameters},
        PublicUser,
    },
    Error, Result,
};

use super::{
    password,
    session::{IssuedSession, SessionKeys},
};

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RegisterUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
pub struct Credentials {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LoginResponse {
    pub user: PublicUser,
    pub expires_at: DateTime<Utc>,
}

fn required(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn required_secret(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// Verified against when the email is unknown so both login failures cost the same.
fn dummy_hash() -> &'static str {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();
    DUMMY_HASH.get_or_init(|| password::hash_password("dummy-password").unwrap_or_default())
}

pub async fn register(RegisterUser { name, email, password }: RegisterUser, db: DB) -> Result<PublicUser> {
    let (Some(name), Some(email), Some(password)) = (required(name), required(email), required_secret(password)) else {
        return Err(Error::Validation("All fields are required".into()));
    };

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    if repo::email_taken(db.clone(), email.clone()).await? {
        return Err(Error::Conflict("User already exists".into()));
    }

    let password_hash = password::hash_password_blocking(password).await?;

    let user = repo::create(
        db,
        CreateUserParameters {
            name,
            email,
            password_hash,
        },
    )
    .await
    .map_err(|e| e.conflict_message("User already exists"))?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok(PublicUser::from(&user))
}

pub struct Login {
    pub user: PublicUser,
    pub session: IssuedSession,
}

pub async fn login(Credentials { email, password }: Credentials, keys: &SessionKeys, db: DB) -> Result<Login> {
    let (Some(email), Some(password)) = (required(email), required_secret(password)) else {
        return Err(Error::Validation("Email and password are required".into()));
    };

    let user = match repo::find_one_by_email(
        db,
        GetUserByEmailParameters {
            user_email: email.clone(),
        },
    )
    .await
    {
        Ok(user) => user,
        Err(db::Error::NotFound(_)) => {
            let _ = password::verify_password_blocking(password, dummy_hash().to_owned()).await;
            tracing::warn!(%email, "login failed: no such user");
            return Err(Error::InvalidCredentials);
        }
        Err(error) => return Err(error.into()),
    };

    if !password::verify_password_blocking(password, user.password_hash.clone()).await? {
        tracing::warn!(user_id = %user.id, "login failed: wrong password");
        return Err(Error::InvalidCredentials);
    }

    let session = keys.issue(user.id, &user.email)?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Login {
        user: PublicUser::from(&user),
        session,
    })
}

pub async fn current_user(BaseParams { db, ctx }: BaseParams) -> Result<PublicUser> {
    let user_id = ctx.require_user_id()?;

    // a valid token for a user that no longer resolves is still unauthenticated
    let user = repo::find_one_by_id(db, GetUserByIdParameters { user_id })
        .await
        .map_err(|e| match e {
            db::Error::NotFound(_) => Error::Unauthorized,
            e => e.into(),
        })?;

    Ok(PublicUser::from(&user))
}
