use std::sync::{Arc, OnceLock};

use crate::error_responses;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Request,
    },
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::db;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("not_found")]
    NotFound(String),
    #[error("conflict")]
    Conflict(String),

    // auth
    #[error("unauthorized")]
    Unauthorized,
    #[error("invalid_credentials")]
    InvalidCredentials,

    // validation
    #[error("validation")]
    Validation(String),
    #[error("validation")]
    JsonValidation(#[from] JsonRejection),
    #[error("validation")]
    PathValidation(#[from] PathRejection),

    #[error(transparent)]
    DB(db::Error),

    // other
    #[error(transparent)]
    /// An application-specific error.
    App(Box<dyn std::error::Error + Send + Sync + 'static>),

    #[error("unexpected")]
    Unexpected(String),
}

impl From<db::Error> for Error {
    fn from(error: db::Error) -> Self {
        match error {
            db::Error::NotFound(msg) => Self::NotFound(msg),
            db::Error::Conflict(msg) => Self::Conflict(msg),
            error => Self::DB(error),
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::App(error.into())
    }
}

// Response

error_responses! {
    not_found: 404,
    conflict: 409,
    validation: 400,
    path_validation: 400,
    json_validation: 400,
    unauthorized: 401,
    unexpected: 500
}

impl From<&Error> for ErrorResponse {
    fn from(error: &Error) -> Self {
        let errors = errors();
        match error {
            Error::NotFound(message) => errors.not_found.with_message(message),
            Error::Conflict(message) => errors.conflict.with_message(message),
            Error::Unauthorized => errors.unauthorized.with_message("Unauthorized"),
            Error::InvalidCredentials => errors.unauthorized.with_message("Invalid email or password"),
            Error::Validation(message) => errors.validation.with_message(message),
            Error::JsonValidation(error) => errors.json_validation.with_message(error.body_text()),
            Error::PathValidation(error) => errors.path_validation.with_message(error.body_text()),
            _ => errors.unexpected.with_message("Unexpected"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let error = Arc::new(self);

        let error_res = ErrorResponse::from(error.as_ref());
        let status = error_res.status;

        let mut res = axum::Json(error_res).into_response();
        res.extensions_mut().insert(error);

        *res.status_mut() = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        res
    }
}

pub async fn on_error(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let error = response.extensions().get::<Arc<Error>>().map(Arc::as_ref);
    if let Some(error) = error {
        if matches!(error, Error::DB(_) | Error::App(_) | Error::Unexpected(_)) {
            tracing::error!("{:?}", error);
        } else {
            tracing::debug!("{:?}", error);
        }
    }

    response
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, JsonSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: Option<String>,
    pub status: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, status: u16) -> Self {
        Self {
            error: error.into(),
            status,
            ..Default::default()
        }
    }

    pub fn with_message(&self, message: impl Into<String>) -> Self {
        let mut res = self.clone();
        res.message = Some(message.into());
        res
    }
}

/// Typed responses built once and cloned per error
/// ```rust,ignore
/// error_responses! {
///     not_found: 404,
///     unexpected: 500
/// }
///
/// impl From<&Error> for ErrorResponse {
///     fn from(error: &Error) -> Self {
///     let errors = errors(); // <- from macro
///     match error {
///         Error::NotFound(message) => errors.not_found.with_message(message),
///         Error::Unexpected(message) => errors.unexpected.with_message(message),
///     }
/// }
/// ```
#[macro_export]
macro_rules! error_responses {
    (
        $($name:ident: $code:expr),* $(,)?
    ) => {
        #[derive(Debug, Clone)]
        struct Responses {
            $(
                $name: ErrorResponse,
            )*
        }

        static ERRORS: OnceLock<Responses> = OnceLock::new();

        fn errors() -> &'static Responses {
            ERRORS.get_or_init(|| Responses {
                $(
                    $name: ErrorResponse::new(stringify!($name), $code),
                )*
            })
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_and_session_failures_share_status() {
        let session = ErrorResponse::from(&Error::Unauthorized);
        let credentials = ErrorResponse::from(&Error::InvalidCredentials);

        assert_eq!(session.status, 401);
        assert_eq!(credentials.status, 401);
        assert_eq!(credentials.error, "unauthorized");
    }

    #[test]
    fn internal_errors_hide_details() {
        let error = Error::DB(db::Error::Rusqlite(rusqlite::Error::InvalidQuery));
        let res = ErrorResponse::from(&error);

        assert_eq!(res.status, 500);
        assert_eq!(res.error, "unexpected");
        assert_eq!(res.message.as_deref(), Some("Unexpected"));
    }

    #[test]
    fn db_errors_keep_their_kind() {
        assert!(matches!(
            Error::from(db::Error::NotFound("Note not found".into())),
            Error::NotFound(_)
        ));
        assert!(matches!(
            Error::from(db::Error::Conflict("User already exists".into())),
            Error::Conflict(_)
        ));
    }

    #[test]
    fn response_carries_status() {
        let res = Error::Conflict("User already exists".into()).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        assert!(res.extensions().get::<Arc<Error>>().is_some());
    }
}
