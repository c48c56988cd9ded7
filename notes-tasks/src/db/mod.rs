mod migrations;

use rusqlite::{functions::FunctionFlags, ErrorCode};
use uuid::Uuid;

pub use rusqlite;
pub use tokio_rusqlite;

use crate::config::config;

use migrations::MIGRATIONS;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("not_found")]
    NotFound(String),
    #[error("conflict")]
    Conflict(String),
    #[error(transparent)]
    TokioRusqlite(tokio_rusqlite::Error),
    #[error(transparent)]
    Rusqlite(rusqlite::Error),
}

impl Error {
    pub fn not_found_message(self, message: impl Into<String>) -> Self {
        if matches!(self, Self::NotFound(_)) {
            return Self::NotFound(message.into());
        }
        self
    }

    pub fn conflict_message(self, message: impl Into<String>) -> Self {
        if matches!(self, Self::Conflict(_)) {
            return Self::Conflict(message.into());
        }
        self
    }
}

fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == ErrorCode::ConstraintViolation
                && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl From<tokio_rusqlite::Error> for Error {
    fn from(error: tokio_rusqlite::Error) -> Self {
        match error {
            tokio_rusqlite::Error::Rusqlite(error) => Self::from(error),
            error => Self::TokioRusqlite(error),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        match error {
            rusqlite::Error::QueryReturnedNoRows => Self::NotFound("Not found".into()),
            error if is_unique_violation(&error) => Self::Conflict("Already exists".into()),
            error => Self::Rusqlite(error),
        }
    }
}

pub type DB = tokio_rusqlite::Connection;

pub async fn init_db() -> Result<DB> {
    let database_url = &config().database_url;
    let conn = tokio_rusqlite::Connection::open(database_url).await?;

    conn.call(|conn| {
        add_uuid_functions(conn)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        MIGRATIONS
            .to_latest(conn)
            .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;

        Ok(())
    })
    .await?;

    tracing::debug!("database ready at {database_url}");

    Ok(conn)
}

#[cfg(test)]
pub async fn init_test_db() -> Result<DB> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;

    conn.call(|conn| {
        add_uuid_functions(conn)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;

        MIGRATIONS
            .to_latest(conn)
            .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;

        Ok(())
    })
    .await?;

    Ok(conn)
}

fn add_uuid_functions(conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function("uuid7_now", 0, FunctionFlags::SQLITE_UTF8, |_| Ok(Uuid::now_v7()))?;

    conn.create_scalar_function(
        "uuid_blob",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value = ctx.get::<String>(0)?;
            let uuid = Uuid::parse_str(&value).map_err(|e| rusqlite::Error::UserFunctionError(e.into()))?;

            Ok(uuid)
        },
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn maps_no_rows_to_not_found() {
        let db = init_test_db().await.unwrap();

        let result = db
            .call(|conn| {
                conn.query_row("SELECT id FROM users WHERE email = 'nobody'", [], |r| r.get::<_, Uuid>(0))
                    .map_err(|e| e.into())
            })
            .await
            .map_err(Error::from)
            .map_err(|e| e.not_found_message("User not found"));

        assert!(matches!(result, Err(Error::NotFound(message)) if message == "User not found"));
    }

    #[tokio::test]
    async fn maps_unique_violation_to_conflict() {
        let db = init_test_db().await.unwrap();

        let result = db
            .call(|conn| {
                conn.execute(
                    "INSERT INTO users (name, email, password_hash) VALUES ('a', 'a@mail.com', 'x')",
                    [],
                )?;
                conn.execute(
                    "INSERT INTO users (name, email, password_hash) VALUES ('b', 'a@mail.com', 'y')",
                    [],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from);

        assert!(matches!(result, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn uuid_blob_round_trips() {
        let db = init_test_db().await.unwrap();

        let id = db
            .call(|conn| {
                conn.query_row(
                    "SELECT uuid_blob('018f6146-32f4-7948-8289-cfb5cdb2b2af')",
                    [],
                    |r| r.get::<_, Uuid>(0),
                )
                .map_err(|e| e.into())
            })
            .await
            .unwrap();

        assert_eq!(id.to_string(), "018f6146-32f4-7948-8289-cfb5cdb2b2af");
    }
}
