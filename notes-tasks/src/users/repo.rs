use rusqlite::named_params;

use crate::db::{self, DB};

use super::*;

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at";

#[derive(Debug, Clone)]
pub struct CreateUserParameters {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GetUserByEmailParameters {
    pub user_email: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GetUserByIdParameters {
    pub user_id: UserId,
}

pub async fn create(db: DB, args: CreateUserParameters) -> db::Result<User> {
    let user_email = args.email.clone();
    let user = db
        .call(move |conn| {
            conn.query_row(
                &format!(
                    r#"INSERT INTO users (name, email, password_hash) VALUES (:name, :email, :password_hash)
                    RETURNING {USER_COLUMNS}"#
                ),
                named_params! {
                    ":name": args.name,
                    ":email": args.email,
                    ":password_hash": args.password_hash,
                },
                |r| User::try_from(r),
            )
            .map_err(|e| e.into())
        })
        .await
        .map_err(db::Error::from)
        .map_err(|e| e.conflict_message(format!("User '{}' already exists", user_email)))?;

    Ok(user)
}

pub async fn find_one_by_id(db: DB, args: GetUserByIdParameters) -> db::Result<User> {
    let user_id = args.user_id;
    let user = db
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
                [args.user_id],
                |r| User::try_from(r),
            )
            .map_err(|e| e.into())
        })
        .await
        .map_err(db::Error::from)
        .map_err(|e| e.not_found_message(format!("User '{}' not found", user_id)))?;

    Ok(user)
}

pub async fn find_one_by_email(db: DB, args: GetUserByEmailParameters) -> db::Result<User> {
    let user_email = args.user_email.to_owned();
    let user = db
        .call(|conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"),
                [args.user_email],
                |r| User::try_from(r),
            )
            .map_err(|e| e.into())
        })
        .await
        .map_err(db::Error::from)
        .map_err(|e| e.not_found_message(format!("User '{}' not found", user_email)))?;

    Ok(user)
}

pub async fn email_taken(db: DB, email: String) -> db::Result<bool> {
    let taken = db
        .call(|conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)",
                [email],
                |r| r.get::<_, bool>(0),
            )
            .map_err(|e| e.into())
        })
        .await?;

    Ok(taken)
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::db::{self, init_test_db};

    use super::*;

    fn params(email: &str) -> CreateUserParameters {
        CreateUserParameters {
            name: "Test".into(),
            email: email.into(),
            password_hash: "$argon2id$stub".into(),
        }
    }

    #[tokio::test]
    async fn user_create() {
        let db = init_test_db().await.unwrap();
        let user = create(db, params("test@mail.com")).await.unwrap();

        assert_eq!(user.email, "test@mail.com");
        assert_eq!(user.name, "Test");
    }

    #[tokio::test]
    async fn user_create_duplicate_email() {
        let db = init_test_db().await.unwrap();
        create(db.clone(), params("test@mail.com")).await.unwrap();

        let user = create(db, params("test@mail.com")).await;

        assert!(matches!(user.err(), Some(db::Error::Conflict(_))));
    }

    #[tokio::test]
    async fn user_get_by_id() {
        let db = init_test_db().await.unwrap();
        let user = create(db.clone(), params("test@mail.com")).await.unwrap();

        let user = find_one_by_id(db, GetUserByIdParameters { user_id: user.id })
            .await
            .unwrap();

        assert_eq!(user.email, "test@mail.com");
    }

    #[tokio::test]
    async fn user_get_by_email() {
        let db = init_test_db().await.unwrap();
        create(db.clone(), params("test@mail.com")).await.unwrap();

        let user = find_one_by_email(
            db.clone(),
            GetUserByEmailParameters {
                user_email: "test@mail.com".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(user.email, "test@mail.com");
        assert!(email_taken(db, "test@mail.com".into()).await.unwrap());
    }

    #[tokio::test]
    async fn user_not_found() {
        let db = init_test_db().await.unwrap();

        let user = find_one_by_email(
            db.clone(),
            GetUserByEmailParameters {
                user_email: "test@mail.com".into(),
            },
        )
        .await;

        assert!(matches!(user.err(), Some(db::Error::NotFound(_))));

        let user = find_one_by_id(
            db.clone(),
            GetUserByIdParameters {
                user_id: Uuid::new_v4(),
            },
        )
        .await;

        assert!(matches!(user.err(), Some(db::Error::NotFound(_))));
        assert!(!email_taken(db, "test@mail.com".into()).await.unwrap());
    }
}
