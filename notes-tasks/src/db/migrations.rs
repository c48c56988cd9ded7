use lazy_static::lazy_static;
use rusqlite_migration::{Migrations, M};

lazy_static! {
    pub static ref MIGRATIONS: Migrations<'static> = Migrations::new(vec![
        M::up(
            r#"
            CREATE TABLE users (
                id BLOB PRIMARY KEY CHECK(length(id) = 16) NOT NULL UNIQUE DEFAULT (uuid7_now()),
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,

                created_at DATETIME NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
                updated_at DATETIME
            );
        "#
        ),
        M::up(
            r#"
            CREATE TABLE notes (
                id BLOB PRIMARY KEY CHECK(length(id) = 16) NOT NULL UNIQUE DEFAULT (uuid7_now()),
                user_id BLOB NOT NULL CHECK(length(user_id) = 16),

                title TEXT NOT NULL DEFAULT '',
                content TEXT NOT NULL DEFAULT '',

                created_at DATETIME NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
                updated_at DATETIME,

                FOREIGN KEY (user_id) REFERENCES users (id)
            );

            CREATE INDEX notes_user_id ON notes (user_id);
        "#
        ),
        M::up(
            r#"
            CREATE TABLE tasks (
                id BLOB PRIMARY KEY CHECK(length(id) = 16) NOT NULL UNIQUE DEFAULT (uuid7_now()),
                user_id BLOB NOT NULL CHECK(length(user_id) = 16),

                title TEXT NOT NULL DEFAULT '',
                done INTEGER NOT NULL DEFAULT 0 CHECK(done IN (0, 1)),

                created_at DATETIME NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
                updated_at DATETIME,

                FOREIGN KEY (user_id) REFERENCES users (id)
            );

            CREATE INDEX tasks_user_id ON tasks (user_id, created_at);
        "#
        ),
    ]);
}
