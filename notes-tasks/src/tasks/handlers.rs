use rusqlite::{named_params, Row};
use uuid::Uuid;

use crate::{ctx::BaseParams, db, Error, Result};

use super::{CreateTask, FindTasksResponse, Task, UpdateTask};

const TASK_COLUMNS: &str = "id, user_id, title, done, created_at, updated_at";

impl<'a> TryFrom<&Row<'a>> for Task {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'a>) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            done: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

fn task_not_found(error: db::Error) -> Error {
    error.not_found_message("Task not found").into()
}

/// Newest first; rows created within the same millisecond fall back to insertion order.
pub async fn find_tasks(BaseParams { db, ctx }: BaseParams) -> Result<FindTasksResponse> {
    let user_id = ctx.require_user_id()?;

    let tasks = db
        .call(move |conn| {
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = :user_id ORDER BY created_at DESC, rowid DESC"
            ))?;
            let tasks = stmt
                .query_map(named_params! { ":user_id": user_id }, |row| Task::try_from(row))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(tasks)
        })
        .await
        .map_err(db::Error::from)?;

    Ok(FindTasksResponse { results: tasks })
}

pub async fn create_task(CreateTask { title }: CreateTask, BaseParams { db, ctx }: BaseParams) -> Result<Task> {
    let user_id = ctx.require_user_id()?;

    let task = db
        .call(move |conn| {
            conn.query_row(
                &format!("INSERT INTO tasks (user_id, title, done) VALUES (:user_id, :title, 0) RETURNING {TASK_COLUMNS}"),
                named_params! { ":user_id": user_id, ":title": title },
                |row| Task::try_from(row),
            )
            .map_err(|e| e.into())
        })
        .await
        .map_err(db::Error::from)?;

    tracing::debug!(task_id = %task.id, %user_id, "task created");
    Ok(task)
}

pub async fn get_task(task_id: Uuid, BaseParams { db, ctx }: BaseParams) -> Result<Task> {
    let user_id = ctx.require_user_id()?;

    db.call(move |conn| {
        conn.query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = :id AND user_id = :user_id"),
            named_params! { ":id": task_id, ":user_id": user_id },
            |row| Task::try_from(row),
        )
        .map_err(|e| e.into())
    })
    .await
    .map_err(db::Error::from)
    .map_err(task_not_found)
}

pub async fn update_task(
    task_id: Uuid,
    UpdateTask { title, done }: UpdateTask,
    BaseParams { db, ctx }: BaseParams,
) -> Result<Task> {
    let user_id = ctx.require_user_id()?;

    db.call(move |conn| {
        conn.query_row(
            &format!(
                r#"UPDATE tasks SET
                    title = coalesce(:title, title),
                    done = coalesce(:done, done),
                    updated_at = :updated_at
                WHERE id = :id AND user_id = :user_id
                RETURNING {TASK_COLUMNS}"#
            ),
            named_params! {
                ":title": title,
                ":done": done,
                ":updated_at": chrono::Utc::now(),
                ":id": task_id,
                ":user_id": user_id,
            },
            |row| Task::try_from(row),
        )
        .map_err(|e| e.into())
    })
    .await
    .map_err(db::Error::from)
    .map_err(task_not_found)
}

pub async fn delete_task(task_id: Uuid, BaseParams { db, ctx }: BaseParams) -> Result<Task> {
    let user_id = ctx.require_user_id()?;

    let task = db
        .call(move |conn| {
            conn.query_row(
                &format!("DELETE FROM tasks WHERE id = :id AND user_id = :user_id RETURNING {TASK_COLUMNS}"),
                named_params! { ":id": task_id, ":user_id": user_id },
                |row| Task::try_from(row),
            )
            .map_err(|e| e.into())
        })
        .await
        .map_err(db::Error::from)
        .map_err(task_not_found)?;

    tracing::debug!(task_id = %task.id, %user_id, "task deleted");
    Ok(task)
}
