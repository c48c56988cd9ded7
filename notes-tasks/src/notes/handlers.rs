use rusqlite::{params, Row};
use uuid::Uuid;

use crate::{ctx::BaseParams, db, Error, Result};

use super::{CreateNote, FindNotesResponse, Note, UpdateNote};

const NOTE_COLUMNS: &str = "id, user_id, title, content, created_at, updated_at";

impl<'a> TryFrom<&Row<'a>> for Note {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'a>) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            content: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

pub async fn find_notes(BaseParams { db, ctx }: BaseParams) -> Result<FindNotesResponse> {
    let user_id = ctx.require_user_id()?;

    db.call(move |conn| {
        let notes = conn
            .prepare(&format!("SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = ?"))?
            .query_map(params![user_id], |row| Note::try_from(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(FindNotesResponse { results: notes })
    })
    .await
    .map_err(db::Error::from)
    .map_err(Error::from)
}

pub async fn create_note(CreateNote { title, content }: CreateNote, BaseParams { db, ctx }: BaseParams) -> Result<Note> {
    let user_id = ctx.require_user_id()?;

    let note = db
        .call(move |conn| {
            conn.query_row(
                &format!("INSERT INTO notes (user_id, title, content) VALUES (?, ?, ?) RETURNING {NOTE_COLUMNS}"),
                params![user_id, title, content],
                |row| Note::try_from(row),
            )
            .map_err(|e| e.into())
        })
        .await
        .map_err(db::Error::from)
        .map_err(Error::from)?;

    tracing::debug!(note_id = %note.id, %user_id, "note created");
    Ok(note)
}

pub async fn get_note(note_id: Uuid, BaseParams { db, ctx }: BaseParams) -> Result<Note> {
    let user_id = ctx.require_user_id()?;

    db.call(move |conn| {
        let note = conn.query_row(
            &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ? AND user_id = ?"),
            params![note_id, user_id],
            |row| Note::try_from(row),
        )?;
        Ok(note)
    })
    .await
    .map_err(db::Error::from)
    .map_err(|e| db::Error::not_found_message(e, "Note not found"))
    .map_err(Error::from)
}

/// A note owned by someone else is reported exactly like a missing one.
pub async fn update_note(
    note_id: Uuid,
    UpdateNote { title, content }: UpdateNote,
    BaseParams { db, ctx }: BaseParams,
) -> Result<Note> {
    let user_id = ctx.require_user_id()?;

    db.call(move |conn| {
        conn.query_row(
            &format!(
                r#"UPDATE notes SET title = coalesce(?, title), content = coalesce(?, content), updated_at = ?
                WHERE id = ? AND user_id = ?
                RETURNING {NOTE_COLUMNS}"#
            ),
            params![title, content, chrono::Utc::now(), note_id, user_id],
            |row| Note::try_from(row),
        )
        .map_err(|e| e.into())
    })
    .await
    .map_err(db::Error::from)
    .map_err(|e| db::Error::not_found_message(e, "Note not found"))
    .map_err(Error::from)
}

pub async fn delete_note(note_id: Uuid, BaseParams { db, ctx }: BaseParams) -> Result<Note> {
    let user_id = ctx.require_user_id()?;

    db.call(move |conn| {
        conn.query_row(
            &format!("DELETE FROM notes WHERE id = ? AND user_id = ? RETURNING {NOTE_COLUMNS}"),
            params![note_id, user_id],
            |row| Note::try_from(row),
        )
        .map_err(|e| e.into())
    })
    .await
    .map_err(db::Error::from)
    .map_err(|e| db::Error::not_found_message(e, "Note not found"))
    .map_err(Error::from)
}
