use axum::{http::StatusCode, middleware};
use schemars::JsonSchema;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth,
    ctx::BaseParams,
    openapi::{
        aide::{
            axum::{routing::get, ApiRouter, IntoApiResponse},
            NoApi,
        },
        Json, Path,
    },
    state::AppState,
};

use super::{handlers, CreateNote, Note, UpdateNote};

#[derive(Debug, Deserialize, JsonSchema)]
struct NoteIdPath {
    note_id: Uuid,
}

pub fn router(state: AppState) -> ApiRouter {
    ApiRouter::new()
        .api_route(
            "/api/notes",
            get(find_notes).post_with(create_note, |t| t.response::<201, Json<Note>>()),
        )
        .api_route(
            "/api/notes/{note_id}",
            get(get_note).put(update_note).delete(delete_note),
        )
        .route_layer(middleware::from_fn(auth::middleware::protected))
        .with_state(state)
}

async fn find_notes(NoApi(base): NoApi<BaseParams>) -> impl IntoApiResponse {
    handlers::find_notes(base).await.map(Json)
}

async fn create_note(NoApi(base): NoApi<BaseParams>, Json(args): Json<CreateNote>) -> impl IntoApiResponse {
    handlers::create_note(args, base)
        .await
        .map(|r| (StatusCode::CREATED, Json(r)))
}

async fn get_note(
    Path(NoteIdPath { note_id }): Path<NoteIdPath>,
    NoApi(base): NoApi<BaseParams>,
) -> impl IntoApiResponse {
    handlers::get_note(note_id, base).await.map(Json)
}

async fn update_note(
    Path(NoteIdPath { note_id }): Path<NoteIdPath>,
    NoApi(base): NoApi<BaseParams>,
    Json(args): Json<UpdateNote>,
) -> impl IntoApiResponse {
    handlers::update_note(note_id, args, base).await.map(Json)
}

async fn delete_note(
    Path(NoteIdPath { note_id }): Path<NoteIdPath>,
    NoApi(base): NoApi<BaseParams>,
) -> impl IntoApiResponse {
    handlers::delete_note(note_id, base).await.map(Json)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use uuid::Uuid;

    use crate::{
        auth::SessionKeys,
        db::init_test_db,
        errors::{ErrorResponse, Result},
        notes::{FindNotesResponse, Note},
        tests::{signed_in, test_server, test_session_keys},
    };

    #[tokio::test]
    async fn create_and_find_notes() -> Result<()> {
        let server = signed_in(test_server(init_test_db().await?).await?, "ada@mail.com").await;

        let response = server
            .post("/api/notes")
            .json(&json!({ "title": "world", "content": "hello" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::CREATED);
        let created = response.json::<Note>();
        assert_eq!(created.title, "world");

        let response = server.get("/api/notes").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let notes = response.json::<FindNotesResponse>().results;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, created.id);
        Ok(())
    }

    #[tokio::test]
    async fn create_note_without_content() -> Result<()> {
        let server = signed_in(test_server(init_test_db().await?).await?, "ada@mail.com").await;

        let response = server.post("/api/notes").json(&json!({ "title": "empty" })).await;

        assert_eq!(response.status_code(), StatusCode::CREATED);
        assert_eq!(response.json::<Note>().content, "");
        Ok(())
    }

    #[tokio::test]
    async fn update_then_get_note() -> Result<()> {
        let server = signed_in(test_server(init_test_db().await?).await?, "ada@mail.com").await;
        let created = server
            .post("/api/notes")
            .json(&json!({ "title": "first", "content": "1" }))
            .await
            .json::<Note>();

        let response = server
            .put(&format!("/api/notes/{}", created.id))
            .json(&json!({ "content": "2" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let updated = response.json::<Note>();
        assert_eq!(updated.title, "first");
        assert_eq!(updated.content, "2");

        let fetched = server.get(&format!("/api/notes/{}", created.id)).await.json::<Note>();
        assert_eq!(fetched.content, "2");
        Ok(())
    }

    #[tokio::test]
    async fn delete_note() -> Result<()> {
        let db = init_test_db().await?;
        let server = signed_in(test_server(db.clone()).await?, "ada@mail.com").await;
        let created = server
            .post("/api/notes")
            .json(&json!({ "title": "first", "content": "1" }))
            .await
            .json::<Note>();

        let response = server.delete(&format!("/api/notes/{}", created.id)).await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.json::<Note>().title, "first");

        let count = db
            .call(|conn| {
                conn.query_row::<u32, _, _>("select count(*) from notes", [], |r| r.get(0))
                    .map_err(|e| e.into())
            })
            .await
            .unwrap();

        assert_eq!(count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn other_users_notes_look_missing() -> Result<()> {
        let db = init_test_db().await?;
        let alice = signed_in(test_server(db.clone()).await?, "alice@mail.com").await;
        let bob = signed_in(test_server(db.clone()).await?, "bob@mail.com").await;

        let created = alice
            .post("/api/notes")
            .json(&json!({ "title": "private", "content": "secret" }))
            .await
            .json::<Note>();

        assert!(bob.get("/api/notes").await.json::<FindNotesResponse>().results.is_empty());

        let foreign = bob
            .put(&format!("/api/notes/{}", created.id))
            .json(&json!({ "title": "hacked" }))
            .await;
        let missing = bob
            .put(&format!("/api/notes/{}", Uuid::now_v7()))
            .json(&json!({ "title": "hacked" }))
            .await;

        assert_eq!(foreign.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(foreign.text(), missing.text());

        let delete = bob.delete(&format!("/api/notes/{}", created.id)).await;
        assert_eq!(delete.status_code(), StatusCode::NOT_FOUND);

        let kept = alice.get(&format!("/api/notes/{}", created.id)).await.json::<Note>();
        assert_eq!(kept.title, "private");
        Ok(())
    }

    #[tokio::test]
    async fn invalid_note_id() -> Result<()> {
        let server = signed_in(test_server(init_test_db().await?).await?, "ada@mail.com").await;

        let response = server.get("/api/notes/not-a-uuid").await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<ErrorResponse>().error, "path_validation");
        Ok(())
    }

    #[tokio::test]
    async fn notes_require_session() -> Result<()> {
        let server = test_server(init_test_db().await?).await?;

        let list = server.get("/api/notes").await;
        let create = server.post("/api/notes").json(&json!({ "title": "x" })).await;

        assert_eq!(list.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(create.status_code(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn notes_reject_foreign_and_expired_tokens() -> Result<()> {
        let server = test_server(init_test_db().await?).await?;
        let user_id = Uuid::now_v7();

        let foreign = SessionKeys::new(b"some-other-secret", 3600).issue(user_id, "ada@mail.com")?;
        let expired = test_session_keys().issue_at(user_id, "ada@mail.com", Utc::now() - Duration::hours(2))?;
        let valid = test_session_keys().issue(user_id, "ada@mail.com")?;

        let response = server.get("/api/notes").authorization_bearer(&foreign.token).await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

        let response = server.get("/api/notes").authorization_bearer(&expired.token).await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

        let response = server.get("/api/notes").authorization_bearer(&valid.token).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        Ok(())
    }
}
