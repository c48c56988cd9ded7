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

use super::{handlers, CreateTask, Task, UpdateTask};

#[derive(Debug, Deserialize, JsonSchema)]
struct TaskIdPath {
    task_id: Uuid,
}

pub fn router(state: AppState) -> ApiRouter {
    ApiRouter::new()
        .api_route(
            "/api/tasks",
            get(find_tasks).post_with(create_task, |t| t.response::<201, Json<Task>>()),
        )
        .api_route(
            "/api/tasks/{task_id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route_layer(middleware::from_fn(auth::middleware::protected))
        .with_state(state)
}

async fn find_tasks(NoApi(base): NoApi<BaseParams>) -> impl IntoApiResponse {
    handlers::find_tasks(base).await.map(Json)
}

async fn create_task(NoApi(base): NoApi<BaseParams>, Json(args): Json<CreateTask>) -> impl IntoApiResponse {
    handlers::create_task(args, base)
        .await
        .map(|task| (StatusCode::CREATED, Json(task)))
}

async fn get_task(
    Path(TaskIdPath { task_id }): Path<TaskIdPath>,
    NoApi(base): NoApi<BaseParams>,
) -> impl IntoApiResponse {
    handlers::get_task(task_id, base).await.map(Json)
}

async fn update_task(
    Path(TaskIdPath { task_id }): Path<TaskIdPath>,
    NoApi(base): NoApi<BaseParams>,
    Json(args): Json<UpdateTask>,
) -> impl IntoApiResponse {
    handlers::update_task(task_id, args, base).await.map(Json)
}

async fn delete_task(
    Path(TaskIdPath { task_id }): Path<TaskIdPath>,
    NoApi(base): NoApi<BaseParams>,
) -> impl IntoApiResponse {
    handlers::delete_task(task_id, base).await.map(Json)
}
