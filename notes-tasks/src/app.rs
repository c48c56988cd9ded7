use aide::scalar::Scalar;
use axum::{middleware, response::IntoResponse, routing::get, Extension, Json, Router};
use std::sync::Arc;
use tower::ServiceBuilder;

use crate::config;

use rand::Rng;
use serde_json::json;

use crate::{
    auth::{self, SessionKeys},
    db::DB,
    errors::{self, on_error, ErrorResponse},
    notes,
    openapi::{self, aide::axum::ApiRouter, OpenApi},
    state::AppState,
    summarize::{self, SharedSummarizer},
    tasks,
};

pub struct AppParams<Router>
where
    Router: FnOnce(AppState) -> ApiRouter,
{
    pub db: DB,
    pub summarizer: SharedSummarizer,
    pub session_keys: SessionKeys,
    pub router: Router,
}

/// Every JSON API route of the service.
pub fn routes(state: AppState) -> ApiRouter {
    ApiRouter::new()
        .merge(auth::router(state.clone()))
        .merge(notes::router(state.clone()))
        .merge(tasks::router(state.clone()))
        .merge(summarize::router(state))
}

pub async fn create<R>(
    AppParams {
        db,
        summarizer,
        session_keys,
        router,
    }: AppParams<R>,
) -> errors::Result<(Router, OpenApi)>
where
    R: FnOnce(AppState) -> ApiRouter,
{
    let mut api = OpenApi::default();

    let state = AppState {
        conn: db.clone(),
        summarizer,
        session_keys: session_keys.clone(),
    };

    let docs_router = axum::Router::new()
        .route(
            "/__docs__",
            get(Scalar::new("/__docs__/spec.json")
                .with_title("Notes & Tasks API")
                .axum_handler()),
        )
        .route("/__docs__/spec.json", get(serve_docs));

    let app = ApiRouter::new()
        .route("/__version__", get(version))
        .route("/__heartbeat__", get(heartbeat))
        .route("/__lbheartbeat__", get(lbheartbeat))
        .merge(docs_router)
        .merge(router(state))
        .finish_api_with(&mut api, |t| {
            t.title("Notes & Tasks")
                .default_response::<openapi::Json<ErrorResponse>>()
        })
        .layer(
            ServiceBuilder::new()
                .layer(Extension(db))
                .layer(Extension(session_keys))
                .layer(Extension(Arc::new(api.clone())))
                .layer(middleware::from_fn(on_error)),
        );

    Ok((app, api))
}

async fn version() -> impl IntoResponse {
    let config = &config();
    Json(json!({
        "source" : config.source,
        "version": config.version,
        "commit" : config.git_commit,
        "build"  : config.pipeline_id
    }))
}

async fn heartbeat() -> impl IntoResponse {
    let mut rng = rand::thread_rng();
    let random: u32 = rng.gen_range(0..=10000);

    Json(json!({
        "status" : "ok",
        "random": random,
    }))
}

async fn lbheartbeat() -> impl IntoResponse {
    ""
}

async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoResponse {
    Json(api.as_ref()).into_response()
}
