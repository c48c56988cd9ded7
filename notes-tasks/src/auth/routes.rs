use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    ctx::BaseParams,
    openapi::{
        aide::{
            axum::{routing::get, routing::post_with, ApiRouter, IntoApiResponse},
            NoApi,
        },
        Json,
    },
    state::AppState,
    users::PublicUser,
    Result,
};

use super::{
    handlers::{self, Credentials, LoginResponse, RegisterUser},
    session::{removal_cookie, SessionKeys},
};

pub fn router(state: AppState) -> ApiRouter {
    ApiRouter::new()
        .api_route(
            "/api/auth/signup",
            post_with(signup, |t| t.response::<201, Json<PublicUser>>()),
        )
        .api_route("/api/auth/session", get(session))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .with_state(state)
}

async fn signup(NoApi(base): NoApi<BaseParams>, Json(args): Json<RegisterUser>) -> impl IntoApiResponse {
    handlers::register(args, base.db)
        .await
        .map(|user| (StatusCode::CREATED, Json(user)))
}

async fn session(NoApi(base): NoApi<BaseParams>) -> impl IntoApiResponse {
    handlers::current_user(base).await.map(Json)
}

async fn login(
    base: BaseParams,
    State(keys): State<SessionKeys>,
    jar: CookieJar,
    Json(args): Json<Credentials>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let login = handlers::login(args, &keys, base.db).await?;
    let cookie = keys.cookie(&login.session);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            user: login.user,
            expires_at: login.session.expires_at,
        }),
    ))
}

async fn logout(jar: CookieJar) -> impl IntoResponse {
    (jar.remove(removal_cookie()), StatusCode::NO_CONTENT)
}
