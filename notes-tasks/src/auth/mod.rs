mod handlers;
pub mod password;
mod routes;
pub mod session;

pub use handlers::{Credentials, LoginResponse, RegisterUser};
pub use routes::router;
pub use session::SessionKeys;

pub mod middleware {
    use axum::{extract::Request, middleware::Next, response::Response};

    use crate::{ctx::Ctx, Error, Result};

    /// Single session gate for every protected route.
    pub async fn protected(ctx: Ctx, mut request: Request, next: Next) -> Result<Response> {
        ctx.user.as_ref().ok_or(Error::Unauthorized)?;

        request.extensions_mut().insert(ctx);
        Ok(next.run(request).await)
    }
}
