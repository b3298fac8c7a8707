use crate::auth::jwt::{parse_bearer_token, validate_jwt};
use crate::auth::models::UserContext;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthState {
    pub jwt_secret: String,
}

/// Reject requests without a valid bearer token; otherwise attach the caller's
/// [`UserContext`] for downstream extractors.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let user_id = match parse_bearer_token(request.headers())
        .and_then(|token| validate_jwt(token, &auth_state.jwt_secret))
    {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::debug!(
                method = %request.method(),
                path = %request.uri().path(),
                "Authentication failed"
            );
            return HttpAppError(e).into_response();
        }
    };

    request.extensions_mut().insert(UserContext { user_id });
    next.run(request).await
}
