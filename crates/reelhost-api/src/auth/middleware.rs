use crate::auth::jwt::IdentityResolver;
use crate::auth::models::AuthUser;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use reelhost_core::AppError;
use std::sync::Arc;

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn auth_middleware(
    State(resolver): State<Arc<dyn IdentityResolver>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Couldn't find JWT".to_string(),
            ))
            .into_response();
        }
    };

    // Owned, so the request is not borrowed across the await
    let Some(token) = bearer_token(auth_header).map(str::to_string) else {
        return HttpAppError(AppError::Unauthorized(
            "Invalid authorization header format".to_string(),
        ))
        .into_response();
    };

    let user_id = match resolver.resolve(&token).await {
        Ok(user_id) => user_id,
        Err(e) => return HttpAppError(e).into_response(),
    };

    tracing::debug!(user_id = %user_id, "Request authenticated");
    request.extensions_mut().insert(AuthUser { user_id });

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Bearer   "), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("bearer abc"), None);
    }
}
