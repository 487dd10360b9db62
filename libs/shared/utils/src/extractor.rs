use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_models::session::SessionContext;

/// Middleware that lifts the caller's bearer credential into an explicit
/// SessionContext. Token validation belongs to the records service; here the
/// credential is only carried through to boundary calls.
pub async fn session_middleware(
    State(_config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    let token = auth_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

    // The session owns its token, so the header borrow ends here.
    let session = SessionContext::new(token.to_string());
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{middleware, Extension, Router};
    use tower::ServiceExt;

    async fn whoami(Extension(session): Extension<SessionContext>) -> String {
        session.token().to_string()
    }

    fn app() -> Router {
        let config = Arc::new(AppConfig {
            records_api_url: "http://localhost".to_string(),
            records_service_key: "test-key".to_string(),
        });

        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(config, session_middleware))
    }

    #[tokio::test]
    async fn bearer_token_is_carried_into_the_session_context() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("Authorization", "Bearer patient-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"patient-token");
    }

    #[tokio::test]
    async fn missing_authorization_header_is_rejected() {
        let response = app()
            .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("Authorization", "Token abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
