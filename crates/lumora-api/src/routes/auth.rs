//! Authentication extractor and routes

use axum::{
    Json, Router,
    extract::{FromRef, FromRequestParts, State, rejection::JsonRejection},
    http::{header::SET_COOKIE, request::Parts},
    routing::{get, post},
};
use lumora_auth::RegisterUser;
use lumora_db::User;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest, UserResponse};

// ==================== Auth Extractor ====================

/// Extractor for the authenticated user
///
/// Guards every protected route: the handler only runs when the request
/// carries a valid token for an existing user.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let user = app_state.resolver.resolve(&parts.headers).await?;
        Ok(CurrentUser(user))
    }
}

// ==================== Auth Routes ====================

/// POST /auth/register
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(request) = payload?;

    let user = state
        .auth
        .register(RegisterUser {
            name: request.name,
            email: request.email,
            password: request.password,
        })
        .await?;

    Ok(Json(user.into()))
}

/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<([(axum::http::HeaderName, String); 1], Json<LoginResponse>), ApiError> {
    let Json(request) = payload?;

    let session = state.auth.login(&request.email, &request.password).await?;

    Ok((
        [(SET_COOKIE, session.set_cookie)],
        Json(LoginResponse {
            message: "Login successful".to_string(),
            access_token: session.token,
            token_type: "bearer".to_string(),
            expires_in: session.expires_in,
        }),
    ))
}

/// GET /auth/me
async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    debug!("Serving identity for user id {}", user.id);
    Json(user.into())
}

/// POST /auth/logout
async fn logout(
    State(state): State<AppState>,
) -> ([(axum::http::HeaderName, String); 1], Json<MessageResponse>) {
    (
        [(SET_COOKIE, state.auth.logout())],
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, WWW_AUTHENTICATE};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use chrono::Duration;
    use lumora_auth::{AuthResolver, AuthService, CookieSettings, JwtConfig, JwtManager};
    use lumora_db::Database;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    use super::*;
    use crate::routes::create_router;

    async fn app() -> Router {
        let db = Database::in_memory().await.unwrap();
        let jwt = Arc::new(
            JwtManager::new(&JwtConfig {
                secret: "router-test-secret-key-0123456789abcdef".to_string(),
                algorithm: "HS256".to_string(),
                token_ttl: Duration::minutes(30),
            })
            .unwrap(),
        );
        let cookie = CookieSettings::default();
        let auth = Arc::new(AuthService::new(db.clone(), jwt.clone(), cookie.clone()).unwrap());
        let resolver = Arc::new(AuthResolver::new(db.clone(), jwt, cookie));
        create_router(AppState::new(db, auth, resolver))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn alice() -> Value {
        json!({"name": "Alice", "email": "a@x.com", "password": "pw123"})
    }

    #[tokio::test]
    async fn test_full_account_flow() {
        let app = app().await;

        // Register
        let response = app
            .clone()
            .oneshot(post_json("/auth/register", alice()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["name"], "Alice");
        assert_eq!(body["email"], "a@x.com");
        assert!(body.get("password_hash").is_none());

        // Duplicate registration
        let response = app
            .clone()
            .oneshot(post_json("/auth/register", alice()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["detail"], "Email already registered");

        // Login
        let response = app
            .clone()
            .oneshot(post_json(
                "/auth/login",
                json!({"email": "a@x.com", "password": "pw123"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap().to_string();
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("SameSite=Lax"));
        let body = body_json(response).await;
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["token_type"], "bearer");
        assert_eq!(body["expires_in"], 1800);
        let token = body["access_token"].as_str().unwrap().to_string();
        assert!(!token.is_empty());
        assert!(set_cookie.starts_with(&format!("token={};", token)));

        // Identity with bearer header
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/auth/me")
                    .header(AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["name"], "Alice");
        assert_eq!(body["id"], 1);

        // Identity with cookie
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/auth/me")
                    .header(COOKIE, format!("token={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Identity without credentials
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/auth/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");

        // Logout
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/logout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cleared = response.headers()[SET_COOKIE].to_str().unwrap().to_string();
        assert!(cleared.starts_with("token=;"));
        assert!(cleared.contains("Max-Age=0"));
        assert_eq!(body_json(response).await["message"], "Logged out successfully");

        // Logout does not revoke the token itself
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/auth/me")
                    .header(AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_failures_look_the_same() {
        let app = app().await;
        app.clone()
            .oneshot(post_json("/auth/register", alice()))
            .await
            .unwrap();

        let wrong_password = app
            .clone()
            .oneshot(post_json(
                "/auth/login",
                json!({"email": "a@x.com", "password": "wrong"}),
            ))
            .await
            .unwrap();
        let unknown_email = app
            .oneshot(post_json(
                "/auth/login",
                json!({"email": "nobody@x.com", "password": "pw123"}),
            ))
            .await
            .unwrap();

        assert_eq!(wrong_password.status(), StatusCode::BAD_REQUEST);
        assert_eq!(wrong_password.status(), unknown_email.status());
        assert!(wrong_password.headers().get(SET_COOKIE).is_none());
        assert_eq!(body_json(wrong_password).await, body_json(unknown_email).await);
    }

    #[tokio::test]
    async fn test_bad_tokens_look_the_same() {
        let app = app().await;

        let mut bodies = Vec::new();
        for header in ["Bearer garbage", "Basic dXNlcjpwdw==", "Bearer a.b.c"] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .uri("/auth/me")
                        .header(AUTHORIZATION, header)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            bodies.push(body_json(response).await);
        }

        assert!(bodies.iter().all(|b| *b == bodies[0]));
        assert_eq!(bodies[0]["detail"], "Could not validate credentials");
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let app = app().await;

        let response = app
            .oneshot(post_json("/auth/register", json!({"name": "Alice"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_invalid_email_is_rejected() {
        let app = app().await;

        let response = app
            .oneshot(post_json(
                "/auth/register",
                json!({"name": "Alice", "email": "alice", "password": "pw123"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_health_and_unknown_route() {
        let app = app().await;

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");

        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
