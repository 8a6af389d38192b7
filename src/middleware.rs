// middleware.rs
use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::IntoResponse,
    Extension,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{ErrorMessage, HttpError},
    utils::token,
    AppState,
};

/// The signed-in caller, as attached by `auth` or `optional_auth`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
}

fn extract_token(cookie_jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    cookie_jar
        .get("token")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(|auth_value| auth_value.strip_prefix("Bearer "))
                .map(|token| token.trim().to_owned())
        })
        .filter(|token| !token.is_empty())
}

fn resolve_user(token: String, secret: &[u8]) -> Result<AuthUser, HttpError> {
    let subject = token::decode_token(token, secret)
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;

    let id = Uuid::parse_str(&subject)
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;

    Ok(AuthUser { id })
}

pub async fn auth(
    cookie_jar: CookieJar,
    Extension(app_state): Extension<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let token = extract_token(&cookie_jar, req.headers())
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::TokenNotProvided.to_string()))?;

    let user = resolve_user(token, app_state.env.jwt_secret.as_bytes())?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Attaches the caller when a valid token is present; anyone else goes through
/// as an anonymous request.
pub async fn optional_auth(
    cookie_jar: CookieJar,
    Extension(app_state): Extension<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> impl IntoResponse {
    if let Some(token) = extract_token(&cookie_jar, req.headers()) {
        match resolve_user(token, app_state.env.jwt_secret.as_bytes()) {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(_) => {
                tracing::debug!("ignoring invalid token on optional-auth route");
            }
        }
    }

    next.run(req).await
}
