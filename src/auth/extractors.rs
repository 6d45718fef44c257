use crate::auth::models::Role;
use crate::auth::responses::{TokenExtractionError, TokenExtractionReason};
use crate::auth::token;
use crate::http::requests::TokenQueryParam;
use async_trait::async_trait;
use axum::extract::{FromRequestParts, Query};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::response::Json;

pub struct User {
    pub user_id: String,
    pub role: Role,
}

type TokenRejection = (StatusCode, Json<TokenExtractionError>);

fn rejection(reason: TokenExtractionReason) -> TokenRejection {
    (
        StatusCode::UNAUTHORIZED,
        Json(TokenExtractionError {
            error: true,
            reason,
        }),
    )
}

fn user_from_token(token: &str) -> Result<User, TokenRejection> {
    match token::decode(token.trim()) {
        Ok(jwt_payload) => Ok(User {
            user_id: jwt_payload.user_id,
            role: jwt_payload.role,
        }),
        Err(()) => Err(rejection(TokenExtractionReason::InvalidToken)),
    }
}

fn user_from_header(header: &HeaderValue) -> Result<User, TokenRejection> {
    let bearer_token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| rejection(TokenExtractionReason::InvalidToken))?;
    user_from_token(bearer_token)
}

#[async_trait]
impl<S> FromRequestParts<S> for User
where
    S: Send + Sync,
{
    type Rejection = TokenRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Err(rejection(TokenExtractionReason::NoAuthorizationHeaderProvided));
        };
        user_from_header(header)
    }
}

/// A [`User`] for websocket handshakes: the `Authorization` header when present, otherwise the
/// bare token from the `token` query parameter.
pub struct SocketUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for SocketUser
where
    S: Send + Sync,
{
    type Rejection = TokenRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(header) = parts.headers.get(AUTHORIZATION) {
            return user_from_header(header).map(SocketUser);
        }
        let query_token = Query::<TokenQueryParam>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(query_params)| query_params.token);
        match query_token {
            Some(token) => user_from_token(&token).map(SocketUser),
            None => Err(rejection(TokenExtractionReason::NoAuthorizationHeaderProvided)),
        }
    }
}
