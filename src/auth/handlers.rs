use crate::auth::extractors::User;
use crate::auth::responses::DecodeTokenResponse;
use axum::response::Json;

pub async fn decode_token(user: User) -> Json<DecodeTokenResponse> {
    Json(DecodeTokenResponse {
        error: false,
        user_id: user.user_id,
        role: user.role,
    })
}
