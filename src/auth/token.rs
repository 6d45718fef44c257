use crate::auth::models::JwtPayload;
use crate::auth::JWT_SIGNING_KEY;
use jwt::VerifyWithKey;

pub fn decode(token: &str) -> Result<JwtPayload, ()> {
    let key = JWT_SIGNING_KEY.get().ok_or_else(|| {
        tracing::error!("`JWT_SIGNING_KEY` was not initialized.");
    })?;
    token.verify_with_key(key).map_err(|_err| ())
}
