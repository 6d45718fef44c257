use serde::{Deserialize, Serialize};

/// Browsers cannot set headers on a websocket handshake, so sockets carry the token here.
#[derive(Serialize, Deserialize)]
pub struct TokenQueryParam {
    pub token: Option<String>,
}
