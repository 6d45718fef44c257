use crate::app_context::{AppContext, RequestContext};
use crate::auth::extractors::SocketUser;
use crate::sessions::message_types::ServerSentSocketMessage;
use crate::sessions::models::SessionHandle;
use crate::sessions::responses::SessionResponse;
use crate::sessions::services::SessionHttpHandler;
use crate::storage::sessions::HashMapSessionStorage;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Json, Response};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio_stream::wrappers::WatchStream;

#[axum::debug_handler]
pub async fn ws(
    SocketUser(user): SocketUser,
    Path(session_id): Path<String>,
    State(app_context): State<AppContext<HashMapSessionStorage>>,
    upgrade: WebSocketUpgrade,
) -> Response {
    let request_context = RequestContext { user, session_id };
    let subscribed = SessionHttpHandler::new(app_context, &request_context)
        .selection_stream()
        .await;
    match subscribed {
        Ok(handle) => upgrade.on_upgrade(move |socket| stream_selection(socket, handle)),
        Err(error_code) => Json(SessionResponse::refused(error_code)).into_response(),
    }
}

/// Pushes the current selection, then every change, until either side goes away.
async fn stream_selection(socket: WebSocket, handle: SessionHandle) {
    let (session_id, receiver) = {
        let mut session = handle.lock().await;
        (session.id.clone(), session.attach_socket())
    };
    // Only a weak reference outlives the handshake, so removing the session ends the stream.
    let session = Arc::downgrade(&handle);
    drop(handle);

    let (mut sender, mut incoming) = socket.split();
    let mut updates = WatchStream::new(receiver);
    tracing::debug!(session_id = %session_id, "Selection stream opened.");
    loop {
        tokio::select! {
            update = updates.next() => {
                // The session was removed.
                let Some(selection) = update else {
                    break;
                };
                let message = ServerSentSocketMessage::SelectionChanged(selection);
                let text = match serde_json::to_string(&message) {
                    Ok(text) => text,
                    Err(err) => {
                        tracing::error!(session_id = %session_id, %err, "Failed to encode a selection.");
                        break;
                    }
                };
                if sender.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            received = incoming.next() => match received {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    if let Some(handle) = session.upgrade() {
        handle.lock().await.detach_socket();
    }
    tracing::debug!(session_id = %session_id, "Selection stream closed.");
}
