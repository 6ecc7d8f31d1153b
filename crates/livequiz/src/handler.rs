//! Per-connection handler: frame I/O and event routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! Inbound frames are decoded to [`ClientEvent`]s and routed to room
//! actors; outbound [`ServerEvent`]s arrive on an unbounded channel that a
//! dedicated writer task drains, so room broadcasts never block on a slow
//! socket.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use livequiz_protocol::{
    ClientEvent, Codec, ConnectionId, ErrorKind, RoomId, ServerEvent,
};
use livequiz_room::{QuestionSource, RoomError, RoomHandle};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::LiveQuizError;
use crate::net::WsStream;
use crate::server::ServerState;

/// Outbound channel to this connection's writer task.
type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// The rooms this connection is a participant of, with the identity it
/// holds in each. Usually the socket's own id; an admin rejoin binds the
/// identity carried in the event instead, so a reconnected host keeps
/// acting as the original host connection.
type Memberships = HashMap<RoomId, (RoomHandle, ConnectionId)>;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<S: QuestionSource>(
    conn_id: ConnectionId,
    ws: WsStream,
    state: Arc<ServerState<S>>,
) -> Result<(), LiveQuizError> {
    tracing::debug!(conn = %conn_id, "handling new connection");

    let (mut write, mut read) = ws.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    // Writer task: serialize outbound events into text frames. Ends when
    // the channel closes (handler exit) or the socket rejects a send.
    let codec = state.codec;
    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let bytes = match codec.encode(&event) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(conn = %conn_id, error = %e, "failed to encode event");
                    continue;
                }
            };
            // JSON output is valid UTF-8.
            let Ok(text) = String::from_utf8(bytes) else { continue };
            if write.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = write.send(Message::Close(None)).await;
    });

    let mut memberships: Memberships = HashMap::new();

    while let Some(msg) = read.next().await {
        let data = match msg {
            Ok(Message::Text(text)) => text.as_bytes().to_vec(),
            Ok(Message::Binary(data)) => data.into(),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue, // ping/pong/frame
            Err(e) => {
                tracing::debug!(conn = %conn_id, error = %e, "recv error");
                break;
            }
        };

        let event: ClientEvent = match state.codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(conn = %conn_id, error = %e, "failed to decode event");
                continue;
            }
        };

        dispatch(conn_id, event, &state, &tx, &mut memberships).await;
    }

    // Roster entries survive the socket; only the connected flag drops.
    for (handle, identity) in memberships.values() {
        handle.mark_disconnected(*identity).await;
    }

    drop(tx);
    let _ = writer.await;

    tracing::debug!(conn = %conn_id, "connection closed");
    Ok(())
}

/// Routes one client event. Request errors go only to this connection.
async fn dispatch<S: QuestionSource>(
    conn_id: ConnectionId,
    event: ClientEvent,
    state: &Arc<ServerState<S>>,
    tx: &EventSender,
    memberships: &mut Memberships,
) {
    match event {
        ClientEvent::CreateRoom {
            room_id,
            name,
            user,
            category,
        } => {
            if let Err(e) = require_fields(&room_id, &name) {
                send_error(tx, &e);
                return;
            }

            let result = {
                let mut registry = state.registry.lock().await;
                registry.create(room_id.clone(), conn_id, name, user, category, tx.clone())
            };
            match result {
                Ok(handle) => {
                    memberships.insert(room_id.clone(), (handle, conn_id));
                    let _ = tx.send(ServerEvent::RoomCreated {
                        room_id,
                        connection: conn_id,
                    });
                }
                Err(e) => send_error(tx, &e),
            }
        }

        ClientEvent::AdminRejoin {
            room_id,
            connection,
        } => {
            let handle = match lookup(state, &room_id).await {
                Ok(handle) => handle,
                Err(e) => {
                    send_error(tx, &e);
                    return;
                }
            };
            match handle.admin_rejoin(connection, tx.clone()).await {
                Ok(()) => {
                    memberships.insert(room_id, (handle, connection));
                }
                Err(e) => send_error(tx, &e),
            }
        }

        ClientEvent::JoinRoom {
            room_id,
            name,
            user,
        } => {
            if let Err(e) = require_fields(&room_id, &name) {
                send_error(tx, &e);
                return;
            }

            let handle = match lookup(state, &room_id).await {
                Ok(handle) => handle,
                Err(e) => {
                    send_error(tx, &e);
                    return;
                }
            };
            match handle.join(conn_id, name, user, tx.clone()).await {
                Ok(()) => {
                    memberships.insert(room_id, (handle, conn_id));
                }
                Err(e) => send_error(tx, &e),
            }
        }

        ClientEvent::StartQuiz { room_id } => {
            let handle = match lookup(state, &room_id).await {
                Ok(handle) => handle,
                Err(e) => {
                    send_error(tx, &e);
                    return;
                }
            };
            let identity = identity_in(memberships, &room_id, conn_id);
            if let Err(e) = handle.start(identity).await {
                send_error(tx, &e);
            }
        }

        ClientEvent::SubmitAnswer {
            room_id,
            question_index,
            selected_option,
        } => {
            // Orphaned submissions are dropped without a reply.
            let Ok(handle) = lookup(state, &room_id).await else {
                return;
            };
            let identity = identity_in(memberships, &room_id, conn_id);
            handle
                .submit_answer(identity, question_index, selected_option)
                .await;
        }

        ClientEvent::AnswerSubmitted {
            room_id,
            user_id,
            question_id,
        } => {
            let Ok(handle) = lookup(state, &room_id).await else {
                return;
            };
            let identity = identity_in(memberships, &room_id, conn_id);
            handle.notify_submission(identity, user_id, question_id).await;
        }
    }
}

/// Resolves a room handle, holding the registry lock only for the lookup.
async fn lookup<S: QuestionSource>(
    state: &Arc<ServerState<S>>,
    room_id: &RoomId,
) -> Result<RoomHandle, RoomError> {
    state.registry.lock().await.get(room_id)
}

/// The identity this connection holds in `room_id`, defaulting to the
/// socket's own id.
fn identity_in(
    memberships: &Memberships,
    room_id: &RoomId,
    conn_id: ConnectionId,
) -> ConnectionId {
    memberships
        .get(room_id)
        .map(|(_, identity)| *identity)
        .unwrap_or(conn_id)
}

fn require_fields(room_id: &RoomId, name: &str) -> Result<(), RoomError> {
    if room_id.is_empty() {
        return Err(RoomError::MissingField("room_id"));
    }
    if name.is_empty() {
        return Err(RoomError::MissingField("name"));
    }
    Ok(())
}

fn send_error(tx: &EventSender, err: &RoomError) {
    let _ = tx.send(ServerEvent::Error {
        kind: error_kind(err),
        message: err.to_string(),
    });
}

/// Maps room errors to their wire-level kinds.
fn error_kind(err: &RoomError) -> ErrorKind {
    match err {
        RoomError::NotFound(_) | RoomError::Unavailable(_) => ErrorKind::RoomNotFound,
        RoomError::Duplicate(_) => ErrorKind::DuplicateRoom,
        RoomError::AlreadyStarted(_) => ErrorKind::RoomAlreadyStarted,
        RoomError::NotHost(_) => ErrorKind::NotHost,
        RoomError::InvalidCategory(_) => ErrorKind::InvalidCategory,
        RoomError::Provider(_) => ErrorKind::ProviderError,
        RoomError::MissingField(_) => ErrorKind::MissingField,
    }
}
