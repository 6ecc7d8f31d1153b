//! Wire protocol for LiveQuiz.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`RoomId`], [`ConnectionId`], [`Question`], [`RoomSnapshot`],
//!   etc.) — the data that travels on the wire.
//! - **Events** ([`ClientEvent`], [`ServerEvent`]) — the request/broadcast
//!   contract at the transport boundary.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how events are converted
//!   to and from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while doing so.
//!
//! The protocol layer sits between transport (raw frames) and the room
//! layer (quiz state). It doesn't know about connections or rooms — it only
//! knows how to describe and serialize events.

mod codec;
mod error;
mod events;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use events::{ClientEvent, ErrorKind, ServerEvent};
pub use types::{
    ConnectionId, Medal, ParticipantInfo, Question, QuestionView,
    RankingEntry, RoomId, RoomPhase, RoomSnapshot,
};
