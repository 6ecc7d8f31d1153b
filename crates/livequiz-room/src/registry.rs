//! The registry of active rooms.

use std::collections::HashMap;
use std::sync::Arc;

use livequiz_protocol::{ConnectionId, RoomId};

use crate::room::{spawn_room, ParticipantSender, RoomHandle};
use crate::{QuestionSource, QuizRoom, RoomConfig, RoomError};

/// Owns every active room, keyed by room id.
///
/// Creation spawns a room actor task; the registry keeps only the handle.
/// Rooms are never garbage-collected in the serving path — an Ended room
/// stays resolvable so late lookups get the final snapshot rather than a
/// not-found error.
pub struct RoomRegistry<S: QuestionSource> {
    rooms: HashMap<RoomId, RoomHandle>,
    config: RoomConfig,
    source: Arc<S>,
}

impl<S: QuestionSource> RoomRegistry<S> {
    pub fn new(config: RoomConfig, source: Arc<S>) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
            source,
        }
    }

    /// Creates a room with `host` as its sole participant and spawns its
    /// actor. The id must be unused.
    pub fn create(
        &mut self,
        room_id: RoomId,
        host: ConnectionId,
        host_name: String,
        user: Option<String>,
        category: u32,
        host_sender: ParticipantSender,
    ) -> Result<RoomHandle, RoomError> {
        if self.rooms.contains_key(&room_id) {
            return Err(RoomError::Duplicate(room_id));
        }

        let room = QuizRoom::new(room_id.clone(), host, host_name, user, category);
        let handle = spawn_room(
            room,
            self.config.clone(),
            Arc::clone(&self.source),
            host_sender,
        );

        tracing::info!(%room_id, %host, category, "room created");
        self.rooms.insert(room_id, handle.clone());
        Ok(handle)
    }

    /// Looks up a room by id.
    pub fn get(&self, room_id: &RoomId) -> Result<RoomHandle, RoomError> {
        self.rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }

    /// Removes a room and shuts its actor down.
    pub async fn destroy(&mut self, room_id: &RoomId) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .remove(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        tracing::info!(%room_id, "room destroyed");
        handle.shutdown().await
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
