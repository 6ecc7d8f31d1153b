//! In-memory room state: the quiz, its participants, and their answers.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use livequiz_protocol::{
    ConnectionId, ParticipantInfo, Question, RoomId, RoomPhase, RoomSnapshot,
};

/// A participant's role in the room. Exactly one participant holds Host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Host,
    Player,
}

/// One recorded answer for one question index.
///
/// `selected` follows last-write-wins — a participant may change their
/// answer until the clock advances. `scored` is set by the first
/// submission and makes scoring provably idempotent: once true, no
/// resubmission for this index can touch the score again.
#[derive(Debug, Clone, Copy)]
pub struct AnswerRecord {
    pub selected: usize,
    pub scored: bool,
}

/// One connected party in a room.
///
/// The connection identity that keys this participant is owned by the
/// transport session; the room only references it. Participants are never
/// removed — a dropped session flips `connected` and nothing else.
#[derive(Debug, Clone)]
pub struct Participant {
    pub name: String,
    /// External user id, when supplied at join.
    pub user: Option<String>,
    pub role: Role,
    pub score: u32,
    /// Question index → recorded answer. Absent until first submission.
    pub answers: HashMap<usize, AnswerRecord>,
    pub connected: bool,
    pub joined_at_ms: u64,
    /// Position in join order; the explicit ranking tie-break.
    pub join_seq: u64,
}

impl Participant {
    fn new(name: String, user: Option<String>, role: Role, join_seq: u64) -> Self {
        Self {
            name,
            user,
            role,
            score: 0,
            answers: HashMap::new(),
            connected: true,
            joined_at_ms: now_ms(),
            join_seq,
        }
    }
}

/// The full state of one live quiz session.
#[derive(Debug)]
pub struct QuizRoom {
    id: RoomId,
    host: ConnectionId,
    host_name: String,
    category: u32,
    phase: RoomPhase,
    /// Immutable once fetched. Non-empty whenever phase is InProgress.
    questions: Vec<Question>,
    /// The question currently broadcast. Monotonically non-decreasing
    /// while InProgress.
    current_question_index: usize,
    participants: HashMap<ConnectionId, Participant>,
    next_join_seq: u64,
    created_at_ms: u64,
}

impl QuizRoom {
    /// Creates an Open room with the creator as sole Host participant.
    pub fn new(
        id: RoomId,
        host: ConnectionId,
        host_name: impl Into<String>,
        user: Option<String>,
        category: u32,
    ) -> Self {
        let host_name = host_name.into();
        let mut room = Self {
            id,
            host,
            host_name: host_name.clone(),
            category,
            phase: RoomPhase::Open,
            questions: Vec::new(),
            current_question_index: 0,
            participants: HashMap::new(),
            next_join_seq: 0,
            created_at_ms: now_ms(),
        };
        room.insert_participant(host, host_name, user, Role::Host);
        room
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn host(&self) -> ConnectionId {
        self.host
    }

    pub fn category(&self) -> u32 {
        self.category
    }

    pub fn phase(&self) -> RoomPhase {
        self.phase
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    pub fn participant(&self, conn: ConnectionId) -> Option<&Participant> {
        self.participants.get(&conn)
    }

    pub fn participant_mut(&mut self, conn: ConnectionId) -> Option<&mut Participant> {
        self.participants.get_mut(&conn)
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// All participants with their identities, in join order.
    pub fn participants_by_join_order(&self) -> Vec<(ConnectionId, &Participant)> {
        let mut all: Vec<_> = self.participants.iter().map(|(c, p)| (*c, p)).collect();
        all.sort_by_key(|(_, p)| p.join_seq);
        all
    }

    /// Adds a Player participant. Rejoining with a known identity resets
    /// that entry (score 0, no answers), matching the original join flow.
    /// The host connection keeps the Host role even through this path, so
    /// exactly one participant holds it at all times.
    pub fn add_player(&mut self, conn: ConnectionId, name: impl Into<String>, user: Option<String>) {
        let role = if conn == self.host { Role::Host } else { Role::Player };
        self.insert_participant(conn, name.into(), user, role);
    }

    /// Idempotent admin upsert: a known identity is left untouched; an
    /// unknown one gets a derived participant. The derived entry holds the
    /// Host role only when the identity is the host connection itself —
    /// otherwise this deliberately creates a second entry for the same
    /// human rather than merging into the host's original slot.
    ///
    /// Returns `true` if a new participant was inserted.
    pub fn upsert_admin(&mut self, conn: ConnectionId) -> bool {
        if self.participants.contains_key(&conn) {
            return false;
        }
        let role = if conn == self.host { Role::Host } else { Role::Player };
        let name = format!("user-{}", conn.0);
        self.insert_participant(conn, name, None, role);
        true
    }

    /// Flags a participant as disconnected. They stay in the roster and in
    /// the final standings. Returns `false` for unknown identities.
    pub fn mark_disconnected(&mut self, conn: ConnectionId) -> bool {
        match self.participants.get_mut(&conn) {
            Some(p) => {
                p.connected = false;
                true
            }
            None => false,
        }
    }

    /// Transitions Open → InProgress with the fetched question sequence.
    ///
    /// Callers must have validated the phase; `questions` must be
    /// non-empty (InProgress implies a non-empty sequence).
    pub fn begin(&mut self, questions: Vec<Question>) {
        debug_assert!(self.phase.can_transition_to(RoomPhase::InProgress));
        debug_assert!(!questions.is_empty());
        self.questions = questions;
        self.current_question_index = 0;
        self.phase = RoomPhase::InProgress;
    }

    /// Transitions InProgress → Ended. Terminal.
    pub fn finish(&mut self) {
        debug_assert!(self.phase.can_transition_to(RoomPhase::Ended));
        self.phase = RoomPhase::Ended;
    }

    /// Moves the active question forward. Never backward.
    pub fn set_current_question_index(&mut self, index: usize) {
        debug_assert!(index >= self.current_question_index);
        self.current_question_index = index;
    }

    /// A point-in-time snapshot for rosters and the completion broadcast.
    pub fn snapshot(&self) -> RoomSnapshot {
        let participants = self
            .participants_by_join_order()
            .into_iter()
            .map(|(conn, p)| ParticipantInfo {
                connection: conn,
                name: p.name.clone(),
                user: p.user.clone(),
                is_host: p.role == Role::Host,
                score: p.score,
                connected: p.connected,
                joined_at_ms: p.joined_at_ms,
            })
            .collect();

        RoomSnapshot {
            room_id: self.id.clone(),
            host: self.host,
            host_name: self.host_name.clone(),
            category: self.category,
            phase: self.phase,
            current_question_index: self.current_question_index,
            question_count: self.questions.len(),
            participants,
        }
    }

    fn insert_participant(
        &mut self,
        conn: ConnectionId,
        name: String,
        user: Option<String>,
        role: Role,
    ) {
        let seq = self.next_join_seq;
        self.next_join_seq += 1;
        self.participants
            .insert(conn, Participant::new(name, user, role, seq));
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
