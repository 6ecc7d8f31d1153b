//! Room actor: an isolated Tokio task that owns one live quiz session.
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc mailbox. Transport events and question-clock ticks for
//! one room all pass through the actor's single `select!` loop, so every
//! read-modify-write on room state is serialized without locks. Rooms are
//! independent — a slow provider fetch or a panic in one room never
//! touches another.

use std::collections::HashMap;
use std::sync::Arc;

use livequiz_protocol::{ConnectionId, RoomId, RoomSnapshot, ServerEvent};
use livequiz_tick::QuestionClock;
use tokio::sync::{mpsc, oneshot};

use crate::{
    QuestionSource, QuizRoom, RoomConfig, RoomError, SourceError, ranking,
    scoring,
};

/// Channel sender for delivering server events to one participant's
/// connection handler.
pub type ParticipantSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a room actor through its mailbox.
///
/// Variants with a `oneshot::Sender` are request/reply: the caller awaits
/// the outcome. The rest are fire-and-forget — by contract they never
/// produce a user-visible error.
pub(crate) enum RoomCommand {
    /// Add a Player participant while the room is Open.
    Join {
        conn: ConnectionId,
        name: String,
        user: Option<String>,
        sender: ParticipantSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Idempotent upsert of a (possibly second) host-channel identity.
    AdminRejoin {
        conn: ConnectionId,
        sender: ParticipantSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Host-only: fetch questions and start the round.
    Start {
        requester: ConnectionId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Record an answer. Silent no-op on any mismatch.
    SubmitAnswer {
        conn: ConnectionId,
        question_index: usize,
        selected_option: usize,
    },

    /// Cosmetic "X has submitted" notice to the rest of the room.
    NotifySubmission {
        conn: ConnectionId,
        user_id: Option<String>,
        question_id: u64,
    },

    /// The participant's transport session dropped. Observability only —
    /// the participant is never removed.
    MarkDisconnected { conn: ConnectionId },

    /// Request the current room snapshot.
    Snapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },

    /// Shut down the actor. The question clock dies with it.
    Shutdown,
}

/// Handle to a running room actor. Cheap to clone — an `mpsc::Sender`
/// wrapper plus the room id. The registry holds one per room.
#[derive(Clone, Debug)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Joins the room as a Player.
    pub async fn join(
        &self,
        conn: ConnectionId,
        name: String,
        user: Option<String>,
        sender: ParticipantSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            conn,
            name,
            user,
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?
    }

    /// Idempotently upserts an admin-channel identity and triggers the
    /// roster broadcast.
    pub async fn admin_rejoin(
        &self,
        conn: ConnectionId,
        sender: ParticipantSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::AdminRejoin {
            conn,
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?
    }

    /// Starts the quiz. Resolves once questions are fetched and the clock
    /// is running, or with the error to report to the requester.
    pub async fn start(&self, requester: ConnectionId) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Start {
            requester,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?
    }

    /// Records an answer (fire-and-forget).
    pub async fn submit_answer(
        &self,
        conn: ConnectionId,
        question_index: usize,
        selected_option: usize,
    ) {
        let _ = self
            .sender
            .send(RoomCommand::SubmitAnswer {
                conn,
                question_index,
                selected_option,
            })
            .await;
    }

    /// Broadcasts the cosmetic submission notice (fire-and-forget).
    pub async fn notify_submission(
        &self,
        conn: ConnectionId,
        user_id: Option<String>,
        question_id: u64,
    ) {
        let _ = self
            .sender
            .send(RoomCommand::NotifySubmission {
                conn,
                user_id,
                question_id,
            })
            .await;
    }

    /// Flags a participant as disconnected (fire-and-forget).
    pub async fn mark_disconnected(&self, conn: ConnectionId) {
        let _ = self
            .sender
            .send(RoomCommand::MarkDisconnected { conn })
            .await;
    }

    /// Requests the current room snapshot.
    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Snapshot { reply: reply_tx }).await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Tells the room actor to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }
}

/// The internal room actor. Runs inside a Tokio task.
struct RoomActor<S: QuestionSource> {
    room: QuizRoom,
    config: RoomConfig,
    source: Arc<S>,
    /// Per-participant outbound channels.
    senders: HashMap<ConnectionId, ParticipantSender>,
    clock: QuestionClock,
    /// The next question to broadcast. Distinct from the room's
    /// `current_question_index`, which trails it by one tick.
    cursor: usize,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl<S: QuestionSource> RoomActor<S> {
    /// Runs the actor loop until shutdown.
    async fn run(mut self) {
        tracing::info!(room_id = %self.room.id(), "room actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    match cmd {
                        Some(cmd) => {
                            if self.handle_command(cmd).await {
                                break;
                            }
                        }
                        // Registry dropped the handle — tear down.
                        None => break,
                    }
                }
                _ = self.clock.wait_for_tick() => {
                    self.handle_tick();
                }
            }
        }

        tracing::info!(room_id = %self.room.id(), "room actor stopped");
    }

    /// Processes one command. Returns `true` to shut down.
    async fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Join {
                conn,
                name,
                user,
                sender,
                reply,
            } => {
                let _ = reply.send(self.handle_join(conn, name, user, sender));
            }
            RoomCommand::AdminRejoin { conn, sender, reply } => {
                let _ = reply.send(self.handle_admin_rejoin(conn, sender));
            }
            RoomCommand::Start { requester, reply } => {
                let _ = reply.send(self.handle_start(requester).await);
            }
            RoomCommand::SubmitAnswer {
                conn,
                question_index,
                selected_option,
            } => {
                let outcome = scoring::submit_answer(
                    &mut self.room,
                    conn,
                    question_index,
                    selected_option,
                );
                tracing::debug!(
                    room_id = %self.room.id(),
                    %conn,
                    question_index,
                    ?outcome,
                    "answer submitted"
                );
            }
            RoomCommand::NotifySubmission {
                conn,
                user_id,
                question_id,
            } => {
                self.handle_notify_submission(conn, user_id, question_id);
            }
            RoomCommand::MarkDisconnected { conn } => {
                if self.room.mark_disconnected(conn) {
                    tracing::debug!(
                        room_id = %self.room.id(),
                        %conn,
                        "participant disconnected (kept in roster)"
                    );
                }
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(self.room.snapshot());
            }
            RoomCommand::Shutdown => {
                tracing::info!(room_id = %self.room.id(), "room shutting down");
                self.clock.cancel();
                return true;
            }
        }
        false
    }

    fn handle_join(
        &mut self,
        conn: ConnectionId,
        name: String,
        user: Option<String>,
        sender: ParticipantSender,
    ) -> Result<(), RoomError> {
        if !self.room.phase().is_joinable() {
            return Err(RoomError::AlreadyStarted(self.room.id().clone()));
        }

        self.room.add_player(conn, name.clone(), user);
        self.senders.insert(conn, sender);

        tracing::info!(
            room_id = %self.room.id(),
            %conn,
            name,
            participants = self.room.participant_count(),
            "participant joined"
        );

        self.send_to(
            conn,
            ServerEvent::RoomJoined {
                room_id: self.room.id().clone(),
                name: name.clone(),
            },
        );
        self.broadcast_except(conn, ServerEvent::ParticipantJoined { connection: conn, name });

        Ok(())
    }

    fn handle_admin_rejoin(
        &mut self,
        conn: ConnectionId,
        sender: ParticipantSender,
    ) -> Result<(), RoomError> {
        // The completion broadcast must stay the last event a room ever
        // emits, so an Ended room acknowledges the rejoin silently.
        if self.room.phase() == livequiz_protocol::RoomPhase::Ended {
            return Ok(());
        }

        // Refresh the outbound channel either way — this is exactly the
        // rejoin case where the old one is dead.
        self.senders.insert(conn, sender);

        if self.room.upsert_admin(conn) {
            tracing::info!(room_id = %self.room.id(), %conn, "admin identity added to roster");
        } else {
            tracing::debug!(room_id = %self.room.id(), %conn, "admin identity already present");
        }

        let snapshot = self.room.snapshot();
        self.broadcast(ServerEvent::AdminInfo {
            participants: snapshot.participants,
            host: self.room.host(),
        });

        Ok(())
    }

    async fn handle_start(&mut self, requester: ConnectionId) -> Result<(), RoomError> {
        let room_id = self.room.id().clone();

        // Hostship is keyed on the stable host connection id, not roster
        // state, so no join or rejoin can ever lock the room out of
        // starting.
        if requester != self.room.host() {
            return Err(RoomError::NotHost(room_id));
        }
        if !self.room.phase().is_joinable() {
            return Err(RoomError::AlreadyStarted(room_id));
        }
        let category = self.room.category();
        if category == 0 {
            return Err(RoomError::InvalidCategory(category));
        }

        // The only suspension point in the room layer. Stalls this room's
        // mailbox until the provider answers; other rooms keep ticking.
        let questions = self
            .source
            .fetch(category, self.config.question_count)
            .await
            .map_err(|e| match e {
                SourceError::InvalidCategory(c) => RoomError::InvalidCategory(c),
                SourceError::Unavailable(msg) => RoomError::Provider(msg),
            })?;
        if questions.is_empty() {
            return Err(RoomError::Provider("provider returned no questions".into()));
        }

        tracing::info!(
            room_id = %room_id,
            category,
            questions = questions.len(),
            "quiz started"
        );

        self.room.begin(questions);
        self.cursor = 0;

        // Each participant gets the full set; the room-wide list is
        // sanitized. Both shapes are part of the wire contract.
        let full = self.room.questions().to_vec();
        let host = self.room.host();
        let recipients: Vec<ConnectionId> =
            self.senders.keys().copied().collect();
        for conn in recipients {
            self.send_to(
                conn,
                ServerEvent::QuizStarted {
                    room_id: room_id.clone(),
                    host,
                    questions: full.clone(),
                },
            );
        }
        self.broadcast(ServerEvent::QuestionList {
            questions: full.iter().map(|q| q.view()).collect(),
        });

        self.clock.start();
        Ok(())
    }

    fn handle_notify_submission(
        &mut self,
        conn: ConnectionId,
        user_id: Option<String>,
        question_id: u64,
    ) {
        // Cosmetic only: unknown participants are dropped silently, and an
        // Ended room emits nothing further.
        if !self.room.phase().is_live() {
            return;
        }
        let Some(name) = self.room.participant(conn).map(|p| p.name.clone()) else {
            return;
        };
        self.broadcast_except(
            conn,
            ServerEvent::UserSubmitted {
                connection: conn,
                name,
                user_id,
                question_id,
            },
        );
    }

    /// One clock tick: advance to the next question or end the round.
    fn handle_tick(&mut self) {
        if !self.room.phase().is_live() {
            // A tick must never act on a room that isn't running.
            self.clock.cancel();
            return;
        }

        if self.cursor >= self.room.questions().len() {
            self.clock.cancel();
            self.room.finish();

            let (rankings, winners) = ranking::compute(&self.room);
            tracing::info!(
                room_id = %self.room.id(),
                winners = ?winners,
                "quiz ended"
            );

            // The last event this room will ever emit.
            self.broadcast(ServerEvent::QuizEnded {
                room: self.room.snapshot(),
                winners,
                rankings,
            });
            return;
        }

        let question = self.room.questions()[self.cursor].view();
        self.broadcast(ServerEvent::NextQuestion {
            index: self.cursor,
            question,
        });
        self.room.set_current_question_index(self.cursor);
        self.cursor += 1;
    }

    /// Sends an event to every registered participant channel.
    fn broadcast(&self, event: ServerEvent) {
        for conn in self.senders.keys() {
            self.send_to(*conn, event.clone());
        }
    }

    /// Sends an event to everyone except `excluded`.
    fn broadcast_except(&self, excluded: ConnectionId, event: ServerEvent) {
        for conn in self.senders.keys() {
            if *conn != excluded {
                self.send_to(*conn, event.clone());
            }
        }
    }

    /// Sends an event to a single participant. Silently drops if the
    /// receiver is gone (participant disconnected).
    fn send_to(&self, conn: ConnectionId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&conn) {
            let _ = sender.send(event);
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
///
/// `host_sender` is the creating connection's outbound channel, registered
/// so the host receives broadcasts from the start.
pub(crate) fn spawn_room<S: QuestionSource>(
    room: QuizRoom,
    config: RoomConfig,
    source: Arc<S>,
    host_sender: ParticipantSender,
) -> RoomHandle {
    let room_id = room.id().clone();
    let (tx, rx) = mpsc::channel(config.mailbox_size);

    let mut senders = HashMap::new();
    senders.insert(room.host(), host_sender);

    let clock = QuestionClock::new(config.tick_interval());
    let actor = RoomActor {
        room,
        config,
        source,
        senders,
        clock,
        cursor: 0,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
