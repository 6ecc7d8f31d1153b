//! End-to-end room lifecycle tests against the actor, with a scripted
//! question source and paused time so full rounds run instantly.

use std::sync::Arc;
use std::time::Duration;

use livequiz_protocol::{ConnectionId, Question, RoomId, RoomPhase, ServerEvent};
use livequiz_room::{
    QuestionSource, RoomConfig, RoomError, RoomRegistry, SourceError,
};
use tokio::sync::mpsc;

const WINDOW: Duration = Duration::from_millis(40);
const BUFFER: Duration = Duration::from_millis(10);
const TICK: Duration = Duration::from_millis(50);

fn config() -> RoomConfig {
    RoomConfig {
        question_count: 3,
        answer_window: WINDOW,
        advance_buffer: BUFFER,
        mailbox_size: 64,
    }
}

struct ScriptedSource;

impl QuestionSource for ScriptedSource {
    async fn fetch(
        &self,
        _category: u32,
        count: usize,
    ) -> Result<Vec<Question>, SourceError> {
        Ok((0..count)
            .map(|i| Question {
                text: format!("question {i}"),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_index: i % 4,
            })
            .collect())
    }
}

struct FailingSource;

impl QuestionSource for FailingSource {
    async fn fetch(
        &self,
        _category: u32,
        _count: usize,
    ) -> Result<Vec<Question>, SourceError> {
        Err(SourceError::Unavailable("connection refused".into()))
    }
}

struct TestClient {
    conn: ConnectionId,
    rx: mpsc::UnboundedReceiver<ServerEvent>,
}

impl TestClient {
    fn new(id: u64) -> (Self, mpsc::UnboundedSender<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                conn: ConnectionId(id),
                rx,
            },
            tx,
        )
    }

    /// Pulls everything currently queued.
    fn drain(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

/// A room with host "alice" (conn 1) and players "bob" (2), "carol" (3).
async fn three_person_room<S: QuestionSource>(
    source: S,
) -> (
    RoomRegistry<S>,
    livequiz_room::RoomHandle,
    TestClient,
    TestClient,
    TestClient,
) {
    let mut registry = RoomRegistry::new(config(), Arc::new(source));

    let (mut alice, alice_tx) = TestClient::new(1);
    let (mut bob, bob_tx) = TestClient::new(2);
    let (mut carol, carol_tx) = TestClient::new(3);

    let handle = registry
        .create(
            RoomId::new("R1"),
            alice.conn,
            "alice".into(),
            None,
            9,
            alice_tx,
        )
        .unwrap();
    handle
        .join(bob.conn, "bob".into(), None, bob_tx)
        .await
        .unwrap();
    handle
        .join(carol.conn, "carol".into(), Some("u-carol".into()), carol_tx)
        .await
        .unwrap();

    // Discard the join chatter so tests start from a clean queue.
    alice.drain();
    bob.drain();
    carol.drain();

    (registry, handle, alice, bob, carol)
}

#[tokio::test(start_paused = true)]
async fn test_join_events_reach_the_right_participants() {
    let mut registry = RoomRegistry::new(config(), Arc::new(ScriptedSource));
    let (mut alice, alice_tx) = TestClient::new(1);
    let (mut bob, bob_tx) = TestClient::new(2);

    let handle = registry
        .create(RoomId::new("R1"), alice.conn, "alice".into(), None, 9, alice_tx)
        .unwrap();
    handle.join(bob.conn, "bob".into(), None, bob_tx).await.unwrap();

    // Joiner gets the confirmation; everyone else gets the announcement.
    let bob_events = bob.drain();
    assert!(matches!(
        &bob_events[..],
        [ServerEvent::RoomJoined { room_id, name }]
            if room_id.as_str() == "R1" && name == "bob"
    ));

    let alice_events = alice.drain();
    assert!(matches!(
        &alice_events[..],
        [ServerEvent::ParticipantJoined { connection, name }]
            if *connection == ConnectionId(2) && name == "bob"
    ));
}

#[tokio::test(start_paused = true)]
async fn test_full_round_from_start_to_completion() {
    let (_registry, handle, mut alice, mut bob, mut carol) =
        three_person_room(ScriptedSource).await;

    handle.start(alice.conn).await.unwrap();

    // Everyone gets the full question set plus the sanitized list, and
    // nothing else until the first tick.
    for client in [&mut alice, &mut bob, &mut carol] {
        let events = client.drain();
        assert_eq!(events.len(), 2);
        match &events[0] {
            ServerEvent::QuizStarted { room_id, host, questions } => {
                assert_eq!(room_id.as_str(), "R1");
                assert_eq!(*host, ConnectionId(1));
                assert_eq!(questions.len(), 3);
                assert_eq!(questions[0].correct_index, 0);
            }
            other => panic!("expected QuizStarted, got {other:?}"),
        }
        match &events[1] {
            ServerEvent::QuestionList { questions } => {
                assert_eq!(questions.len(), 3);
                assert_eq!(questions[0].options.len(), 4);
            }
            other => panic!("expected QuestionList, got {other:?}"),
        }
    }

    // First question only after one full interval.
    tokio::time::sleep(TICK - Duration::from_millis(1)).await;
    assert!(bob.drain().is_empty());
    tokio::time::sleep(Duration::from_millis(1)).await;

    let events = bob.drain();
    assert!(matches!(
        &events[..],
        [ServerEvent::NextQuestion { index: 0, .. }]
    ));

    // bob answers question 0 correctly, carol incorrectly.
    handle.submit_answer(bob.conn, 0, 0).await;
    handle.submit_answer(carol.conn, 0, 3).await;

    // Questions 1 and 2.
    tokio::time::sleep(TICK).await;
    assert!(matches!(
        &bob.drain()[..],
        [ServerEvent::NextQuestion { index: 1, .. }]
    ));
    handle.submit_answer(bob.conn, 1, 1).await;

    tokio::time::sleep(TICK).await;
    assert!(matches!(
        &bob.drain()[..],
        [ServerEvent::NextQuestion { index: 2, .. }]
    ));

    // One more interval after the last question ends the round.
    tokio::time::sleep(TICK).await;

    let events = bob.drain();
    assert_eq!(events.len(), 1, "completion must be the only trailing event");
    match &events[0] {
        ServerEvent::QuizEnded { room, winners, rankings } => {
            assert_eq!(room.phase, RoomPhase::Ended);
            assert_eq!(winners, &vec!["bob".to_string()]);
            assert_eq!(rankings[0].name, "bob");
            assert_eq!(rankings[0].score, 2);
            // carol scored zero; alice never answered.
            assert!(rankings.iter().all(|r| r.name != "bob" || r.score == 2));
        }
        other => panic!("expected QuizEnded, got {other:?}"),
    }

    // Ended for good: the clock is cancelled, no further events arrive.
    tokio::time::sleep(TICK * 3).await;
    assert!(bob.drain().is_empty());
    // alice never drained during the round: three questions plus the end.
    let alice_events = alice.drain();
    assert_eq!(alice_events.len(), 4);
    assert!(matches!(alice_events.last(), Some(ServerEvent::QuizEnded { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_question_index_is_monotonic() {
    let (_registry, handle, mut alice, _bob, _carol) =
        three_person_room(ScriptedSource).await;

    handle.start(alice.conn).await.unwrap();

    let mut last = 0usize;
    for _ in 0..3 {
        tokio::time::sleep(TICK).await;
        let snap = handle.snapshot().await.unwrap();
        assert!(snap.current_question_index >= last);
        last = snap.current_question_index;
    }
}

#[tokio::test(start_paused = true)]
async fn test_join_after_start_is_rejected() {
    let (_registry, handle, alice, _bob, _carol) =
        three_person_room(ScriptedSource).await;

    handle.start(alice.conn).await.unwrap();

    let (dana, dana_tx) = TestClient::new(4);
    let err = handle
        .join(dana.conn, "dana".into(), None, dana_tx)
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::AlreadyStarted(_)));

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.participants.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_second_start_is_rejected() {
    let (_registry, handle, alice, _bob, _carol) =
        three_person_room(ScriptedSource).await;

    handle.start(alice.conn).await.unwrap();
    let err = handle.start(alice.conn).await.unwrap_err();
    assert!(matches!(err, RoomError::AlreadyStarted(_)));
}

#[tokio::test(start_paused = true)]
async fn test_host_can_start_after_joining_own_room() {
    let mut registry = RoomRegistry::new(config(), Arc::new(ScriptedSource));
    let (mut alice, alice_tx) = TestClient::new(1);

    let handle = registry
        .create(RoomId::new("R1"), alice.conn, "alice".into(), None, 9, alice_tx)
        .unwrap();

    // The host goes through the ordinary join path for their own room.
    let (_, alice_tx2) = TestClient::new(1);
    handle
        .join(alice.conn, "alice".into(), None, alice_tx2)
        .await
        .unwrap();

    // Still the host: starting works and the roster keeps one Host entry.
    handle.start(alice.conn).await.unwrap();

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.phase, RoomPhase::InProgress);
    let hosts = snap.participants.iter().filter(|p| p.is_host).count();
    assert_eq!(hosts, 1);
    alice.drain();
}

#[tokio::test(start_paused = true)]
async fn test_only_the_host_may_start() {
    let (_registry, handle, mut alice, bob, _carol) =
        three_person_room(ScriptedSource).await;

    let err = handle.start(bob.conn).await.unwrap_err();
    assert!(matches!(err, RoomError::NotHost(_)));

    // The rejection touched nothing: still Open, no events leaked.
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.phase, RoomPhase::Open);
    assert!(alice.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_provider_failure_leaves_room_open_for_retry() {
    let (_registry, handle, mut alice, mut bob, _carol) =
        three_person_room(FailingSource).await;

    let err = handle.start(alice.conn).await.unwrap_err();
    assert!(matches!(err, RoomError::Provider(_)));

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.phase, RoomPhase::Open);

    // No broadcast went out, and no clock started.
    tokio::time::sleep(TICK * 2).await;
    assert!(alice.drain().is_empty());
    assert!(bob.drain().is_empty());

    // Open means the host may try again.
    let err = handle.start(alice.conn).await.unwrap_err();
    assert!(matches!(err, RoomError::Provider(_)));
}

#[tokio::test(start_paused = true)]
async fn test_zero_category_is_rejected_before_fetch() {
    let mut registry = RoomRegistry::new(config(), Arc::new(FailingSource));
    let (alice, alice_tx) = TestClient::new(1);

    let handle = registry
        .create(RoomId::new("R1"), alice.conn, "alice".into(), None, 0, alice_tx)
        .unwrap();

    // InvalidCategory, not Provider: the source is never consulted.
    let err = handle.start(alice.conn).await.unwrap_err();
    assert!(matches!(err, RoomError::InvalidCategory(0)));
}

#[tokio::test(start_paused = true)]
async fn test_admin_rejoin_refreshes_channel_and_broadcasts_roster() {
    let (_registry, handle, alice, mut bob, _carol) =
        three_person_room(ScriptedSource).await;

    // The host reconnects on a fresh channel with the same identity.
    let (mut alice2, alice2_tx) = TestClient::new(1);
    handle.admin_rejoin(alice.conn, alice2_tx).await.unwrap();

    let events = alice2.drain();
    assert_eq!(events.len(), 1);
    match &events[0] {
        ServerEvent::AdminInfo { participants, host } => {
            assert_eq!(*host, ConnectionId(1));
            assert_eq!(participants.len(), 3, "idempotent: no duplicate entry");
        }
        other => panic!("expected AdminInfo, got {other:?}"),
    }
    assert!(matches!(&bob.drain()[..], [ServerEvent::AdminInfo { .. }]));
}

#[tokio::test(start_paused = true)]
async fn test_admin_rejoin_with_unknown_identity_adds_entry() {
    let (_registry, handle, _alice, _bob, _carol) =
        three_person_room(ScriptedSource).await;

    let (admin, admin_tx) = TestClient::new(99);
    handle.admin_rejoin(admin.conn, admin_tx).await.unwrap();

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.participants.len(), 4);
    let derived = snap
        .participants
        .iter()
        .find(|p| p.connection == ConnectionId(99))
        .unwrap();
    assert_eq!(derived.name, "user-99");
    assert!(!derived.is_host);
}

#[tokio::test(start_paused = true)]
async fn test_ended_room_emits_nothing_after_completion() {
    let (_registry, handle, alice, mut bob, _carol) =
        three_person_room(ScriptedSource).await;

    handle.start(alice.conn).await.unwrap();
    // Run the whole round out: 3 questions plus the closing tick.
    tokio::time::sleep(TICK * 4).await;
    bob.drain();

    // A late rejoin is acknowledged but broadcasts nothing.
    let (_admin, admin_tx) = TestClient::new(1);
    handle.admin_rejoin(alice.conn, admin_tx).await.unwrap();

    // Late submissions and notices are swallowed too.
    handle.submit_answer(bob.conn, 0, 0).await;
    handle.notify_submission(bob.conn, None, 7).await;

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.phase, RoomPhase::Ended);
    assert!(bob.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_submission_notice_goes_to_everyone_else() {
    let (_registry, handle, mut alice, mut bob, mut carol) =
        three_person_room(ScriptedSource).await;

    handle.start(alice.conn).await.unwrap();
    alice.drain();
    bob.drain();
    carol.drain();

    handle
        .notify_submission(bob.conn, Some("u-bob".into()), 3)
        .await;
    // Flush the fire-and-forget command through the mailbox.
    handle.snapshot().await.unwrap();

    assert!(bob.drain().is_empty(), "submitter is not echoed");
    for client in [&mut alice, &mut carol] {
        let events = client.drain();
        assert!(matches!(
            &events[..],
            [ServerEvent::UserSubmitted { connection, name, user_id: Some(u), question_id: 3 }]
                if *connection == ConnectionId(2) && name == "bob" && u == "u-bob"
        ));
    }
}

#[tokio::test(start_paused = true)]
async fn test_disconnected_participant_keeps_score_and_ranks() {
    let (_registry, handle, alice, mut bob, _carol) =
        three_person_room(ScriptedSource).await;

    handle.start(alice.conn).await.unwrap();
    tokio::time::sleep(TICK).await;

    handle.submit_answer(bob.conn, 0, 0).await;
    handle.mark_disconnected(bob.conn).await;

    let snap = handle.snapshot().await.unwrap();
    let bob_info = snap
        .participants
        .iter()
        .find(|p| p.connection == ConnectionId(2))
        .unwrap();
    assert!(!bob_info.connected);
    assert_eq!(bob_info.score, 1);

    // Run the round out; bob still tops the rankings.
    tokio::time::sleep(TICK * 3).await;
    bob.drain();
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.phase, RoomPhase::Ended);
    let bob_info = snap
        .participants
        .iter()
        .find(|p| p.connection == ConnectionId(2))
        .unwrap();
    assert_eq!(bob_info.score, 1);
}
