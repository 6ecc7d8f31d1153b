//! Answer recording and idempotent scoring.

use livequiz_protocol::ConnectionId;

use crate::state::{AnswerRecord, QuizRoom};

/// What happened to a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Silently dropped: room not live, participant unknown, or question
    /// index out of range. Never an error — late and orphaned submissions
    /// are expected traffic.
    Dropped,
    /// First submission for this index; it was the one that scored.
    Scored { correct: bool },
    /// The index was already scored; only the recorded selection changed.
    Rerecorded,
}

/// Records `selected` for `(conn, question_index)` and scores it.
///
/// Recording is last-write-wins: a participant may change their answer any
/// number of times until the next tick. Scoring is first-submission-wins:
/// only the first submission for an index can increment the score, and it
/// marks the index scored either way, so no resubmission can re-increment
/// or re-decrement.
pub fn submit_answer(
    room: &mut QuizRoom,
    conn: ConnectionId,
    question_index: usize,
    selected: usize,
) -> Submission {
    if !room.phase().is_live() {
        return Submission::Dropped;
    }
    let Some(question) = room.questions().get(question_index) else {
        return Submission::Dropped;
    };
    let correct = selected == question.correct_index;

    let Some(participant) = room.participant_mut(conn) else {
        return Submission::Dropped;
    };

    match participant.answers.get_mut(&question_index) {
        Some(record) => {
            record.selected = selected;
            Submission::Rerecorded
        }
        None => {
            participant.answers.insert(
                question_index,
                AnswerRecord {
                    selected,
                    scored: true,
                },
            );
            if correct {
                participant.score += 1;
            }
            Submission::Scored { correct }
        }
    }
}
