//! Final standings: ranks, medals, and winners.

use livequiz_protocol::{Medal, RankingEntry};

use crate::state::QuizRoom;

/// Computes the final standings for a room.
///
/// Participants are sorted by score descending; ties are broken by join
/// order, earlier joiners ranking higher — an explicit contract, not an
/// accident of map iteration. Ranks 0/1/2 carry gold/silver/bronze.
///
/// Returns `(rankings, winners)`, where `winners` holds the display name
/// of every participant whose score equals the top score — all of them
/// when first place is tied, not just the rank-0 entry.
pub fn compute(room: &QuizRoom) -> (Vec<RankingEntry>, Vec<String>) {
    let mut ordered = room.participants_by_join_order();
    ordered.sort_by(|(_, a), (_, b)| {
        b.score.cmp(&a.score).then(a.join_seq.cmp(&b.join_seq))
    });

    let rankings: Vec<RankingEntry> = ordered
        .iter()
        .enumerate()
        .map(|(rank, (conn, p))| RankingEntry {
            connection: *conn,
            name: p.name.clone(),
            user: p.user.clone(),
            score: p.score,
            medal: match rank {
                0 => Some(Medal::Gold),
                1 => Some(Medal::Silver),
                2 => Some(Medal::Bronze),
                _ => None,
            },
        })
        .collect();

    let top_score = rankings.first().map(|r| r.score).unwrap_or(0);
    let winners = rankings
        .iter()
        .filter(|r| r.score == top_score)
        .map(|r| r.name.clone())
        .collect();

    (rankings, winners)
}
