//! Leaderboard ranking.

use quizhall_protocol::LeaderboardEntry;
use quizhall_store::Participant;

/// Ranks participants by score, highest first.
///
/// The sort is stable, so equal scores keep join order. Ranks are 1-based
/// positions; tied players get distinct ranks.
pub fn rank(participants: &[Participant]) -> Vec<LeaderboardEntry> {
    let mut ordered: Vec<&Participant> = participants.iter().collect();
    ordered.sort_by(|a, b| b.score.cmp(&a.score));
    ordered
        .into_iter()
        .enumerate()
        .map(|(i, p)| LeaderboardEntry {
            rank: i + 1,
            name: p.name.clone(),
            score: p.score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use quizhall_protocol::PlayerId;

    use super::*;

    fn player(id: u64, name: &str, score: u64) -> Participant {
        let mut p = Participant::new(PlayerId(id), name);
        p.score = score;
        p
    }

    #[test]
    fn test_rank_sorts_by_score_descending() {
        let board = rank(&[player(1, "Ana", 1000), player(2, "Bo", 1500), player(3, "Cy", 0)]);
        let names: Vec<_> = board.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Bo", "Ana", "Cy"]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[2].rank, 3);
    }

    #[test]
    fn test_rank_ties_keep_join_order() {
        let board = rank(&[player(1, "Ana", 1300), player(2, "Bo", 1300), player(3, "Cy", 1300)]);
        let names: Vec<_> = board.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Ana", "Bo", "Cy"]);
        assert_eq!(board.iter().map(|e| e.rank).collect::<Vec<_>>(), [1, 2, 3]);
    }

    #[test]
    fn test_rank_empty_roster_is_empty() {
        assert!(rank(&[]).is_empty());
    }
}
