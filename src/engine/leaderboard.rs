use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::engine::score_keeper::{Player, ScoreKeeper};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub username: String,
    pub keys: u32,
    pub score: u64,
    pub streak: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn top(&self, n: usize) -> &[LeaderboardEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn find(&self, username: &str) -> Option<&LeaderboardEntry> {
        self.entries.iter().find(|e| e.username == username)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LeaderboardRanker;

impl LeaderboardRanker {
    pub fn new() -> Self {
        Self
    }

    /// Sort by keys, then score, both descending. Exact ties go to whoever
    /// reached that standing first, then to username order, so the same
    /// players always produce the same board. Ranks are positions: tied
    /// players get consecutive ranks, never a shared one.
    pub fn rank(&self, players: &[Player]) -> Leaderboard {
        let mut sorted: Vec<&Player> = players.iter().collect();
        sorted.sort_by(|a, b| compare(a, b));

        let entries = sorted
            .into_iter()
            .enumerate()
            .map(|(i, p)| LeaderboardEntry {
                rank: i + 1,
                username: p.username.clone(),
                keys: p.keys,
                score: p.score,
                streak: p.current_streak,
            })
            .collect();

        Leaderboard { entries }
    }

    /// Rank from one locked snapshot of the keeper.
    pub fn rank_keeper(&self, keeper: &ScoreKeeper) -> Leaderboard {
        self.rank(&keeper.snapshot())
    }
}

fn compare(a: &Player, b: &Player) -> Ordering {
    b.keys
        .cmp(&a.keys)
        .then_with(|| b.score.cmp(&a.score))
        .then_with(|| a.last_active_at.cmp(&b.last_active_at))
        .then_with(|| a.username.cmp(&b.username))
}
