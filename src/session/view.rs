use rand::Rng;
use serde::Serialize;

use crate::engine::leaderboard::LeaderboardEntry;
use crate::generator::messages::{TimeOfDay, format_solve_time, greeting};
use crate::quest::verifier::Verdict;
use crate::quest::{Difficulty, Quest, QuestKind};
use crate::session::clock::ClockHandle;
use crate::session::machine::SessionStateMachine;
use crate::session::state::GameState;

/// Ranks shown on the podium before the player's own row.
pub const PODIUM_SIZE: usize = 3;

/// What the front end may show about a quest. The target stays hidden.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuestCard {
    pub id: String,
    pub kind: QuestKind,
    pub difficulty: Difficulty,
    pub clue: String,
    pub points: u64,
}

impl From<&Quest> for QuestCard {
    fn from(quest: &Quest) -> Self {
        Self {
            id: quest.id.clone(),
            kind: quest.kind,
            difficulty: quest.difficulty,
            clue: quest.clue.clone(),
            points: quest.points(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub game_state: GameState,
    pub quest: Option<QuestCard>,
    pub timer: String,
    pub verdict: Option<Verdict>,
    pub result_message: Option<String>,
    pub podium: Vec<LeaderboardEntry>,
    /// The player's own row when they are not on the podium.
    pub player_rank: Option<LeaderboardEntry>,
    pub greeting: String,
    pub solve_time: Option<String>,
}

impl<R: Rng> SessionStateMachine<R> {
    pub fn view(&self, clock: &ClockHandle, period: TimeOfDay) -> SessionView {
        let board = self.leaderboard();
        let player_rank = board
            .find(self.username())
            .filter(|e| e.rank > PODIUM_SIZE)
            .cloned();

        SessionView {
            game_state: self.state(),
            quest: self.current_quest().map(QuestCard::from),
            timer: clock.formatted(),
            verdict: self.pending().map(|p| p.verdict),
            result_message: self.pending().map(|p| p.message.clone()),
            podium: board.top(PODIUM_SIZE).to_vec(),
            player_rank,
            greeting: greeting(self.username(), period),
            solve_time: self.last_solve().map(|s| format_solve_time(s.elapsed_secs)),
        }
    }
}
