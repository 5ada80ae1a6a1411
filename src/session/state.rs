use std::fmt;

use serde::{Deserialize, Serialize};

/// Which screen the player is on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameState {
    #[default]
    Welcome,
    Clue,
    Puzzle,
    Leaderboard,
    #[serde(rename = "howtoplay")]
    HowToPlay,
    SuccessFlow,
}

impl GameState {
    pub fn as_str(self) -> &'static str {
        match self {
            GameState::Welcome => "welcome",
            GameState::Clue => "clue",
            GameState::Puzzle => "puzzle",
            GameState::Leaderboard => "leaderboard",
            GameState::HowToPlay => "howtoplay",
            GameState::SuccessFlow => "successFlow",
        }
    }

    pub fn can_view_leaderboard(self) -> bool {
        matches!(
            self,
            GameState::Clue | GameState::Puzzle | GameState::SuccessFlow
        )
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
