use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::score_keeper::ScoreKeeper;
use crate::generator::hunt::Hunt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub total_hunts: usize,
    pub active_hunts: usize,
    pub total_players: usize,
    pub keys_collected_today: usize,
}

impl GameStats {
    pub fn collect(hunts: &[Hunt], keeper: &ScoreKeeper, now: DateTime<Utc>) -> Self {
        Self {
            total_hunts: hunts.len(),
            active_hunts: hunts.iter().filter(|h| h.is_open(now)).count(),
            total_players: keeper.snapshot().len(),
            keys_collected_today: keeper.keys_collected_on(now.date_naive()),
        }
    }
}
