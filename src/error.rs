use thiserror::Error;

use crate::session::state::GameState;

pub type QuestResult<T> = Result<T, QuestError>;

#[derive(Debug, Error)]
pub enum QuestError {
    /// No quests to choose from, not even for recycling.
    #[error("quest catalog is empty")]
    EmptyCatalog,

    #[error("duplicate quest id in catalog: {0}")]
    DuplicateQuestId(String),

    #[error("failed to parse quest catalog: {0}")]
    CatalogParse(#[from] serde_json::Error),

    /// Caller submitted an answer before any quest was selected.
    #[error("no active quest to submit an answer for")]
    NoActiveQuest,

    #[error("answers are only accepted on the puzzle screen, not {0}")]
    NotOnPuzzle(GameState),
}
