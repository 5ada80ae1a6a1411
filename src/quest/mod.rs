pub mod catalog;
pub mod selector;
pub mod verifier;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestKind {
    Subreddit,
    Post,
    Comment,
    User,
    Topic,
}

impl QuestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestKind::Subreddit => "subreddit",
            QuestKind::Post => "post",
            QuestKind::Comment => "comment",
            QuestKind::User => "user",
            QuestKind::Topic => "topic",
        }
    }

    /// Which key a solved quest of this kind hands out.
    pub fn key_type(self) -> KeyType {
        match self {
            QuestKind::Subreddit => KeyType::Explorer,
            QuestKind::User => KeyType::Collaborator,
            QuestKind::Post | QuestKind::Comment | QuestKind::Topic => KeyType::Creator,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn points(self) -> u64 {
        match self {
            Difficulty::Easy => 100,
            Difficulty::Medium => 250,
            Difficulty::Hard => 500,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    #[default]
    Explorer,
    Collaborator,
    Creator,
}

impl KeyType {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyType::Explorer => "explorer",
            KeyType::Collaborator => "collaborator",
            KeyType::Creator => "creator",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestKind,
    pub difficulty: Difficulty,
    pub target: String,
    pub clue: String,
}

impl Quest {
    pub fn points(&self) -> u64 {
        self.difficulty.points()
    }

    pub fn key_type(&self) -> KeyType {
        self.kind.key_type()
    }
}
