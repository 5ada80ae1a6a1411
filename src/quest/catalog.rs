use std::collections::HashSet;

use crate::error::{QuestError, QuestResult};
use crate::quest::Quest;

const QUESTS_JSON: &str = include_str!("../../assets/quests.json");

/// Fixed, read-only list of quests. Built once and shared behind an `Arc`.
#[derive(Clone, Debug, Default)]
pub struct QuestCatalog {
    quests: Vec<Quest>,
}

impl QuestCatalog {
    pub fn new(quests: Vec<Quest>) -> QuestResult<Self> {
        let mut seen = HashSet::with_capacity(quests.len());
        for quest in &quests {
            if !seen.insert(quest.id.as_str()) {
                return Err(QuestError::DuplicateQuestId(quest.id.clone()));
            }
        }
        Ok(Self { quests })
    }

    /// The quests bundled with the game.
    pub fn builtin() -> QuestResult<Self> {
        let quests: Vec<Quest> = serde_json::from_str(QUESTS_JSON)?;
        Self::new(quests)
    }

    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    pub fn get(&self, id: &str) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == id)
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::{Difficulty, QuestKind};

    fn quest(id: &str) -> Quest {
        Quest {
            id: id.to_string(),
            kind: QuestKind::Topic,
            difficulty: Difficulty::Easy,
            target: "target".to_string(),
            clue: "clue".to_string(),
        }
    }

    #[test]
    fn builtin_catalog_loads_all_quests() {
        let catalog = QuestCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 16);
        let wholesome = catalog.get("sub_wholesome").unwrap();
        assert_eq!(wholesome.kind, QuestKind::Subreddit);
        assert_eq!(wholesome.target, "r/wholesomememes");
        assert_eq!(wholesome.points(), 250);
    }

    #[test]
    fn builtin_ids_are_unique() {
        let catalog = QuestCatalog::builtin().unwrap();
        let ids: HashSet<&str> = catalog.quests().iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = QuestCatalog::new(vec![quest("a"), quest("b"), quest("a")]).unwrap_err();
        assert!(matches!(err, QuestError::DuplicateQuestId(id) if id == "a"));
    }

    #[test]
    fn empty_catalog_is_allowed_but_empty() {
        let catalog = QuestCatalog::new(Vec::new()).unwrap();
        assert!(catalog.is_empty());
        assert!(catalog.get("anything").is_none());
    }

    #[test]
    fn catalog_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QuestCatalog>();
    }
}
