use std::collections::HashSet;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{QuestError, QuestResult};
use crate::quest::Quest;
use crate::quest::catalog::QuestCatalog;

pub struct QuestSelector<R: Rng = SmallRng> {
    catalog: Arc<QuestCatalog>,
    rng: R,
}

impl QuestSelector<SmallRng> {
    pub fn from_entropy(catalog: Arc<QuestCatalog>) -> Self {
        Self::new(catalog, SmallRng::from_entropy())
    }

    pub fn seeded(catalog: Arc<QuestCatalog>, seed: u64) -> Self {
        Self::new(catalog, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> QuestSelector<R> {
    pub fn new(catalog: Arc<QuestCatalog>, rng: R) -> Self {
        Self { catalog, rng }
    }

    pub fn catalog(&self) -> &QuestCatalog {
        &self.catalog
    }

    /// Pick uniformly among quests not in `completed`. Once every quest has
    /// been completed the whole catalog is eligible again.
    pub fn next(&mut self, completed: &HashSet<String>) -> QuestResult<Quest> {
        let available: Vec<&Quest> = self
            .catalog
            .quests()
            .iter()
            .filter(|q| !completed.contains(&q.id))
            .collect();

        let picked = if available.is_empty() {
            self.catalog.quests().choose(&mut self.rng)
        } else {
            available.choose(&mut self.rng).copied()
        };

        picked.cloned().ok_or(QuestError::EmptyCatalog)
    }
}
