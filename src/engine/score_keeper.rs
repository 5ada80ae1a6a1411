use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::quest::KeyType;

/// Identity used until (and unless) a real username is known.
pub const ANONYMOUS: &str = "anonymous";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysCollected {
    pub explorer: u32,
    pub collaborator: u32,
    pub creator: u32,
}

impl KeysCollected {
    fn add(&mut self, key_type: KeyType) {
        match key_type {
            KeyType::Explorer => self.explorer += 1,
            KeyType::Collaborator => self.collaborator += 1,
            KeyType::Creator => self.creator += 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub username: String,
    #[serde(rename = "totalKeys")]
    pub keys: u32,
    #[serde(rename = "totalScore")]
    pub score: u64,
    pub current_streak: u32,
    pub keys_collected: KeysCollected,
    pub last_active_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Player {
    pub fn new(username: &str, now: DateTime<Utc>) -> Self {
        Self {
            username: username.to_string(),
            keys: 0,
            score: 0,
            current_streak: 0,
            keys_collected: KeysCollected::default(),
            last_active_at: now,
            created_at: now,
        }
    }
}

/// One key handed out for one solved quest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Key {
    pub id: String,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    pub quest_id: String,
    pub player_id: String,
    pub collected_at: DateTime<Utc>,
    pub points: u64,
}

#[derive(Debug, Default)]
struct Ledger {
    players: Vec<Player>,
    keys: Vec<Key>,
}

impl Ledger {
    fn entry(&mut self, username: &str, now: DateTime<Utc>) -> &mut Player {
        let idx = match self.players.iter().position(|p| p.username == username) {
            Some(idx) => idx,
            None => {
                debug!(username, "tracking new player");
                self.players.push(Player::new(username, now));
                self.players.len() - 1
            }
        };
        &mut self.players[idx]
    }

    fn holds_key(&self, username: &str, quest_id: &str) -> bool {
        self.keys
            .iter()
            .any(|k| k.player_id == username && k.quest_id == quest_id)
    }

    fn credit(
        &mut self,
        username: &str,
        quest_id: &str,
        points: u64,
        key_type: KeyType,
        now: DateTime<Utc>,
    ) -> Player {
        let key_id = format!("key_{}", self.keys.len() + 1);

        let player = self.entry(username, now);
        player.keys += 1;
        player.score += points;
        player.current_streak += 1;
        player.keys_collected.add(key_type);
        player.last_active_at = now;
        let updated = player.clone();

        self.keys.push(Key {
            id: key_id,
            key_type,
            quest_id: quest_id.to_string(),
            player_id: username.to_string(),
            collected_at: now,
            points,
        });

        info!(
            username,
            quest_id,
            points,
            keys = updated.keys,
            score = updated.score,
            "key collected"
        );
        updated
    }
}

/// Cumulative standing for every player seen this session.
///
/// All reads and writes go through one lock, so a snapshot never sees a
/// reward with keys applied but score not (or the reverse).
#[derive(Debug, Default)]
pub struct ScoreKeeper {
    ledger: Mutex<Ledger>,
}

impl ScoreKeeper {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make sure `username` is tracked; returns its current standing.
    pub fn observe(&self, username: &str, now: DateTime<Utc>) -> Player {
        self.lock().entry(username, now).clone()
    }

    /// Credit one solved quest: +1 key, +`points` score, +1 streak.
    pub fn reward(
        &self,
        username: &str,
        quest_id: &str,
        points: u64,
        key_type: KeyType,
        now: DateTime<Utc>,
    ) -> Player {
        self.lock().credit(username, quest_id, points, key_type, now)
    }

    /// Like [`reward`](Self::reward), but only if `username` holds no key for
    /// `quest_id` yet. Returns `None` when the key was already collected.
    pub fn reward_once(
        &self,
        username: &str,
        quest_id: &str,
        points: u64,
        key_type: KeyType,
        now: DateTime<Utc>,
    ) -> Option<Player> {
        let mut ledger = self.lock();
        if ledger.holds_key(username, quest_id) {
            debug!(username, quest_id, "key already collected");
            return None;
        }
        Some(ledger.credit(username, quest_id, points, key_type, now))
    }

    pub fn has_key(&self, username: &str, quest_id: &str) -> bool {
        self.lock().holds_key(username, quest_id)
    }

    /// Move a player's record to a new name. Does nothing if `to` is already
    /// tracked or `from` is unknown.
    pub fn rename(&self, from: &str, to: &str) -> bool {
        let mut ledger = self.lock();
        if ledger.players.iter().any(|p| p.username == to) {
            return false;
        }
        let Some(player) = ledger.players.iter_mut().find(|p| p.username == from) else {
            return false;
        };
        player.username = to.to_string();
        for key in ledger.keys.iter_mut().filter(|k| k.player_id == from) {
            key.player_id = to.to_string();
        }
        true
    }

    pub fn player(&self, username: &str) -> Option<Player> {
        self.lock()
            .players
            .iter()
            .find(|p| p.username == username)
            .cloned()
    }

    /// Consistent copy of every tracked player, in first-seen order.
    pub fn snapshot(&self) -> Vec<Player> {
        self.lock().players.clone()
    }

    pub fn keys(&self) -> Vec<Key> {
        self.lock().keys.clone()
    }

    pub fn keys_collected_on(&self, day: NaiveDate) -> usize {
        self.lock()
            .keys
            .iter()
            .filter(|k| k.collected_at.date_naive() == day)
            .count()
    }
}
