use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::score_keeper::ANONYMOUS;

/// Each message kind has this many phrasings in the locale files.
pub const MESSAGE_VARIANTS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Welcome,
    Success,
    Failure,
    Hint,
    Encouragement,
}

impl MessageKind {
    pub const ALL: [MessageKind; 5] = [
        MessageKind::Welcome,
        MessageKind::Success,
        MessageKind::Failure,
        MessageKind::Hint,
        MessageKind::Encouragement,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Welcome => "welcome",
            MessageKind::Success => "success",
            MessageKind::Failure => "failure",
            MessageKind::Hint => "hint",
            MessageKind::Encouragement => "encouragement",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TreasureGodMessage {
    pub id: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
}

/// Picks the Treasure God's lines.
pub struct MessageGenerator<R: Rng = SmallRng> {
    rng: R,
    counter: u64,
}

impl MessageGenerator<SmallRng> {
    pub fn from_entropy() -> Self {
        Self::new(SmallRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> MessageGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, counter: 0 }
    }

    pub fn message(&mut self, kind: MessageKind) -> String {
        let variant = self.rng.gen_range(1..=MESSAGE_VARIANTS);
        let key = format!("god.{}.v{variant}", kind.as_str());
        t!(key.as_str()).into_owned()
    }

    pub fn announce(&mut self, kind: MessageKind, now: DateTime<Utc>) -> TreasureGodMessage {
        self.counter += 1;
        TreasureGodMessage {
            id: format!("msg_{}", self.counter),
            message: self.message(kind),
            kind,
            timestamp: now,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Early,
    OnTime,
    Late,
    VeryLate,
}

impl TimeOfDay {
    /// Local wall-clock hour, 0..24.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            1..=5 => TimeOfDay::Early,
            6..=11 => TimeOfDay::OnTime,
            12..=17 => TimeOfDay::Late,
            _ => TimeOfDay::VeryLate,
        }
    }

    fn key(self) -> &'static str {
        match self {
            TimeOfDay::Early => "greeting.early",
            TimeOfDay::OnTime => "greeting.ontime",
            TimeOfDay::Late => "greeting.late",
            TimeOfDay::VeryLate => "greeting.verylate",
        }
    }
}

pub fn greeting(username: &str, period: TimeOfDay) -> String {
    let name = if username == ANONYMOUS {
        t!("greeting.anonymous").into_owned()
    } else {
        format!("r/{username}")
    };
    t!(period.key(), name = name).into_owned()
}

/// `42` -> "42 seconds", `125` -> "2 minutes and 5 seconds".
pub fn format_solve_time(secs: u64) -> String {
    if secs < 60 {
        t!("solve_time.seconds", secs = secs).into_owned()
    } else {
        t!("solve_time.minutes", mins = secs / 60, secs = secs % 60).into_owned()
    }
}
