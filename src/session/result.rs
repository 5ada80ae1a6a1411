use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::quest::verifier::Verdict;

/// The last answer and what the verifier made of it. Shown until its display
/// timer fires or the player moves on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PendingSubmission {
    pub answer: String,
    pub verdict: Verdict,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

impl PendingSubmission {
    pub fn new(answer: &str, verdict: Verdict, submitted_at: DateTime<Utc>) -> Self {
        let message = match verdict {
            Verdict::Correct => t!("result.correct"),
            Verdict::Incorrect => t!("result.incorrect"),
            Verdict::Invalid => t!("result.invalid"),
        };
        Self {
            answer: answer.to_string(),
            verdict,
            message: message.into_owned(),
            submitted_at,
        }
    }
}

/// A solved quest and how long it took.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SolveRecord {
    pub quest_id: String,
    pub elapsed_secs: u64,
    pub points: u64,
    pub solved_at: DateTime<Utc>,
}

/// Whole seconds from `started` to `now`, never negative. Zero if the quest
/// never recorded a start.
pub fn elapsed_secs(started: Option<DateTime<Utc>>, now: DateTime<Utc>) -> u64 {
    started
        .map(|start| (now - start).num_seconds().max(0) as u64)
        .unwrap_or(0)
}
