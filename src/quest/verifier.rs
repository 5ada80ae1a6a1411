use std::sync::LazyLock;

use icu_normalizer::ComposingNormalizerBorrowed;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::generator::hunt::{Hunt, HuntType, SUBREDDIT_COUNTS, format_thousands};
use crate::quest::{Quest, QuestKind};

/// Words this short are ignored when matching keyword targets.
const MIN_KEYWORD_LEN: usize = 3;

const KNOWN_ACTIVE_USERS: &[&str] = &[
    "TechGamer123",
    "ScienceModerator",
    "RedditVeteran",
    "CrossPoster",
    "MultiSubUser",
];

const KNOWN_POST_CONTENT: &[&str] = &[
    "1234 upvotes",
    "serendipity",
    "cat picture",
    "mildly interesting fact",
    "shower thought",
];

const KNOWN_CROSS_ACTIVITIES: &[&str] = &[
    "moderator",
    "cross-post",
    "related subreddit",
    "community connection",
    "multi-subreddit",
];

static COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,3}(?:,\d{3})*)").expect("count pattern is valid"));

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Incorrect,
    /// The quest itself could not be checked. Not the player's fault.
    Invalid,
}

impl Verdict {
    pub fn is_correct(self) -> bool {
        matches!(self, Verdict::Correct)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Correct => "correct",
            Verdict::Incorrect => "incorrect",
            Verdict::Invalid => "invalid",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HuntVerdict {
    pub verdict: Verdict,
    pub message: String,
    pub points: u64,
}

impl HuntVerdict {
    fn correct(message: impl Into<String>, points: u64) -> Self {
        Self {
            verdict: Verdict::Correct,
            message: message.into(),
            points,
        }
    }

    fn incorrect(message: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Incorrect,
            message: message.into(),
            points: 0,
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Invalid,
            message: message.into(),
            points: 0,
        }
    }
}

/// Stateless answer checker. Every method is a pure function of its inputs.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnswerVerifier;

impl AnswerVerifier {
    pub fn new() -> Self {
        Self
    }

    pub fn verify(&self, quest: &Quest, submission: &str) -> Verdict {
        let answer = normalize(submission);
        let target = normalize(&quest.target);

        let correct = match quest.kind {
            QuestKind::Subreddit => matches_subreddit(&target, &answer),
            QuestKind::Post | QuestKind::Comment | QuestKind::User | QuestKind::Topic => {
                matches_keywords(&target, &answer)
            }
        };

        if correct {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        }
    }

    pub fn verify_hunt(&self, hunt: &Hunt, solution: &str) -> HuntVerdict {
        let answer = normalize(solution);
        let verdict = match hunt.hunt_type {
            HuntType::SubscriberCount => verify_subscriber_count(hunt, &answer),
            HuntType::UserActivity => verify_contains_any(
                hunt,
                &answer,
                KNOWN_ACTIVE_USERS,
                "hunt.collaborator_found",
                "hunt.collaborator_missed",
            ),
            HuntType::PostContent => verify_contains_any(
                hunt,
                &answer,
                KNOWN_POST_CONTENT,
                "hunt.creator_found",
                "hunt.creator_missed",
            ),
            HuntType::CrossSubreddit => verify_contains_any(
                hunt,
                &answer,
                KNOWN_CROSS_ACTIVITIES,
                "hunt.cross_found",
                "hunt.cross_missed",
            ),
            HuntType::Unknown => HuntVerdict::invalid(t!("hunt.unknown_type")),
        };

        if verdict.verdict == Verdict::Invalid {
            warn!(hunt_id = %hunt.id, hunt_type = hunt.hunt_type.as_str(), "hunt could not be verified");
        }
        verdict
    }
}

/// NFC-compose, lowercase and trim.
pub fn normalize(text: &str) -> String {
    let composed = ComposingNormalizerBorrowed::new_nfc().normalize(text);
    composed.to_lowercase().trim().to_string()
}

fn matches_subreddit(target: &str, answer: &str) -> bool {
    let bare = target.strip_prefix("r/").unwrap_or(target);
    answer == bare || answer == format!("r/{bare}") || answer.contains(bare)
}

fn matches_keywords(target: &str, answer: &str) -> bool {
    let keywords: Vec<&str> = target
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_KEYWORD_LEN)
        .collect();

    // A target made only of short words has no keywords, so anything passes.
    keywords.iter().all(|w| answer.contains(w)) || answer.contains(target) || answer == target
}

fn verify_subscriber_count(hunt: &Hunt, answer: &str) -> HuntVerdict {
    let Some(target) = COUNT_RE
        .captures(&hunt.description)
        .and_then(|caps| caps[1].replace(',', "").parse::<u64>().ok())
    else {
        return HuntVerdict::invalid(t!("hunt.bad_format"));
    };

    let subreddit = answer.strip_prefix("r/").unwrap_or(answer);
    let actual = SUBREDDIT_COUNTS
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(subreddit))
        .map(|entry| entry.subscribers);

    match actual {
        Some(count) if count == target => HuntVerdict::correct(
            t!(
                "hunt.explorer_found",
                subreddit = subreddit,
                count = format_thousands(count)
            ),
            hunt.points,
        ),
        _ => {
            let count = actual.map_or_else(|| "unknown".to_string(), format_thousands);
            HuntVerdict::incorrect(t!(
                "hunt.explorer_missed",
                subreddit = subreddit,
                count = count,
                target = format_thousands(target)
            ))
        }
    }
}

fn verify_contains_any(
    hunt: &Hunt,
    answer: &str,
    known: &[&str],
    found_key: &str,
    missed_key: &str,
) -> HuntVerdict {
    let hit = known.iter().any(|k| answer.contains(&k.to_lowercase()));
    if hit {
        HuntVerdict::correct(t!(found_key), hunt.points)
    } else {
        HuntVerdict::incorrect(t!(missed_key))
    }
}
