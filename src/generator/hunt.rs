use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::quest::{Difficulty, KeyType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubredditCount {
    pub name: &'static str,
    pub subscribers: u64,
    pub difficulty: Difficulty,
}

/// Known subscriber counts. Hunts are generated from this table and checked
/// against it.
pub const SUBREDDIT_COUNTS: &[SubredditCount] = &[
    SubredditCount {
        name: "wholesomememes",
        subscribers: 1_234_567,
        difficulty: Difficulty::Medium,
    },
    SubredditCount {
        name: "gaming",
        subscribers: 2_500_000,
        difficulty: Difficulty::Easy,
    },
    SubredditCount {
        name: "mildlyinteresting",
        subscribers: 987_654,
        difficulty: Difficulty::Hard,
    },
    SubredditCount {
        name: "AskReddit",
        subscribers: 1_500_000,
        difficulty: Difficulty::Easy,
    },
    SubredditCount {
        name: "todayilearned",
        subscribers: 750_000,
        difficulty: Difficulty::Medium,
    },
];

struct HuntTemplate {
    description: &'static str,
    difficulty: Difficulty,
    points: u64,
}

const USER_ACTIVITY_TEMPLATES: &[HuntTemplate] = &[
    HuntTemplate {
        description: "Find a user who posted in both r/gaming and r/technology today",
        difficulty: Difficulty::Medium,
        points: 300,
    },
    HuntTemplate {
        description: "Find a user with exactly 10,000 karma who posted in r/AskReddit",
        difficulty: Difficulty::Hard,
        points: 500,
    },
    HuntTemplate {
        description: "Find a user who created their account exactly 5 years ago today",
        difficulty: Difficulty::Easy,
        points: 150,
    },
];

const POST_CONTENT_TEMPLATES: &[HuntTemplate] = &[
    HuntTemplate {
        description: "Find a post with exactly 1,234 upvotes in r/mildlyinteresting",
        difficulty: Difficulty::Medium,
        points: 250,
    },
    HuntTemplate {
        description: "Find a post containing the word \"serendipity\" in r/Showerthoughts",
        difficulty: Difficulty::Hard,
        points: 400,
    },
    HuntTemplate {
        description: "Find a post with a cat in r/aww that was posted today",
        difficulty: Difficulty::Easy,
        points: 100,
    },
];

const CROSS_SUBREDDIT_TEMPLATES: &[HuntTemplate] = &[
    HuntTemplate {
        description: "Find a user who moderates both r/science and r/technology",
        difficulty: Difficulty::Hard,
        points: 600,
    },
    HuntTemplate {
        description: "Find a post that was cross-posted from r/gaming to r/funny",
        difficulty: Difficulty::Medium,
        points: 300,
    },
    HuntTemplate {
        description: "Find a subreddit that has exactly 3 related subreddits",
        difficulty: Difficulty::Easy,
        points: 200,
    },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HuntType {
    SubscriberCount,
    UserActivity,
    PostContent,
    CrossSubreddit,
    /// Any type string this build does not know about.
    #[serde(other)]
    Unknown,
}

impl HuntType {
    pub const GENERATED: [HuntType; 4] = [
        HuntType::SubscriberCount,
        HuntType::UserActivity,
        HuntType::PostContent,
        HuntType::CrossSubreddit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HuntType::SubscriberCount => "subscriber_count",
            HuntType::UserActivity => "user_activity",
            HuntType::PostContent => "post_content",
            HuntType::CrossSubreddit => "cross_subreddit",
            HuntType::Unknown => "unknown",
        }
    }

    pub fn key_type(self) -> KeyType {
        match self {
            HuntType::SubscriberCount | HuntType::Unknown => KeyType::Explorer,
            HuntType::UserActivity => KeyType::Collaborator,
            HuntType::PostContent | HuntType::CrossSubreddit => KeyType::Creator,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunt {
    pub id: String,
    #[serde(rename = "type")]
    pub hunt_type: HuntType,
    pub difficulty: Difficulty,
    pub title: String,
    pub description: String,
    pub challenge: String,
    pub points: u64,
    pub hints: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Hunt {
    pub fn key_type(&self) -> KeyType {
        self.hunt_type.key_type()
    }

    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.is_none_or(|expires| expires > now)
    }
}

pub struct HuntGenerator<R: Rng = SmallRng> {
    rng: R,
    counter: u64,
}

impl HuntGenerator<SmallRng> {
    pub fn from_entropy() -> Self {
        Self::new(SmallRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> HuntGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, counter: 0 }
    }

    /// Number of hunts generated so far.
    pub fn generated(&self) -> u64 {
        self.counter
    }

    pub fn generate_daily_hunt(&mut self, now: DateTime<Utc>) -> Hunt {
        self.counter += 1;
        let hunt_type = HuntType::GENERATED[self.rng.gen_range(0..HuntType::GENERATED.len())];
        let hunt = match hunt_type {
            HuntType::SubscriberCount => self.subscriber_count_hunt(now),
            HuntType::UserActivity => self.templated_hunt(
                HuntType::UserActivity,
                "User Detective",
                USER_ACTIVITY_TEMPLATES,
                &[
                    "Check recent posts and comments",
                    "Look at user profiles and activity",
                    "Use Reddit search features",
                ],
                now,
            ),
            HuntType::PostContent => self.templated_hunt(
                HuntType::PostContent,
                "Content Hunter",
                POST_CONTENT_TEMPLATES,
                &[
                    "Browse through recent posts",
                    "Use search filters and sorting",
                    "Check post details and metadata",
                ],
                now,
            ),
            HuntType::CrossSubreddit | HuntType::Unknown => self.templated_hunt(
                HuntType::CrossSubreddit,
                "Cross-Platform Explorer",
                CROSS_SUBREDDIT_TEMPLATES,
                &[
                    "Explore multiple subreddits",
                    "Look for connections between communities",
                    "Check moderator lists and related subreddits",
                ],
                now,
            ),
        };
        debug!(hunt_id = %hunt.id, hunt_type = hunt.hunt_type.as_str(), "generated hunt");
        hunt
    }

    fn next_id(&self) -> String {
        format!("hunt_{}", self.counter)
    }

    fn subscriber_count_hunt(&mut self, now: DateTime<Utc>) -> Hunt {
        let target = SUBREDDIT_COUNTS[self.rng.gen_range(0..SUBREDDIT_COUNTS.len())];
        let count = target.subscribers;
        let description = format!(
            "Find the subreddit with exactly {} subscribers",
            format_thousands(count)
        );

        Hunt {
            id: self.next_id(),
            hunt_type: HuntType::SubscriberCount,
            difficulty: target.difficulty,
            title: "Subreddit Explorer".to_string(),
            challenge: description.clone(),
            description,
            points: target.difficulty.points(),
            hints: vec![
                format!(
                    "The subreddit has between {} and {} subscribers",
                    format_thousands(count * 9 / 10),
                    format_thousands(count * 11 / 10)
                ),
                "The subreddit name contains common words".to_string(),
                "It's a popular community on Reddit".to_string(),
            ],
            is_active: true,
            created_at: now,
            expires_at: None,
        }
    }

    fn templated_hunt(
        &mut self,
        hunt_type: HuntType,
        title: &str,
        templates: &[HuntTemplate],
        hints: &[&str],
        now: DateTime<Utc>,
    ) -> Hunt {
        let id = self.next_id();
        let template = &templates[self.rng.gen_range(0..templates.len())];

        Hunt {
            id,
            hunt_type,
            difficulty: template.difficulty,
            title: title.to_string(),
            description: template.description.to_string(),
            challenge: template.description.to_string(),
            points: template.points,
            hints: hints.iter().map(|h| h.to_string()).collect(),
            is_active: true,
            created_at: now,
            expires_at: None,
        }
    }
}

/// `1234567` -> `"1,234,567"`.
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
