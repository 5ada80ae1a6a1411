use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::SmallRng;
use rand::Rng;
use tracing::{debug, warn};

use crate::config::Config;
use crate::engine::leaderboard::{Leaderboard, LeaderboardRanker};
use crate::engine::score_keeper::{ANONYMOUS, ScoreKeeper};
use crate::error::{QuestError, QuestResult};
use crate::quest::Quest;
use crate::quest::selector::QuestSelector;
use crate::quest::verifier::{AnswerVerifier, Verdict};
use crate::session::result::{PendingSubmission, SolveRecord, elapsed_secs};
use crate::session::state::GameState;

/// How long a verdict stays on screen before the session moves on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayDelays {
    pub success: Duration,
    pub failure: Duration,
}

impl Default for DisplayDelays {
    fn default() -> Self {
        Self {
            success: Duration::seconds(2),
            failure: Duration::seconds(3),
        }
    }
}

impl DisplayDelays {
    pub fn from_config(config: &Config) -> Self {
        Self {
            success: millis(config.success_delay_ms),
            failure: millis(config.failure_delay_ms),
        }
    }
}

fn millis(ms: u64) -> Duration {
    Duration::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerAction {
    EnterSuccessFlow,
    ClearResult,
}

#[derive(Clone, Copy, Debug)]
struct ResultTimer {
    fires_at: DateTime<Utc>,
    action: TimerAction,
}

/// One player's run through the hunt.
///
/// Owns all session state. Delayed steps (showing a verdict, then moving on)
/// are kept as a single deadline that [`poll`](Self::poll) fires; any newer
/// submission or navigation replaces or cancels it.
pub struct SessionStateMachine<R: Rng = SmallRng> {
    state: GameState,
    username: String,
    current_quest: Option<Quest>,
    quest_started_at: Option<DateTime<Utc>>,
    completed_quest_ids: HashSet<String>,
    solved: bool,
    pending: Option<PendingSubmission>,
    timer: Option<ResultTimer>,
    last_solve: Option<SolveRecord>,
    leaderboard: Leaderboard,
    selector: QuestSelector<R>,
    verifier: AnswerVerifier,
    ranker: LeaderboardRanker,
    keeper: Arc<ScoreKeeper>,
    delays: DisplayDelays,
}

impl<R: Rng> SessionStateMachine<R> {
    /// Starts on the welcome screen with the first quest already drawn.
    pub fn new(
        mut selector: QuestSelector<R>,
        keeper: Arc<ScoreKeeper>,
        delays: DisplayDelays,
        now: DateTime<Utc>,
    ) -> Self {
        let current_quest = match selector.next(&HashSet::new()) {
            Ok(quest) => Some(quest),
            Err(e) => {
                warn!(error = %e, "session starting without a quest");
                None
            }
        };
        keeper.observe(ANONYMOUS, now);

        let ranker = LeaderboardRanker::new();
        let leaderboard = ranker.rank_keeper(&keeper);

        Self {
            state: GameState::Welcome,
            username: ANONYMOUS.to_string(),
            current_quest,
            quest_started_at: None,
            completed_quest_ids: HashSet::new(),
            solved: false,
            pending: None,
            timer: None,
            last_solve: None,
            leaderboard,
            selector,
            verifier: AnswerVerifier::new(),
            ranker,
            keeper,
            delays,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn current_quest(&self) -> Option<&Quest> {
        self.current_quest.as_ref()
    }

    pub fn quest_started_at(&self) -> Option<DateTime<Utc>> {
        self.quest_started_at
    }

    pub fn completed_quest_ids(&self) -> &HashSet<String> {
        &self.completed_quest_ids
    }

    pub fn pending(&self) -> Option<&PendingSubmission> {
        self.pending.as_ref()
    }

    pub fn last_solve(&self) -> Option<&SolveRecord> {
        self.last_solve.as_ref()
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn keeper(&self) -> &ScoreKeeper {
        &self.keeper
    }

    /// True once the current quest has been answered correctly.
    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn pending_timer_deadline(&self) -> Option<DateTime<Utc>> {
        self.timer.map(|t| t.fires_at)
    }

    pub fn start_hunt(&mut self, now: DateTime<Utc>) {
        if self.state != GameState::Welcome {
            return;
        }
        self.quest_started_at = Some(now);
        self.go(GameState::Clue);
    }

    pub fn view_puzzle(&mut self) {
        if self.state == GameState::Clue {
            self.go(GameState::Puzzle);
        }
    }

    /// Check `text` against the current quest. A correct answer is credited
    /// immediately; the success screen follows once the display delay passes.
    pub fn submit_answer(&mut self, text: &str, now: DateTime<Utc>) -> QuestResult<Verdict> {
        let Some(quest) = self.current_quest.clone() else {
            return Err(QuestError::NoActiveQuest);
        };
        if self.state != GameState::Puzzle {
            return Err(QuestError::NotOnPuzzle(self.state));
        }
        if self.solved {
            // Already credited; waiting on the success screen.
            return Ok(Verdict::Correct);
        }

        let verdict = self.verifier.verify(&quest, text);
        self.pending = Some(PendingSubmission::new(text, verdict, now));
        debug!(quest_id = %quest.id, verdict = verdict.as_str(), "answer submitted");

        match verdict {
            Verdict::Correct => {
                let elapsed = elapsed_secs(self.quest_started_at, now);
                self.completed_quest_ids.insert(quest.id.clone());
                self.keeper.reward(
                    &self.username,
                    &quest.id,
                    quest.points(),
                    quest.key_type(),
                    now,
                );
                self.solved = true;
                self.last_solve = Some(SolveRecord {
                    quest_id: quest.id,
                    elapsed_secs: elapsed,
                    points: quest.difficulty.points(),
                    solved_at: now,
                });
                self.refresh_leaderboard();
                self.schedule(TimerAction::EnterSuccessFlow, self.delays.success, now);
            }
            Verdict::Incorrect | Verdict::Invalid => {
                self.schedule(TimerAction::ClearResult, self.delays.failure, now);
            }
        }
        Ok(verdict)
    }

    /// Fire the pending display timer if its deadline has passed.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        let Some(timer) = self.timer else {
            return false;
        };
        if now < timer.fires_at {
            return false;
        }

        self.timer = None;
        self.pending = None;
        if timer.action == TimerAction::EnterSuccessFlow && self.state == GameState::Puzzle {
            self.go(GameState::SuccessFlow);
        }
        true
    }

    pub fn next_quest(&mut self, now: DateTime<Utc>) {
        if self.state != GameState::SuccessFlow {
            return;
        }
        self.advance_quest(now);
        self.go(GameState::Clue);
    }

    pub fn view_leaderboard(&mut self) {
        if !self.state.can_view_leaderboard() {
            return;
        }
        self.cancel_timer();
        self.refresh_leaderboard();
        self.go(GameState::Leaderboard);
    }

    pub fn view_how_to_play(&mut self) {
        if self.state == GameState::Welcome {
            self.go(GameState::HowToPlay);
        }
    }

    pub fn back_to_welcome(&mut self) {
        if self.state == GameState::HowToPlay {
            self.go(GameState::Welcome);
        }
    }

    /// Leave the puzzle or the leaderboard for the clue screen. Abandoning an
    /// answer costs nothing; a quest that was already solved is replaced.
    pub fn back_to_quest(&mut self, now: DateTime<Utc>) {
        if !matches!(self.state, GameState::Puzzle | GameState::Leaderboard) {
            return;
        }
        self.cancel_timer();
        if self.solved {
            self.advance_quest(now);
        }
        self.go(GameState::Clue);
    }

    /// Adopt a looked-up username, carrying over anything earned so far.
    pub fn set_username(&mut self, username: &str, now: DateTime<Utc>) {
        if username.is_empty() || username == self.username {
            return;
        }
        if !self.keeper.rename(&self.username, username) {
            self.keeper.observe(username, now);
        }
        debug!(from = %self.username, to = username, "player identified");
        self.username = username.to_string();
        self.refresh_leaderboard();
    }

    pub fn refresh_leaderboard(&mut self) {
        self.leaderboard = self.ranker.rank_keeper(&self.keeper);
    }

    fn advance_quest(&mut self, now: DateTime<Utc>) {
        match self.selector.next(&self.completed_quest_ids) {
            Ok(quest) => self.current_quest = Some(quest),
            Err(e) => warn!(error = %e, "could not draw next quest"),
        }
        self.solved = false;
        self.quest_started_at = Some(now);
        self.cancel_timer();
    }

    fn schedule(&mut self, action: TimerAction, delay: Duration, now: DateTime<Utc>) {
        self.timer = Some(ResultTimer {
            fires_at: now + delay,
            action,
        });
    }

    fn cancel_timer(&mut self) {
        self.timer = None;
        self.pending = None;
    }

    fn go(&mut self, to: GameState) {
        debug!(from = %self.state, to = %to, "state transition");
        self.state = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::catalog::QuestCatalog;
    use crate::quest::{Difficulty, QuestKind};

    fn quest(id: &str, kind: QuestKind, difficulty: Difficulty, target: &str) -> Quest {
        Quest {
            id: id.to_string(),
            kind,
            difficulty,
            target: target.to_string(),
            clue: format!("clue for {id}"),
        }
    }

    fn single_quest_session() -> SessionStateMachine {
        let catalog = QuestCatalog::new(vec![quest(
            "sub_wholesome",
            QuestKind::Subreddit,
            Difficulty::Medium,
            "r/wholesomememes",
        )])
        .unwrap();
        session_for(catalog)
    }

    fn session_for(catalog: QuestCatalog) -> SessionStateMachine {
        let selector = QuestSelector::seeded(Arc::new(catalog), 1);
        SessionStateMachine::new(
            selector,
            Arc::new(ScoreKeeper::new()),
            DisplayDelays::default(),
            Utc::now(),
        )
    }

    fn on_puzzle(session: &mut SessionStateMachine, now: DateTime<Utc>) {
        session.start_hunt(now);
        session.view_puzzle();
        assert_eq!(session.state(), GameState::Puzzle);
    }

    #[test]
    fn starts_on_welcome_with_quest_selected() {
        let session = single_quest_session();
        assert_eq!(session.state(), GameState::Welcome);
        assert_eq!(session.current_quest().unwrap().id, "sub_wholesome");
        assert!(session.quest_started_at().is_none());
        assert_eq!(session.username(), ANONYMOUS);
    }

    #[test]
    fn correct_answer_reaches_success_flow_after_delay() {
        let mut session = single_quest_session();
        let t0 = Utc::now();
        on_puzzle(&mut session, t0);

        let t1 = t0 + Duration::seconds(65);
        let verdict = session.submit_answer("wholesomememes", t1).unwrap();
        assert_eq!(verdict, Verdict::Correct);

        // Still on the puzzle while the result shows.
        assert_eq!(session.state(), GameState::Puzzle);
        assert_eq!(session.pending().unwrap().verdict, Verdict::Correct);
        assert!(!session.poll(t1 + Duration::milliseconds(1_999)));
        assert_eq!(session.state(), GameState::Puzzle);

        assert!(session.poll(t1 + Duration::seconds(2)));
        assert_eq!(session.state(), GameState::SuccessFlow);
        assert!(session.pending().is_none());

        assert_eq!(session.completed_quest_ids().len(), 1);
        assert!(session.completed_quest_ids().contains("sub_wholesome"));
        let solve = session.last_solve().unwrap();
        assert_eq!(solve.elapsed_secs, 65);
        assert_eq!(solve.points, 250);
    }

    #[test]
    fn correct_answer_credits_keeper_and_leaderboard() {
        let mut session = single_quest_session();
        let now = Utc::now();
        on_puzzle(&mut session, now);
        session.submit_answer("r/wholesomememes", now).unwrap();

        let me = session.keeper().player(ANONYMOUS).unwrap();
        assert_eq!(me.keys, 1);
        assert_eq!(me.score, 250);
        let entry = session.leaderboard().find(ANONYMOUS).unwrap();
        assert_eq!((entry.rank, entry.keys, entry.score), (1, 1, 250));
    }

    #[test]
    fn resubmitting_while_solved_does_not_double_credit() {
        let mut session = single_quest_session();
        let now = Utc::now();
        on_puzzle(&mut session, now);
        session.submit_answer("wholesomememes", now).unwrap();
        session.submit_answer("wholesomememes", now).unwrap();
        assert_eq!(session.keeper().player(ANONYMOUS).unwrap().keys, 1);
    }

    #[test]
    fn incorrect_answer_clears_after_delay_and_stays_on_puzzle() {
        let mut session = single_quest_session();
        let now = Utc::now();
        on_puzzle(&mut session, now);

        let verdict = session.submit_answer("wholesome", now).unwrap();
        assert_eq!(verdict, Verdict::Incorrect);
        assert!(session.pending().is_some());
        assert!(!session.poll(now + Duration::seconds(2)));
        assert!(session.poll(now + Duration::seconds(3)));
        assert!(session.pending().is_none());
        assert_eq!(session.state(), GameState::Puzzle);
        assert!(session.completed_quest_ids().is_empty());
        assert_eq!(session.keeper().player(ANONYMOUS).unwrap().score, 0);
    }

    #[test]
    fn new_submission_supersedes_pending_timer() {
        let mut session = single_quest_session();
        let now = Utc::now();
        on_puzzle(&mut session, now);

        session.submit_answer("nope", now).unwrap();
        let later = now + Duration::seconds(2);
        session.submit_answer("wholesomememes", later).unwrap();

        // The miss's clear-timer would have fired here; the success one has not.
        assert!(!session.poll(now + Duration::seconds(3)));
        assert_eq!(session.pending().unwrap().verdict, Verdict::Correct);
        assert_eq!(
            session.pending_timer_deadline(),
            Some(later + Duration::seconds(2))
        );
        assert!(session.poll(later + Duration::seconds(2)));
        assert_eq!(session.state(), GameState::SuccessFlow);
    }

    #[test]
    fn navigation_cancels_pending_timer() {
        let mut session = single_quest_session();
        let now = Utc::now();
        on_puzzle(&mut session, now);
        session.submit_answer("nope", now).unwrap();
        session.back_to_quest(now);
        assert_eq!(session.state(), GameState::Clue);
        assert!(session.pending().is_none());
        assert!(session.pending_timer_deadline().is_none());
        assert!(!session.poll(now + Duration::seconds(10)));
    }

    #[test]
    fn submit_off_puzzle_is_rejected() {
        let mut session = single_quest_session();
        let err = session.submit_answer("wholesomememes", Utc::now()).unwrap_err();
        assert!(matches!(err, QuestError::NotOnPuzzle(GameState::Welcome)));
    }

    #[test]
    fn submit_without_quest_fails() {
        let mut session = session_for(QuestCatalog::new(Vec::new()).unwrap());
        assert!(session.current_quest().is_none());
        session.start_hunt(Utc::now());
        session.view_puzzle();
        let err = session.submit_answer("anything", Utc::now()).unwrap_err();
        assert!(matches!(err, QuestError::NoActiveQuest));
    }

    #[test]
    fn next_quest_avoids_completed_and_resets_start() {
        let catalog = QuestCatalog::new(vec![
            quest("a", QuestKind::Topic, Difficulty::Easy, "apple"),
            quest("b", QuestKind::Topic, Difficulty::Hard, "banana"),
        ])
        .unwrap();
        let mut session = session_for(catalog);
        let t0 = Utc::now();
        on_puzzle(&mut session, t0);

        let first = session.current_quest().unwrap().clone();
        session.submit_answer(&first.target, t0).unwrap();
        session.poll(t0 + Duration::seconds(2));
        assert_eq!(session.state(), GameState::SuccessFlow);

        let t1 = t0 + Duration::seconds(30);
        session.next_quest(t1);
        assert_eq!(session.state(), GameState::Clue);
        assert_ne!(session.current_quest().unwrap().id, first.id);
        assert_eq!(session.quest_started_at(), Some(t1));
        assert!(!session.is_solved());
    }

    #[test]
    fn next_quest_only_from_success_flow() {
        let mut session = single_quest_session();
        let now = Utc::now();
        session.next_quest(now);
        assert_eq!(session.state(), GameState::Welcome);
    }

    #[test]
    fn leaderboard_reranks_scores_from_other_sessions() {
        let keeper = Arc::new(ScoreKeeper::new());
        let catalog = Arc::new(
            QuestCatalog::new(vec![quest(
                "sub_wholesome",
                QuestKind::Subreddit,
                Difficulty::Medium,
                "r/wholesomememes",
            )])
            .unwrap(),
        );
        let now = Utc::now();
        let session = |seed| {
            SessionStateMachine::new(
                QuestSelector::seeded(Arc::clone(&catalog), seed),
                Arc::clone(&keeper),
                DisplayDelays::default(),
                now,
            )
        };

        let mut alice = session(1);
        alice.set_username("alice", now);
        let mut rival = session(2);
        rival.set_username("rival", now);

        on_puzzle(&mut rival, now);
        rival.submit_answer("wholesomememes", now).unwrap();
        assert!(alice.leaderboard().find("rival").is_none());

        alice.start_hunt(now);
        alice.view_leaderboard();
        assert_eq!(alice.state(), GameState::Leaderboard);
        let board = alice.leaderboard();
        assert_eq!(board.entries()[0].username, "rival");
        assert_eq!(board.entries()[0].keys, 1);
        assert_eq!(board.find("alice").unwrap().rank, 2);
    }

    #[test]
    fn leaderboard_reachable_from_clue_puzzle_and_success() {
        let now = Utc::now();

        let mut session = single_quest_session();
        session.view_leaderboard();
        assert_eq!(session.state(), GameState::Welcome);

        session.start_hunt(now);
        session.view_leaderboard();
        assert_eq!(session.state(), GameState::Leaderboard);
        session.back_to_quest(now);
        assert_eq!(session.state(), GameState::Clue);

        session.view_puzzle();
        session.view_leaderboard();
        assert_eq!(session.state(), GameState::Leaderboard);

        session.back_to_quest(now);
        session.view_puzzle();
        session.submit_answer("wholesomememes", now).unwrap();
        session.poll(now + Duration::seconds(2));
        session.view_leaderboard();
        assert_eq!(session.state(), GameState::Leaderboard);
        assert_eq!(session.leaderboard().entries()[0].keys, 1);
    }

    #[test]
    fn leaving_a_solved_quest_draws_a_new_one() {
        let catalog = QuestCatalog::new(vec![
            quest("a", QuestKind::Topic, Difficulty::Easy, "apple"),
            quest("b", QuestKind::Topic, Difficulty::Easy, "banana"),
        ])
        .unwrap();
        let mut session = session_for(catalog);
        let now = Utc::now();
        on_puzzle(&mut session, now);
        let first = session.current_quest().unwrap().id.clone();
        let target = session.current_quest().unwrap().target.clone();
        session.submit_answer(&target, now).unwrap();

        session.view_leaderboard();
        session.back_to_quest(now);
        assert_eq!(session.state(), GameState::Clue);
        assert_ne!(session.current_quest().unwrap().id, first);
    }

    #[test]
    fn how_to_play_round_trip() {
        let mut session = single_quest_session();
        session.view_how_to_play();
        assert_eq!(session.state(), GameState::HowToPlay);
        session.start_hunt(Utc::now());
        assert_eq!(session.state(), GameState::HowToPlay);
        session.back_to_welcome();
        assert_eq!(session.state(), GameState::Welcome);
        assert!(session.quest_started_at().is_none());
    }

    #[test]
    fn set_username_carries_progress() {
        let mut session = single_quest_session();
        let now = Utc::now();
        on_puzzle(&mut session, now);
        session.submit_answer("wholesomememes", now).unwrap();

        session.set_username("spez", now);
        assert_eq!(session.username(), "spez");
        assert!(session.keeper().player(ANONYMOUS).is_none());
        assert_eq!(session.leaderboard().find("spez").unwrap().score, 250);
    }

    #[test]
    fn recycles_after_catalog_exhausted() {
        let mut session = single_quest_session();
        let now = Utc::now();
        on_puzzle(&mut session, now);
        session.submit_answer("wholesomememes", now).unwrap();
        session.poll(now + Duration::seconds(2));
        session.next_quest(now);
        assert_eq!(session.current_quest().unwrap().id, "sub_wholesome");

        session.view_puzzle();
        session.submit_answer("wholesomememes", now).unwrap();
        assert_eq!(session.completed_quest_ids().len(), 1);
        assert_eq!(session.keeper().player(ANONYMOUS).unwrap().keys, 2);
    }
}
