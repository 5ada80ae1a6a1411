use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, Timelike, Utc};
use tracing::info;

use crate::config::Config;
use crate::engine::leaderboard::Leaderboard;
use crate::engine::score_keeper::{ANONYMOUS, ScoreKeeper};
use crate::engine::stats::GameStats;
use crate::error::QuestResult;
use crate::event::{AppEvent, EventHandler};
use crate::generator::hunt::{Hunt, HuntGenerator};
use crate::generator::messages::{MessageGenerator, MessageKind, TimeOfDay, TreasureGodMessage};
use crate::quest::catalog::QuestCatalog;
use crate::quest::selector::QuestSelector;
use crate::quest::verifier::{AnswerVerifier, HuntVerdict, Verdict};
use crate::session::clock::{ClockHandle, CountdownClock, CountdownTicker};
use crate::session::machine::{DisplayDelays, SessionStateMachine};
use crate::session::state::GameState;
use crate::session::view::SessionView;

/// Wires one session to the shared keeper, the countdown and the event
/// loop. Front ends drive it with the navigation methods and [`pump`].
///
/// [`pump`]: App::pump
pub struct App {
    pub config: Config,
    session: SessionStateMachine,
    keeper: Arc<ScoreKeeper>,
    clock: ClockHandle,
    _ticker: CountdownTicker,
    events: EventHandler,
    messages: MessageGenerator,
    god_messages: Vec<TreasureGodMessage>,
    hunts: HuntGenerator,
    daily_hunts: Vec<Hunt>,
    verifier: AnswerVerifier,
}

impl App {
    pub fn new(config: Config) -> QuestResult<Self> {
        let catalog = Arc::new(QuestCatalog::builtin()?);
        Ok(Self::with_catalog(config, catalog, Arc::new(ScoreKeeper::new())))
    }

    /// Build against a given catalog and keeper. Several apps may share one
    /// keeper to play on the same leaderboard.
    pub fn with_catalog(config: Config, catalog: Arc<QuestCatalog>, keeper: Arc<ScoreKeeper>) -> Self {
        rust_i18n::set_locale(&config.locale);
        let now = Utc::now();

        let (selector, mut messages, hunts) = match config.rng_seed {
            Some(seed) => (
                QuestSelector::seeded(catalog, seed),
                MessageGenerator::seeded(seed.wrapping_add(1)),
                HuntGenerator::seeded(seed.wrapping_add(2)),
            ),
            None => (
                QuestSelector::from_entropy(catalog),
                MessageGenerator::from_entropy(),
                HuntGenerator::from_entropy(),
            ),
        };

        let session = SessionStateMachine::new(
            selector,
            Arc::clone(&keeper),
            DisplayDelays::from_config(&config),
            now,
        );

        let clock = CountdownClock::new(config.countdown_secs);
        let handle = clock.handle();
        let ticker = clock.start(Duration::from_secs(1));

        let events = EventHandler::new(Duration::from_millis(config.tick_rate_ms));
        if !config.identity_url.is_empty() {
            events.spawn_identity_lookup(
                config.identity_url.clone(),
                Duration::from_secs(config.identity_timeout_secs),
            );
        }

        let welcome = messages.announce(MessageKind::Welcome, now);
        info!(countdown_secs = config.countdown_secs, "quest session ready");

        Self {
            config,
            session,
            keeper,
            clock: handle,
            _ticker: ticker,
            events,
            messages,
            god_messages: vec![welcome],
            hunts,
            daily_hunts: Vec::new(),
            verifier: AnswerVerifier::new(),
        }
    }

    pub fn session(&self) -> &SessionStateMachine {
        &self.session
    }

    pub fn keeper(&self) -> &Arc<ScoreKeeper> {
        &self.keeper
    }

    pub fn clock(&self) -> &ClockHandle {
        &self.clock
    }

    pub fn state(&self) -> GameState {
        self.session.state()
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        self.session.leaderboard()
    }

    pub fn god_messages(&self) -> &[TreasureGodMessage] {
        &self.god_messages
    }

    pub fn latest_god_message(&self) -> Option<&TreasureGodMessage> {
        self.god_messages.last()
    }

    pub fn handle_event(&mut self, event: AppEvent, now: DateTime<Utc>) {
        match event {
            AppEvent::Tick => {
                self.session.poll(now);
            }
            AppEvent::Identity(name) => {
                if name != ANONYMOUS {
                    self.session.set_username(&name, now);
                }
            }
        }
    }

    /// Wait for the next event and apply it.
    pub fn step(&mut self) -> anyhow::Result<()> {
        let event = self.events.next()?;
        self.handle_event(event, Utc::now());
        Ok(())
    }

    /// Apply every queued event without blocking. Returns how many ran.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.events.try_next() {
            self.handle_event(event, Utc::now());
            handled += 1;
        }
        handled
    }

    pub fn view(&self) -> SessionView {
        let period = TimeOfDay::from_hour(Local::now().hour());
        self.session.view(&self.clock, period)
    }

    pub fn start_hunt(&mut self) {
        self.session.start_hunt(Utc::now());
    }

    pub fn view_puzzle(&mut self) {
        self.session.view_puzzle();
    }

    pub fn submit_answer(&mut self, text: &str) -> QuestResult<Verdict> {
        let now = Utc::now();
        let already_solved = self.session.is_solved();
        let verdict = self.session.submit_answer(text, now)?;
        if already_solved {
            return Ok(verdict);
        }
        let kind = if verdict.is_correct() {
            MessageKind::Success
        } else {
            MessageKind::Failure
        };
        self.god_messages.push(self.messages.announce(kind, now));
        Ok(verdict)
    }

    pub fn next_quest(&mut self) {
        self.session.next_quest(Utc::now());
    }

    pub fn view_leaderboard(&mut self) {
        self.session.view_leaderboard();
    }

    pub fn view_how_to_play(&mut self) {
        self.session.view_how_to_play();
    }

    pub fn back_to_welcome(&mut self) {
        self.session.back_to_welcome();
    }

    pub fn back_to_quest(&mut self) {
        self.session.back_to_quest(Utc::now());
    }

    pub fn hint(&mut self) -> &TreasureGodMessage {
        let message = self.messages.announce(MessageKind::Hint, Utc::now());
        self.god_messages.push(message);
        &self.god_messages[self.god_messages.len() - 1]
    }

    pub fn daily_hunt(&mut self) -> &Hunt {
        let hunt = self.hunts.generate_daily_hunt(Utc::now());
        self.daily_hunts.push(hunt);
        &self.daily_hunts[self.daily_hunts.len() - 1]
    }

    pub fn daily_hunts(&self) -> &[Hunt] {
        &self.daily_hunts
    }

    /// Check a hunt solution and credit the current player on their first
    /// success. Later correct answers report zero points. Returns `None` for
    /// an unknown or closed hunt.
    pub fn submit_hunt_solution(&mut self, hunt_id: &str, solution: &str) -> Option<HuntVerdict> {
        let now = Utc::now();
        let hunt = self
            .daily_hunts
            .iter()
            .find(|h| h.id == hunt_id && h.is_open(now))?;
        let mut outcome = self.verifier.verify_hunt(hunt, solution);
        if outcome.verdict.is_correct() {
            let credited = self.keeper.reward_once(
                self.session.username(),
                &hunt.id,
                outcome.points,
                hunt.key_type(),
                now,
            );
            if credited.is_some() {
                self.session.refresh_leaderboard();
            } else {
                outcome.points = 0;
            }
        }
        Some(outcome)
    }

    pub fn stats(&self) -> GameStats {
        GameStats::collect(&self.daily_hunts, &self.keeper, Utc::now())
    }
}
