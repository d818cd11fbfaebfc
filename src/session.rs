//! Event session: the composition root
//!
//! Owns the pool, the roster, every engine, the clock, the RNG, the session
//! provider and the HUD sink, and routes engine signals between them once per
//! tick. Nothing here is global; collaborators are passed in explicitly.

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::EVENT_WINDOW_SECS;
use crate::hud::{self, HudSink};
use crate::quest::avatar::ActorEvent;
use crate::quest::countdown::EventCountdown;
use crate::quest::matchmaking::MatchmakingSimulator;
use crate::quest::pool::ActorPool;
use crate::quest::roster::{ImageRef, ParticipantRecord, RecordRef, Roster};
use crate::quest::round::RoundEngine;
use crate::quest::signal::Signal;
use crate::reward::RewardPopup;
use crate::tuning::Tuning;

/// Source of participants and event timing
pub trait SessionProvider {
    /// Build a roster of `count` participants, exactly one flagged main
    fn roster(&mut self, count: usize) -> Roster;
    /// Event end time on the session clock; fixed after the first call
    fn event_end_time(&mut self, now: f64) -> f64;
}

/// Offline provider: one local player plus generated guests
#[derive(Debug)]
pub struct MockSessionProvider {
    rng: Pcg32,
    profile_images: Vec<ImageRef>,
    frame_images: Vec<ImageRef>,
    end_time: Option<f64>,
}

impl MockSessionProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            profile_images: Vec::new(),
            frame_images: Vec::new(),
            end_time: None,
        }
    }

    /// Image libraries bots draw their profile picture and frame from
    pub fn with_images(mut self, profile_images: Vec<ImageRef>, frame_images: Vec<ImageRef>) -> Self {
        self.profile_images = profile_images;
        self.frame_images = frame_images;
        self
    }

    fn pick_image(rng: &mut Pcg32, library: &[ImageRef]) -> Option<ImageRef> {
        if library.is_empty() {
            return None;
        }
        Some(library[rng.random_range(0..library.len())].clone())
    }
}

impl SessionProvider for MockSessionProvider {
    fn roster(&mut self, count: usize) -> Roster {
        let mut records = vec![ParticipantRecord::new("local_player", "YOU", true)];
        let mut ids = HashSet::new();
        for _ in 1..count {
            let id = loop {
                let id = format!("bot_{:05x}", self.rng.random_range(0..0x10_0000u32));
                if ids.insert(id.clone()) {
                    break id;
                }
            };
            let name = format!("Guest_{}", self.rng.random_range(1000..9999));
            let mut record = ParticipantRecord::new(id, name, false);
            record.profile_image = Self::pick_image(&mut self.rng, &self.profile_images);
            record.frame_image = Self::pick_image(&mut self.rng, &self.frame_images);
            records.push(record);
        }
        Roster::new(records)
    }

    fn event_end_time(&mut self, now: f64) -> f64 {
        *self.end_time.get_or_insert(now + EVENT_WINDOW_SECS)
    }
}

/// Which screen of the event is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Start popup
    Intro,
    Matchmaking,
    /// Climb map
    Map,
    /// External mini-game running
    MiniGame,
    /// Winners popup
    Reward,
}

/// User intents for one tick; every flag is one-shot
#[derive(Debug, Clone, Default)]
pub struct SessionInput {
    pub start_event: bool,
    pub continue_pressed: bool,
    pub play_pressed: bool,
    /// Mini-game result, `Some(true)` on a win
    pub game_result: Option<bool>,
    pub collect_reward: bool,
}

pub struct EventSession<P: SessionProvider, H: HudSink> {
    tuning: Tuning,
    rng: Pcg32,
    provider: P,
    hud: H,
    pool: ActorPool,
    roster: Option<Roster>,
    matchmaking: MatchmakingSimulator,
    round: RoundEngine,
    countdown: EventCountdown,
    reward: Option<RewardPopup>,
    phase: SessionPhase,
    now: f64,
    continue_available: bool,
    play_enabled: bool,
    matchmaking_text: String,
    winners: Vec<RecordRef>,
}

impl<P: SessionProvider, H: HudSink> EventSession<P, H> {
    /// Wire everything up and start the event clock
    pub fn new(tuning: Tuning, mut provider: P, hud: H) -> Self {
        let end_time = provider.event_end_time(0.0);
        let mut countdown = EventCountdown::new(end_time);
        countdown.start(0.0);

        Self {
            rng: Pcg32::seed_from_u64(tuning.seed),
            pool: ActorPool::new(&tuning.pool, tuning.motion.clone()),
            matchmaking: MatchmakingSimulator::new(tuning.matchmaking.clone()),
            round: RoundEngine::from_tuning(tuning.round.clone()),
            tuning,
            provider,
            hud,
            roster: None,
            countdown,
            reward: None,
            phase: SessionPhase::Intro,
            now: 0.0,
            continue_available: false,
            play_enabled: false,
            matchmaking_text: String::new(),
            winners: Vec::new(),
        }
    }

    /// Advance the whole event by one frame
    pub fn tick(&mut self, input: &SessionInput, dt: f32) {
        self.now += dt as f64;
        self.apply_input(input);

        if let Some(message) = self.countdown.advance(dt) {
            self.route(Signal::ClockMessage(message));
        }
        self.matchmaking.tick(dt, &mut self.pool, &mut self.rng);
        self.round.tick(dt, &mut self.pool, &mut self.rng);

        for (handle, event) in self.pool.advance(dt) {
            if let ActorEvent::Landed(position) = event {
                self.round.handle_landed(handle, position, &mut self.pool);
            }
        }

        let mut signals = self.matchmaking.drain_signals();
        signals.extend(self.round.drain_signals());
        for signal in signals {
            self.route(signal);
        }
    }

    fn apply_input(&mut self, input: &SessionInput) {
        match self.phase {
            SessionPhase::Intro if input.start_event => self.start_event(),
            SessionPhase::Matchmaking if input.continue_pressed && self.continue_available => {
                self.enter_map()
            }
            SessionPhase::Map if input.play_pressed => {
                self.round.request_play(&mut self.pool);
            }
            SessionPhase::MiniGame => {
                if let Some(won) = input.game_result {
                    self.finish_game(won);
                }
            }
            SessionPhase::Reward if input.collect_reward => self.collect_reward(),
            _ => {}
        }
    }

    fn start_event(&mut self) {
        let roster = self.provider.roster(self.tuning.roster_size);
        log::info!("Event started with {} participants", roster.len());
        self.continue_available = false;
        self.matchmaking.start(&roster, &mut self.pool);
        self.roster = Some(roster);
        self.set_phase(SessionPhase::Matchmaking);
    }

    fn enter_map(&mut self) {
        self.matchmaking.cleanup(&mut self.pool);
        self.continue_available = false;
        let Some(roster) = self.roster.as_ref() else {
            log::warn!("No roster, returning to intro");
            self.set_phase(SessionPhase::Intro);
            return;
        };
        self.round.initialize(roster, &mut self.pool, &mut self.rng);
        self.set_phase(SessionPhase::Map);
    }

    fn finish_game(&mut self, won: bool) {
        self.set_phase(SessionPhase::Map);
        let Some(roster) = self.roster.as_mut() else {
            log::warn!("Mini-game result without a roster, ignored");
            return;
        };
        self.round.start_round(won, roster, &mut self.pool, &mut self.rng);
    }

    fn collect_reward(&mut self) {
        if let Some(mut popup) = self.reward.take() {
            popup.cleanup(&mut self.pool);
        }
        self.reset_to_intro();
    }

    /// Release every actor and drop the roster
    fn reset_to_intro(&mut self) {
        self.round.reset(&mut self.pool);
        self.matchmaking.cleanup(&mut self.pool);
        self.roster = None;
        self.continue_available = false;
        self.play_enabled = false;
        self.set_phase(SessionPhase::Intro);
    }

    fn route(&mut self, signal: Signal) {
        let Some(signal) = hud::dispatch(signal, &mut self.hud) else {
            return;
        };
        match signal {
            Signal::MatchmakingCounter { current, target } => {
                self.matchmaking_text = format!("{}/{}", current, target);
            }
            Signal::PlayControl { enabled } => self.play_enabled = enabled,
            Signal::ContinueAvailable => self.continue_available = true,
            Signal::PlayRequested => self.set_phase(SessionPhase::MiniGame),
            Signal::RestartRequested => self.reset_to_intro(),
            Signal::QuestCompleted { winners } => {
                if let Some(roster) = self.roster.as_ref() {
                    let popup =
                        RewardPopup::build(&winners, roster, &mut self.pool, &self.tuning.reward);
                    self.reward = Some(popup);
                }
                self.winners = winners;
                self.set_phase(SessionPhase::Reward);
            }
            // HUD signals never reach this point
            Signal::LevelText { .. }
            | Signal::PlayerCount { .. }
            | Signal::InfoMessage(_)
            | Signal::ClockMessage(_) => {}
        }
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase != phase {
            log::info!("Session phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn hud(&self) -> &H {
        &self.hud
    }

    pub fn pool(&self) -> &ActorPool {
        &self.pool
    }

    pub fn roster(&self) -> Option<&Roster> {
        self.roster.as_ref()
    }

    pub fn round(&self) -> &RoundEngine {
        &self.round
    }

    pub fn matchmaking(&self) -> &MatchmakingSimulator {
        &self.matchmaking
    }

    pub fn reward(&self) -> Option<&RewardPopup> {
        self.reward.as_ref()
    }

    pub fn countdown(&self) -> &EventCountdown {
        &self.countdown
    }

    /// Matchmaking counter as displayed, `current/target`
    pub fn matchmaking_text(&self) -> &str {
        &self.matchmaking_text
    }

    pub fn is_continue_available(&self) -> bool {
        self.continue_available
    }

    pub fn is_play_enabled(&self) -> bool {
        self.play_enabled
    }

    /// Winners of the last completed quest
    pub fn winners(&self) -> &[RecordRef] {
        &self.winners
    }
}
