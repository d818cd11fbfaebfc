//! Round resolution
//!
//! One round decides, for every participant still standing, whether they
//! advance one step (jump) or are eliminated (fall). The engine is a small
//! state machine advanced by `tick`:
//!
//! ```text
//! AwaitingPlay -> RoundInProgress -> Resolving -> AwaitingPlay
//!                       |                 |-----> Completed
//!                       |                 '-----> Failed
//!                       '-- winners jump, settle pause, losers fall
//! ```
//!
//! Only one round can be in flight; `start_round` while one is running is a
//! no-op.

use glam::Vec2;
use rand::Rng;

use super::avatar::Container;
use super::layout::RowPattern;
use super::pool::{ActorHandle, ActorPool};
use super::roster::{RecordRef, Roster};
use super::signal::Signal;
use super::task::Delay;
use crate::tuning::RoundTuning;
use crate::{random_in_disc, symmetric_jitter};

/// Step centres of the climb, bottom first; the last one is the goal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepSequence {
    positions: Vec<Vec2>,
}

impl StepSequence {
    pub fn new(positions: Vec<Vec2>) -> Self {
        Self { positions }
    }

    /// Lay `count` steps out on a row pattern (no jitter)
    pub fn from_pattern(pattern: &RowPattern, count: usize) -> Self {
        let positions = (0..count).map_while(|i| pattern.slot_center(i)).collect();
        Self { positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Vec2> {
        self.positions.get(index).copied()
    }

    /// Index of the terminal step
    pub fn last_index(&self) -> Option<usize> {
        self.positions.len().checked_sub(1)
    }
}

/// Round state as seen from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Waiting for the play control
    AwaitingPlay,
    /// Winners issued, waiting to issue losers
    RoundInProgress,
    /// All animations issued, waiting to conclude
    Resolving,
    /// Main participant reached the final step
    Completed,
    /// Main participant failed; a restart has been requested
    Failed,
}

/// Per-participant result of the last round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
}

#[derive(Debug)]
struct PendingRound {
    main_won: bool,
    winners: Vec<ActorHandle>,
    losers: Vec<ActorHandle>,
}

/// Drives rounds on the climb map
#[derive(Debug)]
pub struct RoundEngine {
    tuning: RoundTuning,
    steps: StepSequence,
    actors: Vec<ActorHandle>,
    current_step_index: usize,
    total_participants: usize,
    round_in_progress: bool,
    phase: RoundPhase,
    timer: Delay,
    pending: Option<PendingRound>,
    /// The main participant lost the current round
    main_fallen: bool,
    play_enabled: bool,
    outcomes: Vec<(RecordRef, Outcome)>,
    signals: Vec<Signal>,
}

impl RoundEngine {
    pub fn new(tuning: RoundTuning, steps: StepSequence) -> Self {
        Self {
            tuning,
            steps,
            actors: Vec::new(),
            current_step_index: 0,
            total_participants: 0,
            round_in_progress: false,
            phase: RoundPhase::AwaitingPlay,
            timer: Delay::elapsed(),
            pending: None,
            main_fallen: false,
            play_enabled: false,
            outcomes: Vec::new(),
            signals: Vec::new(),
        }
    }

    /// Build the engine from tuning; a step pattern takes precedence over explicit positions
    pub fn from_tuning(tuning: RoundTuning) -> Self {
        let steps = match &tuning.step_pattern {
            Some(pattern) => StepSequence::from_pattern(pattern, pattern.capacity()),
            None => StepSequence::new(tuning.step_positions.clone()),
        };
        Self::new(tuning, steps)
    }

    /// Place one actor per participant on the first step
    pub fn initialize(&mut self, roster: &Roster, pool: &mut ActorPool, rng: &mut impl Rng) {
        self.release_actors(pool);
        self.total_participants = roster.len();
        self.current_step_index = 0;
        self.round_in_progress = false;
        self.phase = RoundPhase::AwaitingPlay;
        self.timer = Delay::elapsed();
        self.pending = None;
        self.main_fallen = false;
        self.outcomes.clear();
        self.set_play_enabled(true);

        if self.steps.is_empty() {
            log::warn!("No step geometry, skipping actor placement");
        } else {
            let top = roster.len() as i32;
            for (record, participant) in roster.iter() {
                let handle = pool.acquire(Container::Climb);
                let position = self.step_target(0, rng);
                if let Some(actor) = pool.get_mut(handle) {
                    actor.configure(record);
                    actor.set_position(position);
                    // Main participant draws above everyone else
                    actor.set_z_order(if participant.is_main { top } else { record.0 as i32 });
                }
                self.actors.push(handle);
            }
            log::info!(
                "Climb initialised: {} participants on {} steps",
                self.actors.len(),
                self.steps.len()
            );
        }

        let levels = self.total_levels();
        self.signals.push(Signal::InfoMessage(format!(
            "Beat {} levels to complete the challenge!",
            levels
        )));
        self.push_level_text(self.current_step_index);
        self.signals.push(Signal::PlayerCount {
            current: self.survivor_count(roster, pool) as u32,
            total: self.total_participants as u32,
        });
    }

    /// Handle the play control: freeze every actor and hand over to the mini-game.
    /// Ignored while a round is in progress.
    pub fn request_play(&mut self, pool: &mut ActorPool) -> bool {
        if self.round_in_progress {
            log::debug!("Play ignored, round in progress");
            return false;
        }
        self.set_play_enabled(false);
        for &handle in &self.actors {
            if let Some(actor) = pool.get_mut(handle) {
                if actor.is_active() {
                    actor.force_stop();
                }
            }
        }
        self.signals.push(Signal::PlayRequested);
        true
    }

    /// Resolve a round given the mini-game result.
    /// Returns false (and changes nothing) if a round is already in flight.
    /// Fewer than two steps leave nothing to climb: the start is refused and play re-enabled.
    pub fn start_round(
        &mut self,
        main_won: bool,
        roster: &mut Roster,
        pool: &mut ActorPool,
        rng: &mut impl Rng,
    ) -> bool {
        if self.round_in_progress {
            log::debug!("Round start ignored, round already in progress");
            return false;
        }
        // A round needs a step to advance to
        let last = match self.steps.last_index() {
            Some(last) if last > 0 => last,
            _ => {
                log::warn!("Round start ignored, {} steps is nothing to climb", self.steps.len());
                self.set_play_enabled(true);
                return false;
            }
        };

        self.round_in_progress = true;
        self.phase = RoundPhase::RoundInProgress;
        self.main_fallen = !main_won;
        self.set_play_enabled(false);
        self.outcomes.clear();

        let mut winners = Vec::new();
        let mut losers = Vec::new();
        let p_pass = self.tuning.bot_pass_probability.clamp(0.0, 1.0) as f64;
        for &handle in &self.actors {
            let Some(record) = pool.get(handle).and_then(|a| a.record()) else {
                continue;
            };
            let Some(participant) = roster.get(record) else {
                continue;
            };
            if participant.is_eliminated {
                continue;
            }
            let passed = if participant.is_main {
                main_won
            } else {
                rng.random_bool(p_pass)
            };
            // Nobody advances past the terminal step
            if passed && self.current_step_index < last {
                winners.push(handle);
                self.outcomes.push((record, Outcome::Passed));
            } else {
                losers.push(handle);
                self.outcomes.push((record, Outcome::Failed));
            }
        }

        // Eliminate simulated losers; the main participant is tracked by outcome only
        for &handle in &losers {
            if let Some(record) = pool.get(handle).and_then(|a| a.record()) {
                if let Some(participant) = roster.get_mut(record) {
                    if !participant.is_main {
                        participant.is_eliminated = true;
                    }
                }
            }
        }

        log::info!(
            "Round on step {}: main {}, {} advance, {} fall",
            self.current_step_index,
            if main_won { "won" } else { "lost" },
            winners.len(),
            losers.len()
        );

        let display_step = if main_won && self.current_step_index < last {
            self.current_step_index + 1
        } else {
            self.current_step_index
        };
        self.signals.push(Signal::InfoMessage(if main_won {
            "Congratulations! You advanced to the next step!".to_string()
        } else {
            "You failed the challenge.".to_string()
        }));
        self.push_level_text(display_step);
        self.signals.push(Signal::PlayerCount {
            current: self.survivor_count(roster, pool) as u32,
            total: self.total_participants as u32,
        });

        let next_step = self.current_step_index + 1;
        for &handle in &winners {
            let target = self.step_target(next_step, rng);
            let delay = self.start_delay(rng);
            if let Some(actor) = pool.get_mut(handle) {
                actor.play_jump(target, delay);
            }
        }

        let has_winners = !winners.is_empty();
        self.pending = Some(PendingRound {
            main_won,
            winners,
            losers,
        });
        if has_winners {
            self.timer = Delay::new(self.tuning.settle_delay);
        } else {
            self.issue_losers(pool, rng);
        }
        true
    }

    /// Advance timers by one frame
    pub fn tick(&mut self, dt: f32, pool: &mut ActorPool, rng: &mut impl Rng) {
        match self.phase {
            RoundPhase::RoundInProgress => {
                if self.timer.advance(dt) {
                    self.issue_losers(pool, rng);
                }
            }
            RoundPhase::Resolving => {
                if self.timer.advance(dt) {
                    self.conclude(pool);
                }
            }
            RoundPhase::AwaitingPlay | RoundPhase::Completed | RoundPhase::Failed => {}
        }
    }

    /// Losers try for the next step and miss, falling far below it
    fn issue_losers(&mut self, pool: &mut ActorPool, rng: &mut impl Rng) {
        let Some(pending) = self.pending.as_ref() else {
            return;
        };
        let center = self
            .steps
            .get(self.current_step_index + 1)
            .or_else(|| self.steps.get(self.current_step_index))
            .unwrap_or(Vec2::ZERO);

        for &handle in &pending.losers {
            let x = center.x + symmetric_jitter(rng, self.tuning.step_radius);
            let target = Vec2::new(x, center.y - self.tuning.fall_depth);
            let delay = self.start_delay(rng);
            if let Some(actor) = pool.get_mut(handle) {
                actor.play_fall(target, delay);
            }
        }

        let main_won = pending.main_won;
        let last = self.steps.last_index().unwrap_or(0);
        let delay = if main_won {
            if self.current_step_index < last {
                self.current_step_index += 1;
            }
            if self.current_step_index >= last {
                self.tuning.victory_delay
            } else {
                self.tuning.next_round_delay
            }
        } else {
            self.tuning.failure_delay
        };
        self.phase = RoundPhase::Resolving;
        self.timer = Delay::new(delay);
    }

    fn conclude(&mut self, pool: &ActorPool) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let last = self.steps.last_index().unwrap_or(0);

        if !pending.main_won {
            self.phase = RoundPhase::Failed;
            log::info!("Main participant failed on step {}", self.current_step_index);
            self.signals.push(Signal::RestartRequested);
        } else if self.current_step_index >= last {
            self.phase = RoundPhase::Completed;
            let winners: Vec<RecordRef> = pending
                .winners
                .iter()
                .filter_map(|&h| pool.get(h).and_then(|a| a.record()))
                .collect();
            log::info!("Quest completed with {} winners", winners.len());
            self.signals.push(Signal::QuestCompleted { winners });
        } else {
            self.phase = RoundPhase::AwaitingPlay;
            self.round_in_progress = false;
            self.set_play_enabled(true);
        }
    }

    /// A landing on the climb map triggers a pooled effect
    pub fn handle_landed(&self, handle: ActorHandle, position: Vec2, pool: &mut ActorPool) {
        if self.actors.contains(&handle) {
            pool.play_effect(position);
        }
    }

    /// Return every climb actor to the pool and go back to the pre-roster state
    pub fn reset(&mut self, pool: &mut ActorPool) {
        self.release_actors(pool);
        self.current_step_index = 0;
        self.total_participants = 0;
        self.round_in_progress = false;
        self.phase = RoundPhase::AwaitingPlay;
        self.pending = None;
        self.main_fallen = false;
        self.outcomes.clear();
        self.play_enabled = false;
    }

    fn release_actors(&mut self, pool: &mut ActorPool) {
        pool.release_all(&mut self.actors);
    }

    /// Random landing point around a step centre
    fn step_target(&self, index: usize, rng: &mut impl Rng) -> Vec2 {
        let Some(center) = self.steps.get(index) else {
            return Vec2::ZERO;
        };
        let offset = random_in_disc(rng, self.tuning.step_radius);
        center + Vec2::new(offset.x, offset.y * self.tuning.step_vertical_jitter)
    }

    fn start_delay(&self, rng: &mut impl Rng) -> f32 {
        if self.tuning.max_start_delay <= 0.0 {
            return 0.0;
        }
        rng.random_range(0.0..=self.tuning.max_start_delay)
    }

    fn set_play_enabled(&mut self, enabled: bool) {
        self.play_enabled = enabled;
        self.signals.push(Signal::PlayControl { enabled });
    }

    fn total_levels(&self) -> usize {
        self.steps.len().saturating_sub(1).max(1)
    }

    fn push_level_text(&mut self, step_index: usize) {
        let total = self.total_levels();
        let current = (step_index + 1).min(total);
        self.signals.push(Signal::LevelText {
            current: current as u32,
            total: total as u32,
        });
    }

    /// Participants still standing
    pub fn survivor_count(&self, roster: &Roster, pool: &ActorPool) -> usize {
        self.actors
            .iter()
            .filter_map(|&h| pool.get(h))
            .filter(|a| a.is_active())
            .filter_map(|a| a.record())
            .filter(|&r| !roster.is_eliminated(r))
            .filter(|&r| !(self.main_fallen && roster.is_main(r)))
            .count()
    }

    pub fn drain_signals(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.signals)
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_round_in_progress(&self) -> bool {
        self.round_in_progress
    }

    pub fn is_play_enabled(&self) -> bool {
        self.play_enabled
    }

    pub fn actors(&self) -> &[ActorHandle] {
        &self.actors
    }

    pub fn steps(&self) -> &StepSequence {
        &self.steps
    }

    /// Outcomes of the most recent round
    pub fn outcomes(&self) -> &[(RecordRef, Outcome)] {
        &self.outcomes
    }
}
