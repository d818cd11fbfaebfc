//! Matchmaking simulation
//!
//! Fakes the "finding players" screen: a counter climbs to its target over a
//! fixed duration while crowd avatars pop into a pile, proportionally to the
//! counter's progress. When the counter is full, a short settle pause is
//! followed by `Signal::ContinueAvailable`.

use rand::Rng;

use super::avatar::Container;
use super::pool::{ActorHandle, ActorPool};
use super::roster::{RecordRef, Roster};
use super::signal::Signal;
use super::task::Delay;
use crate::tuning::MatchmakingTuning;
use crate::{clamp01, symmetric_jitter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchmakingPhase {
    Idle,
    /// Counter running, avatars popping in
    Counting,
    /// Counter full, waiting before offering continue
    Settling,
    /// Continue offered
    Ready,
}

#[derive(Debug)]
pub struct MatchmakingSimulator {
    tuning: MatchmakingTuning,
    phase: MatchmakingPhase,
    elapsed: f32,
    /// Participants in spawn order, main participant first
    order: Vec<RecordRef>,
    /// `order[0]` is the main participant
    main_first: bool,
    visuals_limit: usize,
    actors: Vec<ActorHandle>,
    settle: Delay,
    counter: u32,
    signals: Vec<Signal>,
}

impl MatchmakingSimulator {
    pub fn new(tuning: MatchmakingTuning) -> Self {
        Self {
            tuning,
            phase: MatchmakingPhase::Idle,
            elapsed: 0.0,
            order: Vec::new(),
            main_first: false,
            visuals_limit: 0,
            actors: Vec::new(),
            settle: Delay::elapsed(),
            counter: 0,
            signals: Vec::new(),
        }
    }

    /// Begin a run over `roster`. Ignored while a run is in flight.
    pub fn start(&mut self, roster: &Roster, pool: &mut ActorPool) -> bool {
        if self.is_running() {
            log::debug!("Matchmaking already running, start ignored");
            return false;
        }
        pool.release_all(&mut self.actors);

        let main = roster.main_ref();
        self.main_first = main.is_some();
        self.order = main.into_iter().collect();
        self.order
            .extend(roster.iter().filter(|(_, r)| !r.is_main).map(|(r, _)| r));
        // Extra main-flagged records are never shown
        self.visuals_limit = self
            .order
            .len()
            .min(self.tuning.max_visual_slots)
            .min(self.tuning.pile.capacity());
        self.elapsed = 0.0;
        self.counter = 0;
        self.phase = MatchmakingPhase::Counting;
        self.signals.push(Signal::MatchmakingCounter {
            current: 0,
            target: self.tuning.target_count,
        });
        log::info!(
            "Matchmaking started: target {}, {} visual slots",
            self.tuning.target_count,
            self.visuals_limit
        );
        true
    }

    pub fn tick(&mut self, dt: f32, pool: &mut ActorPool, rng: &mut impl Rng) {
        match self.phase {
            MatchmakingPhase::Counting => self.tick_counting(dt, pool, rng),
            MatchmakingPhase::Settling => {
                if self.settle.advance(dt) {
                    self.phase = MatchmakingPhase::Ready;
                    self.signals.push(Signal::ContinueAvailable);
                }
            }
            MatchmakingPhase::Idle | MatchmakingPhase::Ready => {}
        }
    }

    fn tick_counting(&mut self, dt: f32, pool: &mut ActorPool, rng: &mut impl Rng) {
        self.elapsed += dt;
        let progress = if self.tuning.total_duration > 0.0 {
            clamp01(self.elapsed / self.tuning.total_duration)
        } else {
            1.0
        };

        self.counter = (progress * self.tuning.target_count as f32).floor() as u32;
        self.signals.push(Signal::MatchmakingCounter {
            current: self.counter,
            target: self.tuning.target_count,
        });

        // Visuals track the counter, never ahead of it
        let due = ((progress * self.visuals_limit as f32).floor() as usize).min(self.visuals_limit);
        while self.actors.len() < due {
            if !self.spawn(self.actors.len(), pool, rng) {
                break;
            }
        }

        if progress >= 1.0 {
            self.phase = MatchmakingPhase::Settling;
            self.settle = Delay::new(self.tuning.settle_delay);
        }
    }

    /// Spawn the crowd avatar for `index`; false when nobody is left to show
    fn spawn(&mut self, index: usize, pool: &mut ActorPool, rng: &mut impl Rng) -> bool {
        let Some(&record) = self.order.get(index) else {
            return false;
        };
        let is_main = index == 0 && self.main_first;
        let handle = pool.acquire(Container::Crowd);
        let position = self.tuning.pile.position(index, rng).unwrap_or_default();
        let rotation = symmetric_jitter(rng, self.tuning.rotation_spread);
        // Front of the pile draws on top; the main participant tops everyone
        let z = if is_main {
            self.visuals_limit as i32 + 1
        } else {
            (self.visuals_limit - index) as i32
        };
        let main_scale = self.tuning.main_scale;
        let motion = pool.motion().clone();
        if let Some(actor) = pool.get_mut(handle) {
            actor.configure(record);
            actor.set_position(position);
            actor.set_rotation(rotation);
            actor.set_z_order(z);
            if is_main {
                actor.set_base_scale(main_scale);
            }
            actor.play_pop(&motion);
        }
        self.actors.push(handle);
        true
    }

    /// Return the crowd to the pool and go idle
    pub fn cleanup(&mut self, pool: &mut ActorPool) {
        pool.release_all(&mut self.actors);
        self.phase = MatchmakingPhase::Idle;
        self.order.clear();
        self.main_first = false;
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, MatchmakingPhase::Counting | MatchmakingPhase::Settling)
    }

    pub fn phase(&self) -> MatchmakingPhase {
        self.phase
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn visuals_limit(&self) -> usize {
        self.visuals_limit
    }

    pub fn actors(&self) -> &[ActorHandle] {
        &self.actors
    }

    pub fn drain_signals(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.signals)
    }
}
