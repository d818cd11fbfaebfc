//! Avatar actor and its animation state machine
//!
//! An actor is the visual stand-in for one participant. Movement animations
//! (jump, fall) are resumable tasks advanced once per frame; starting a new
//! one force-stops the previous one first, so no half-finished motion ever
//! leaks into the next transition. The pop-in scale runs independently of
//! movement.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::roster::RecordRef;
use super::task::{Delay, Progress};
use crate::lerp;
use crate::tuning::MotionTuning;

/// Visual parent an actor is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Container {
    /// Inactive, parked under the pool
    #[default]
    Pool,
    /// Matchmaking crowd pile
    Crowd,
    /// Climb map
    Climb,
    /// Reward popup, large slot
    RewardMain,
    /// Reward popup, co-winner grid
    RewardCrowd,
}

/// Observable animation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorState {
    Idle,
    Jumping,
    Falling,
    Popping,
}

/// Events raised by an actor while advancing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActorEvent {
    /// A jump completed naturally at this position
    Landed(Vec2),
    /// A fall completed; the actor is no longer visible
    FellOut,
}

/// Identifies the in-flight movement task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationToken(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum MotionKind {
    Jump,
    Fall,
}

/// A movement task: optional start delay, then a timed interpolation
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Motion {
    kind: MotionKind,
    token: AnimationToken,
    target: Vec2,
    delay: Delay,
    /// Set once the delay runs out
    run: Option<Run>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Run {
    start: Vec2,
    progress: Progress,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Pop {
    progress: Progress,
}

/// A pooled visual unit bound to one participant at a time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarActor {
    record: Option<RecordRef>,
    /// Anchored position inside the parent container
    position: Vec2,
    /// Last committed target; force-stop snaps here
    pending_target: Vec2,
    /// Z rotation in degrees
    rotation: f32,
    /// Persistent scale (crowd/reward emphasis)
    base_scale: f32,
    /// Jump deformation, (1, 1) at rest
    squash: Vec2,
    /// Pop-in scale, 1 at rest
    pop_scale: f32,
    /// Explicit draw order, higher draws on top
    z_order: i32,
    active: bool,
    parent: Container,
    motion: Option<Motion>,
    pop: Option<Pop>,
    /// Cancellation token of the in-flight motion
    token: Option<AnimationToken>,
    next_token: u32,
    #[serde(skip)]
    events: Vec<ActorEvent>,
}

impl Default for AvatarActor {
    fn default() -> Self {
        Self::new()
    }
}

impl AvatarActor {
    /// A freshly constructed, inactive actor
    pub fn new() -> Self {
        Self {
            record: None,
            position: Vec2::ZERO,
            pending_target: Vec2::ZERO,
            rotation: 0.0,
            base_scale: 1.0,
            squash: Vec2::ONE,
            pop_scale: 1.0,
            z_order: 0,
            active: false,
            parent: Container::Pool,
            motion: None,
            pop: None,
            token: None,
            next_token: 0,
            events: Vec::new(),
        }
    }

    /// Bind to a participant and reset transform
    pub fn configure(&mut self, record: RecordRef) {
        self.record = Some(record);
        self.base_scale = 1.0;
        self.squash = Vec2::ONE;
        self.pop_scale = 1.0;
        self.rotation = 0.0;
    }

    /// Place instantly and commit the position as the resting target
    pub fn set_position(&mut self, pos: Vec2) {
        self.position = pos;
        self.pending_target = pos;
    }

    /// Cancel any in-flight movement and snap to the last committed target
    pub fn force_stop(&mut self) {
        self.motion = None;
        self.token = None;
        self.position = self.pending_target;
        self.rotation = 0.0;
        self.squash = Vec2::ONE;
    }

    pub fn play_jump(&mut self, target: Vec2, delay: f32) -> AnimationToken {
        self.start_motion(MotionKind::Jump, target, delay)
    }

    pub fn play_fall(&mut self, target: Vec2, delay: f32) -> AnimationToken {
        self.start_motion(MotionKind::Fall, target, delay)
    }

    /// Scale in from zero; does not interrupt movement
    pub fn play_pop(&mut self, motion: &MotionTuning) {
        self.pop_scale = 0.0;
        self.pop = Some(Pop {
            progress: Progress::new(motion.pop_duration),
        });
    }

    fn start_motion(&mut self, kind: MotionKind, target: Vec2, delay: f32) -> AnimationToken {
        self.force_stop();
        self.pending_target = target;

        let token = AnimationToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        self.token = Some(token);
        self.motion = Some(Motion {
            kind,
            token,
            target,
            delay: Delay::new(delay),
            run: None,
        });
        token
    }

    /// Advance animations by one frame
    pub fn advance(&mut self, dt: f32, tuning: &MotionTuning) {
        if !self.active {
            return;
        }
        self.advance_pop(dt, tuning);

        let Some(mut motion) = self.motion.take() else {
            return;
        };
        // Cancellation check at the top of every resume
        if self.token != Some(motion.token) {
            return;
        }
        if !motion.delay.advance(dt) {
            self.motion = Some(motion);
            return;
        }

        let duration = match motion.kind {
            MotionKind::Jump => tuning.jump_duration,
            MotionKind::Fall => tuning.fall_duration,
        };
        // Start is captured after the delay, not when the motion was issued
        let position = self.position;
        let run = motion.run.get_or_insert_with(|| Run {
            start: position,
            progress: Progress::new(duration),
        });
        let t = run.progress.advance(dt);
        let (start, done) = (run.start, run.progress.is_done());

        match motion.kind {
            MotionKind::Jump => self.step_jump(start, motion.target, t, tuning),
            MotionKind::Fall => self.step_fall(start, motion.target, t, tuning),
        }

        if done {
            self.finish(motion);
        } else {
            self.motion = Some(motion);
        }
    }

    fn step_jump(&mut self, start: Vec2, target: Vec2, t: f32, tuning: &MotionTuning) {
        let mut pos = start.lerp(target, t);
        pos.y += tuning.arc_curve.evaluate(t) * tuning.jump_height;
        self.position = pos;

        let d = tuning.squash_curve.evaluate(t);
        self.squash = Vec2::new(1.0 - d, 1.0 + d);
    }

    fn step_fall(&mut self, start: Vec2, target: Vec2, t: f32, tuning: &MotionTuning) {
        let x = lerp(start.x, target.x, t);
        // Gravity uses the ease-in curve as its weight, the hop rides on top
        let gravity_y = lerp(start.y, target.y, tuning.fall_curve.evaluate(t));
        let hop_y = tuning.arc_curve.evaluate(t) * tuning.fall_hop_height;
        self.position = Vec2::new(x, gravity_y + hop_y);
        self.rotation = t * tuning.fall_spin_degrees;
    }

    fn finish(&mut self, motion: Motion) {
        self.token = None;
        match motion.kind {
            MotionKind::Jump => {
                self.position = motion.target;
                self.squash = Vec2::ONE;
                self.events.push(ActorEvent::Landed(motion.target));
            }
            MotionKind::Fall => {
                self.active = false;
                self.events.push(ActorEvent::FellOut);
            }
        }
    }

    fn advance_pop(&mut self, dt: f32, tuning: &MotionTuning) {
        let Some(pop) = self.pop.as_mut() else {
            return;
        };
        let t = pop.progress.advance(dt);
        if pop.progress.is_done() {
            self.pop_scale = 1.0;
            self.pop = None;
        } else {
            self.pop_scale = tuning.pop_curve.evaluate(t);
        }
    }

    /// Take events raised since the last call
    pub fn drain_events(&mut self) -> Vec<ActorEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn state(&self) -> ActorState {
        match (&self.motion, &self.pop) {
            (Some(m), _) if m.kind == MotionKind::Jump => ActorState::Jumping,
            (Some(_), _) => ActorState::Falling,
            (None, Some(_)) => ActorState::Popping,
            (None, None) => ActorState::Idle,
        }
    }

    /// Clear everything a previous owner left behind
    pub(crate) fn reset_for_pool(&mut self) {
        self.force_stop();
        self.pop = None;
        self.pop_scale = 1.0;
        self.base_scale = 1.0;
        self.z_order = 0;
        self.record = None;
        self.events.clear();
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub(crate) fn set_parent(&mut self, parent: Container) {
        self.parent = parent;
    }

    pub fn record(&self) -> Option<RecordRef> {
        self.record
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn pending_target(&self) -> Vec2 {
        self.pending_target
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
    }

    pub fn set_base_scale(&mut self, scale: f32) {
        self.base_scale = scale;
    }

    /// Final rendered scale (emphasis x pop-in x squash/stretch)
    pub fn scale(&self) -> Vec2 {
        self.squash * self.base_scale * self.pop_scale
    }

    pub fn z_order(&self) -> i32 {
        self.z_order
    }

    pub fn set_z_order(&mut self, z: i32) {
        self.z_order = z;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn parent(&self) -> Container {
        self.parent
    }

    pub fn animation_token(&self) -> Option<AnimationToken> {
        self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn active_actor(at: Vec2) -> AvatarActor {
        let mut actor = AvatarActor::new();
        actor.set_active(true);
        actor.configure(RecordRef(0));
        actor.set_position(at);
        actor
    }

    fn run(actor: &mut AvatarActor, tuning: &MotionTuning, seconds: f32) -> Vec<ActorEvent> {
        let mut events = Vec::new();
        let frames = (seconds / SIM_DT).ceil() as usize;
        for _ in 0..frames {
            actor.advance(SIM_DT, tuning);
            events.extend(actor.drain_events());
        }
        events
    }

    #[test]
    fn test_jump_lands_exactly_once_on_target() {
        let tuning = MotionTuning::default();
        let mut actor = active_actor(Vec2::ZERO);
        let target = Vec2::new(100.0, 150.0);
        actor.play_jump(target, 0.0);
        assert_eq!(actor.state(), ActorState::Jumping);

        let events = run(&mut actor, &tuning, 1.0);
        assert_eq!(events, vec![ActorEvent::Landed(target)]);
        assert_eq!(actor.position(), target);
        assert_eq!(actor.scale(), Vec2::ONE);
        assert_eq!(actor.state(), ActorState::Idle);
        assert!(actor.animation_token().is_none());
    }

    #[test]
    fn test_jump_arcs_above_straight_line() {
        let tuning = MotionTuning::default();
        let mut actor = active_actor(Vec2::ZERO);
        actor.play_jump(Vec2::new(0.0, 100.0), 0.0);
        run(&mut actor, &tuning, tuning.jump_duration / 2.0);
        // Halfway the arc adds close to the full jump height
        assert!(actor.position().y > 100.0);
    }

    #[test]
    fn test_delay_holds_position() {
        let tuning = MotionTuning::default();
        let mut actor = active_actor(Vec2::new(5.0, 5.0));
        actor.play_jump(Vec2::new(100.0, 100.0), 0.3);
        run(&mut actor, &tuning, 0.2);
        assert_eq!(actor.position(), Vec2::new(5.0, 5.0));
        assert_eq!(actor.state(), ActorState::Jumping);
    }

    #[test]
    fn test_zero_duration_snaps_and_lands() {
        let tuning = MotionTuning {
            jump_duration: 0.0,
            ..Default::default()
        };
        let mut actor = active_actor(Vec2::ZERO);
        let target = Vec2::new(10.0, 10.0);
        actor.play_jump(target, 0.0);
        actor.advance(SIM_DT, &tuning);
        assert_eq!(actor.position(), target);
        assert_eq!(actor.drain_events(), vec![ActorEvent::Landed(target)]);
    }

    #[test]
    fn test_force_stop_snaps_without_landing() {
        let tuning = MotionTuning::default();
        let mut actor = active_actor(Vec2::ZERO);
        let target = Vec2::new(100.0, 0.0);
        actor.play_jump(target, 0.0);
        run(&mut actor, &tuning, 0.2);
        assert_ne!(actor.position(), target);

        actor.force_stop();
        assert_eq!(actor.position(), target);
        assert_eq!(actor.rotation(), 0.0);
        assert_eq!(actor.scale(), Vec2::ONE);
        assert!(actor.animation_token().is_none());
        assert!(run(&mut actor, &tuning, 1.0).is_empty());
    }

    #[test]
    fn test_new_motion_cancels_previous() {
        let tuning = MotionTuning::default();
        let mut actor = active_actor(Vec2::ZERO);
        let first = actor.play_jump(Vec2::new(100.0, 0.0), 0.0);
        run(&mut actor, &tuning, 0.1);
        let second = actor.play_jump(Vec2::new(-100.0, 0.0), 0.0);
        assert_ne!(first, second);

        // Cancelled jump was snapped to its target before the new one began
        let events = run(&mut actor, &tuning, 1.0);
        assert_eq!(events, vec![ActorEvent::Landed(Vec2::new(-100.0, 0.0))]);
    }

    #[test]
    fn test_fall_deactivates_and_never_lands() {
        let tuning = MotionTuning::default();
        let mut actor = active_actor(Vec2::ZERO);
        let target = Vec2::new(40.0, -3000.0);
        actor.play_fall(target, 0.0);
        assert_eq!(actor.state(), ActorState::Falling);

        let events = run(&mut actor, &tuning, 1.0);
        assert_eq!(events, vec![ActorEvent::FellOut]);
        assert!(!actor.is_active());
        assert!((actor.rotation() - tuning.fall_spin_degrees).abs() < 1e-3);
    }

    #[test]
    fn test_fall_hops_before_dropping() {
        let tuning = MotionTuning::default();
        let mut actor = active_actor(Vec2::ZERO);
        actor.play_fall(Vec2::new(0.0, -3000.0), 0.0);
        run(&mut actor, &tuning, 0.1);
        assert!(actor.position().y > 0.0);
    }

    #[test]
    fn test_force_stop_mid_fall_resets_rotation() {
        let tuning = MotionTuning::default();
        let mut actor = active_actor(Vec2::ZERO);
        let target = Vec2::new(0.0, -3000.0);
        actor.play_fall(target, 0.0);
        run(&mut actor, &tuning, 0.3);
        assert!(actor.rotation() > 0.0);
        actor.force_stop();
        assert_eq!(actor.rotation(), 0.0);
        assert_eq!(actor.position(), target);
    }

    #[test]
    fn test_pop_runs_alongside_jump() {
        let tuning = MotionTuning::default();
        let mut actor = active_actor(Vec2::ZERO);
        actor.play_pop(&tuning);
        assert_eq!(actor.state(), ActorState::Popping);
        assert_eq!(actor.scale(), Vec2::ZERO);

        actor.play_jump(Vec2::new(0.0, 50.0), 0.0);
        run(&mut actor, &tuning, 1.0);
        assert_eq!(actor.scale(), Vec2::ONE);
        assert_eq!(actor.state(), ActorState::Idle);
    }

    #[test]
    fn test_inactive_actor_does_not_advance() {
        let tuning = MotionTuning::default();
        let mut actor = active_actor(Vec2::ZERO);
        actor.play_jump(Vec2::new(10.0, 0.0), 0.0);
        actor.set_active(false);
        assert!(run(&mut actor, &tuning, 1.0).is_empty());
    }
}
