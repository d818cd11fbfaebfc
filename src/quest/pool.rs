//! Reusable actor and effect pools
//!
//! Actors are never destroyed: the pool only grows (on demand, when the free
//! queue is empty) and released actors are parked for reuse. Landing effects
//! come from a second, fixed-size pool and are best-effort; when none is
//! available the request is dropped.

use std::collections::VecDeque;

use glam::Vec2;

use super::avatar::{ActorEvent, AvatarActor, Container};
use super::task::Delay;
use crate::tuning::{MotionTuning, PoolTuning};

/// Handle to an actor owned by the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorHandle(u32);

impl ActorHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One-shot landing effect
#[derive(Debug, Clone)]
pub struct Effect {
    pub position: Vec2,
    pub active: bool,
    lifetime: Delay,
}

impl Effect {
    fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            active: false,
            lifetime: Delay::elapsed(),
        }
    }

    fn play(&mut self, position: Vec2, lifetime: f32) {
        self.position = position;
        self.active = true;
        self.lifetime = Delay::new(lifetime);
    }

    fn advance(&mut self, dt: f32) {
        if self.active && self.lifetime.advance(dt) {
            self.active = false;
        }
    }
}

/// Pool statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Actors ever constructed
    pub constructed: usize,
    /// Actors currently checked out
    pub checked_out: usize,
    /// Landing effects shown
    pub effects_played: usize,
    /// Effect requests dropped for lack of a free effect
    pub effects_dropped: usize,
}

/// Owns every avatar actor and landing effect
#[derive(Debug)]
pub struct ActorPool {
    actors: Vec<AvatarActor>,
    checked_out: Vec<bool>,
    free: VecDeque<ActorHandle>,
    effects: Vec<Effect>,
    effect_queue: VecDeque<usize>,
    effect_lifetime: f32,
    motion: MotionTuning,
    effects_played: usize,
    effects_dropped: usize,
}

impl ActorPool {
    /// Pre-construct the configured number of actors and effects
    pub fn new(tuning: &PoolTuning, motion: MotionTuning) -> Self {
        let mut pool = Self {
            actors: Vec::with_capacity(tuning.avatar_pool_size),
            checked_out: Vec::with_capacity(tuning.avatar_pool_size),
            free: VecDeque::with_capacity(tuning.avatar_pool_size),
            effects: (0..tuning.effect_pool_size).map(|_| Effect::new()).collect(),
            effect_queue: (0..tuning.effect_pool_size).collect(),
            effect_lifetime: tuning.effect_lifetime,
            motion,
            effects_played: 0,
            effects_dropped: 0,
        };
        for _ in 0..tuning.avatar_pool_size {
            let handle = pool.construct();
            pool.free.push_back(handle);
        }
        pool
    }

    fn construct(&mut self) -> ActorHandle {
        let handle = ActorHandle(self.actors.len() as u32);
        self.actors.push(AvatarActor::new());
        self.checked_out.push(false);
        handle
    }

    /// Take an actor (recycled or new), activated and attached to `parent`
    pub fn acquire(&mut self, parent: Container) -> ActorHandle {
        let handle = match self.free.pop_front() {
            Some(handle) => handle,
            None => {
                let handle = self.construct();
                log::debug!("Actor pool grew to {}", self.actors.len());
                handle
            }
        };
        self.checked_out[handle.index()] = true;
        let actor = &mut self.actors[handle.index()];
        actor.set_parent(parent);
        actor.set_active(true);
        handle
    }

    /// Deactivate, detach and queue an actor for reuse.
    /// Releasing a handle that is not checked out is ignored.
    pub fn release(&mut self, handle: ActorHandle) {
        match self.checked_out.get_mut(handle.index()) {
            Some(out) if *out => *out = false,
            _ => {
                log::warn!("Ignoring release of actor {:?} that is not checked out", handle);
                return;
            }
        }
        let actor = &mut self.actors[handle.index()];
        actor.reset_for_pool();
        actor.set_active(false);
        actor.set_parent(Container::Pool);
        self.free.push_back(handle);
    }

    /// Release every handle in `handles`, leaving it empty
    pub fn release_all(&mut self, handles: &mut Vec<ActorHandle>) {
        for handle in handles.drain(..) {
            self.release(handle);
        }
    }

    /// Show a landing effect at `position`; dropped when none is free
    pub fn play_effect(&mut self, position: Vec2) -> bool {
        let Some(index) = self.effect_queue.pop_front() else {
            self.effects_dropped += 1;
            log::debug!("No free landing effect, dropping request");
            return false;
        };
        self.effects[index].play(position, self.effect_lifetime);
        self.effects_played += 1;
        // Round-robin: the oldest effect is reused next
        self.effect_queue.push_back(index);
        true
    }

    /// Advance every checked-out actor and effect by one frame.
    /// Returns the actor events raised during this frame.
    pub fn advance(&mut self, dt: f32) -> Vec<(ActorHandle, ActorEvent)> {
        let mut events = Vec::new();
        for (index, actor) in self.actors.iter_mut().enumerate() {
            if !self.checked_out[index] {
                continue;
            }
            actor.advance(dt, &self.motion);
            let handle = ActorHandle(index as u32);
            events.extend(actor.drain_events().into_iter().map(|e| (handle, e)));
        }
        for effect in &mut self.effects {
            effect.advance(dt);
        }
        events
    }

    pub fn get(&self, handle: ActorHandle) -> Option<&AvatarActor> {
        self.actors.get(handle.index())
    }

    pub fn get_mut(&mut self, handle: ActorHandle) -> Option<&mut AvatarActor> {
        self.actors.get_mut(handle.index())
    }

    pub fn is_checked_out(&self, handle: ActorHandle) -> bool {
        self.checked_out.get(handle.index()).copied().unwrap_or(false)
    }

    pub fn motion(&self) -> &MotionTuning {
        &self.motion
    }

    /// Checked-out actors in draw order (lowest z first)
    pub fn draw_list(&self, parent: Container) -> Vec<ActorHandle> {
        let mut list: Vec<ActorHandle> = (0..self.actors.len())
            .filter(|&i| self.checked_out[i])
            .filter(|&i| self.actors[i].is_active() && self.actors[i].parent() == parent)
            .map(|i| ActorHandle(i as u32))
            .collect();
        list.sort_by_key(|h| self.actors[h.index()].z_order());
        list
    }

    pub fn active_effects(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter().filter(|e| e.active)
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            constructed: self.actors.len(),
            checked_out: self.checked_out.iter().filter(|c| **c).count(),
            effects_played: self.effects_played,
            effects_dropped: self.effects_dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::roster::RecordRef;

    fn pool(avatars: usize, effects: usize) -> ActorPool {
        let tuning = PoolTuning {
            avatar_pool_size: avatars,
            effect_pool_size: effects,
            effect_lifetime: 0.5,
        };
        ActorPool::new(&tuning, MotionTuning::default())
    }

    #[test]
    fn test_acquire_reuses_before_growing() {
        let mut pool = pool(2, 1);
        let a = pool.acquire(Container::Climb);
        let b = pool.acquire(Container::Climb);
        assert_eq!(pool.stats().constructed, 2);

        let c = pool.acquire(Container::Climb);
        assert_eq!(pool.stats().constructed, 3);
        assert!(a != b && b != c && a != c);
        assert!(pool.get(c).unwrap().is_active());
        assert_eq!(pool.get(c).unwrap().parent(), Container::Climb);
    }

    #[test]
    fn test_release_parks_and_recycles() {
        let mut pool = pool(1, 1);
        let a = pool.acquire(Container::Crowd);
        pool.release(a);
        assert!(!pool.get(a).unwrap().is_active());
        assert_eq!(pool.get(a).unwrap().parent(), Container::Pool);

        let b = pool.acquire(Container::Climb);
        assert_eq!(a, b);
        assert_eq!(pool.stats().constructed, 1);
    }

    #[test]
    fn test_no_double_checkout() {
        let mut pool = pool(1, 1);
        let a = pool.acquire(Container::Climb);
        pool.release(a);
        pool.release(a);
        assert_eq!(pool.free_count(), 1);

        let b = pool.acquire(Container::Climb);
        let c = pool.acquire(Container::Climb);
        assert_ne!(b, c);
    }

    #[test]
    fn test_pool_never_shrinks() {
        let mut pool = pool(0, 1);
        let mut handles: Vec<_> = (0..5).map(|_| pool.acquire(Container::Climb)).collect();
        pool.release_all(&mut handles);
        assert!(handles.is_empty());
        assert_eq!(pool.stats().constructed, 5);
        assert_eq!(pool.free_count(), 5);
    }

    #[test]
    fn test_release_discards_animation() {
        let mut pool = pool(1, 1);
        let a = pool.acquire(Container::Climb);
        let actor = pool.get_mut(a).unwrap();
        actor.configure(RecordRef(3));
        actor.play_jump(Vec2::new(50.0, 0.0), 0.0);
        pool.release(a);

        let b = pool.acquire(Container::Climb);
        let actor = pool.get(b).unwrap();
        assert!(actor.record().is_none());
        assert!(actor.animation_token().is_none());
        assert!(pool.advance(1.0).is_empty());
    }

    #[test]
    fn test_effects_are_best_effort() {
        let mut pool = pool(0, 0);
        assert!(!pool.play_effect(Vec2::ZERO));
        assert_eq!(pool.stats().effects_dropped, 1);
    }

    #[test]
    fn test_effect_round_robin_and_expiry() {
        let mut pool = pool(0, 2);
        assert!(pool.play_effect(Vec2::new(1.0, 0.0)));
        assert!(pool.play_effect(Vec2::new(2.0, 0.0)));
        assert!(pool.play_effect(Vec2::new(3.0, 0.0)));
        let positions: Vec<f32> = pool.active_effects().map(|e| e.position.x).collect();
        assert_eq!(positions, vec![3.0, 2.0]);
        assert_eq!(pool.stats().effects_played, 3);

        pool.advance(1.0);
        assert_eq!(pool.active_effects().count(), 0);
    }

    #[test]
    fn test_advance_reports_landings() {
        let mut pool = pool(1, 1);
        let a = pool.acquire(Container::Climb);
        pool.get_mut(a).unwrap().play_jump(Vec2::new(0.0, 10.0), 0.0);
        let mut events = Vec::new();
        for _ in 0..60 {
            events.extend(pool.advance(1.0 / 60.0));
        }
        assert_eq!(events, vec![(a, ActorEvent::Landed(Vec2::new(0.0, 10.0)))]);
    }

    #[test]
    fn test_draw_list_sorted_by_z() {
        let mut pool = pool(3, 1);
        let a = pool.acquire(Container::Crowd);
        let b = pool.acquire(Container::Crowd);
        let c = pool.acquire(Container::Climb);
        pool.get_mut(a).unwrap().set_z_order(5);
        pool.get_mut(b).unwrap().set_z_order(-1);
        assert_eq!(pool.draw_list(Container::Crowd), vec![b, a]);
        assert_eq!(pool.draw_list(Container::Climb), vec![c]);
    }
}
