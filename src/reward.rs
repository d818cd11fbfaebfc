//! Winners popup
//!
//! Shows the main participant large and a handful of co-winners small. All
//! avatars come from the shared pool and are parked in an idle pose.

use crate::quest::avatar::Container;
use crate::quest::pool::{ActorHandle, ActorPool};
use crate::quest::roster::{RecordRef, Roster};
use crate::tuning::RewardTuning;

#[derive(Debug, Default)]
pub struct RewardPopup {
    main: Option<ActorHandle>,
    co_winners: Vec<ActorHandle>,
    /// Winners other than the main participant, shown or not
    others_count: usize,
}

impl RewardPopup {
    /// Build the popup from the quest-completed winners
    pub fn build(
        winners: &[RecordRef],
        roster: &Roster,
        pool: &mut ActorPool,
        tuning: &RewardTuning,
    ) -> Self {
        let mut popup = Self::default();
        let main = winners.iter().copied().find(|&r| roster.is_main(r));
        let others: Vec<RecordRef> = winners.iter().copied().filter(|&r| !roster.is_main(r)).collect();
        popup.others_count = others.len();

        if let Some(record) = main {
            popup.main = Some(spawn(pool, record, Container::RewardMain, tuning.main_scale));
        }
        for &record in others.iter().take(tuning.max_co_winners) {
            popup
                .co_winners
                .push(spawn(pool, record, Container::RewardCrowd, tuning.co_winner_scale));
        }
        log::info!(
            "Reward popup: {} co-winners ({} shown)",
            popup.others_count,
            popup.co_winners.len()
        );
        popup
    }

    /// Text shown under the winners, none on a solo win
    pub fn sharing_text(&self) -> Option<String> {
        (self.others_count > 0).then(|| {
            format!(
                "You are sharing the reward with {} other winners!",
                self.others_count
            )
        })
    }

    pub fn main_actor(&self) -> Option<ActorHandle> {
        self.main
    }

    pub fn co_winner_actors(&self) -> &[ActorHandle] {
        &self.co_winners
    }

    pub fn others_count(&self) -> usize {
        self.others_count
    }

    /// Return every popup actor to the pool
    pub fn cleanup(&mut self, pool: &mut ActorPool) {
        if let Some(handle) = self.main.take() {
            pool.release(handle);
        }
        pool.release_all(&mut self.co_winners);
        self.others_count = 0;
    }
}

fn spawn(pool: &mut ActorPool, record: RecordRef, parent: Container, scale: f32) -> ActorHandle {
    let handle = pool.acquire(parent);
    if let Some(actor) = pool.get_mut(handle) {
        actor.configure(record);
        actor.set_position(glam::Vec2::ZERO);
        actor.set_base_scale(scale);
        actor.force_stop();
    }
    handle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::avatar::ActorState;
    use crate::quest::roster::ParticipantRecord;
    use crate::tuning::{MotionTuning, PoolTuning};
    use glam::Vec2;

    fn roster(size: usize) -> Roster {
        let mut records = vec![ParticipantRecord::new("local_player", "YOU", true)];
        records.extend((1..size).map(|i| ParticipantRecord::new(format!("bot_{i}"), format!("Guest_{i}"), false)));
        Roster::new(records)
    }

    fn pool() -> ActorPool {
        ActorPool::new(&PoolTuning::default(), MotionTuning::default())
    }

    #[test]
    fn test_main_large_and_co_winners_capped() {
        let roster = roster(20);
        let mut pool = pool();
        let winners: Vec<RecordRef> = (0..9).map(RecordRef).collect();
        let popup = RewardPopup::build(&winners, &roster, &mut pool, &RewardTuning::default());

        let main = pool.get(popup.main_actor().unwrap()).unwrap();
        assert_eq!(main.record(), Some(RecordRef(0)));
        assert_eq!(main.parent(), Container::RewardMain);
        assert!((main.scale().x - 1.3).abs() < 1e-5);
        assert_eq!(main.state(), ActorState::Idle);

        assert_eq!(popup.co_winner_actors().len(), 5);
        for &h in popup.co_winner_actors() {
            let actor = pool.get(h).unwrap();
            assert!((actor.scale().x - 0.8).abs() < 1e-5);
            assert_eq!(actor.rotation(), 0.0);
            assert_eq!(actor.position(), Vec2::ZERO);
        }
        assert_eq!(
            popup.sharing_text().as_deref(),
            Some("You are sharing the reward with 8 other winners!")
        );
    }

    #[test]
    fn test_solo_win_has_no_sharing_text() {
        let roster = roster(5);
        let mut pool = pool();
        let popup = RewardPopup::build(&[RecordRef(0)], &roster, &mut pool, &RewardTuning::default());
        assert!(popup.sharing_text().is_none());
        assert!(popup.co_winner_actors().is_empty());
    }

    #[test]
    fn test_cleanup_returns_actors() {
        let roster = roster(10);
        let mut pool = pool();
        let winners: Vec<RecordRef> = (0..4).map(RecordRef).collect();
        let mut popup = RewardPopup::build(&winners, &roster, &mut pool, &RewardTuning::default());
        assert_eq!(pool.stats().checked_out, 4);
        popup.cleanup(&mut pool);
        assert_eq!(pool.stats().checked_out, 0);
        assert!(popup.main_actor().is_none());
        assert!(popup.sharing_text().is_none());
    }
}
