//! Frame-driven event simulation
//!
//! Everything here advances on an explicit `dt` and draws randomness from a
//! caller-supplied RNG:
//! - Fixed frame tick only, single-threaded
//! - No rendering or platform dependencies
//! - Engines report to the outside world through `Signal` outboxes

pub mod avatar;
pub mod countdown;
pub mod curve;
pub mod layout;
pub mod matchmaking;
pub mod pool;
pub mod roster;
pub mod round;
pub mod signal;
pub mod task;

pub use avatar::{ActorEvent, ActorState, AnimationToken, AvatarActor, Container};
pub use countdown::{EventCountdown, format_hms};
pub use curve::{Curve, Key};
pub use layout::{RowPattern, Slot};
pub use matchmaking::{MatchmakingPhase, MatchmakingSimulator};
pub use pool::{ActorHandle, ActorPool, Effect, PoolStats};
pub use roster::{ImageRef, ParticipantRecord, RecordRef, Roster};
pub use round::{Outcome, RoundEngine, RoundPhase, StepSequence};
pub use signal::Signal;
pub use task::{Delay, Progress};
