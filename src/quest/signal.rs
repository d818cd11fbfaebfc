//! Typed messages from the engines to their UI collaborators
//!
//! Engines never call into the UI directly. They queue signals and the
//! composition root drains and routes them once per frame.

use super::roster::RecordRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// HUD level counter
    LevelText { current: u32, total: u32 },
    /// HUD survivor counter
    PlayerCount { current: u32, total: u32 },
    /// HUD status line
    InfoMessage(String),
    /// HUD event clock
    ClockMessage(String),
    /// Matchmaking counter text
    MatchmakingCounter { current: u32, target: u32 },
    /// Play control interactable state
    PlayControl { enabled: bool },
    /// Matchmaking finished; the continue control may be shown
    ContinueAvailable,
    /// The play control was accepted; the mini-game should open
    PlayRequested,
    /// The main participant failed; the event returns to its intro
    RestartRequested,
    /// The main participant reached the final step
    QuestCompleted { winners: Vec<RecordRef> },
}
