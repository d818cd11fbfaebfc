//! HUD sink
//!
//! The engines only ever talk to the HUD through `Signal`s. `dispatch` turns
//! the HUD subset of those signals into calls on a `HudSink`.

use crate::quest::signal::Signal;

/// Anything that can display the event HUD
pub trait HudSink {
    fn set_level_text(&mut self, current: u32, total: u32);
    fn set_player_count(&mut self, current: u32, total: u32);
    fn set_info_message(&mut self, message: &str);
    fn set_clock_message(&mut self, message: &str);
}

/// Apply a HUD signal to `hud`; any other signal is handed back
pub fn dispatch(signal: Signal, hud: &mut dyn HudSink) -> Option<Signal> {
    match signal {
        Signal::LevelText { current, total } => hud.set_level_text(current, total),
        Signal::PlayerCount { current, total } => hud.set_player_count(current, total),
        Signal::InfoMessage(message) => hud.set_info_message(&message),
        Signal::ClockMessage(message) => hud.set_clock_message(&message),
        other => return Some(other),
    }
    None
}

/// HUD state kept as the strings a text UI would show
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextHud {
    pub level: String,
    pub players: String,
    pub info: String,
    pub clock: String,
}

impl HudSink for TextHud {
    fn set_level_text(&mut self, current: u32, total: u32) {
        self.level = format!("Level {}/{}", current, total);
    }

    fn set_player_count(&mut self, current: u32, total: u32) {
        self.players = format!("Players {}/{}", current, total);
    }

    fn set_info_message(&mut self, message: &str) {
        self.info = message.to_string();
    }

    fn set_clock_message(&mut self, message: &str) {
        self.clock = message.to_string();
    }
}

/// Text HUD that also logs every change (headless runs)
#[derive(Debug, Default)]
pub struct LogHud {
    pub text: TextHud,
}

impl HudSink for LogHud {
    fn set_level_text(&mut self, current: u32, total: u32) {
        self.text.set_level_text(current, total);
        log::info!("[hud] {}", self.text.level);
    }

    fn set_player_count(&mut self, current: u32, total: u32) {
        self.text.set_player_count(current, total);
        log::info!("[hud] {}", self.text.players);
    }

    fn set_info_message(&mut self, message: &str) {
        self.text.set_info_message(message);
        log::info!("[hud] {}", message);
    }

    fn set_clock_message(&mut self, message: &str) {
        self.text.set_clock_message(message);
        log::debug!("[hud] clock {}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_formats_hud_text() {
        let mut hud = TextHud::default();
        assert!(dispatch(Signal::LevelText { current: 2, total: 8 }, &mut hud).is_none());
        assert!(dispatch(Signal::PlayerCount { current: 71, total: 100 }, &mut hud).is_none());
        assert!(dispatch(Signal::ClockMessage("23:59:58".into()), &mut hud).is_none());
        assert_eq!(hud.level, "Level 2/8");
        assert_eq!(hud.players, "Players 71/100");
        assert_eq!(hud.clock, "23:59:58");
    }

    #[test]
    fn test_dispatch_passes_through_other_signals() {
        let mut hud = TextHud::default();
        assert_eq!(dispatch(Signal::PlayRequested, &mut hud), Some(Signal::PlayRequested));
        assert_eq!(hud, TextHud::default());
    }
}
