//! Participants of one event session

use serde::{Deserialize, Serialize};

/// Opaque handle to an image owned by the rendering collaborator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef(pub String);

/// One entry of the roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    /// Unique per event instance
    pub id: String,
    pub display_name: String,
    pub profile_image: Option<ImageRef>,
    pub frame_image: Option<ImageRef>,
    /// Human-controlled entry (exactly one per roster)
    pub is_main: bool,
    /// Runtime flag, false at spawn
    #[serde(default)]
    pub is_eliminated: bool,
}

impl ParticipantRecord {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, is_main: bool) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            profile_image: None,
            frame_image: None,
            is_main,
            is_eliminated: false,
        }
    }
}

/// Stable reference to a roster entry (its index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordRef(pub usize);

/// Ordered participants, built once per session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    records: Vec<ParticipantRecord>,
}

impl Roster {
    pub fn new(records: Vec<ParticipantRecord>) -> Self {
        let mains = records.iter().filter(|r| r.is_main).count();
        if mains != 1 {
            log::warn!("Roster has {} main participants (expected 1)", mains);
        }
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, r: RecordRef) -> Option<&ParticipantRecord> {
        self.records.get(r.0)
    }

    pub fn get_mut(&mut self, r: RecordRef) -> Option<&mut ParticipantRecord> {
        self.records.get_mut(r.0)
    }

    /// Looked up by flag; index 0 is not guaranteed to be the main participant
    pub fn main_ref(&self) -> Option<RecordRef> {
        self.records.iter().position(|r| r.is_main).map(RecordRef)
    }

    pub fn is_main(&self, r: RecordRef) -> bool {
        self.get(r).is_some_and(|rec| rec.is_main)
    }

    pub fn is_eliminated(&self, r: RecordRef) -> bool {
        self.get(r).is_some_and(|rec| rec.is_eliminated)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RecordRef, &ParticipantRecord)> {
        self.records.iter().enumerate().map(|(i, rec)| (RecordRef(i), rec))
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Roster {
        Roster::new(vec![
            ParticipantRecord::new("bot_a", "Guest_1000", false),
            ParticipantRecord::new("local_player", "YOU", true),
            ParticipantRecord::new("bot_b", "Guest_2000", false),
        ])
    }

    #[test]
    fn test_main_found_by_flag() {
        let roster = sample();
        assert_eq!(roster.main_ref(), Some(RecordRef(1)));
        assert!(roster.is_main(RecordRef(1)));
        assert!(!roster.is_main(RecordRef(0)));
    }

    #[test]
    fn test_elimination_flags() {
        let mut roster = sample();
        roster.get_mut(RecordRef(2)).unwrap().is_eliminated = true;
        assert!(roster.is_eliminated(RecordRef(2)));
        assert!(!roster.is_eliminated(RecordRef(0)));
    }

    #[test]
    fn test_out_of_range_ref() {
        let roster = sample();
        assert!(roster.get(RecordRef(9)).is_none());
        assert!(!roster.is_eliminated(RecordRef(9)));
    }
}
