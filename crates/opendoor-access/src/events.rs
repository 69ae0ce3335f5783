//! Special event table.
//!
//! Some cards trigger a side-effect action instead of (or in addition to) a
//! plain access decision: a master card that holds the door open, a card that
//! flips a light, a test card that beeps the buzzer. The table maps
//! facility-code/card-number patterns to actions; either field may be left
//! out to act as a wildcard. The first matching entry wins.
//!
//! The controller only *reports* the triggered action — actuators live
//! outside this crate.

use opendoor_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Action kinds understood by the actuator layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    DoorOpen,
    DoorClose,
    LightOn,
    LightOff,
    BuzzerBeep,
}

/// Raw action parameters as they appear in `events.json`. Absent fields get
/// the actuator defaults when the action is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_id: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

/// Fully resolved side-effect action with every parameter filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum Action {
    /// Hold the door open for the given number of seconds (default 5).
    DoorOpen { duration_secs: u64 },
    /// Close the door immediately.
    DoorClose,
    /// Turn a light on for the given number of seconds (defaults: light 1,
    /// 10 seconds).
    LightOn { light_id: u32, duration_secs: u64 },
    /// Turn a light off (default: light 1).
    LightOff { light_id: u32 },
    /// Beep the buzzer `count` times for `duration_ms` each (defaults: one
    /// 100 ms beep).
    BuzzerBeep { count: u32, duration_ms: u64 },
}

/// One entry of the special event table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialEvent {
    /// Facility code to match; absent matches any.
    #[serde(rename = "FC", default, skip_serializing_if = "Option::is_none")]
    pub facility_code: Option<i64>,

    /// Card number to match; absent matches any.
    #[serde(rename = "CN", default, skip_serializing_if = "Option::is_none")]
    pub card_number: Option<i64>,

    /// What to do when the entry matches.
    pub action: ActionKind,

    /// Optional action parameters.
    #[serde(default)]
    pub params: ActionParams,
}

impl SpecialEvent {
    /// Does this entry match the decoded card? Absent fields are wildcards.
    #[must_use]
    pub fn matches(&self, facility_code: i64, card_number: i64) -> bool {
        let fc_match = self.facility_code.is_none_or(|fc| fc == facility_code);
        let cn_match = self.card_number.is_none_or(|cn| cn == card_number);
        fc_match && cn_match
    }

    /// Resolve the entry into an action with defaults applied.
    #[must_use]
    pub fn resolve_action(&self) -> Action {
        match self.action {
            ActionKind::DoorOpen => Action::DoorOpen {
                duration_secs: self.params.duration.unwrap_or(5),
            },
            ActionKind::DoorClose => Action::DoorClose,
            ActionKind::LightOn => Action::LightOn {
                light_id: self.params.light_id.unwrap_or(1),
                duration_secs: self.params.duration.unwrap_or(10),
            },
            ActionKind::LightOff => Action::LightOff {
                light_id: self.params.light_id.unwrap_or(1),
            },
            ActionKind::BuzzerBeep => Action::BuzzerBeep {
                count: self.params.count.unwrap_or(1),
                duration_ms: self.params.duration.unwrap_or(100),
            },
        }
    }
}

/// In-memory special event table, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct EventTable {
    events: Vec<SpecialEvent>,
}

impl EventTable {
    /// Build a table from already-parsed entries.
    #[must_use]
    pub fn new(events: Vec<SpecialEvent>) -> Self {
        EventTable { events }
    }

    /// Load the table from a JSON file.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read and `Error::Config`
    /// if it does not parse as an event list.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let events: Vec<SpecialEvent> = serde_json::from_str(&raw).map_err(|e| {
            Error::Config(format!(
                "invalid event table {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Ok(EventTable { events })
    }

    /// Resolve the action of the first entry matching the decoded card.
    #[must_use]
    pub fn trigger(&self, facility_code: i64, card_number: i64) -> Option<Action> {
        self.events
            .iter()
            .find(|event| event.matches(facility_code, card_number))
            .map(SpecialEvent::resolve_action)
    }

    /// Number of table entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
