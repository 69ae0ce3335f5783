//! Door session state machine.
//!
//! One reader channel moves through a small, strictly validated state flow
//! per swipe:
//!
//! - `Idle → Reading → Deciding → Granted | Denied → Idle` in door-sim mode
//! - `Idle → Reading → Idle` in raw mode (no decision step)
//!
//! No other transitions exist. The machine exists to keep display updates
//! and decision calls honest — a decision can only happen once per read, and
//! only from the `Deciding` state.

use crate::display::VirtualDisplay;
use opendoor_access::{AccessController, AccessDecision};
use opendoor_core::{CardReadEvent, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// States of one reader channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorState {
    /// Waiting for a swipe.
    Idle,
    /// A frame has been captured and decoded.
    Reading,
    /// Access decision in progress.
    Deciding,
    /// Access granted, verdict on display.
    Granted,
    /// Access denied, verdict on display.
    Denied,
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            DoorState::Idle => "Idle",
            DoorState::Reading => "Reading",
            DoorState::Deciding => "Deciding",
            DoorState::Granted => "Granted",
            DoorState::Denied => "Denied",
        };
        write!(f, "{state}")
    }
}

impl DoorState {
    /// Check if transition to target state is valid from this state.
    #[must_use]
    pub fn can_transition_to(&self, target: &DoorState) -> bool {
        matches!(
            (self, target),
            (DoorState::Idle, DoorState::Reading)
                | (DoorState::Reading, DoorState::Deciding | DoorState::Idle)
                | (DoorState::Deciding, DoorState::Granted | DoorState::Denied)
                | (DoorState::Granted, DoorState::Idle)
                | (DoorState::Denied, DoorState::Idle)
        )
    }
}

/// State machine for one reader channel.
#[derive(Debug, Clone)]
pub struct DoorSession {
    state: DoorState,
}

impl Default for DoorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DoorSession {
    /// New session in `Idle`.
    #[must_use]
    pub fn new() -> Self {
        DoorSession {
            state: DoorState::Idle,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> DoorState {
        self.state
    }

    /// Move to `target`, validating the transition.
    ///
    /// # Errors
    /// Returns `Error::InvalidStateTransition` for a move the flow does not
    /// allow.
    pub fn transition_to(&mut self, target: DoorState) -> Result<()> {
        if !self.state.can_transition_to(&target) {
            return Err(Error::InvalidStateTransition {
                from: self.state.to_string(),
                to: target.to_string(),
            });
        }
        self.state = target;
        Ok(())
    }

    /// Process one card read in door-sim mode: decide exactly once, render
    /// the verdict, return to idle.
    ///
    /// # Errors
    /// Returns `Error::InvalidStateTransition` if called while a previous
    /// read is still being processed.
    pub fn handle_read(
        &mut self,
        event: &CardReadEvent,
        controller: &AccessController,
        display: &mut VirtualDisplay,
    ) -> Result<AccessDecision> {
        self.transition_to(DoorState::Reading)?;
        self.transition_to(DoorState::Deciding)?;

        let decision = controller.decide(event);

        if let Some(action) = &decision.action {
            info!(?action, fc = event.facility_code, cn = event.card_number, "special event triggered");
        }

        if decision.is_granted() {
            info!(user = decision.granted_to(), "access granted");
            self.transition_to(DoorState::Granted)?;
        } else {
            warn!(fc = event.facility_code, cn = event.card_number, "access denied");
            self.transition_to(DoorState::Denied)?;
        }

        display.show_decision(&decision, &event.frame);
        self.transition_to(DoorState::Idle)?;
        Ok(decision)
    }

    /// Process one card read in raw mode: render the frame, no decision.
    ///
    /// # Errors
    /// Returns `Error::InvalidStateTransition` if called while a previous
    /// read is still being processed.
    pub fn handle_raw(
        &mut self,
        event: &CardReadEvent,
        display: &mut VirtualDisplay,
    ) -> Result<()> {
        self.transition_to(DoorState::Reading)?;
        display.show_frame(&event.frame);
        self.transition_to(DoorState::Idle)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opendoor_access::{AccessController, EventTable, User, UserTable};
    use opendoor_core::DecodedFrame;

    fn read_event(fc: i64, cn: i64) -> CardReadEvent {
        CardReadEvent::new(DecodedFrame {
            bits: 26,
            name: "STANDARD 26-bit (H10301)".to_string(),
            facility_code: fc,
            card_number: cn,
            parity_ok: true,
            raw_hex: "0x0".to_string(),
        })
    }

    fn controller() -> AccessController {
        AccessController::new(
            UserTable::new(vec![User {
                name: "Alice".to_string(),
                facility_code: Some(12),
                card_number: 5000,
                active: true,
                flag: None,
            }]),
            EventTable::default(),
        )
    }

    #[test]
    fn test_valid_flow_returns_to_idle() {
        let mut session = DoorSession::new();
        let mut display = VirtualDisplay::default();

        let decision = session
            .handle_read(&read_event(12, 5000), &controller(), &mut display)
            .unwrap();

        assert!(decision.is_granted());
        assert_eq!(session.state(), DoorState::Idle);
        assert_eq!(display.get_line(0).unwrap().trim_end(), "Access Granted");
    }

    #[test]
    fn test_denied_flow_returns_to_idle() {
        let mut session = DoorSession::new();
        let mut display = VirtualDisplay::default();

        let decision = session
            .handle_read(&read_event(1, 2), &controller(), &mut display)
            .unwrap();

        assert!(!decision.is_granted());
        assert_eq!(session.state(), DoorState::Idle);
        assert_eq!(display.get_line(0).unwrap().trim_end(), "Access Denied");
    }

    #[test]
    fn test_raw_flow_skips_decision() {
        let mut session = DoorSession::new();
        let mut display = VirtualDisplay::default();

        session
            .handle_raw(&read_event(12, 5000), &mut display)
            .unwrap();

        assert_eq!(session.state(), DoorState::Idle);
        assert_eq!(display.get_line(0).unwrap().trim_end(), "FC: 12");
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let mut session = DoorSession::new();
        let result = session.transition_to(DoorState::Granted);
        assert!(matches!(
            result,
            Err(Error::InvalidStateTransition { .. })
        ));
        assert_eq!(session.state(), DoorState::Idle);
    }

    #[test]
    fn test_transition_matrix() {
        assert!(DoorState::Idle.can_transition_to(&DoorState::Reading));
        assert!(DoorState::Reading.can_transition_to(&DoorState::Deciding));
        assert!(DoorState::Reading.can_transition_to(&DoorState::Idle));
        assert!(DoorState::Deciding.can_transition_to(&DoorState::Granted));
        assert!(DoorState::Deciding.can_transition_to(&DoorState::Denied));
        assert!(DoorState::Granted.can_transition_to(&DoorState::Idle));
        assert!(DoorState::Denied.can_transition_to(&DoorState::Idle));

        assert!(!DoorState::Idle.can_transition_to(&DoorState::Deciding));
        assert!(!DoorState::Granted.can_transition_to(&DoorState::Denied));
        assert!(!DoorState::Idle.can_transition_to(&DoorState::Idle));
    }

    #[test]
    fn test_state_serde_snake_case() {
        let json = serde_json::to_string(&DoorState::Deciding).unwrap();
        assert_eq!(json, "\"deciding\"");
    }
}
