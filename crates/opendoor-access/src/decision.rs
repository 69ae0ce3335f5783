//! The lookup-and-decide step.
//!
//! Called exactly once per successfully decoded frame (including frames of
//! unknown format; the empty-frame capture failure never reaches this
//! layer). The controller consults the special event table first, then the
//! user table, and reports the outcome. It keeps no state between calls.

use crate::events::{Action, EventTable};
use crate::users::{User, UserTable};
use opendoor_core::CardReadEvent;
use std::fmt;

/// Why access was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No credential matched the decoded facility code / card number.
    UnknownUser,
    /// A credential matched but is marked inactive.
    CardDisabled,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DenyReason::UnknownUser => write!(f, "Unknown User"),
            DenyReason::CardDisabled => write!(f, "Card Disabled"),
        }
    }
}

/// Grant or deny, with the matched credential on grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessOutcome {
    Granted { user: User },
    Denied { reason: DenyReason },
}

/// Result of one decision: the outcome plus any side-effect action the
/// special event table triggered. Actions fire independently of the grant
/// outcome — a master card may open the door without being enrolled.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessDecision {
    pub outcome: AccessOutcome,
    pub action: Option<Action>,
}

impl AccessDecision {
    /// Returns `true` when access was granted.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self.outcome, AccessOutcome::Granted { .. })
    }

    /// Name of the matched credential, if access was granted.
    #[must_use]
    pub fn granted_to(&self) -> Option<&str> {
        match &self.outcome {
            AccessOutcome::Granted { user } => Some(&user.name),
            AccessOutcome::Denied { .. } => None,
        }
    }
}

/// The access-decision collaborator.
#[derive(Debug, Clone, Default)]
pub struct AccessController {
    users: UserTable,
    events: EventTable,
}

impl AccessController {
    /// Build a controller over loaded tables.
    #[must_use]
    pub fn new(users: UserTable, events: EventTable) -> Self {
        AccessController { users, events }
    }

    /// Decide on one card read.
    ///
    /// Order follows the original firmware: the special event table is
    /// consulted first (its action fires regardless of the grant outcome),
    /// then the user table decides grant or deny.
    #[must_use]
    pub fn decide(&self, event: &CardReadEvent) -> AccessDecision {
        let action = self.events.trigger(event.facility_code, event.card_number);

        let outcome = match self.users.find(event.facility_code, event.card_number) {
            None => AccessOutcome::Denied {
                reason: DenyReason::UnknownUser,
            },
            Some(user) if !user.active => AccessOutcome::Denied {
                reason: DenyReason::CardDisabled,
            },
            Some(user) => AccessOutcome::Granted { user: user.clone() },
        };

        AccessDecision { outcome, action }
    }

    /// The user table backing this controller.
    #[must_use]
    pub fn users(&self) -> &UserTable {
        &self.users
    }

    /// The event table backing this controller.
    #[must_use]
    pub fn events(&self) -> &EventTable {
        &self.events
    }
}
