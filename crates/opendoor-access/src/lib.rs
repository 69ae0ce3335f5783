//! Access decision for decoded card reads.
//!
//! Given the (facility code, card number) pair of a decoded frame, this crate
//! answers two questions: does a special event fire for this card, and is
//! access granted and to whom. It performs a single lookup-and-decide step
//! against in-memory tables loaded once at startup — no I/O at decision time,
//! no grant history, no policy beyond the lookup.
//!
//! The table files (`users.json`, `events.json`) keep the field naming of the
//! original reader firmware, so existing deployments' files load unchanged.

pub mod decision;
pub mod events;
pub mod users;

pub use decision::{AccessController, AccessDecision, AccessOutcome, DenyReason};
pub use events::{Action, ActionKind, EventTable, SpecialEvent};
pub use users::{User, UserTable};
