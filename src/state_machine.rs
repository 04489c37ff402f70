//! Per-user dialog state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! the runtime loads a user's stage, feeds it an event, then executes the
//! returned effects and renders the reply.

mod effect;
pub mod event;
pub mod reply;
pub mod stage;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use reply::{InvalidInput, Reply, MAIN_MENU};
pub use stage::{Direction, Stage};
pub use transition::{transition, Transition};
