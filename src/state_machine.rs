//! Turn state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.
//! The runtime executes the effects; nothing in here performs I/O.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::Effect;
pub use event::{Event, Reply};
pub use state::{ConvContext, ConvState, TurnFailure, DEFAULT_MAX_ROUND_TRIPS};
pub use transition::{begin_turn, transition, TransitionError};
