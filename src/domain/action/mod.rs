//! Action lifecycle module

mod session;

pub use session::{
    ActionSession, ActionSlot, ActionState, FailureKind, InvalidStateTransition, Outcome,
};
