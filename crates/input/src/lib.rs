//! Host input: pointer, click and resize events, collected in a mailbox that
//! the frame loop drains once per frame.
//!
//! # Invariants
//! - Event handlers only write to the mailbox; they never touch the scene.
//! - Any number of clicks between two frames becomes one selection request.
//! - The pointer position persists across frames until the next move.

pub mod event;
pub mod mailbox;

pub use event::{InputEvent, pointer_to_ndc};
pub use mailbox::{FrameInput, InputMailbox};
