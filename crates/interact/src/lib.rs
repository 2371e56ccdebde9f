//! Interaction: the torch that follows the pointer, the hover highlight state
//! machine, click selection with its pulse, and the [`Session`] frame loop.
//!
//! # Invariants
//! - At most one object is hovered per frame: the metadata owner of the
//!   nearest hit.
//! - A click is resolved against the hit computed in the same frame.
//! - A pulse restores exactly the scale it captured, after any hover easing
//!   that ran in the same frame.
//! - Collaborators (display, audio, picker) are reached only through traits.

pub mod aim;
pub mod highlight;
pub mod pulse;
pub mod selection;
pub mod session;
pub mod sinks;

pub use aim::Torch;
pub use pulse::PulseQueue;
pub use selection::{Feedback, Selection, select};
pub use session::{FrameReport, Session};
pub use sinks::{AudioCue, DisplaySink, LogAudio, LogDisplay};
