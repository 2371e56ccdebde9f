use crate::event::InputEvent;
use glam::Vec2;

/// What the frame loop sees when it drains the mailbox.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Latest pointer position in NDC.
    pub pointer: Vec2,
    /// At least one click arrived since the last drain.
    pub select_requested: bool,
    /// Most recent surface size, if it changed since the last drain.
    pub resized: Option<(u32, u32)>,
}

/// Single-threaded mailbox between host callbacks and the frame loop.
///
/// Holds the latest pointer, a pending-click flag and a pending viewport size.
#[derive(Debug, Clone, Default)]
pub struct InputMailbox {
    pointer: Vec2,
    click_pending: bool,
    resize_pending: Option<(u32, u32)>,
}

impl InputMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMoved(ndc) => self.pointer = ndc,
            InputEvent::Click => self.click_pending = true,
            InputEvent::Resized { width, height } => {
                tracing::trace!(width, height, "resize queued");
                self.resize_pending = Some((width, height));
            }
        }
    }

    /// Current pointer without draining anything.
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Take pending click and resize; the pointer stays.
    pub fn drain(&mut self) -> FrameInput {
        FrameInput {
            pointer: self.pointer,
            select_requested: std::mem::take(&mut self.click_pending),
            resized: self.resize_pending.take(),
        }
    }
}
