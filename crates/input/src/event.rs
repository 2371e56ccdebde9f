use glam::Vec2;

/// An input event from the host window, already stripped of platform detail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer moved. Normalized device coordinates, y up, both in [-1, 1].
    PointerMoved(Vec2),
    /// Primary button clicked. Carries no position: selection uses the last
    /// pointer position.
    Click,
    /// Drawable surface resized, in physical pixels.
    Resized { width: u32, height: u32 },
}

/// Map a window-space pointer position (origin top-left, y down) to NDC.
///
/// Returns `None` for an empty viewport.
pub fn pointer_to_ndc(x: f32, y: f32, width: u32, height: u32) -> Option<Vec2> {
    if width == 0 || height == 0 {
        return None;
    }
    Some(Vec2::new(
        (x / width as f32) * 2.0 - 1.0,
        -(y / height as f32) * 2.0 + 1.0,
    ))
}
