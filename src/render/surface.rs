use crate::foundation::core::Size;
use crate::render::frame::Frame;

/// A polled input event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// Window closed, Escape or `q`.
    Quit,
    /// Any other key press, by its text when it has one.
    Key(String),
}

impl InputEvent {
    /// Map a pressed key's text to an event.
    pub fn from_key_text(text: &str) -> Self {
        match text {
            "q" | "Q" => Self::Quit,
            other => Self::Key(other.to_string()),
        }
    }
}

/// Render surface frames are presented to.
///
/// `present` borrows the frame: presenting never consumes it.
pub trait Display {
    fn size(&self) -> Size;
    fn present(&mut self, frame: &Frame);
}

/// Non-blocking source of input events.
pub trait EventSource {
    fn poll(&mut self) -> Vec<InputEvent>;
}
