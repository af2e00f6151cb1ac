use ratatui::Frame;
use ratatui::layout::Rect;

use super::event::TuiEvent;

/// Anything that draws itself into a region of the frame.
///
/// Wrappers are rebuilt every frame from borrowed props; whatever must
/// survive between frames (scroll offsets, layout caches, form focus) lives
/// in a `*State` struct the wrapper borrows mutably, which is why `render`
/// takes `&mut self`.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that turns raw key/mouse events into its own event type.
///
/// Returning `None` means the event was consumed (or ignored) with no
/// outcome the caller needs to act on.
pub trait EventHandler {
    type Event;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event>;
}
