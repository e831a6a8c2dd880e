use ratatui::Frame;
use ratatui::layout::Rect;

/// A reusable UI component.
///
/// Components receive data via props (struct fields), may borrow persistent
/// state that lives in `TuiState`, and render into a `Frame` within a `Rect`.
///
/// `render` takes `&mut self` so stateful components can update scroll
/// offsets or selection state during the render pass, the same way ratatui's
/// `StatefulWidget` does.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that turns low-level `TuiEvent`s into its own events.
pub trait EventHandler {
    /// The type of high-level event this component emits.
    type Event;

    fn handle_event(&mut self, event: &super::event::TuiEvent) -> Option<Self::Event>;
}
