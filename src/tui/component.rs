use ratatui::Frame;
use ratatui::layout::Rect;

/// A renderable UI piece.
///
/// Components receive data via struct fields (persistent state borrowed
/// into a transient wrapper, or owned props) and draw into a `Rect`.
///
/// `render` takes `&mut self` so components can update presentation
/// caches (cached widths, scroll offsets) during the render pass, in line
/// with Ratatui's `StatefulWidget` pattern.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}
