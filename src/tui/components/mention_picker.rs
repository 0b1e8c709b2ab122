//! # Mention Picker Overlay
//!
//! Completion list for an open `@` query, drawn over the editor. The
//! state lives in the editing session (the picker is part of the
//! document's suggestion machinery); this is a transient render wrapper
//! borrowing it, created each frame.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph};

use crate::session::BufferSession;

const MAX_VISIBLE_CANDIDATES: u16 = 5;

pub struct MentionPicker<'a> {
    pub session: &'a BufferSession,
}

impl MentionPicker<'_> {
    /// Render anchored above `editor_area` (falls back to overlapping it
    /// near the top of the screen).
    pub fn render(&self, frame: &mut Frame, editor_area: Rect) {
        let Some(suggestion) = self.session.suggestion() else {
            return;
        };
        let matches = self.session.suggestion_matches();

        let height = (matches.len() as u16).clamp(1, MAX_VISIBLE_CANDIDATES) + 2;
        let y = editor_area.y.saturating_sub(height);
        let overlay = Rect {
            x: editor_area.x,
            y,
            width: editor_area.width.min(32).max(16),
            height,
        };

        frame.render_widget(Clear, overlay);

        let title = format!(" @{} ", suggestion.query);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title);

        if matches.is_empty() {
            let empty = Paragraph::new("No matching users")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, overlay);
            return;
        }

        let items: Vec<ListItem> = matches
            .iter()
            .enumerate()
            .map(|(i, user)| {
                let style = if i == suggestion.selected {
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    Style::default().fg(Color::Gray)
                };
                ListItem::new(Line::from(Span::styled(
                    format!("@{}", user.username),
                    style,
                )))
            })
            .collect();

        frame.render_widget(List::new(items).block(block), overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{key, test_session_with_text, type_str};
    use crate::tui::event::Key;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_renders_query_and_candidates() {
        let mut session = test_session_with_text("cc ");
        session.handle_key(&key(Key::Char('@')));
        type_str(&mut session, "al");

        let backend = TestBackend::new(50, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                let editor_area = Rect::new(0, 8, 40, 3);
                MentionPicker { session: &session }.render(f, editor_area);
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("@al"), "query shown in title");
        assert!(text.contains("@alice"));
    }

    #[test]
    fn test_renders_empty_state() {
        let mut session = test_session_with_text("");
        session.handle_key(&key(Key::Char('@')));
        type_str(&mut session, "zzz");

        let backend = TestBackend::new(50, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                MentionPicker { session: &session }.render(f, Rect::new(0, 8, 40, 3));
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("No matching users"));
    }
}
