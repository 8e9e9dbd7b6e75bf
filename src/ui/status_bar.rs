use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

pub struct StatusBar<'a> {
    pub hints: &'a [(String, &'static str)],
    pub message: Option<&'a str>,
    pub selected: usize,
    pub in_flight: usize,
}

impl<'a> Widget for StatusBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if let Some(msg) = self.message {
            let line = Line::from(Span::styled(
                format!(" {} ", msg),
                Style::default().fg(Color::Yellow),
            ));
            line.render(area, buf);
            return;
        }

        let mut spans = vec![Span::raw(" ")];

        if self.selected > 0 {
            spans.push(Span::styled(
                format!("{} selected ", self.selected),
                Style::default().fg(Color::Black).bg(Color::Cyan),
            ));
            spans.push(Span::raw(" "));
        }
        if self.in_flight > 0 {
            spans.push(Span::styled(
                format!("syncing {} ", self.in_flight),
                Style::default().fg(Color::Yellow),
            ));
        }

        for (i, (key, action)) in self.hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled("  ", Style::default().fg(Color::DarkGray)));
            }
            spans.push(Span::styled(
                format!("[{}]", key),
                Style::default().fg(Color::Cyan),
            ));
            spans.push(Span::styled(
                action.to_string(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM),
            ));
        }

        Line::from(spans).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::test_support::row_text;

    fn render(bar: StatusBar) -> String {
        let area = Rect::new(0, 0, 70, 1);
        let mut buf = Buffer::empty(area);
        bar.render(area, &mut buf);
        row_text(&buf, 0)
    }

    #[test]
    fn renders_hints() {
        let hints = vec![("Ctrl+q".to_string(), "quit"), ("F1".to_string(), "help")];
        let content = render(StatusBar {
            hints: &hints,
            message: None,
            selected: 0,
            in_flight: 0,
        });
        assert!(content.contains("[Ctrl+q]quit"));
        assert!(content.contains("[F1]help"));
        assert!(!content.contains("selected"));
    }

    #[test]
    fn message_replaces_hints() {
        let hints = vec![("Ctrl+q".to_string(), "quit")];
        let content = render(StatusBar {
            hints: &hints,
            message: Some("Opening document..."),
            selected: 0,
            in_flight: 0,
        });
        assert!(content.contains("Opening document..."));
        assert!(!content.contains("[Ctrl+q]"));
    }

    #[test]
    fn shows_selection_and_pending_counts() {
        let content = render(StatusBar {
            hints: &[],
            message: None,
            selected: 3,
            in_flight: 2,
        });
        assert!(content.contains("3 selected"));
        assert!(content.contains("syncing 2"));
    }
}
