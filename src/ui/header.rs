use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

pub struct Header<'a> {
    pub document: &'a str,
    pub backend: &'a str,
    pub loading: bool,
}

impl<'a> Widget for Header<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bg = Style::default().bg(Color::DarkGray);
        let title = Span::styled(
            " blockpad ",
            bg.fg(Color::White).add_modifier(Modifier::BOLD),
        );
        let document = Span::styled(format!(" [{}] ", self.document), bg.fg(Color::Cyan));

        let right = if self.loading {
            format!("loading from {} ", self.backend)
        } else {
            format!("{} ", self.backend)
        };
        let spacer_len = area
            .width
            .saturating_sub((title.width() + document.width() + right.chars().count()) as u16);
        let spacer = Span::styled(" ".repeat(spacer_len as usize), bg);
        let backend = Span::styled(right, bg.fg(Color::Gray));

        Line::from(vec![title, document, spacer, backend]).render(area, buf);
    }
}
