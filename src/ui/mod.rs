pub mod document;
pub mod header;
pub mod status_bar;

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block as WidgetBlock, BorderType, Borders, Clear};
use ratatui::Frame;

use crate::app::AppState;
use crate::error::ErrorPopup;

use document::DocumentView;
use header::Header;
use status_bar::StatusBar;

pub fn render(frame: &mut Frame, state: &AppState) {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .split(frame.area());

    let header = Header {
        document: &state.document,
        backend: &state.backend_label,
        loading: state.loading,
    };
    frame.render_widget(header, chunks[0]);

    let view = DocumentView {
        root_id: &state.document,
        blocks: state.blocks(),
        dataview: &state.dataview,
        focus: state.editor.focused(),
        selection: state.editor.selection(),
        loading: state.loading,
    };
    frame.render_widget(view, chunks[1]);

    if state.show_help {
        render_help_popup(frame, &state.hints, chunks[1]);
    }

    if let Some(err) = &state.error_popup {
        render_error_popup(frame, err, chunks[1]);
    }

    let status = StatusBar {
        hints: &state.hints,
        message: state.status_message.as_deref(),
        selected: state.editor.selection().get().len(),
        in_flight: state.editor.in_flight(),
    };
    frame.render_widget(status, chunks[2]);
}

const EDITING_HELP: [(&str, &str); 6] = [
    ("Enter", "split / new block"),
    ("Backspace", "merge / delete block"),
    ("↑ ↓", "previous / next block"),
    ("Shift+↑", "select block"),
    ("Ctrl+A", "select all"),
    ("← →", "move caret"),
];

fn centered(area: Rect, width_percent: u16, min_width: u16, height: u16) -> Rect {
    let width = (area.width * width_percent / 100).max(min_width).min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_help_popup(frame: &mut Frame, hints: &[(String, &str)], area: Rect) {
    let rows: Vec<(String, &str)> = hints
        .iter()
        .map(|(k, a)| (k.clone(), *a))
        .chain(EDITING_HELP.iter().map(|(k, a)| (k.to_string(), *a)))
        .collect();
    let popup_area = centered(area, 60, 30, (rows.len() + 3) as u16); // +2 borders +1 footer
    frame.render_widget(Clear, popup_area);

    let block = WidgetBlock::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Help ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    for (i, (key_str, action_name)) in rows.iter().enumerate() {
        if i as u16 >= inner.height.saturating_sub(1) {
            break;
        }
        let line = Line::from(vec![
            Span::styled(format!("{:>12}", key_str), Style::default().fg(Color::Yellow)),
            Span::raw("  "),
            Span::styled(*action_name, Style::default().fg(Color::White)),
        ]);
        let line_area = Rect::new(inner.x, inner.y + i as u16, inner.width, 1);
        frame.render_widget(line, line_area);
    }

    if inner.height > 0 {
        let footer = Line::styled("Press any key to close", Style::default().fg(Color::DarkGray));
        let footer_area = Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1);
        frame.render_widget(footer, footer_area);
    }
}

fn render_error_popup(frame: &mut Frame, popup: &ErrorPopup, area: Rect) {
    let width = (area.width * 50 / 100).max(30).min(area.width);
    let msg_lines = wrap_text(&popup.message, width.saturating_sub(2) as usize);
    // blank, message, blank, hint, blank, footer
    let content_height = msg_lines.len() + 5;
    let popup_area = centered(area, 50, 30, (content_height + 2) as u16);
    frame.render_widget(Clear, popup_area);

    let block = WidgetBlock::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Red))
        .title(format!(" ! {} ", popup.title));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines: Vec<Line> = vec![Line::raw("")];
    lines.extend(
        msg_lines
            .into_iter()
            .map(|l| Line::styled(l, Style::default().fg(Color::White))),
    );
    lines.push(Line::raw(""));
    lines.push(Line::styled(popup.hint.clone(), Style::default().fg(Color::DarkGray)));
    lines.push(Line::raw(""));
    lines.push(Line::styled("Press any key to close", Style::default().fg(Color::DarkGray)));

    for (row, line) in lines.into_iter().enumerate() {
        if row as u16 >= inner.height {
            break;
        }
        frame.render_widget(line, Rect::new(inner.x, inner.y + row as u16, inner.width, 1));
    }
}

fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![text.to_string()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= max_width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_helpers::loaded_state;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn wrap_text_breaks_on_width() {
        assert_eq!(wrap_text("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap_text("", 10), vec![""]);
    }

    #[test]
    fn full_frame_renders_document() {
        let (state, _rx, _keys) = loaded_state();
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal.draw(|frame| render(frame, &state)).unwrap();

        let buf = terminal.backend().buffer();
        let rows: Vec<String> = (0..10).map(|y| test_support::row_text(buf, y)).collect();
        assert!(rows[0].contains("[doc]"));
        assert!(rows[1].contains("Untitled"));
        assert!(rows[2].contains("hello"));
        assert!(rows[9].contains("[Ctrl+q]quit"));
    }

    #[test]
    fn error_popup_is_drawn_over_document() {
        let (mut state, _rx, _keys) = loaded_state();
        state.error_popup = Some(ErrorPopup {
            title: "Command Failed".into(),
            message: "blockMerge returned error code 3".into(),
            hint: "Nothing was changed, try again".into(),
        });
        let mut terminal = Terminal::new(TestBackend::new(60, 14)).unwrap();
        terminal.draw(|frame| render(frame, &state)).unwrap();

        let buf = terminal.backend().buffer();
        let all: String = (0..14).map(|y| test_support::row_text(buf, y)).collect();
        assert!(all.contains("Command Failed"));
        assert!(all.contains("Press any key to close"));
    }
}
