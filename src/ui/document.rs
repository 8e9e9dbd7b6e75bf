use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use crate::api::types::{Block, BlockContent, TextRange, TextStyle};
use crate::editor::{build_tree, FocusState, Selection, TreeNode};
use crate::store::{KeyedStore, Scope};

pub struct DocumentView<'a> {
    pub root_id: &'a str,
    pub blocks: &'a [Block],
    pub dataview: &'a KeyedStore,
    pub focus: Option<&'a FocusState>,
    pub selection: &'a Selection,
    pub loading: bool,
}

struct Row<'a> {
    block: &'a Block,
    depth: usize,
    marker: String,
}

fn collect_rows<'a>(nodes: &[TreeNode<'a>], depth: usize, out: &mut Vec<Row<'a>>) {
    let mut number = 0;
    for node in nodes {
        let style = node.block.style();
        number = if style == Some(TextStyle::Numbered) { number + 1 } else { 0 };
        out.push(Row {
            block: node.block,
            depth,
            marker: marker(&node.block.content, number),
        });
        collect_rows(&node.children, depth + 1, out);
    }
}

fn marker(content: &BlockContent, number: usize) -> String {
    match content {
        BlockContent::Text(t) => match t.style {
            TextStyle::Checkbox if t.checked => "[x] ".into(),
            TextStyle::Checkbox => "[ ] ".into(),
            TextStyle::Bulleted => "• ".into(),
            TextStyle::Numbered => format!("{}. ", number),
            TextStyle::Toggle => "▸ ".into(),
            TextStyle::Quote => "│ ".into(),
            _ => String::new(),
        },
        BlockContent::File(m) => format!("[file: {}]", m.name),
        BlockContent::Image(m) => format!("[image: {}]", m.name),
        BlockContent::Video(m) => format!("[video: {}]", m.name),
        BlockContent::Bookmark(b) => format!("[bookmark: {}]", b.url),
        BlockContent::Dataview => "[dataview]".into(),
        BlockContent::Relation(r) => format!("[relation: {}]", r.key),
        BlockContent::Div => "────".into(),
    }
}

/// One-line summary of a dataview block: active view, record count, visible columns.
fn dataview_summary(store: &KeyedStore, scope: &Scope) -> String {
    let views = store.get_views(scope);
    let meta = store.get_meta(scope);
    let Some(view) = views.iter().find(|v| v.id == meta.view_id).or(views.first()) else {
        return " no views".into();
    };
    let count = store.get_records(scope).len();
    let mut summary = format!(" {} · {} of {} records", view.name, count, meta.total.max(count as u64));
    let columns: Vec<&str> = view
        .visible_relations()
        .filter_map(|vr| store.get_relation(scope, &vr.relation_key))
        .map(|r| r.name.as_str())
        .collect();
    if !columns.is_empty() {
        summary.push_str(" · ");
        summary.push_str(&columns.join(", "));
    }
    summary
}

fn text_style(block: &Block) -> Style {
    match block.style() {
        Some(TextStyle::Title) => Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        Some(TextStyle::Header1 | TextStyle::Header2 | TextStyle::Header3) => {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        }
        Some(TextStyle::Description | TextStyle::Quote) => Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
        Some(TextStyle::Code) => Style::default().fg(Color::Green),
        Some(_) => Style::default().fg(Color::White),
        None => Style::default().fg(Color::DarkGray),
    }
}

/// Splits `text` around `range` so the range (or a one-cell caret) can be drawn reversed.
fn caret_spans(text: &str, range: TextRange, base: Style) -> Vec<Span<'static>> {
    let chars: Vec<char> = text.chars().collect();
    let from = range.from.min(chars.len());
    let to = range.to.min(chars.len());
    let cursor = base.add_modifier(Modifier::REVERSED);

    let before: String = chars[..from].iter().collect();
    let mut spans = vec![Span::styled(before, base)];
    if from == to {
        let at = chars.get(from).map(|c| c.to_string()).unwrap_or_else(|| " ".into());
        spans.push(Span::styled(at, cursor));
        let after: String = chars.iter().skip(from + 1).collect();
        spans.push(Span::styled(after, base));
    } else {
        let inside: String = chars[from..to].iter().collect();
        spans.push(Span::styled(inside, cursor));
        let after: String = chars[to..].iter().collect();
        spans.push(Span::styled(after, base));
    }
    spans
}

impl<'a> Widget for DocumentView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let tree = build_tree(self.root_id, self.blocks);
        let mut rows = Vec::new();
        collect_rows(&tree, 0, &mut rows);

        if rows.is_empty() {
            let msg = if self.loading { "Loading..." } else { "Empty document" };
            let line = Line::styled(msg, Style::default().fg(Color::DarkGray));
            let x = area.x + area.width.saturating_sub(msg.chars().count() as u16) / 2;
            let y = area.y + area.height / 2;
            line.render(Rect::new(x, y, area.width.min(msg.len() as u16), 1), buf);
            return;
        }

        let focused_row = self
            .focus
            .and_then(|f| rows.iter().position(|r| r.block.id == f.block_id));
        let height = area.height as usize;
        let offset = match focused_row {
            Some(i) if height > 0 && i >= height => i + 1 - height,
            _ => 0,
        };

        for (i, row) in rows.iter().skip(offset).take(height).enumerate() {
            let selected = self.selection.contains(&row.block.id);
            let mut base = text_style(row.block);
            if selected {
                base = base.bg(Color::DarkGray);
            }

            let mut spans = vec![
                Span::raw("  ".repeat(row.depth + 1)),
                Span::styled(row.marker.clone(), base.fg(Color::DarkGray)),
            ];
            match self.focus.filter(|f| f.block_id == row.block.id) {
                Some(f) if row.block.is_text() => {
                    spans.extend(caret_spans(row.block.text(), f.range, base));
                }
                _ if matches!(row.block.content, BlockContent::Dataview) => {
                    let scope = Scope::new(self.root_id, &row.block.id);
                    spans.push(Span::styled(dataview_summary(self.dataview, &scope), base));
                }
                _ => spans.push(Span::styled(row.block.text().to_string(), base)),
            }

            let line_area = Rect::new(area.x, area.y + i as u16, area.width, 1);
            Line::from(spans).render(line_area, buf);
        }
    }
}
