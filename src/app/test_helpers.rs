use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::api::local::{DataviewData, LocalBackend};
use crate::api::types::{Block, BlockContent, TextStyle};
use crate::editor::UNTITLED;
use crate::store::{Record, Relation, RelationFormat, View, ViewRelation};
use crate::keys::KeybindingMap;

use super::{finish_pass, handle_command_completed, open_document, AppMessage, AppState, TaskChannel};

pub fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

pub fn sample_blocks() -> Vec<Block> {
    vec![
        Block::new("doc-title", "doc", BlockContent::text(TextStyle::Title, UNTITLED)),
        Block::new("doc-a", "doc", BlockContent::text(TextStyle::Paragraph, "hello")),
        Block::new("doc-b", "doc", BlockContent::text(TextStyle::Paragraph, "world")),
    ]
}

/// App state on a local backend holding `sample_blocks`, with the open
/// request issued but not yet delivered.
pub fn test_state() -> (AppState, mpsc::UnboundedReceiver<AppMessage>, KeybindingMap) {
    state_with(LocalBackend::new().with_document("doc", sample_blocks()))
}

/// Like `test_state`, plus a dataview block `doc-table` holding two records.
pub fn dataview_state() -> (AppState, mpsc::UnboundedReceiver<AppMessage>, KeybindingMap) {
    let mut blocks = sample_blocks();
    blocks.push(Block::new("doc-table", "doc", BlockContent::Dataview));
    let data = DataviewData {
        relations: vec![Relation::new("name", "Name", RelationFormat::ShortText)],
        views: vec![View::new("grid", "Grid", vec![ViewRelation::new("name", true, 200)])],
        records: vec![Record::new("r1"), Record::new("r2")],
    };
    state_with(
        LocalBackend::new()
            .with_document("doc", blocks)
            .with_dataview("doc", "doc-table", data),
    )
}

fn state_with(backend: LocalBackend) -> (AppState, mpsc::UnboundedReceiver<AppMessage>, KeybindingMap) {
    let (tx, rx) = mpsc::unbounded_channel();
    let channel = TaskChannel::local(backend, &tx);
    let keys = KeybindingMap::from_preset("default", &HashMap::new()).unwrap();
    let mut state = AppState::new("doc", "local", channel, keys.hints());
    open_document(&mut state);
    (state, rx, keys)
}

pub fn loaded_state() -> (AppState, mpsc::UnboundedReceiver<AppMessage>, KeybindingMap) {
    let (mut state, mut rx, keys) = test_state();
    pump(&mut state, &mut rx);
    finish_pass(&mut state);
    (state, rx, keys)
}

/// Delivers every completion already waiting on the channel.
pub fn pump(state: &mut AppState, rx: &mut mpsc::UnboundedReceiver<AppMessage>) {
    while let Ok(msg) = rx.try_recv() {
        if let AppMessage::CommandCompleted { id, name, result } = msg {
            handle_command_completed(state, id, name, result);
        }
    }
}
