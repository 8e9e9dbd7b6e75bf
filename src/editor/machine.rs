use std::collections::{HashMap, VecDeque};

use tracing::{debug, trace, warn};

use crate::api::types::{
    Block, BlockContent, BlockCreateRequest, BlockIdRequest, BlockMergeRequest, BlockPosition,
    BlockSetTextRequest, BlockSplitRequest, BlockTarget, BlockUnlinkRequest, Command, Completion,
    TextRange, TextStyle,
};
use crate::error::{BlockpadError, Result};
use crate::store::BlockStore;

use super::focus::{FocusController, FocusState};
use super::keys::{decide, Key, KeyAction, KeyInput};
use super::selection::Selection;
use super::tree::{build_tree, flatten, get_next_block, Direction};

pub type RequestId = u64;

/// Placeholder text a fresh document's title carries before the user types one.
pub const UNTITLED: &str = "Untitled";

/// Where commands go. The completion for `id` comes back through `Editor::complete`.
pub trait CommandChannel {
    fn issue(&mut self, id: RequestId, command: Command);
}

/// Channel that only records what was issued; the owner drains and delivers it.
#[derive(Debug, Default)]
pub struct QueuedChannel {
    queue: VecDeque<(RequestId, Command)>,
}

impl QueuedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Option<(RequestId, Command)> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl CommandChannel for QueuedChannel {
    fn issue(&mut self, id: RequestId, command: Command) {
        self.queue.push_back((id, command));
    }
}

/// Side effects the editor asks its host to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorSignal {
    CloseMenu(&'static str),
}

#[derive(Debug, Clone)]
enum FollowUp {
    Nothing,
    FocusCreated,
    FocusSplit { source_id: String },
    FocusAt { block_id: String, offset: usize },
    FocusNeighbor(Option<String>),
}

#[derive(Debug, Clone)]
struct Pending {
    name: &'static str,
    follow_up: FollowUp,
}

/// Editing state machine for one open document.
///
/// Structural commands (create, split, merge, remove) are issued through the
/// channel and only change focus once their completion reports success.
/// Block data is not owned here: callers pass the document's flat blocks (or
/// the `BlockStore` when completions must be ingested).
pub struct Editor<C: CommandChannel> {
    root_id: String,
    channel: C,
    focus: FocusController,
    selection: Selection,
    pending: HashMap<RequestId, Pending>,
    next_id: RequestId,
    signals: Vec<EditorSignal>,
}

impl<C: CommandChannel> Editor<C> {
    pub fn new(root_id: &str, channel: C) -> Self {
        Self {
            root_id: root_id.to_string(),
            channel,
            focus: FocusController::new(),
            selection: Selection::new(),
            pending: HashMap::new(),
            next_id: 1,
            signals: Vec::new(),
        }
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn focus(&self) -> &FocusController {
        &self.focus
    }

    pub fn focused(&self) -> Option<&FocusState> {
        self.focus.current()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Number of issued commands still waiting for a completion.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub fn drain_signals(&mut self) -> Vec<EditorSignal> {
        std::mem::take(&mut self.signals)
    }

    fn issue(&mut self, command: Command, follow_up: FollowUp) -> RequestId {
        let id = self.next_id;
        self.next_id += 1;
        let name = command.name();
        debug!(request_id = id, command = name, root_id = %self.root_id, "issuing command");
        self.pending.insert(id, Pending { name, follow_up });
        self.channel.issue(id, command);
        id
    }

    // --- Document lifecycle ---

    pub fn open(&mut self) -> RequestId {
        let block_id = self.root_id.clone();
        self.issue(Command::BlockOpen(BlockIdRequest { block_id }), FollowUp::Nothing)
    }

    /// Closes the document and drops its blocks from `store`. Focus and
    /// selection are reset immediately.
    pub fn close(&mut self, store: &mut BlockStore) -> RequestId {
        self.focus.clear();
        self.selection.clear();
        store.blocks_clear(&self.root_id);
        let block_id = self.root_id.clone();
        self.issue(Command::BlockClose(BlockIdRequest { block_id }), FollowUp::Nothing)
    }

    // --- Structural commands ---

    pub fn create(&mut self, anchor: &Block, direction: Direction, block: BlockContent) -> RequestId {
        let position = match direction {
            Direction::Forward => BlockPosition::After,
            Direction::Backward => BlockPosition::Before,
        };
        let request = BlockCreateRequest {
            context_id: self.root_id.clone(),
            parent_id: anchor
                .parent_id
                .clone()
                .unwrap_or_else(|| self.root_id.clone()),
            target_id: anchor.id.clone(),
            position,
            block,
        };
        self.issue(Command::BlockCreate(request), FollowUp::FocusCreated)
    }

    pub fn split(&mut self, block: &Block, at: usize) -> RequestId {
        let request = BlockSplitRequest {
            context_id: self.root_id.clone(),
            block_id: block.id.clone(),
            cursor_position: at,
        };
        let follow_up = FollowUp::FocusSplit {
            source_id: block.id.clone(),
        };
        self.issue(Command::BlockSplit(request), follow_up)
    }

    /// Merges `focused` into the previous text block. Returns `None` when there
    /// is no previous text block to merge into.
    pub fn merge(&mut self, blocks: &[Block], focused: &Block) -> Option<RequestId> {
        let Some(previous) =
            get_next_block(&self.root_id, blocks, &focused.id, Direction::Backward, Block::is_text)
        else {
            trace!(block_id = %focused.id, "nothing to merge into");
            return None;
        };
        let request = BlockMergeRequest {
            context_id: self.root_id.clone(),
            first_block_id: previous.id.clone(),
            second_block_id: focused.id.clone(),
        };
        let follow_up = FollowUp::FocusAt {
            block_id: previous.id.clone(),
            offset: previous.text_len(),
        };
        Some(self.issue(Command::BlockMerge(request), follow_up))
    }

    /// Removes the selected blocks, or `focused` when nothing is selected.
    ///
    /// The block to refocus afterwards is the text block before the first
    /// target in document order, resolved now because the targets will be gone
    /// when the completion arrives.
    pub fn remove(&mut self, blocks: &[Block], focused: Option<&Block>) -> Option<RequestId> {
        let targets: Vec<String> = if self.selection.is_empty() {
            focused.map(|b| vec![b.id.clone()]).unwrap_or_default()
        } else {
            self.selection.get().to_vec()
        };
        if targets.is_empty() {
            return None;
        }

        let tree = build_tree(&self.root_id, blocks);
        let first = flatten(&tree)
            .into_iter()
            .find(|b| targets.contains(&b.id))
            .map(|b| b.id.clone())
            .unwrap_or_else(|| targets[0].clone());
        let neighbor = get_next_block(&self.root_id, blocks, &first, Direction::Backward, |b| {
            b.is_text() && !targets.contains(&b.id)
        })
        .map(|b| b.id.clone());

        let request = BlockUnlinkRequest {
            context_id: self.root_id.clone(),
            targets: targets
                .into_iter()
                .map(|block_id| BlockTarget { block_id })
                .collect(),
        };
        Some(self.issue(Command::BlockUnlink(request), FollowUp::FocusNeighbor(neighbor)))
    }

    /// Selects every top-level block and drops focus.
    pub fn select_all(&mut self, blocks: &[Block]) {
        let tree = build_tree(&self.root_id, blocks);
        self.selection.set(tree.iter().map(|node| node.block.id.clone()));
        self.focus.clear();
        self.signals.push(EditorSignal::CloseMenu("blockContext"));
    }

    pub fn start_selection(&mut self, block_id: &str) {
        self.selection.set([block_id]);
        self.focus.clear();
        self.signals.push(EditorSignal::CloseMenu("blockContext"));
        self.signals.push(EditorSignal::CloseMenu("blockAction"));
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // --- Focus ---

    /// Stages focus; it becomes visible on the next `apply_focus`/`sync_focus`.
    pub fn focus_at(&mut self, block_id: &str, range: TextRange) {
        self.focus.set(block_id, range);
    }

    pub fn apply_focus(&mut self, blocks: &[Block]) -> bool {
        self.focus.apply(|id| text_len_of(blocks, id))
    }

    /// Focusing a single block always ends a multi-block selection.
    fn focus_now(&mut self, blocks: &[Block], block_id: &str, range: TextRange) {
        self.selection.clear();
        self.focus.set(block_id, range);
        self.apply_focus(blocks);
    }

    /// Moves focus to the next text block in `direction`. Going up lands at the
    /// end of the previous block, going down at the start of the next one.
    pub fn move_focus(&mut self, blocks: &[Block], from: &Block, direction: Direction) -> bool {
        let Some(next) = get_next_block(&self.root_id, blocks, &from.id, direction, Block::is_text)
        else {
            return false;
        };
        let caret = match direction {
            Direction::Backward => next.text_len(),
            Direction::Forward => 0,
        };
        let id = next.id.clone();
        self.focus_now(blocks, &id, TextRange::caret(caret));
        true
    }

    /// Per-render-pass focus upkeep: drops focus on a vanished block, falls back
    /// to the document title when nothing is focused or selected, then applies.
    pub fn sync_focus(&mut self, blocks: &[Block]) -> bool {
        let vanished = self
            .focus
            .current()
            .is_some_and(|f| text_len_of(blocks, &f.block_id).is_none());
        if vanished {
            trace!("focused block vanished");
            self.focus.clear();
        }

        if self.focus.current().is_none() && self.focus.pending().is_none() && self.selection.is_empty() {
            let title = blocks
                .iter()
                .find(|b| b.style() == Some(TextStyle::Title));
            if let Some(title) = title {
                let caret = if title.text() == UNTITLED { 0 } else { title.text_len() };
                self.focus.set(&title.id, TextRange::caret(caret));
            }
        }

        self.apply_focus(blocks) || vanished
    }

    // --- Text ---

    /// Replaces a block's text locally and sends it to the backend.
    pub fn set_text(&mut self, store: &mut BlockStore, block_id: &str, text: String) -> Option<RequestId> {
        let mut block = store.get_block(&self.root_id, block_id)?.clone();
        if !block.is_text() {
            return None;
        }
        block.set_text(text.clone());
        store.block_update(&self.root_id, block);
        let request = BlockSetTextRequest {
            context_id: self.root_id.clone(),
            block_id: block_id.to_string(),
            text,
        };
        Some(self.issue(Command::BlockSetText(request), FollowUp::Nothing))
    }

    /// Plain text editing inside the focused block: typing, deleting before
    /// the caret, and moving the caret left/right.
    fn edit_text(&mut self, store: &mut BlockStore, input: KeyInput) -> bool {
        let Some(state) = self.focus.current().cloned() else {
            return false;
        };
        let Some(block) = store.get_block(&self.root_id, &state.block_id) else {
            return false;
        };
        let text = block.text().to_string();
        let len = block.text_len();
        let range = state.range;

        match input.key {
            // First press selects the block's text; a second one reaches select-all.
            Key::Char('a') | Key::Char('A') if input.modifiers.command() => {
                self.focus.replace_range(TextRange::new(0, len));
                true
            }
            Key::Char(c) if !input.modifiers.command() => {
                let mut next = String::with_capacity(text.len() + c.len_utf8());
                next.push_str(&text[..byte_at(&text, range.from)]);
                next.push(c);
                next.push_str(&text[byte_at(&text, range.to)..]);
                self.set_text(store, &state.block_id, next);
                self.focus.replace_range(TextRange::caret(range.from + 1));
                true
            }
            Key::Backspace => {
                let start = if range.is_caret() {
                    range.from.saturating_sub(1)
                } else {
                    range.from
                };
                if start == range.to {
                    return false;
                }
                let mut next = text[..byte_at(&text, start)].to_string();
                next.push_str(&text[byte_at(&text, range.to)..]);
                self.set_text(store, &state.block_id, next);
                self.focus.replace_range(TextRange::caret(start));
                true
            }
            Key::Left => {
                let at = if range.is_caret() { range.from.saturating_sub(1) } else { range.from };
                self.focus.replace_range(TextRange::caret(at));
                true
            }
            Key::Right => {
                let at = if range.is_caret() { (range.to + 1).min(len) } else { range.to };
                self.focus.replace_range(TextRange::caret(at));
                true
            }
            _ => false,
        }
    }

    // --- Dispatch ---

    /// Runs one key press through the dispatch table and performs the result.
    /// Keys with no structural meaning fall through to text editing.
    pub fn handle_key(&mut self, store: &mut BlockStore, input: KeyInput) -> KeyAction {
        let blocks = store.get_blocks(&self.root_id);
        let focused = self
            .focus
            .current()
            .and_then(|f| blocks.iter().find(|b| b.id == f.block_id).map(|b| (b, f.range)));
        let action = decide(input, focused, &self.selection);
        let focused_block = focused.map(|(b, _)| b.clone());

        match &action {
            KeyAction::None => {
                self.edit_text(store, input);
            }
            KeyAction::Merge => {
                if let Some(block) = &focused_block {
                    self.merge(blocks, block);
                }
            }
            KeyAction::Remove => {
                self.remove(blocks, focused_block.as_ref());
            }
            KeyAction::Create { style } => {
                if let Some(block) = &focused_block {
                    self.create(block, Direction::Forward, BlockContent::text(*style, ""));
                }
            }
            KeyAction::Split { at } => {
                if let Some(block) = &focused_block {
                    self.split(block, *at);
                }
            }
            KeyAction::Move(direction) => {
                if let Some(block) = &focused_block {
                    self.move_focus(blocks, block, *direction);
                }
            }
            KeyAction::StartSelection => {
                if let Some(block) = &focused_block {
                    self.start_selection(&block.id);
                }
            }
            KeyAction::SelectAll => {
                self.select_all(blocks);
            }
        }
        action
    }

    // --- Completions ---

    /// Delivers the completion of request `id`.
    ///
    /// On success the completion's events are ingested into `store` and focus
    /// is resolved against the resulting blocks. A failed completion changes
    /// nothing and comes back as `BlockpadError::Command`. Unknown ids are ignored.
    pub fn complete(&mut self, store: &mut BlockStore, id: RequestId, completion: &Completion) -> Result<()> {
        let Some(pending) = self.pending.remove(&id) else {
            trace!(request_id = id, "completion for unknown request ignored");
            return Ok(());
        };

        if !completion.is_ok() {
            warn!(
                request_id = id,
                command = pending.name,
                code = completion.error.code,
                description = %completion.error.description,
                "command failed"
            );
            return Err(BlockpadError::Command {
                code: completion.error.code,
                description: completion.error.description.clone(),
            });
        }

        debug!(request_id = id, command = pending.name, events = completion.events.len(), "command completed");
        store.apply_events(&self.root_id, &completion.events);
        let blocks = store.get_blocks(&self.root_id);

        match pending.follow_up {
            FollowUp::Nothing => {}
            FollowUp::FocusCreated => {
                if let Some(new_id) = &completion.block_id {
                    self.focus_now(blocks, new_id, TextRange::caret(0));
                }
            }
            FollowUp::FocusSplit { source_id } => {
                let target = completion.block_id.clone().or_else(|| {
                    get_next_block(&self.root_id, blocks, &source_id, Direction::Forward, Block::is_text)
                        .map(|b| b.id.clone())
                });
                if let Some(target) = target {
                    self.focus_now(blocks, &target, TextRange::caret(0));
                }
            }
            FollowUp::FocusAt { block_id, offset } => {
                self.focus_now(blocks, &block_id, TextRange::caret(offset));
            }
            FollowUp::FocusNeighbor(neighbor) => match neighbor {
                Some(block_id) => self.focus_now(blocks, &block_id, TextRange::caret(0)),
                None => {
                    self.selection.clear();
                    self.focus.clear();
                }
            },
        }
        Ok(())
    }
}

fn text_len_of(blocks: &[Block], id: &str) -> Option<usize> {
    blocks.iter().find(|b| b.id == id).map(Block::text_len)
}

/// Byte index of the `chars`-th character, or the end of the string.
fn byte_at(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}
