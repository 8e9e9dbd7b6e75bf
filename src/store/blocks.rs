use std::collections::HashMap;

use crate::api::types::{Block, BlockEvent};

/// Flat, parent-referencing block collections, one per open document root.
///
/// This is the single source of truth for a document's shape; the tree is
/// always derived from it (see `editor::tree`).
#[derive(Debug, Default, Clone)]
pub struct BlockStore {
    blocks: HashMap<String, Vec<Block>>,
}

impl BlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_blocks(&self, root_id: &str) -> &[Block] {
        self.blocks.get(root_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get_block(&self, root_id: &str, id: &str) -> Option<&Block> {
        self.get_blocks(root_id).iter().find(|b| b.id == id)
    }

    pub fn position(&self, root_id: &str, id: &str) -> Option<usize> {
        self.get_blocks(root_id).iter().position(|b| b.id == id)
    }

    /// Replaces the whole collection for `root_id`.
    pub fn blocks_set(&mut self, root_id: &str, list: Vec<Block>) {
        self.blocks.insert(root_id.to_string(), list);
    }

    pub fn blocks_clear(&mut self, root_id: &str) {
        self.blocks.remove(root_id);
    }

    /// Inserts `block` at `index` (clamped), or updates it in place if the id is already present.
    pub fn block_insert(&mut self, root_id: &str, index: usize, block: Block) {
        let list = self.blocks.entry(root_id.to_string()).or_default();
        if let Some(existing) = list.iter_mut().find(|b| b.id == block.id) {
            *existing = block;
            return;
        }
        let index = index.min(list.len());
        list.insert(index, block);
    }

    pub fn block_add(&mut self, root_id: &str, block: Block) {
        self.block_insert(root_id, usize::MAX, block);
    }

    /// Replaces a block by id. Missing ids are ignored: updates can race with deletions.
    pub fn block_update(&mut self, root_id: &str, block: Block) -> bool {
        let Some(list) = self.blocks.get_mut(root_id) else {
            return false;
        };
        match list.iter_mut().find(|b| b.id == block.id) {
            Some(existing) => {
                *existing = block;
                true
            }
            None => {
                tracing::trace!(block_id = %block.id, "update for unknown block ignored");
                false
            }
        }
    }

    pub fn block_delete(&mut self, root_id: &str, id: &str) -> bool {
        let Some(list) = self.blocks.get_mut(root_id) else {
            return false;
        };
        let before = list.len();
        list.retain(|b| b.id != id);
        list.len() != before
    }

    pub fn apply_event(&mut self, root_id: &str, event: &BlockEvent) {
        match event {
            BlockEvent::Set { blocks } => self.blocks_set(root_id, blocks.clone()),
            BlockEvent::Insert { index, block } => self.block_insert(root_id, *index, block.clone()),
            BlockEvent::Update { block } => {
                self.block_update(root_id, block.clone());
            }
            BlockEvent::Delete { ids } => {
                for id in ids {
                    self.block_delete(root_id, id);
                }
            }
        }
    }

    pub fn apply_events(&mut self, root_id: &str, events: &[BlockEvent]) {
        for event in events {
            self.apply_event(root_id, event);
        }
    }
}
