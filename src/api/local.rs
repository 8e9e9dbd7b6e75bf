use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::api::types::{
    Block, BlockContent, BlockCreateRequest, BlockEvent, BlockMergeRequest, BlockPosition,
    BlockSetTextRequest, BlockSplitRequest, BlockType, BlockUnlinkRequest, Command, Completion,
    DataviewEvent,
};
use crate::store::{BlockStore, MetaPatch, Record, Relation, Scope, View};

pub const ERR_NOT_FOUND: i32 = 2;
pub const ERR_BAD_INPUT: i32 = 3;

/// In-memory backend that executes commands against its own documents and
/// answers the way a remote backend would: a completion carrying the block
/// events the caller must apply to stay in sync.
#[derive(Debug, Default)]
pub struct LocalBackend {
    docs: BlockStore,
    dataviews: HashMap<Scope, DataviewData>,
    seq: u64,
}

/// Database-view contents served for one dataview block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataviewData {
    pub relations: Vec<Relation>,
    pub views: Vec<View>,
    pub records: Vec<Record>,
}

impl DataviewData {
    /// Full snapshot of this block, as sent when its document is opened.
    fn snapshot(&self, block_id: &str) -> Vec<DataviewEvent> {
        let block_id = block_id.to_string();
        let meta = MetaPatch {
            total: Some(self.records.len() as i64),
            offset: Some(0),
            view_id: self.views.first().map(|v| v.id.clone()),
            keys: None,
        };
        vec![
            DataviewEvent::RelationsSet {
                block_id: block_id.clone(),
                relations: self.relations.clone(),
            },
            DataviewEvent::ViewsSet {
                block_id: block_id.clone(),
                views: self.views.clone(),
            },
            DataviewEvent::RecordsSet {
                block_id: block_id.clone(),
                records: self.records.clone(),
            },
            DataviewEvent::MetaSet { block_id, meta },
        ]
    }
}

impl LocalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, root_id: &str, blocks: Vec<Block>) -> Self {
        self.docs.blocks_set(root_id, blocks);
        self
    }

    pub fn with_dataview(mut self, root_id: &str, block_id: &str, data: DataviewData) -> Self {
        self.dataviews.insert(Scope::new(root_id, block_id), data);
        self
    }

    pub fn document(&self, root_id: &str) -> &[Block] {
        self.docs.get_blocks(root_id)
    }

    fn next_id(&mut self) -> String {
        self.seq += 1;
        format!("local-{}", self.seq)
    }

    pub fn execute(&mut self, command: &Command) -> Completion {
        debug!(command = command.name(), "local backend executing");
        match command {
            Command::BlockOpen(req) => self.open(&req.block_id),
            Command::BlockClose(_) => Completion::ok(None, vec![]),
            Command::BlockCreate(req) => self.create(req),
            Command::BlockSplit(req) => self.split(req),
            Command::BlockMerge(req) => self.merge(req),
            Command::BlockUnlink(req) => self.unlink(req),
            Command::BlockSetText(req) => self.set_text(req),
        }
    }

    fn open(&self, root_id: &str) -> Completion {
        let blocks = self.docs.get_blocks(root_id);
        if blocks.is_empty() {
            return Completion::failed(ERR_NOT_FOUND, "document not found");
        }
        let dataview: Vec<DataviewEvent> = blocks
            .iter()
            .filter(|b| b.block_type() == BlockType::Dataview)
            .filter_map(|b| {
                self.dataviews
                    .get(&Scope::new(root_id, &b.id))
                    .map(|data| data.snapshot(&b.id))
            })
            .flatten()
            .collect();
        Completion::ok(
            None,
            vec![BlockEvent::Set {
                blocks: blocks.to_vec(),
            }],
        )
        .with_dataview(dataview)
    }

    fn create(&mut self, req: &BlockCreateRequest) -> Completion {
        let root = req.context_id.as_str();
        let Some(pos) = self.docs.position(root, &req.target_id) else {
            return Completion::failed(ERR_NOT_FOUND, "target block not found");
        };
        let target_parent = self.docs.get_blocks(root)[pos]
            .parent_id
            .clone()
            .unwrap_or_else(|| req.parent_id.clone());

        let (parent, index) = match req.position {
            BlockPosition::After => (target_parent, pos + 1),
            BlockPosition::Before => (target_parent, pos),
            BlockPosition::Inner => (req.target_id.clone(), self.docs.get_blocks(root).len()),
        };
        let id = self.next_id();
        let block = Block::new(&id, &parent, req.block.clone());
        self.docs.block_insert(root, index, block.clone());

        Completion::ok(Some(id), vec![BlockEvent::Insert { index, block }])
    }

    fn split(&mut self, req: &BlockSplitRequest) -> Completion {
        let root = req.context_id.as_str();
        let Some(pos) = self.docs.position(root, &req.block_id) else {
            return Completion::failed(ERR_NOT_FOUND, "block not found");
        };
        let mut head = self.docs.get_blocks(root)[pos].clone();
        let BlockContent::Text(content) = &head.content else {
            return Completion::failed(ERR_BAD_INPUT, "only text blocks can be split");
        };

        let at = req.cursor_position.min(head.text_len());
        let head_text: String = content.text.chars().take(at).collect();
        let tail_text: String = content.text.chars().skip(at).collect();
        let tail_content = BlockContent::text(content.style, &tail_text);
        head.set_text(head_text);

        let id = self.next_id();
        let parent = head.parent_id.clone().unwrap_or_else(|| root.to_string());
        let tail = Block::new(&id, &parent, tail_content);

        self.docs.block_update(root, head.clone());
        self.docs.block_insert(root, pos + 1, tail.clone());

        Completion::ok(
            Some(id),
            vec![
                BlockEvent::Update { block: head },
                BlockEvent::Insert {
                    index: pos + 1,
                    block: tail,
                },
            ],
        )
    }

    fn merge(&mut self, req: &BlockMergeRequest) -> Completion {
        let root = req.context_id.as_str();
        let (Some(first), Some(second)) = (
            self.docs.get_block(root, &req.first_block_id),
            self.docs.get_block(root, &req.second_block_id),
        ) else {
            return Completion::failed(ERR_NOT_FOUND, "block not found");
        };
        if !first.is_text() || !second.is_text() {
            return Completion::failed(ERR_BAD_INPUT, "only text blocks can be merged");
        }

        let mut merged = first.clone();
        merged.set_text(format!("{}{}", first.text(), second.text()));
        let children: Vec<Block> = self
            .docs
            .get_blocks(root)
            .iter()
            .filter(|b| b.parent_id.as_deref() == Some(req.second_block_id.as_str()))
            .map(|b| Block {
                parent_id: Some(req.first_block_id.clone()),
                ..b.clone()
            })
            .collect();

        let mut events = vec![BlockEvent::Update {
            block: merged.clone(),
        }];
        self.docs.block_update(root, merged);
        for child in children {
            self.docs.block_update(root, child.clone());
            events.push(BlockEvent::Update { block: child });
        }
        self.docs.block_delete(root, &req.second_block_id);
        events.push(BlockEvent::Delete {
            ids: vec![req.second_block_id.clone()],
        });

        Completion::ok(None, events)
    }

    fn unlink(&mut self, req: &BlockUnlinkRequest) -> Completion {
        let root = req.context_id.as_str();
        let blocks = self.docs.get_blocks(root);

        let mut doomed: HashSet<&str> = req
            .targets
            .iter()
            .map(|t| t.block_id.as_str())
            .filter(|id| blocks.iter().any(|b| b.id == *id))
            .collect();
        if doomed.is_empty() {
            return Completion::failed(ERR_NOT_FOUND, "no target block found");
        }
        // Descendants go with their ancestors; repeat until no new block joins.
        loop {
            let before = doomed.len();
            for block in blocks {
                if block.parent_id.as_deref().is_some_and(|p| doomed.contains(p)) {
                    doomed.insert(block.id.as_str());
                }
            }
            if doomed.len() == before {
                break;
            }
        }

        let ids: Vec<String> = blocks
            .iter()
            .filter(|b| doomed.contains(b.id.as_str()))
            .map(|b| b.id.clone())
            .collect();
        for id in &ids {
            self.docs.block_delete(root, id);
        }
        Completion::ok(None, vec![BlockEvent::Delete { ids }])
    }

    fn set_text(&mut self, req: &BlockSetTextRequest) -> Completion {
        let root = req.context_id.as_str();
        let Some(block) = self.docs.get_block(root, &req.block_id) else {
            return Completion::failed(ERR_NOT_FOUND, "block not found");
        };
        if !block.is_text() {
            return Completion::failed(ERR_BAD_INPUT, "not a text block");
        }
        let mut block = block.clone();
        block.set_text(req.text.clone());
        self.docs.block_update(root, block.clone());
        Completion::ok(None, vec![BlockEvent::Update { block }])
    }
}
