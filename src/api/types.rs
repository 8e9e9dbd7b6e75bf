use serde::{Deserialize, Serialize};

use crate::store::{MetaPatch, Record, Relation, RelationPatch, View, ViewPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockType {
    Text,
    File,
    Image,
    Video,
    Bookmark,
    Dataview,
    Relation,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextStyle {
    #[default]
    Paragraph,
    Title,
    Description,
    Header1,
    Header2,
    Header3,
    Quote,
    Code,
    Checkbox,
    Bulleted,
    Numbered,
    Toggle,
}

impl TextStyle {
    /// Styles that a freshly created sibling inherits when Enter is pressed at the end.
    pub fn is_list(self) -> bool {
        matches!(self, Self::Checkbox | Self::Bulleted | Self::Numbered)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    #[serde(default)]
    pub style: TextStyle,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaContent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkContent {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationContent {
    #[serde(default)]
    pub key: String,
}

/// Block payload, tagged by block type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BlockContent {
    Text(TextContent),
    File(MediaContent),
    Image(MediaContent),
    Video(MediaContent),
    Bookmark(BookmarkContent),
    Dataview,
    Relation(RelationContent),
    Div,
}

impl BlockContent {
    pub fn text(style: TextStyle, text: &str) -> Self {
        Self::Text(TextContent {
            style,
            text: text.to_string(),
            checked: false,
        })
    }

    pub fn paragraph() -> Self {
        Self::text(TextStyle::Paragraph, "")
    }

    pub fn block_type(&self) -> BlockType {
        match self {
            Self::Text(_) => BlockType::Text,
            Self::File(_) => BlockType::File,
            Self::Image(_) => BlockType::Image,
            Self::Video(_) => BlockType::Video,
            Self::Bookmark(_) => BlockType::Bookmark,
            Self::Dataview => BlockType::Dataview,
            Self::Relation(_) => BlockType::Relation,
            Self::Div => BlockType::Div,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub content: BlockContent,
}

impl Block {
    pub fn new(id: &str, parent_id: &str, content: BlockContent) -> Self {
        Self {
            id: id.to_string(),
            parent_id: Some(parent_id.to_string()),
            content,
        }
    }

    pub fn block_type(&self) -> BlockType {
        self.content.block_type()
    }

    pub fn is_text(&self) -> bool {
        self.block_type() == BlockType::Text
    }

    pub fn style(&self) -> Option<TextStyle> {
        match &self.content {
            BlockContent::Text(t) => Some(t.style),
            _ => None,
        }
    }

    /// Text of a text block; empty for every other block type.
    pub fn text(&self) -> &str {
        match &self.content {
            BlockContent::Text(t) => &t.text,
            _ => "",
        }
    }

    /// Length of `text()` in characters, the unit of every `TextRange`.
    pub fn text_len(&self) -> usize {
        self.text().chars().count()
    }

    pub fn set_text(&mut self, text: String) {
        if let BlockContent::Text(t) = &mut self.content {
            t.text = text;
        }
    }
}

/// Half-open character range inside a block's text. `from == to` is a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextRange {
    pub from: usize,
    pub to: usize,
}

impl TextRange {
    pub fn new(from: usize, to: usize) -> Self {
        Self {
            from: from.min(to),
            to: from.max(to),
        }
    }

    pub fn caret(at: usize) -> Self {
        Self { from: at, to: at }
    }

    pub fn is_caret(&self) -> bool {
        self.from == self.to
    }

    pub fn fits(&self, len: usize) -> bool {
        self.from <= self.to && self.to <= len
    }
}

// --- Commands ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockPosition {
    Before,
    After,
    Inner,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockCreateRequest {
    pub context_id: String,
    pub parent_id: String,
    pub target_id: String,
    pub position: BlockPosition,
    pub block: BlockContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSplitRequest {
    pub context_id: String,
    pub block_id: String,
    pub cursor_position: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockMergeRequest {
    pub context_id: String,
    pub first_block_id: String,
    pub second_block_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTarget {
    pub block_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockUnlinkRequest {
    pub context_id: String,
    pub targets: Vec<BlockTarget>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSetTextRequest {
    pub context_id: String,
    pub block_id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockIdRequest {
    pub block_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "request", rename_all = "camelCase")]
pub enum Command {
    BlockOpen(BlockIdRequest),
    BlockClose(BlockIdRequest),
    BlockCreate(BlockCreateRequest),
    BlockSplit(BlockSplitRequest),
    BlockMerge(BlockMergeRequest),
    BlockUnlink(BlockUnlinkRequest),
    BlockSetText(BlockSetTextRequest),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::BlockOpen(_) => "blockOpen",
            Self::BlockClose(_) => "blockClose",
            Self::BlockCreate(_) => "blockCreate",
            Self::BlockSplit(_) => "blockSplit",
            Self::BlockMerge(_) => "blockMerge",
            Self::BlockUnlink(_) => "blockUnlink",
            Self::BlockSetText(_) => "blockSetText",
        }
    }

    /// The request body alone, as sent over the wire.
    pub fn payload(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Self::BlockOpen(r) | Self::BlockClose(r) => serde_json::to_value(r),
            Self::BlockCreate(r) => serde_json::to_value(r),
            Self::BlockSplit(r) => serde_json::to_value(r),
            Self::BlockMerge(r) => serde_json::to_value(r),
            Self::BlockUnlink(r) => serde_json::to_value(r),
            Self::BlockSetText(r) => serde_json::to_value(r),
        }
    }
}

// --- Completions ---

/// Incremental change to a document's flat block collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BlockEvent {
    Set { blocks: Vec<Block> },
    Insert { index: usize, block: Block },
    Update { block: Block },
    Delete { ids: Vec<String> },
}

/// Incremental change to the database-view data of one dataview block.
/// The scope is the open document plus `block_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DataviewEvent {
    RelationsSet { block_id: String, relations: Vec<Relation> },
    RelationUpdate { block_id: String, relation: RelationPatch },
    RelationDelete { block_id: String, relation_key: String },
    ViewsSet { block_id: String, views: Vec<View> },
    ViewUpdate { block_id: String, view: ViewPatch },
    ViewDelete { block_id: String, view_id: String },
    ViewsSort { block_id: String, ids: Vec<String> },
    RecordsSet { block_id: String, records: Vec<Record> },
    /// `dir > 0` appends, anything else prepends.
    RecordAdd {
        block_id: String,
        record: Record,
        #[serde(default)]
        dir: i32,
    },
    RecordUpdate { block_id: String, record: Record },
    RecordDelete { block_id: String, record_id: String },
    MetaSet { block_id: String, meta: MetaPatch },
}

impl DataviewEvent {
    pub fn block_id(&self) -> &str {
        match self {
            Self::RelationsSet { block_id, .. }
            | Self::RelationUpdate { block_id, .. }
            | Self::RelationDelete { block_id, .. }
            | Self::ViewsSet { block_id, .. }
            | Self::ViewUpdate { block_id, .. }
            | Self::ViewDelete { block_id, .. }
            | Self::ViewsSort { block_id, .. }
            | Self::RecordsSet { block_id, .. }
            | Self::RecordAdd { block_id, .. }
            | Self::RecordUpdate { block_id, .. }
            | Self::RecordDelete { block_id, .. }
            | Self::MetaSet { block_id, .. } => block_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponseError {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub description: String,
}

/// Outcome of one issued command. A non-zero `error.code` means the backend rejected it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    #[serde(default)]
    pub error: ResponseError,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(default)]
    pub events: Vec<BlockEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dataview: Vec<DataviewEvent>,
}

impl Completion {
    pub fn ok(block_id: Option<String>, events: Vec<BlockEvent>) -> Self {
        Self {
            error: ResponseError::default(),
            block_id,
            events,
            dataview: vec![],
        }
    }

    pub fn with_dataview(mut self, events: Vec<DataviewEvent>) -> Self {
        self.dataview = events;
        self
    }

    pub fn failed(code: i32, description: &str) -> Self {
        Self {
            error: ResponseError {
                code,
                description: description.to_string(),
            },
            block_id: None,
            events: vec![],
            dataview: vec![],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.code == 0
    }
}
