use crate::api::types::{Block, BlockContent, TextStyle};

pub fn para(id: &str, parent: &str, text: &str) -> Block {
    Block::new(id, parent, BlockContent::text(TextStyle::Paragraph, text))
}

pub fn title(id: &str, text: &str) -> Block {
    Block::new(id, "root", BlockContent::text(TextStyle::Title, text))
}

/// Builds a flat block list under the root `"root"`, in insertion order.
#[derive(Default)]
pub struct DocBuilder {
    blocks: Vec<Block>,
}

impl DocBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, id: &str, text: &str) -> Self {
        self.blocks.push(title(id, text));
        self
    }

    pub fn para(mut self, id: &str, text: &str) -> Self {
        self.blocks.push(para(id, "root", text));
        self
    }

    pub fn styled(mut self, id: &str, style: TextStyle, text: &str) -> Self {
        self.blocks
            .push(Block::new(id, "root", BlockContent::text(style, text)));
        self
    }

    pub fn child(mut self, id: &str, parent: &str, text: &str) -> Self {
        self.blocks.push(para(id, parent, text));
        self
    }

    pub fn div(mut self, id: &str) -> Self {
        self.blocks.push(Block::new(id, "root", BlockContent::Div));
        self
    }

    pub fn dataview(mut self, id: &str) -> Self {
        self.blocks.push(Block::new(id, "root", BlockContent::Dataview));
        self
    }

    pub fn build(self) -> Vec<Block> {
        self.blocks
    }
}
