use crossterm::event::KeyEvent;

use crate::api::types::Completion;
use crate::editor::{Editor, RequestId};
use crate::error::{ErrorInfo, ErrorPopup};
use crate::store::{BlockStore, KeyedStore};

use super::tasks::TaskChannel;

#[derive(Debug, Clone, PartialEq)]
pub enum AppMessage {
    Key(KeyEvent),
    /// Backend answer for request `id`. `Err` means the request never got a completion.
    CommandCompleted {
        id: RequestId,
        name: &'static str,
        result: Result<Completion, ErrorInfo>,
    },
    Tick,
}

pub struct AppState {
    pub document: String,
    pub backend_label: String,
    pub store: BlockStore,
    /// Database-view data of the open document's dataview blocks.
    pub dataview: KeyedStore,
    pub editor: Editor<TaskChannel>,
    pub(super) open_request: Option<RequestId>,
    pub loading: bool,
    pub status_message: Option<String>,
    pub hints: Vec<(String, &'static str)>,
    pub should_quit: bool,
    pub show_help: bool,
    pub error_popup: Option<ErrorPopup>,
}

impl AppState {
    pub fn new(
        document: &str,
        backend_label: &str,
        channel: TaskChannel,
        hints: Vec<(String, &'static str)>,
    ) -> Self {
        Self {
            document: document.to_string(),
            backend_label: backend_label.to_string(),
            store: BlockStore::new(),
            dataview: KeyedStore::new(),
            editor: Editor::new(document, channel),
            open_request: None,
            loading: true,
            status_message: Some("Opening document...".into()),
            hints,
            should_quit: false,
            show_help: false,
            error_popup: None,
        }
    }

    pub fn blocks(&self) -> &[crate::api::types::Block] {
        self.store.get_blocks(&self.document)
    }
}
