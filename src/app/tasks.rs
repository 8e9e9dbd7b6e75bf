use tokio::sync::mpsc;

use crate::api::client::CommandClient;
use crate::api::local::{DataviewData, LocalBackend};
use crate::api::types::{Block, BlockContent, Command, TextStyle};
use crate::editor::{CommandChannel, RequestId};
use crate::error::ErrorInfo;
use crate::store::{Record, Relation, RelationFormat, View, ViewRelation};

use super::state::AppMessage;

enum Backend {
    /// Commands queue up for one worker task, so completions come back in issue order.
    Remote(mpsc::UnboundedSender<(RequestId, Command)>),
    Local(LocalBackend),
}

/// Command channel of the running app: every completion lands on the main
/// loop as `AppMessage::CommandCompleted`.
pub struct TaskChannel {
    backend: Backend,
    tx: mpsc::UnboundedSender<AppMessage>,
}

impl TaskChannel {
    /// Must be called from within the tokio runtime.
    pub fn remote(client: CommandClient, tx: &mpsc::UnboundedSender<AppMessage>) -> Self {
        Self {
            backend: Backend::Remote(spawn_command_worker(client, tx)),
            tx: tx.clone(),
        }
    }

    pub fn local(backend: LocalBackend, tx: &mpsc::UnboundedSender<AppMessage>) -> Self {
        Self {
            backend: Backend::Local(backend),
            tx: tx.clone(),
        }
    }
}

impl CommandChannel for TaskChannel {
    fn issue(&mut self, id: RequestId, command: Command) {
        match &mut self.backend {
            Backend::Remote(queue) => {
                let name = command.name();
                if queue.send((id, command)).is_err() {
                    let _ = self.tx.send(AppMessage::CommandCompleted {
                        id,
                        name,
                        result: Err(ErrorInfo::Network("command worker stopped".into())),
                    });
                }
            }
            Backend::Local(local) => {
                let completion = local.execute(&command);
                let _ = self.tx.send(AppMessage::CommandCompleted {
                    id,
                    name: command.name(),
                    result: Ok(completion),
                });
            }
        }
    }
}

fn spawn_command_worker(
    client: CommandClient,
    tx: &mpsc::UnboundedSender<AppMessage>,
) -> mpsc::UnboundedSender<(RequestId, Command)> {
    let (queue_tx, mut queue_rx) = mpsc::unbounded_channel::<(RequestId, Command)>();
    let tx_clone = tx.clone();
    tokio::spawn(async move {
        while let Some((id, command)) = queue_rx.recv().await {
            let result = client
                .call(&command)
                .await
                .map_err(|e| ErrorInfo::from_blockpad_error(&e));
            let msg = AppMessage::CommandCompleted {
                id,
                name: command.name(),
                result,
            };
            if tx_clone.send(msg).is_err() {
                break;
            }
        }
    });
    queue_tx
}

/// Document the local backend starts with.
pub(super) fn scratch_document(root_id: &str) -> Vec<Block> {
    let text = |id: &str, style: TextStyle, body: &str| {
        Block::new(&format!("{root_id}-{id}"), root_id, BlockContent::text(style, body))
    };
    vec![
        text("title", TextStyle::Title, crate::editor::UNTITLED),
        text("intro", TextStyle::Paragraph, "Type to edit. Enter splits a block, Backspace at the start merges it up."),
        text("list-1", TextStyle::Checkbox, "Select everything with Ctrl+A twice"),
        text("list-2", TextStyle::Checkbox, "Shift+Up starts a block selection"),
        text("quote", TextStyle::Quote, "Changes are kept until the app exits."),
        Block::new(&format!("{root_id}-tasks"), root_id, BlockContent::Dataview),
    ]
}

/// Local backend serving the scratch document and the rows of its task table.
pub(super) fn scratch_backend(root_id: &str) -> LocalBackend {
    let task = |id: &str, name: &str, done: bool| {
        Record::new(id)
            .with_field("name", serde_json::Value::from(name))
            .with_field("done", serde_json::Value::from(done))
    };
    let tasks = DataviewData {
        relations: vec![
            Relation::new("name", "Task", RelationFormat::ShortText),
            Relation::new("done", "Done", RelationFormat::Checkbox),
        ],
        views: vec![View::new(
            "all",
            "All tasks",
            vec![
                ViewRelation::new("name", true, 200),
                ViewRelation::new("done", true, 60),
            ],
        )],
        records: vec![
            task("t1", "Write the outline", true),
            task("t2", "Fill in the sections", false),
            task("t3", "Proofread", false),
        ],
    };
    LocalBackend::new()
        .with_document(root_id, scratch_document(root_id))
        .with_dataview(root_id, &format!("{root_id}-tasks"), tasks)
}
