mod state;
mod tasks;
pub use state::*;
pub use tasks::TaskChannel;

#[cfg(test)]
pub(crate) mod test_helpers;

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::api::client::CommandClient;
use crate::api::types::Completion;
use crate::config::AppConfig;
use crate::editor::{EditorSignal, RequestId};
use crate::error::{BlockpadError, ErrorInfo, ErrorPopup, Result};
use crate::keys::preset::Action;
use crate::keys::{to_key_input, KeybindingMap};

/// Code given to requests whose completion never arrived (network, HTTP status).
const TRANSPORT_FAILURE: i32 = -1;

pub fn open_document(state: &mut AppState) {
    state.loading = true;
    state.status_message = Some("Opening document...".into());
    state.open_request = Some(state.editor.open());
}

pub fn handle_action(state: &mut AppState, action: Action) {
    match action {
        Action::Quit => state.should_quit = true,
        Action::Help => state.show_help = true,
        Action::ClearSelection => state.editor.clear_selection(),
        Action::Reload => {
            state.editor.close(&mut state.store);
            state.dataview.clear_all();
            open_document(state);
        }
    }
}

pub fn handle_key(state: &mut AppState, key: &KeyEvent, keybindings: &KeybindingMap) {
    if state.error_popup.is_some() {
        state.error_popup = None;
        return;
    }
    if state.show_help {
        state.show_help = false;
        return;
    }
    if let Some(action) = keybindings.resolve(key) {
        handle_action(state, action);
        return;
    }
    if state.loading {
        return;
    }
    let action = state.editor.handle_key(&mut state.store, to_key_input(key));
    debug!(?action, "key handled");
}

pub fn handle_command_completed(
    state: &mut AppState,
    id: RequestId,
    name: &'static str,
    result: std::result::Result<Completion, ErrorInfo>,
) {
    let is_open = state.open_request == Some(id);
    if is_open {
        state.open_request = None;
        state.loading = false;
        state.status_message = None;
    }

    let (completion, transport_error) = match result {
        Ok(completion) => (completion, None),
        Err(info) => {
            let completion = Completion::failed(TRANSPORT_FAILURE, &format!("{:?}", info));
            (completion, Some(info))
        }
    };

    if completion.is_ok() {
        state.dataview.apply_events(&state.document, &completion.dataview);
    }

    if let Err(BlockpadError::Command { code, .. }) =
        state.editor.complete(&mut state.store, id, &completion)
    {
        let info = transport_error.unwrap_or(ErrorInfo::Command {
            name: name.to_string(),
            code,
        });
        state.error_popup = Some(ErrorPopup::from_error_info(&info));
        if is_open {
            state.status_message = Some("Could not open document".into());
        }
    }
}

/// Once per pass through the loop, before drawing.
pub fn finish_pass(state: &mut AppState) {
    state.editor.sync_focus(state.store.get_blocks(&state.document));
    for change in state.dataview.drain_changes() {
        trace!(?change, "dataview data changed");
    }
    for signal in state.editor.drain_signals() {
        match signal {
            EditorSignal::CloseMenu(menu) => {
                debug!(menu, "closing menu");
                state.show_help = false;
            }
        }
    }
}

pub async fn run(config: &AppConfig, terminal: &mut DefaultTerminal) -> Result<()> {
    let keybindings =
        KeybindingMap::from_preset(&config.keybindings.preset, &config.keybindings.bindings)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<AppMessage>();

    let document = &config.backend.document;
    let (channel, label) = if config.backend.is_local() {
        let backend = tasks::scratch_backend(document);
        (TaskChannel::local(backend, &tx), "local".to_string())
    } else {
        let client = CommandClient::new(&config.backend.url, &config.backend.token);
        (TaskChannel::remote(client, &tx), config.backend.url.clone())
    };
    info!(document = %document, backend = %label, "starting");

    let mut state = AppState::new(document, &label, channel, keybindings.hints());
    open_document(&mut state);

    // Spawn event reader task
    let event_tx = tx.clone();
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        loop {
            match reader.next().await {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if event_tx.send(AppMessage::Key(key)).is_err() {
                        break;
                    }
                }
                Some(Err(_)) => break,
                None => break,
                _ => {}
            }
        }
    });

    // Spawn tick timer
    let tick_tx = tx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(250));
        loop {
            interval.tick().await;
            if tick_tx.send(AppMessage::Tick).is_err() {
                break;
            }
        }
    });

    // Main loop
    loop {
        finish_pass(&mut state);
        terminal.draw(|frame| crate::ui::render(frame, &state))?;

        if let Some(msg) = rx.recv().await {
            match msg {
                AppMessage::Key(key) => handle_key(&mut state, &key, &keybindings),
                AppMessage::CommandCompleted { id, name, result } => {
                    handle_command_completed(&mut state, id, name, result);
                }
                AppMessage::Tick => {}
            }
        }

        if state.should_quit {
            state.editor.close(&mut state.store);
            break;
        }
    }

    Ok(())
}
