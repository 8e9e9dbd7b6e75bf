//! Block editing engine: tree projection of a document's flat blocks, the
//! two-phase focus controller, multi-block selection, and the state machine
//! turning key presses into backend commands.

pub mod focus;
pub mod keys;
pub mod machine;
pub mod selection;
pub mod tree;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use focus::{FocusController, FocusPhase, FocusState};
pub use keys::{decide, Key, KeyAction, KeyInput, Modifiers};
pub use machine::{CommandChannel, Editor, EditorSignal, QueuedChannel, RequestId, UNTITLED};
pub use selection::Selection;
pub use tree::{build_tree, flatten, get_next_block, Direction, TreeNode};
