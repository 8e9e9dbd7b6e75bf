pub mod api;
pub mod editor;
pub mod error;
pub mod store;

// Convenience re-exports
pub use api::client::CommandClient;
pub use api::local::LocalBackend;
pub use api::types;
pub use editor::{CommandChannel, Editor};
pub use error::{BlockpadError, Result};
pub use store::{BlockStore, KeyedStore};
