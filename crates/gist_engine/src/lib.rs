//! Gist engine: REST client, relation stores and effect execution.
mod api;
mod client;
mod content;
mod decode;
mod engine;
mod search_bus;
mod store;
mod types;

pub use api::GistApi;
pub use client::{ApiSettings, ReqwestGistApi, DEFAULT_API_VERSION, DEFAULT_BASE_URL};
pub use content::{resolve_all_files, resolve_first_files};
pub use decode::{decode_text, DecodeError, DecodedText};
pub use engine::{EngineCommand, EngineHandle};
pub use search_bus::{next_settled, SearchTermBus, DEFAULT_DEBOUNCE};
pub use store::{ForkedGist, ForkedStore, RelationEntry, RelationSet, Snapshot, StarredStore};
pub use types::{ApiError, EngineError, EngineEvent};
