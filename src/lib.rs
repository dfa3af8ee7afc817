//! Incremental-search suggestion engine: debounced remote or static lookups,
//! per-term caching with stale-response suppression, selection tracking and
//! keyboard navigation over the filtered candidate list. Rendering is left to
//! the embedding view layer, which observes [`EngineState`] snapshots.

pub mod config;
pub mod constants;
pub mod errors;
pub mod managers;
pub mod services;
pub mod utils;

pub use config::EngineConfig;
pub use errors::{EngineError, EngineErrorKind};
pub use managers::engine::{Engine, EngineState, NavEffect};
pub use managers::navigation::{Key, Navigation};
pub use services::http::{HttpSuggestClient, SuggestClient};
