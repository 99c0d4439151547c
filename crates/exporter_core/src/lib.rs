//! Exporter core: pure overlay state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{
    conversation_id_from_url, ExportSnapshot, OverlayState, Selection, SnippetFormat,
    MIN_SELECTION_LEN,
};
pub use update::update;
pub use view_model::{OverlayViewModel, StatusIndicator, DEFAULT_BUCKETS};
