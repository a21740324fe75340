pub mod media;
pub mod messages;
pub mod tab;

pub use media::{MediaItem, MediaKind, MediaSnapshot, MediaSummary, ReadyState};
pub use messages::{ControlRequest, ControlResponse, MediaStateChanged, PageMessage, PageRequest};
pub use tab::{TabChange, TabId, TabInfo, TabStatus, WindowId};
