pub mod advancer;
pub mod commands;
pub mod controller;
pub mod event_loop;
pub mod probe;
pub mod state;

pub use commands::NO_ENTRIES_TODAY;
pub use controller::{Collaborators, SessionCoordinator};
pub use event_loop::{dispatch, event_loop, HostEvent};
pub use probe::{check_media_with_retry, retry_with_backoff, RetryPolicy};
pub use state::SessionState;
