pub mod controller;
pub mod dom;
pub mod notifier;
pub mod scanner;

pub use controller::NotifierController;
pub use dom::{Document, Element, FrameContent, MediaElementState, ShadowRoot};
pub use notifier::{
    notifier_loop, respond_to_probe, MediaEventKind, MediaSource, NotifierExit, PageEvent,
    PageNotificationState, PageOutbox,
};
pub use scanner::{classify, scan, Playback};
