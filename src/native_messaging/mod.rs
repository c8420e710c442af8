//! Browser-side channel: length-prefixed JSON frames on stdin/stdout.
//!
//! ```text
//! [u32 LE length] [length bytes of UTF-8 JSON]
//! ```
//!
//! - `frame`: the framing codec shared by both directions
//! - `event`: frames from the extension (tab updates)
//! - `action`: frames to the extension (tab activation)
//! - `receiver`: background task feeding decoded events to the dispatcher

mod action;
mod event;
mod frame;
mod receiver;

pub use action::{Action, ActionSink};
pub use event::Event;
#[cfg(test)]
pub use event::UpdatedEvent;
pub use receiver::spawn_event_receiver;
