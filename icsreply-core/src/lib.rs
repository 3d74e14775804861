//! Core of icsreply: answering iCalendar invitations.
//!
//! - `event` holds the invitation model
//! - `ics` reads invitations and writes METHOD:REPLY documents
//! - `responder` finds the user's own attendee record
//! - `reply` builds the answer

pub mod error;
pub mod event;
pub mod ics;
pub mod reply;
pub mod responder;

pub use error::{ReplyError, ReplyResult};
pub use event::*;
pub use reply::Reply;
