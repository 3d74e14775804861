//! ICS parsing and generation.
//!
//! This module handles reading invitations and writing replies according to
//! RFC 5545 / RFC 5546.

mod generate;
mod parse;

pub use generate::generate_reply;
pub use parse::parse_invitation;
