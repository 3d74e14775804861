//! Error types for icsreply.

use thiserror::Error;

/// Errors that can occur while reading an invitation or building a reply.
#[derive(Error, Debug)]
pub enum ReplyError {
    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("ICS generation error: {0}")]
    IcsGenerate(String),

    #[error("Seems like you have not been invited to this event (looked for {0})")]
    NotInvited(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for icsreply operations.
pub type ReplyResult<T> = Result<T, ReplyError>;
