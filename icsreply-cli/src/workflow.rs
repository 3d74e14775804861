//! Deciding on an answer and sending it.

use anyhow::{Context, Result};
use icsreply_core::ics::generate_reply;
use icsreply_core::responder::find_responder;
use icsreply_core::{Invitation, Reply, Response};

use crate::mail::{Delivery, MailComposer, ReplyMail};
use crate::prompt::Terminal;

const REPLY_FILE_NAME: &str = "event-reply.ics";

/// What the user wants to do with an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Unset,
    Accepted,
    Declined,
    Tentative,
    Aborted,
}

impl Decision {
    /// Map an interactive answer (y/n/t/q, any case).
    pub fn from_answer(answer: &str) -> Option<Self> {
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" => Some(Decision::Accepted),
            "n" => Some(Decision::Declined),
            "t" => Some(Decision::Tentative),
            "q" => Some(Decision::Aborted),
            _ => None,
        }
    }

    /// The answer to send, `None` if nothing should be sent.
    pub fn response(self) -> Option<Response> {
        match self {
            Decision::Accepted => Some(Response::Accepted),
            Decision::Declined => Some(Response::Declined),
            Decision::Tentative => Some(Response::Tentative),
            Decision::Unset | Decision::Aborted => None,
        }
    }
}

/// Ask until the user gives a usable answer.
pub fn prompt_decision(terminal: &impl Terminal) -> Result<Decision> {
    loop {
        let answer = terminal.ask("Accept invitation? [y/n/t/q]")?;
        if let Some(decision) = Decision::from_answer(&answer) {
            return Ok(decision);
        }
    }
}

/// Sends replies for one user through a mail composer.
pub struct Workflow<'a, C, T> {
    addresses: &'a [String],
    composer: &'a C,
    terminal: &'a T,
}

impl<'a, C: MailComposer, T: Terminal> Workflow<'a, C, T> {
    pub fn new(addresses: &'a [String], composer: &'a C, terminal: &'a T) -> Self {
        Workflow {
            addresses,
            composer,
            terminal,
        }
    }

    /// Build the reply, stage it in a temporary directory and hand it to the mail client.
    ///
    /// Fails with `ReplyError::NotInvited` before anything is written when
    /// none of our addresses is on the attendee list. A mail client that
    /// exits unsuccessfully is reported and acknowledged, not an error.
    pub async fn respond(&self, invitation: &Invitation, response: Response) -> Result<Delivery> {
        let responder = find_responder(&invitation.attendees, self.addresses)?;
        let from = responder.email().to_string();

        let reply = Reply::build(invitation, responder, response);
        let ics = generate_reply(&reply)?;

        // Removed with its contents when dropped, on every path below
        let staging = tempfile::Builder::new()
            .prefix("icsreply-")
            .tempdir()
            .context("Could not create temporary directory")?;
        let attachment = staging.path().join(REPLY_FILE_NAME);
        std::fs::write(&attachment, ics)
            .with_context(|| format!("Could not write {}", attachment.display()))?;
        tracing::debug!(path = %attachment.display(), "staged reply");

        let mail = ReplyMail {
            subject: format!("{}: {}", response.label(), invitation.summary),
            body: format!(
                "From: {from}\n\n{from} has {}",
                response.label().to_lowercase()
            ),
            to: invitation.organizer_email().map(String::from),
            from,
            attachment,
        };

        let delivery = self.composer.compose(&mail).await?;

        if let Delivery::Failed(code) = delivery {
            let code = code.map_or_else(|| "a signal".to_string(), |c| c.to_string());
            self.terminal.acknowledge(&format!(
                "Unable to send reply, mail client exited with {code}"
            ))?;
        }

        Ok(delivery)
    }
}
