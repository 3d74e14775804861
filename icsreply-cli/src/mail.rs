//! Handing the reply to an external mail client.
//!
//! The mail client (mutt by default) gets the reply as an attachment, the
//! subject and recipient on its command line, and the body on stdin. It is
//! expected to exit 0 once the message has been sent.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::ReplyConfig;

/// Everything the mail client needs to send one reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyMail {
    pub from: String,
    /// Organizer address; without one the mail client asks for it
    pub to: Option<String>,
    pub subject: String,
    pub body: String,
    pub attachment: PathBuf,
}

/// Outcome of the mail step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// The mail client exited unsuccessfully (`None` if killed by a signal)
    Failed(Option<i32>),
}

pub trait MailComposer {
    async fn compose(&self, mail: &ReplyMail) -> Result<Delivery>;
}

/// Composes replies with mutt or a mutt-compatible command.
pub struct MuttComposer {
    command: String,
    sendmail_wrapper: Option<String>,
}

impl MuttComposer {
    pub fn new(config: &ReplyConfig) -> Self {
        MuttComposer {
            command: config.mail_command.clone(),
            sendmail_wrapper: config.sendmail_wrapper.clone(),
        }
    }

    fn binary_path(&self) -> Result<PathBuf> {
        which::which(&self.command)
            .with_context(|| format!("Mail command '{}' not found in PATH", self.command))
    }

    fn args(&self, mail: &ReplyMail) -> Vec<String> {
        let mut args = vec!["-e".to_string(), format!("my_hdr From: {}", mail.from)];

        if let Some(ref wrapper) = self.sendmail_wrapper {
            let wrapper = shellexpand::tilde(wrapper);
            args.push("-e".to_string());
            args.push(format!("set sendmail='{wrapper}'"));
        }

        args.push("-a".to_string());
        args.push(mail.attachment.to_string_lossy().into_owned());
        args.push("-s".to_string());
        args.push(mail.subject.clone());

        if let Some(ref to) = mail.to {
            args.push("--".to_string());
            args.push(to.clone());
        }

        args
    }
}

impl MailComposer for MuttComposer {
    async fn compose(&self, mail: &ReplyMail) -> Result<Delivery> {
        let binary_path = self.binary_path()?;
        let args = self.args(mail);
        tracing::debug!(command = %binary_path.display(), ?args, "starting mail client");

        let mut child = Command::new(&binary_path)
            .args(&args)
            .stdin(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to spawn {}", binary_path.display()))?;

        let mut stdin = child
            .stdin
            .take()
            .context("Mail client stdin was not captured")?;
        // A client that exits without reading its body is judged by its exit status
        if let Err(e) = stdin.write_all(mail.body.as_bytes()).await {
            if e.kind() != ErrorKind::BrokenPipe {
                return Err(e.into());
            }
            tracing::debug!("mail client closed stdin early");
        }
        drop(stdin);

        let status = child.wait().await?;

        if status.success() {
            Ok(Delivery::Sent)
        } else {
            Ok(Delivery::Failed(status.code()))
        }
    }
}
