mod config;
mod mail;
mod prompt;
mod render;
mod workflow;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use icsreply_core::Invitation;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use crate::config::ReplyConfig;
use crate::mail::{Delivery, MuttComposer};
use crate::prompt::{DialoguerTerminal, Terminal};
use crate::render::Render;
use crate::workflow::{Decision, Workflow, prompt_decision};

#[derive(Parser, Debug)]
#[command(name = "icsreply")]
#[command(about = "Reply to calendar invitations from your mail client")]
#[command(after_help = "The last of -i/-a/-d/-t wins. Without any of them nothing is sent.")]
struct Cli {
    /// Your email address(es), comma separated
    #[arg(short = 'e', long = "email", value_name = "ADDRESS", value_delimiter = ',', required = true)]
    addresses: Vec<String>,

    /// Ask whether to accept
    #[arg(short, long, overrides_with_all = ["accept", "decline", "tentative"])]
    interactive: bool,

    /// Accept the invitation
    #[arg(short, long, overrides_with_all = ["interactive", "decline", "tentative"])]
    accept: bool,

    /// Decline the invitation
    #[arg(short, long, overrides_with_all = ["interactive", "accept", "tentative"])]
    decline: bool,

    /// Tentatively accept the invitation
    #[arg(short, long, overrides_with_all = ["interactive", "accept", "decline"])]
    tentative: bool,

    /// Mail command used to send the reply (default: mutt)
    #[arg(short = 'c', long = "command", value_name = "CMD")]
    mail_command: Option<String>,

    /// The invitation (.ics file)
    file: PathBuf,
}

impl Cli {
    fn decision(&self, terminal: &impl Terminal) -> Result<Decision> {
        let decision = if self.accept {
            Decision::Accepted
        } else if self.decline {
            Decision::Declined
        } else if self.tentative {
            Decision::Tentative
        } else if self.interactive {
            prompt_decision(terminal)?
        } else {
            Decision::Unset
        };
        Ok(decision)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            // Usage errors exit with 1, like every other failure
            let _ = e.print();
            std::process::exit(1);
        }
    };

    let config = ReplyConfig::load()?.with_mail_command(cli.mail_command.clone());

    let invitation = Invitation::from_file(&cli.file)
        .with_context(|| format!("Could not read invitation {}", cli.file.display()))?;
    println!("{}\n", invitation.render());

    let terminal = DialoguerTerminal;
    let Some(response) = cli.decision(&terminal)?.response() else {
        return Ok(());
    };

    let composer = MuttComposer::new(&config);
    let workflow = Workflow::new(&cli.addresses, &composer, &terminal);

    if workflow.respond(&invitation, response).await? == Delivery::Sent {
        println!("{}", format!("Sent: {}", response.label()).green());
    }

    Ok(())
}
