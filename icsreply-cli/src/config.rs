//! icsreply configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

static DEFAULT_MAIL_COMMAND: &str = "mutt";

fn default_mail_command() -> String {
    DEFAULT_MAIL_COMMAND.to_string()
}

/// Configuration at ~/.config/icsreply/config.toml, overridable with
/// `ICSREPLY_*` environment variables.
///
/// ```toml
/// mail_command = "neomutt"
/// sendmail_wrapper = "~/bin/ical_reply_sendmail_wrapper.sh"
/// ```
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ReplyConfig {
    /// Mail client used to compose the reply
    #[serde(default = "default_mail_command")]
    pub mail_command: String,

    /// Optional sendmail replacement passed to the mail client
    #[serde(default)]
    pub sendmail_wrapper: Option<String>,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        ReplyConfig {
            mail_command: default_mail_command(),
            sendmail_wrapper: None,
        }
    }
}

impl ReplyConfig {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("icsreply");

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(config_path)
    }

    fn load_from(config_path: PathBuf) -> Result<Self> {
        Config::builder()
            .add_source(File::from(config_path).required(false))
            .add_source(Environment::with_prefix("ICSREPLY"))
            .build()
            .context("Could not read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Apply the `-c` command line override.
    pub fn with_mail_command(mut self, command: Option<String>) -> Self {
        if let Some(command) = command {
            self.mail_command = command;
        }
        self
    }
}
