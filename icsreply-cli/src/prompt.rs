//! Talking to the user on the terminal.

use anyhow::Result;
use dialoguer::Input;
use owo_colors::OwoColorize;

/// Line-based questions to the person running icsreply.
pub trait Terminal {
    /// Ask a question and return the raw answer.
    fn ask(&self, prompt: &str) -> Result<String>;

    /// Show a problem and wait until the user has seen it.
    fn acknowledge(&self, message: &str) -> Result<()>;
}

pub struct DialoguerTerminal;

impl Terminal for DialoguerTerminal {
    fn ask(&self, prompt: &str) -> Result<String> {
        let answer = Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(answer)
    }

    fn acknowledge(&self, message: &str) -> Result<()> {
        eprintln!("{}", message.red());
        self.ask("Press return to continue")?;
        Ok(())
    }
}
