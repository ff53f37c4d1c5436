//! Terminal confirmation prompts

use dialoguer::Confirm;
use dialoguer::theme::ColorfulTheme;
use git_integrate::error::{Error, Result};
use git_integrate::prompt::ConfirmationPort;

/// Asks the operator on the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct DialoguerPrompt;

impl ConfirmationPort for DialoguerPrompt {
    fn confirm(&self, question: &str, default: bool) -> Result<bool> {
        let theme = ColorfulTheme::default();
        Confirm::with_theme(&theme)
            .with_prompt(question)
            .default(default)
            .interact()
            .map_err(|e| Error::Prompt(e.to_string()))
    }
}
