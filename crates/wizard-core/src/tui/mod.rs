//! CLI prompts using cliclack (Charm-style inline prompts)
//!
//! This module is optional and only available when the `tui` feature is enabled.

mod prompter;

pub use prompter::ClackPrompter;

use crate::error::is_interrupted;
use crate::interact::Unattended;
use crate::profile::ChartProfile;
use crate::wizard::{run_with, Outcome, WizardArgs};
use anyhow::Result;

/// Run the wizard with interactive prompts (or defaults only, with `--yes`)
pub async fn run(profile: &dyn ChartProfile, args: WizardArgs) -> Result<Outcome> {
    cliclack::intro(profile.display_name())?;

    let result = if args.yes {
        cliclack::log::info("Non-interactive mode: every question takes its default")?;
        let mut ui = Unattended::new(ClackPrompter);
        run_with(profile, &args, &mut ui).await
    } else {
        let mut ui = ClackPrompter;
        run_with(profile, &args, &mut ui).await
    };

    match &result {
        Ok(outcome) => {
            let summary = format!(
                "{} modules configured, {} version features applied",
                outcome.report.modules_run.len(),
                outcome.report.features_applied.len()
            );
            cliclack::outro(summary)?;
        }
        Err(e) if is_interrupted(e) => {
            cliclack::outro_cancel("Interrupted")?;
        }
        Err(_) => {}
    }
    restore_cursor();
    result
}

/// Make the terminal cursor visible again
pub fn restore_cursor() {
    let _ = console::Term::stderr().show_cursor();
}
