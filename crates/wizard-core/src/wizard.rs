//! The wizard run loop, independent of any terminal front end
//!
//! `run_with` drives one complete run against a [`Prompter`]: find the values
//! template and chart version, resolve the release track, dispatch every module
//! and its features, then write the output file.

use crate::chart::{ChartFetcher, ChartSource, ValuesOrigin, ValuesRequest};
use crate::dispatch::{DispatchReport, Dispatcher};
use crate::error::{is_interrupted, WizardError};
use crate::features::FeatureRegistry;
use crate::interact::Prompter;
use crate::profile::ChartProfile;
use crate::session::Session;
use crate::tracks::{track_by_id, track_for_version, Track};
use crate::values::{partial_path, ValuesTemplate};
use anyhow::Result;
use serde_yaml::Value;
use std::path::{Path, PathBuf};

const OVERWRITE: &str = "Overwrite";
const NEW_NAME: &str = "Enter a new file name";

/// Options for one wizard run
#[derive(Debug, Clone, Default)]
pub struct WizardArgs {
    pub chart_version: Option<String>,

    /// Use `values.yaml` from the working directory, never download
    pub local: bool,

    /// Download values even if a local or cached copy exists
    pub force_download: bool,

    pub repo_url: Option<String>,
    pub chart_name: Option<String>,
    pub repo_name: Option<String>,

    /// Output file (relative paths are resolved against `workdir`)
    pub output: Option<PathBuf>,

    /// Release track id, overriding the one derived from the chart version
    pub track: Option<String>,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,

    /// Directory holding values, cache and output files
    pub workdir: PathBuf,
}

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct Outcome {
    pub output: PathBuf,
    pub chart_version: String,
    pub track: &'static str,
    pub report: DispatchReport,
    /// Whether the template's comments and layout survived
    pub preserved: bool,
    pub chart_dir: Option<PathBuf>,
}

/// Run the wizard for `profile`, talking to the operator through `ui`
pub async fn run_with(
    profile: &dyn ChartProfile,
    args: &WizardArgs,
    ui: &mut dyn Prompter,
) -> Result<Outcome> {
    let source = ChartSource::from_profile(
        profile,
        args.repo_url.as_deref(),
        args.repo_name.as_deref(),
        args.chart_name.as_deref(),
    )?;
    let fetcher = ChartFetcher::new(profile, source, &args.workdir);

    // Step 1: Find the values template and chart version
    let request = ValuesRequest {
        chart_version: args.chart_version.as_deref(),
        local: args.local,
        force_download: args.force_download,
    };
    let resolved = fetcher.resolve_values(ui, &request).await?;
    let chart_version = resolved
        .chart_version
        .ok_or(WizardError::ChartVersionRequired)?;

    let chart_dir = if resolved.origin == ValuesOrigin::Download {
        match fetcher.extract_chart(ui, &chart_version).await {
            Ok(dir) => Some(dir),
            Err(e) if is_interrupted(&e) => return Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "chart extraction failed");
                ui.warning(&format!("Could not extract the chart: {:#}", e))?;
                None
            }
        }
    } else {
        None
    };

    // Step 2: Resolve the release track
    let track = resolve_track(profile.tracks(), args, &chart_version, ui)?;

    // Step 3: Load the template, build registry and dispatcher
    let template = ValuesTemplate::load(&resolved.path)?;
    let mut registry = FeatureRegistry::new();
    profile.register_features(&mut registry);
    let dispatcher = Dispatcher::with_handlers(&registry, profile.module_handlers());

    let plan = dispatcher.plan(track, &chart_version);
    ui.info(&format!("Chart version: {}", chart_version))?;
    ui.info(&format!("Target track: {}", track))?;
    ui.info(&format!("Modules: {}", track.modules.join(", ")))?;
    let features = plan.feature_ids();
    if !features.is_empty() {
        ui.info(&format!("Version features: {}", features.join(", ")))?;
    }

    let output = resolve_path(
        &args.workdir,
        args.output
            .as_deref()
            .unwrap_or(Path::new(profile.output_file())),
    );

    // Step 4: Dispatch
    let mut session = Session::new(template.context(chart_version.clone()), &mut *ui);
    let result = dispatcher.run(track, &mut session);
    let values = session.into_values();
    let report = match result {
        Ok(report) => report,
        Err(e) if is_interrupted(&e) => {
            return Err(interrupted(ui, &template, values.root(), &args.workdir, &output, e));
        }
        Err(e) => return Err(e),
    };

    // Step 5: Write the output file
    let output = match choose_output(ui, &args.workdir, &output) {
        Ok(output) => output,
        Err(e) if is_interrupted(&e) => {
            return Err(interrupted(ui, &template, values.root(), &args.workdir, &output, e));
        }
        Err(e) => return Err(e),
    };
    let rendered = template.save(values.root(), &output)?;
    if !rendered.preserved {
        ui.warning("Template comments could not be preserved; the file was re-serialized")?;
    }
    ui.success(&format!("Values written to {}", output.display()))?;

    // Step 6: Show next steps
    let steps = profile.next_steps(&output, chart_dir.as_deref());
    if !steps.is_empty() {
        ui.section("Next steps")?;
        for (i, step) in steps.iter().enumerate() {
            ui.info(&format!("{}. {}", i + 1, step))?;
        }
    }

    Ok(Outcome {
        output,
        chart_version,
        track: track.id,
        report,
        preserved: rendered.preserved,
        chart_dir,
    })
}

/// Track from `--track`, else from the chart version, else an operator pick
fn resolve_track(
    tracks: &'static [Track],
    args: &WizardArgs,
    chart_version: &str,
    ui: &mut dyn Prompter,
) -> Result<&'static Track> {
    if let Some(id) = args.track.as_deref() {
        return Ok(track_by_id(tracks, id)?);
    }
    if let Some(track) = track_for_version(tracks, chart_version)? {
        return Ok(track);
    }
    if args.yes {
        return Err(WizardError::UnknownTrack(chart_version.to_string()).into());
    }

    ui.warning(&format!(
        "Cannot determine the release track for chart version '{}'",
        chart_version
    ))?;
    let labels: Vec<String> = tracks.iter().map(Track::to_string).collect();
    let choices: Vec<&str> = labels.iter().map(String::as_str).collect();
    let picked = ui.select("Release track", &choices, None)?;
    tracks
        .iter()
        .zip(&labels)
        .find(|(_, label)| **label == picked)
        .map(|(track, _)| track)
        .ok_or_else(|| WizardError::UnknownTrack(chart_version.to_string()).into())
}

/// Offer to keep what was answered so far, then hand the interruption back
/// unchanged so the run still exits as interrupted
fn interrupted(
    ui: &mut dyn Prompter,
    template: &ValuesTemplate,
    values: &Value,
    workdir: &Path,
    output: &Path,
    err: anyhow::Error,
) -> anyhow::Error {
    if let Err(e) = offer_partial_save(ui, template, values, workdir, output) {
        tracing::warn!(error = %e, "partial save skipped");
    }
    err
}

fn offer_partial_save(
    ui: &mut dyn Prompter,
    template: &ValuesTemplate,
    values: &Value,
    workdir: &Path,
    output: &Path,
) -> Result<()> {
    ui.warning("Configuration interrupted")?;
    // A second Ctrl-C here means "just exit"
    if !ui.confirm("Save progress before exiting?", true).unwrap_or(false) {
        return Ok(());
    }
    let suggested = partial_path(output).display().to_string();
    let name = match ui.input("Partial values file", Some(suggested.as_str()), false) {
        Ok(name) if !name.is_empty() => name,
        _ => return Ok(()),
    };

    let partial = resolve_path(workdir, Path::new(&name));
    match template.save(values, &partial) {
        Ok(_) => ui.success(&format!("Partial values written to {}", partial.display())),
        Err(e) => {
            tracing::warn!(error = %e, path = %partial.display(), "partial save failed");
            ui.error(&format!("Could not save partial values: {:#}", e))
        }
    }
}

/// Ask before replacing an existing output file
fn choose_output(ui: &mut dyn Prompter, workdir: &Path, output: &Path) -> Result<PathBuf> {
    let mut output = output.to_path_buf();
    while output.exists() {
        ui.warning(&format!("File already exists: {}", output.display()))?;
        let choice = ui.select(
            "What should happen to the existing file?",
            &[OVERWRITE, NEW_NAME],
            Some(OVERWRITE),
        )?;
        if choice == OVERWRITE {
            break;
        }
        let name = ui.input("Output file", None, true)?;
        output = resolve_path(workdir, Path::new(&name));
    }
    Ok(output)
}

fn resolve_path(workdir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        workdir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{exit_code_for, EXIT_INTERRUPTED, EXIT_VERSION};
    use crate::interact::{Answer, Level, ScriptedPrompter};
    use crate::profile::testing::DemoProfile;
    use std::fs;
    use tempfile::TempDir;

    const TEMPLATE: &str = "\
# Demo chart
global:
  consoleWebDomain: \"\"  # console host
plugin_connector:
  imageRepoType: docker
";

    fn workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("values.yaml"), TEMPLATE).unwrap();
        dir
    }

    fn args(dir: &TempDir, chart_version: &str) -> WizardArgs {
        WizardArgs {
            chart_version: Some(chart_version.to_string()),
            local: true,
            workdir: dir.path().to_path_buf(),
            ..Default::default()
        }
    }

    fn written(outcome: &Outcome) -> Value {
        serde_yaml::from_str(&fs::read_to_string(&outcome.output).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_full_run_applies_features() {
        let dir = workspace();
        let mut ui = ScriptedPrompter::new([
            Answer::text("console.example.com"),
            Answer::Default,
            Answer::choice("prometheus"),
        ]);
        let outcome = run_with(&DemoProfile, &args(&dir, "3.7.2"), &mut ui).await.unwrap();

        assert_eq!(outcome.track, "3.x");
        assert_eq!(outcome.report.modules_run, ["global", "plugins"]);
        assert_eq!(outcome.report.features_applied, ["plugin_metric"]);
        assert_eq!(outcome.output, dir.path().join("values-prd.yaml"));

        let values = written(&outcome);
        assert_eq!(values["global"]["consoleWebDomain"].as_str(), Some("console.example.com"));
        assert_eq!(values["plugin_manager"]["metric"]["source"].as_str(), Some("prometheus"));

        let text = fs::read_to_string(&outcome.output).unwrap();
        assert!(text.starts_with("# Demo chart"));
        assert!(text.contains("# console host"));
    }

    #[tokio::test]
    async fn test_older_chart_skips_features() {
        let dir = workspace();
        let mut ui = ScriptedPrompter::default();
        let outcome = run_with(&DemoProfile, &args(&dir, "3.6.0"), &mut ui).await.unwrap();
        assert_eq!(outcome.track, "3.x");
        assert!(outcome.report.features_applied.is_empty());
        assert!(!ui.asked("Metric source"));
        assert!(written(&outcome).get("plugin_manager").is_none());
    }

    #[tokio::test]
    async fn test_legacy_track_has_no_plugins() {
        let dir = workspace();
        let mut ui = ScriptedPrompter::default();
        let outcome = run_with(&DemoProfile, &args(&dir, "2.8.0"), &mut ui).await.unwrap();
        assert_eq!(outcome.track, "2.x");
        assert_eq!(outcome.report.modules_run, ["global"]);
        assert!(!ui.asked("Image repository"));
    }

    #[tokio::test]
    async fn test_unsupported_track_fails() {
        let dir = workspace();
        let mut ui = ScriptedPrompter::default();
        let err = run_with(&DemoProfile, &args(&dir, "4.0.0"), &mut ui).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WizardError>(),
            Some(WizardError::UnsupportedTrack { track, .. }) if track == "4.x"
        ));
        assert_eq!(exit_code_for(&err), EXIT_VERSION);
        assert!(!dir.path().join("values-prd.yaml").exists());
    }

    #[tokio::test]
    async fn test_unknown_track_is_picked_or_fails() {
        let dir = workspace();

        let mut unattended = args(&dir, "0.9.0");
        unattended.yes = true;
        let err = run_with(&DemoProfile, &unattended, &mut ScriptedPrompter::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WizardError>(),
            Some(WizardError::UnknownTrack(v)) if v == "0.9.0"
        ));

        let mut ui = ScriptedPrompter::new([Answer::choice("Demo 2.x (2.x)")]);
        let outcome = run_with(&DemoProfile, &args(&dir, "0.9.0"), &mut ui).await.unwrap();
        assert_eq!(outcome.track, "2.x");
    }

    #[tokio::test]
    async fn test_track_flag_overrides_version() {
        let dir = workspace();
        let mut args = args(&dir, "3.7.2");
        args.track = Some("2.x".to_string());
        let mut ui = ScriptedPrompter::default();
        let outcome = run_with(&DemoProfile, &args, &mut ui).await.unwrap();
        assert_eq!(outcome.track, "2.x");
        assert!(outcome.report.features_applied.is_empty());

        args.track = Some("9.x".to_string());
        let err = run_with(&DemoProfile, &args, &mut ui).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WizardError>(),
            Some(WizardError::UnknownTrack(_))
        ));
    }

    #[tokio::test]
    async fn test_existing_output_gets_new_name() {
        let dir = workspace();
        fs::write(dir.path().join("values-prd.yaml"), "keep: me\n").unwrap();
        let mut ui = ScriptedPrompter::new([
            Answer::Default,
            Answer::Default,
            Answer::choice(NEW_NAME),
            Answer::text("custom.yaml"),
        ]);
        let outcome = run_with(&DemoProfile, &args(&dir, "3.6.0"), &mut ui).await.unwrap();
        assert_eq!(outcome.output, dir.path().join("custom.yaml"));
        assert_eq!(
            fs::read_to_string(dir.path().join("values-prd.yaml")).unwrap(),
            "keep: me\n"
        );
    }

    #[tokio::test]
    async fn test_interruption_offers_partial_save() {
        let dir = workspace();
        let mut ui = ScriptedPrompter::new([Answer::Interrupt, Answer::yes(), Answer::Default]);
        let err = run_with(&DemoProfile, &args(&dir, "3.7.2"), &mut ui).await.unwrap_err();
        assert_eq!(exit_code_for(&err), EXIT_INTERRUPTED);
        assert!(ui.asked("Partial values file"));
        assert!(dir.path().join("values-prd-partial.yaml").is_file());
        assert!(!dir.path().join("values-prd.yaml").exists());
    }

    #[tokio::test]
    async fn test_interruption_at_output_choice_keeps_answers() {
        let dir = workspace();
        fs::write(dir.path().join("values-prd.yaml"), "keep: me\n").unwrap();
        let mut ui = ScriptedPrompter::new([
            Answer::text("console.example.com"),
            Answer::Default,
            Answer::Interrupt,
            Answer::yes(),
            Answer::text("draft.yaml"),
        ]);
        let err = run_with(&DemoProfile, &args(&dir, "3.6.0"), &mut ui).await.unwrap_err();
        assert_eq!(exit_code_for(&err), EXIT_INTERRUPTED);
        assert!(ui.asked("What should happen to the existing file?"));

        let draft: Value =
            serde_yaml::from_str(&fs::read_to_string(dir.path().join("draft.yaml")).unwrap()).unwrap();
        assert_eq!(draft["global"]["consoleWebDomain"].as_str(), Some("console.example.com"));
        assert_eq!(
            fs::read_to_string(dir.path().join("values-prd.yaml")).unwrap(),
            "keep: me\n"
        );
    }

    #[tokio::test]
    async fn test_failed_partial_save_still_exits_interrupted() {
        let dir = workspace();
        fs::create_dir(dir.path().join("blocked.yaml")).unwrap();
        let mut ui = ScriptedPrompter::new([
            Answer::Interrupt,
            Answer::yes(),
            Answer::text("blocked.yaml"),
        ]);
        let err = run_with(&DemoProfile, &args(&dir, "3.7.2"), &mut ui).await.unwrap_err();
        assert_eq!(exit_code_for(&err), EXIT_INTERRUPTED);
        assert_eq!(ui.messages_at(Level::Error).len(), 1);
    }

    #[tokio::test]
    async fn test_declined_partial_save_writes_nothing() {
        let dir = workspace();
        let mut ui = ScriptedPrompter::new([Answer::Interrupt, Answer::no()]);
        let err = run_with(&DemoProfile, &args(&dir, "3.7.2"), &mut ui).await.unwrap_err();
        assert!(is_interrupted(&err));
        assert!(!ui.asked("Partial values file"));
        assert!(!dir.path().join("values-prd-partial.yaml").exists());
    }
}
