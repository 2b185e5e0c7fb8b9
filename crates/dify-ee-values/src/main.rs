//! dify-ee-values - Interactive values-prd.yaml generator for Dify Enterprise Edition

mod features;
mod listing;
mod modules;
mod profile;

use clap::{Args as ClapArgs, Parser, Subcommand};
use profile::{DifyProfile, TRACKS};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use wizard_core::error::is_interrupted;
use wizard_core::{exit_code_for, ChartProfile, FeatureRegistry, WizardArgs};

#[derive(Parser, Debug)]
#[command(name = "dify-ee-values")]
#[command(about = "Interactive values-prd.yaml generator for the Dify Enterprise Edition Helm chart")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub generate: GenerateArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a values file (the default)
    Generate(GenerateArgs),
    /// List version features, optionally only those applying to a chart version
    Features {
        #[arg(short = 'c', long = "chart-version")]
        chart_version: Option<String>,
    },
    /// List release tracks and their modules
    Tracks,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Chart version to configure (asked interactively when omitted)
    #[arg(short = 'c', long = "chart-version")]
    pub chart_version: Option<String>,

    /// Use values.yaml from the current directory, never download
    #[arg(short, long)]
    pub local: bool,

    /// Download values.yaml even if a local or cached copy exists
    #[arg(short, long = "force-download")]
    pub force_download: bool,

    /// Helm chart repository URL
    #[arg(long = "repo-url", env = "DIFY_HELM_REPO_URL")]
    pub repo_url: Option<String>,

    /// Chart name inside the repository
    #[arg(long = "chart-name")]
    pub chart_name: Option<String>,

    /// Local helm alias for the repository
    #[arg(long = "repo-name")]
    pub repo_name: Option<String>,

    /// Output file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Release track, overriding the one derived from the chart version
    #[arg(long)]
    pub track: Option<String>,

    /// Accept every default (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Whether `--verbose` was given to the generator
    fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Generate(generate)) => generate.verbose,
            Some(_) => false,
            None => self.generate.verbose,
        }
    }
}

impl GenerateArgs {
    fn into_wizard_args(self, workdir: PathBuf) -> WizardArgs {
        WizardArgs {
            chart_version: self.chart_version,
            local: self.local,
            force_download: self.force_download,
            repo_url: self.repo_url,
            chart_name: self.chart_name,
            repo_name: self.repo_name,
            output: self.output,
            track: self.track,
            yes: self.yes,
            workdir,
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C outside of prompts
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(wizard_core::error::EXIT_INTERRUPTED);
    })
    .ok();

    let args = Args::parse();
    init_tracing(args.verbose());
    let profile = DifyProfile;

    let generate = match args.command {
        Some(Command::Features { chart_version }) => {
            let mut registry = FeatureRegistry::new();
            profile.register_features(&mut registry);
            for line in listing::features(&registry, chart_version.as_deref()) {
                println!("{}", line);
            }
            return ExitCode::SUCCESS;
        }
        Some(Command::Tracks) => {
            for line in listing::tracks(TRACKS) {
                println!("{}", line);
            }
            return ExitCode::SUCCESS;
        }
        Some(Command::Generate(generate)) => generate,
        None => args.generate,
    };

    let workdir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: cannot read the current directory: {}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(workdir = %workdir.display(), "starting");

    let result = wizard_core::run(&profile, generate.into_wizard_args(workdir)).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    match result {
        Ok(outcome) => {
            tracing::debug!(output = %outcome.output.display(), "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            if !is_interrupted(&e) {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::from(exit_code_for(&e) as u8)
        }
    }
}
