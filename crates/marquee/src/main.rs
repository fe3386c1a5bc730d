use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use marquee_core::inspect::{self, DEFAULT_SAMPLE_SIZE};
use marquee_core::profiles::{DEFAULT_INPUT_PATH, DEFAULT_PROFILE};
use marquee_core::{Pipeline, PipelineSummary, ProfileRegistry};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Clean a movie CSV and derive a combined text column",
    long_about = None,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pipeline (the default when no subcommand is given)
    Run(RunArgs),
    /// Print a random sample of an already written output
    Inspect(InspectArgs),
    /// List registered profiles
    Profiles(ProfilesArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Input CSV
    #[arg(long, default_value = DEFAULT_INPUT_PATH)]
    input: PathBuf,
    /// Profile id or alias
    #[arg(long, default_value = DEFAULT_PROFILE)]
    profile: String,
    /// Override the profile's output path
    #[arg(long)]
    output: Option<PathBuf>,
    /// TOML file with extra [[profile]] tables
    #[arg(long)]
    profiles_file: Option<PathBuf>,
    /// Skip printing a sample of the output
    #[arg(long)]
    no_inspect: bool,
    /// Rows to print when inspecting
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    sample: usize,
    /// Print the run summary as JSON on stdout
    #[arg(long)]
    summary_json: bool,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Output CSV to read (defaults to the profile's output path)
    #[arg(long)]
    path: Option<PathBuf>,
    /// Profile id or alias used to find the default path
    #[arg(long, default_value = DEFAULT_PROFILE)]
    profile: String,
    /// TOML file with extra [[profile]] tables
    #[arg(long)]
    profiles_file: Option<PathBuf>,
    /// Rows to print
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    sample: usize,
}

#[derive(Args, Debug)]
struct ProfilesArgs {
    /// TOML file with extra [[profile]] tables
    #[arg(long)]
    profiles_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Some(Command::Run(args)) => handle_run(args),
        Some(Command::Inspect(args)) => handle_inspect(args),
        Some(Command::Profiles(args)) => handle_profiles(args),
        None => handle_run(cli.run),
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_registry(profiles_file: Option<&PathBuf>) -> Result<ProfileRegistry> {
    let mut registry = ProfileRegistry::builtin();
    if let Some(path) = profiles_file {
        registry
            .merge_file(path)
            .with_context(|| format!("failed to load profiles from {}", path.display()))?;
        info!(path = %path.display(), "loaded profile overrides");
    }
    Ok(registry)
}

fn handle_run(args: RunArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_and_report(&args, &mut out)?;
    Ok(())
}

/// Runs the pipeline, then writes the optional JSON summary and sample to
/// `out`. A failed sample is logged and does not fail the run.
fn run_and_report<W: Write>(args: &RunArgs, out: &mut W) -> Result<PipelineSummary> {
    let registry = load_registry(args.profiles_file.as_ref())?;
    let profile = registry.resolve(&args.profile)?.clone();

    let mut pipeline = Pipeline::new(args.input.clone(), profile);
    if let Some(output) = &args.output {
        pipeline = pipeline.with_output(output);
    }

    let summary = pipeline
        .run()
        .with_context(|| format!("pipeline failed for {}", args.input.display()))?;
    info!(
        rows_loaded = summary.rows_loaded,
        rows_written = summary.rows_written,
        output = %summary.output_path.display(),
        "pipeline finished"
    );

    if args.summary_json {
        writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
    }

    if !args.no_inspect {
        let text_column = &pipeline.profile().text_column;
        let mut rng = rand::rng();
        if let Err(err) =
            inspect::print_sample(pipeline.output_path(), args.sample, text_column, &mut rng, out)
        {
            warn!(error = %err, "sample inspection failed");
        }
    }

    Ok(summary)
}

fn handle_inspect(args: InspectArgs) -> Result<()> {
    let registry = load_registry(args.profiles_file.as_ref())?;
    let profile = registry.resolve(&args.profile)?;
    let path = args.path.unwrap_or_else(|| profile.output_path.clone());

    print_sample(&path, args.sample, &profile.text_column)
        .with_context(|| format!("failed to inspect {}", path.display()))?;
    Ok(())
}

fn handle_profiles(args: ProfilesArgs) -> Result<()> {
    let registry = load_registry(args.profiles_file.as_ref())?;
    for profile in registry.profiles() {
        let aliases = if profile.aliases.is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", profile.aliases.join(", "))
        };
        println!("{}{}", profile.id, aliases);
        if !profile.description.is_empty() {
            println!("  {}", profile.description);
        }
        println!("  output: {}", profile.output_path.display());
        println!("  drops: {}", profile.columns_to_drop.join(", "));
        println!("  parses: {}", profile.structured_fields.join(", "));
        println!(
            "  text: {} -> {}",
            profile.text_fields.join(", "),
            profile.text_column
        );
    }
    Ok(())
}

fn print_sample(path: &Path, sample: usize, text_column: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut rng = rand::rng();
    inspect::print_sample(path, sample, text_column, &mut rng, &mut out)?;
    Ok(())
}
