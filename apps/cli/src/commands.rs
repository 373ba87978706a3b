//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

use plugindocs_core::pipeline::{
    BuildConfig, BuildReport, ProgressReporter, build_docs, load_raw_records,
    normalize_and_render,
};
use plugindocs_shared::{AppConfig, DocsBuildError, init_config, load_config};

/// Exit status when the mandatory base artifact cannot be acquired.
const EXIT_MANDATORY_ARTIFACT: i32 = 3;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// plugindocs — build documentation pages for plugin collections.
#[derive(Parser)]
#[command(
    name = "plugindocs",
    version,
    about = "Build one documentation page per plugin from released collection artifacts.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the full build: acquire, install, extract, normalize, render.
    Build {
        /// Dependency descriptor naming the base version and collections.
        #[arg(long)]
        deps_file: PathBuf,

        /// Destination directory for rendered pages (defaults from config).
        #[arg(short, long)]
        dest: Option<PathBuf>,

        /// Artifact registry base URL (defaults from config).
        #[arg(long)]
        registry: Option<String>,

        /// Keep downloads/installs in this directory instead of a
        /// temporary one.
        #[arg(long)]
        work_dir: Option<PathBuf>,

        /// Also dump the extracted raw records to this JSON file.
        #[arg(long)]
        dump_raw: Option<PathBuf>,
    },

    /// Re-render pages from a raw-record dump, skipping acquisition.
    RenderDump {
        /// Raw-record dump produced by `build --dump-raw`.
        #[arg(long)]
        input: PathBuf,

        /// Destination directory for rendered pages.
        #[arg(short, long)]
        dest: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "plugindocs=info",
        1 => "plugindocs=debug",
        _ => "plugindocs=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build {
            deps_file,
            dest,
            registry,
            work_dir,
            dump_raw,
        } => cmd_build(deps_file, dest, registry.as_deref(), work_dir, dump_raw).await,
        Command::RenderDump { input, dest } => cmd_render_dump(&input, dest).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

async fn cmd_build(
    deps_file: PathBuf,
    dest: Option<PathBuf>,
    registry: Option<&str>,
    work_dir: Option<PathBuf>,
    dump_raw: Option<PathBuf>,
) -> Result<()> {
    let config = load_config()?;

    let registry_url = registry.unwrap_or(&config.registry.url);
    let registry = Url::parse(registry_url)
        .map_err(|e| eyre!("invalid registry URL '{registry_url}': {e}"))?;

    let dest_dir = dest.unwrap_or_else(|| PathBuf::from(&config.defaults.dest_dir));

    let build_config = BuildConfig {
        deps_file,
        dest_dir: dest_dir.clone(),
        registry,
        work_dir,
        dump_raw,
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    info!(
        deps_file = %build_config.deps_file.display(),
        dest = %dest_dir.display(),
        "starting docs build"
    );

    let reporter = CliProgress::new();
    let report = match build_docs(&build_config, &reporter).await {
        Ok(report) => report,
        Err(DocsBuildError::MandatoryArtifactUnavailable) => {
            reporter.spinner.finish_and_clear();
            eprintln!("error: the mandatory base artifact did not download successfully");
            std::process::exit(EXIT_MANDATORY_ARTIFACT);
        }
        Err(err) => return Err(err.into()),
    };

    print_report(&report, &dest_dir);
    Ok(())
}

async fn cmd_render_dump(input: &PathBuf, dest: PathBuf) -> Result<()> {
    info!(input = %input.display(), dest = %dest.display(), "rendering from dump");

    let raw = load_raw_records(input)?;
    let reporter = CliProgress::new();
    let report = normalize_and_render(&raw, &dest, &reporter).await?;
    reporter.done(&report);

    print_report(&report, &dest);
    Ok(())
}

fn print_report(report: &BuildReport, dest_dir: &std::path::Path) {
    println!();
    println!("  Documentation build finished!");
    println!("  Plugins:     {}", report.plugin_count);
    println!("  Pages:       {}", report.files_written);
    println!("  Diagnostics: {}", report.diagnostic_count);
    println!("  Dest:        {}", dest_dir.display());
    println!("  Time:        {:.1}s", report.elapsed.as_secs_f64());
    if !report.render_failures.is_empty() {
        println!();
        println!("  {} page(s) failed to write:", report.render_failures.len());
        for failure in &report.render_failures {
            println!("    {}: {}", failure.identity, failure.message);
        }
    }
    println!();
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn stage(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _report: &BuildReport) {
        self.spinner.finish_and_clear();
    }
}
