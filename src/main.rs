use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{ArgAction, Parser, Subcommand};

use claude_plugin_lint::config::{ConfigBuilder, LintSettings, MemoryConfigProvider, OutputFormat};
use claude_plugin_lint::observability::init_tracing_subscriber;
use claude_plugin_lint::{LintReport, PluginLinter};

const EXIT_VIOLATIONS: u8 = 1;
const EXIT_FATAL: u8 = 2;

#[derive(Parser)]
#[command(name = "claude-plugin-lint")]
#[command(version, about = "Validate plugin manifests and their components", long_about = None)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every check against a plugin directory.
    Validate {
        /// Plugin root directory
        path: PathBuf,

        /// Output format: human or json
        #[arg(long, value_name = "FORMAT")]
        format: Option<OutputFormat>,

        /// Settings file (default: ~/.claude/plugin-lint.json)
        #[arg(long, short, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Skip the world-readable check on component files
        #[arg(long)]
        no_permission_check: bool,
    },

    /// Print the components a plugin directory provides.
    Discover {
        /// Plugin root directory
        path: PathBuf,

        /// Output format: human or json
        #[arg(long, value_name = "FORMAT")]
        format: Option<OutputFormat>,

        /// Settings file (default: ~/.claude/plugin-lint.json)
        #[arg(long, short, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing_subscriber(cli.verbose) {
        eprintln!("warning: {e}");
    }

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Validate {
            path,
            format,
            config,
            no_permission_check,
        } => {
            let settings = load_settings(format, config, no_permission_check).await?;
            let report = PluginLinter::new(settings.clone()).lint(&path).await;
            print_report(&report, settings.format, LintReport::render_human)?;

            Ok(match (report.is_fatal(), report.success) {
                (true, _) => ExitCode::from(EXIT_FATAL),
                (false, true) => ExitCode::SUCCESS,
                (false, false) => ExitCode::from(EXIT_VIOLATIONS),
            })
        }
        Commands::Discover {
            path,
            format,
            config,
        } => {
            let settings = load_settings(format, config, false).await?;
            let report = PluginLinter::new(settings.clone()).discover(&path).await;
            print_report(&report, settings.format, LintReport::render_components)?;

            Ok(if report.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_VIOLATIONS)
            })
        }
    }
}

/// Flags, then `PLUGIN_LINT_*`, then `--config`, then the user file.
async fn load_settings(
    format: Option<OutputFormat>,
    config: Option<PathBuf>,
    no_permission_check: bool,
) -> anyhow::Result<LintSettings> {
    let mut flags = MemoryConfigProvider::named("cli");
    if let Some(format) = format {
        flags = flags.value(LintSettings::FORMAT, format.to_string());
    }
    if no_permission_check {
        flags = flags.value(LintSettings::CHECK_PERMISSIONS, "false");
    }

    let mut builder = ConfigBuilder::new().memory(flags).env();
    if let Some(path) = config {
        if !path.is_file() {
            bail!("config file {} does not exist", path.display());
        }
        builder = builder.file(path);
    }

    let provider = builder.user_file().build().await?;
    LintSettings::from_provider(&provider)
        .await
        .context("invalid settings")
}

fn print_report(
    report: &LintReport,
    format: OutputFormat,
    render_human: fn(&LintReport) -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Human => print!("{}", render_human(report)),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}
