//! az-deployment-denoise: remove known noise from Azure what-if results
//!
//! Reads the JSON output of `az deployment ... what-if --no-pretty-print`,
//! suppresses the property changes described by a rules file, and prints the
//! result in the Azure CLI pretty format or as JSON.

#![allow(clippy::needless_pass_by_value)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io::{self, Write as _};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use whatif_denoise::{
    cli,
    config::{BehaviorConfig, DenoiseConfig, OutputConfig},
    pipeline::exit_codes,
    reports::ReportFormat,
};

#[derive(Parser)]
#[command(name = "az-deployment-denoise")]
#[command(version)]
#[command(about = "Remove known noise from Azure deployment what-if results", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
#[command(after_help = "EXIT CODES:
    0  Success (or no actionable changes remain with --fail-on-change)
    1  Actionable changes remain (only with --fail-on-change)
    2  Error occurred

EXAMPLES:
    # Denoise a saved what-if result
    az deployment group what-if -g rg -f main.bicep --no-pretty-print > whatif.json
    az-deployment-denoise whatif.json

    # Pipe directly, with an explicit rules file
    az deployment group what-if -g rg -f main.bicep --no-pretty-print | \\
        az-deployment-denoise -f rules.yml

    # Gate a pipeline on real changes
    az-deployment-denoise whatif.json --fail-on-change -q

    # Create a starter rules file
    az-deployment-denoise config init")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the rules file (discovered if not specified)
    #[arg(
        short = 'f',
        long = "config-file",
        global = true,
        env = "AZ_DEPLOYMENT_DENOISE_CONFIG"
    )]
    config_file: Option<PathBuf>,

    #[command(flatten)]
    denoise: DenoiseArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Arguments for the default denoise action
#[derive(Args)]
struct DenoiseArgs {
    /// What-if result JSON (reads stdin if not specified)
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value_t = ReportFormat::Pretty)]
    output: ReportFormat,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Disable colored output (also respects `NO_COLOR` env)
    #[arg(long)]
    no_color: bool,

    /// Exit with code 1 if actionable changes remain after denoising
    #[arg(long)]
    fail_on_change: bool,

    /// Print every suppressed property change and the rule responsible to stderr
    #[arg(long)]
    explain: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show, discover, or initialize the rules file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate JSON Schema for the rules file format
    ConfigSchema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate a man page and print it to stdout
    Man,
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective rules and the file they were loaded from
    Show,
    /// Print rules file search paths and the discovered rules file
    Path,
    /// Generate an example az-deployment-denoise.yml in the current directory
    Init {
        /// Overwrite an existing rules file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging; stdout carries only the report
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    match run(cli) {
        Ok(exit_code) => {
            if exit_code != exit_codes::SUCCESS {
                std::process::exit(exit_code);
            }
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_codes::ERROR);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let Some(command) = cli.command else {
        let args = cli.denoise;
        let config = DenoiseConfig {
            input: args.input,
            rules_file: cli.config_file,
            output: OutputConfig {
                format: args.output,
                file: args.output_file,
                no_color: args.no_color,
            },
            behavior: BehaviorConfig {
                fail_on_change: args.fail_on_change,
                quiet: cli.quiet,
                explain: args.explain,
            },
        };
        return cli::run_denoise(config);
    };

    match command {
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(cli.config_file.as_deref())?,
            ConfigAction::Path => cli::run_config_path(cli.config_file.as_deref())?,
            ConfigAction::Init { force } => {
                let dir = std::env::current_dir().context("cannot determine current directory")?;
                cli::run_config_init(&dir, force)?;
            }
        },

        Commands::ConfigSchema { output } => {
            let schema = whatif_denoise::config::generate_json_schema();
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
        }

        Commands::Completions { shell } => {
            generate(
                shell,
                &mut Cli::command(),
                "az-deployment-denoise",
                &mut io::stdout(),
            );
        }

        Commands::Man => {
            let cmd = Cli::command();
            let man = clap_mangen::Man::new(cmd);
            let mut buf = Vec::new();
            man.render(&mut buf).context("failed to render man page")?;
            io::stdout().write_all(&buf)?;
        }
    }

    Ok(exit_codes::SUCCESS)
}
