use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use swim_score::config::Config;
use swim_score::scoring::{ScoringError, ScoringOptions};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_OUTPUT: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Format {
    /// Aligned text, coloured on a terminal
    #[default]
    Table,
    /// Tab-separated values for scripting
    Tsv,
    /// Pretty JSON of the result rows, one list per event
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score one meet
    Score {
        /// Parsed meet file (JSON)
        meet: PathBuf,

        #[arg(short, long, value_enum, default_value_t = Format::Table)]
        format: Format,

        /// Write results to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Score several meets and combine them event by event
    Combine {
        /// Parsed meet files (JSON)
        #[arg(required = true)]
        meets: Vec<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = Format::Table)]
        format: Format,

        /// Write results to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check the config file and exit
    Validate,
    /// Write a default config file
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "swim-score")]
#[command(about = "Score swim meets and combine results across meets", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/swim-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load and validate the config, exiting on any problem
fn load_valid_config(path: Option<PathBuf>) -> (Config, ScoringOptions) {
    let config = match swim_score::config::load_config(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = swim_score::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    match config.scoring_options() {
        Ok(options) => (config, options),
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    }
}

fn load_meet_or_exit(path: &Path) -> swim_score::meet::ParsedMeet {
    match swim_score::meet::load_parsed_meet(path) {
        Ok(meet) => meet,
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            std::process::exit(EXIT_INPUT);
        }
    }
}

fn report_scoring_errors(errors: &[ScoringError]) {
    if errors.is_empty() {
        return;
    }
    eprintln!("Warnings ({}):", errors.len());
    for error in errors {
        eprintln!("  - {}", error);
    }
}

/// Print to stdout, or write atomically to `output`
fn emit(content: &str, output: Option<&Path>) {
    match output {
        Some(path) => {
            if let Err(e) = swim_score::output::write_output(content, path) {
                eprintln!("Output error: {:#}", e);
                std::process::exit(EXIT_OUTPUT);
            }
        }
        None => println!("{}", content),
    }
}

fn emit_json<T: serde::Serialize>(value: &T, output: Option<&Path>) {
    let result = match output {
        Some(path) => swim_score::output::export_json(value, path),
        None => swim_score::output::to_json(value).map(|json| println!("{}", json)),
    };
    if let Err(e) = result {
        eprintln!("Output error: {:#}", e);
        std::process::exit(EXIT_OUTPUT);
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let start_time = Instant::now();
    let config_path = cli.config.map(PathBuf::from);

    match cli.command {
        Commands::Init { force } => {
            let path = match config_path.map_or_else(swim_score::config::get_config_path, Ok) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Config error: {:#}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };
            if let Err(e) = swim_score::config::write_default_config(&path, force) {
                eprintln!("Config error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
            println!("Config written to {}", path.display());
            println!("Run `swim-score validate` after editing it.");
        }
        Commands::Validate => {
            let (config, _) = load_valid_config(config_path);
            println!(
                "Config OK: {} points categor{}",
                config.points.categories.len(),
                if config.points.categories.len() == 1 { "y" } else { "ies" }
            );
        }
        Commands::Score {
            meet,
            format,
            output,
        } => {
            let (config, options) = load_valid_config(config_path);
            let parsed = load_meet_or_exit(&meet);

            let (result, errors) =
                swim_score::scoring::score_meet_with(&parsed, &config.points, &options);
            report_scoring_errors(&errors);

            match format {
                Format::Table => {
                    let use_colors = output.is_none() && swim_score::output::should_use_colors();
                    emit(
                        &swim_score::output::format_meet_table(&result, use_colors),
                        output.as_deref(),
                    );
                }
                Format::Tsv => emit(
                    &swim_score::output::format_meet_tsv(&result),
                    output.as_deref(),
                ),
                Format::Json => emit_json(
                    &swim_score::output::meet_rows(&result),
                    output.as_deref(),
                ),
            }

            if cli.verbose {
                eprintln!(
                    "Scored {} events in {:?}",
                    result.events.len(),
                    start_time.elapsed()
                );
            }
        }
        Commands::Combine {
            meets,
            format,
            output,
        } => {
            let (config, options) = load_valid_config(config_path);

            let runs: Vec<_> = meets
                .iter()
                .map(|path| {
                    let parsed = load_meet_or_exit(path);
                    swim_score::scoring::score_meet_with(&parsed, &config.points, &options)
                })
                .collect();

            let (combined, errors) = swim_score::scoring::combine_runs(&runs);
            report_scoring_errors(&errors);

            match format {
                Format::Table => {
                    let use_colors = output.is_none() && swim_score::output::should_use_colors();
                    emit(
                        &swim_score::output::format_combined_table(&combined, use_colors),
                        output.as_deref(),
                    );
                }
                Format::Tsv => emit(
                    &swim_score::output::format_combined_tsv(&combined),
                    output.as_deref(),
                ),
                Format::Json => emit_json(
                    &swim_score::output::combined_event_rows(&combined),
                    output.as_deref(),
                ),
            }

            if cli.verbose {
                eprintln!(
                    "Combined {} meets into {} events in {:?}",
                    runs.len(),
                    combined.events.len(),
                    start_time.elapsed()
                );
            }
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
