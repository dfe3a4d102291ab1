//! fbschema CLI - build, export and update Firebird schemas from SQL scripts.

use clap::{Parser, Subcommand};
use fbschema::error::EXIT_CONFIG_ERROR;
use fbschema::{Config, Connector, DryRunConnector, Orchestrator, SchemaError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, Level};

/// Config file written by `init` when no path is given.
const DEFAULT_CONFIG_FILE: &str = "fbschema.yaml";

#[derive(Parser)]
#[command(name = "fbschema")]
#[command(about = "Build, export and update Firebird database schemas")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: trace, debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    /// Directory for error.log and report.txt (overrides output.log_dir)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new database and run every script in a directory against it
    BuildDb {
        /// Directory in which the database file is created
        #[arg(long)]
        db_dir: PathBuf,

        /// Directory containing *.sql scripts
        #[arg(long)]
        scripts_dir: PathBuf,

        /// Log statements instead of executing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Write domains.sql, tables.sql and procedures<N>.sql from a live database
    ExportScripts {
        /// Database connection string
        #[arg(long)]
        connection_string: String,

        /// Directory for the generated scripts
        #[arg(long)]
        output_dir: PathBuf,
    },

    /// Apply a directory of scripts to a live database in one transaction
    UpdateDb {
        /// Database connection string
        #[arg(long)]
        connection_string: String,

        /// Directory containing *.sql scripts
        #[arg(long)]
        scripts_dir: PathBuf,

        /// Log statements instead of executing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Write a configuration file with default settings
    Init {
        /// Output path for configuration file [default: fbschema.yaml]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_CONFIG_ERROR)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), SchemaError> {
    // Handle init command separately (doesn't need existing config)
    if let Commands::Init { output, force } = &cli.command {
        let output_path = output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        write_default_config(&output_path, *force)?;
        println!("Wrote {}", output_path.display());
        return Ok(());
    }

    setup_logging(&cli.verbosity, &cli.log_format).map_err(SchemaError::Config)?;

    let mut config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => Config::default(),
    };
    if let Some(log_dir) = &cli.log_dir {
        config.output.log_dir = log_dir.display().to_string();
        config.validate()?;
    }

    match cli.command {
        Commands::Init { .. } => unreachable!(), // Handled above
        Commands::BuildDb {
            db_dir,
            scripts_dir,
            dry_run,
        } => {
            if dry_run {
                build(config, DryRunConnector::new(), &db_dir, &scripts_dir, cli.output_json).await
            } else {
                build(config, live_connector()?, &db_dir, &scripts_dir, cli.output_json).await
            }
        }
        Commands::ExportScripts {
            connection_string,
            output_dir,
        } => {
            let orchestrator = Orchestrator::new(config, live_connector()?);
            let summary = orchestrator.export(&connection_string, &output_dir).await?;
            if cli.output_json {
                println!("{}", summary.to_json()?);
            }
            Ok(())
        }
        Commands::UpdateDb {
            connection_string,
            scripts_dir,
            dry_run,
        } => {
            if dry_run {
                update(config, DryRunConnector::new(), &connection_string, &scripts_dir, cli.output_json)
                    .await
            } else {
                update(config, live_connector()?, &connection_string, &scripts_dir, cli.output_json)
                    .await
            }
        }
    }
}

async fn build<C: Connector>(
    config: Config,
    connector: C,
    db_dir: &Path,
    scripts_dir: &Path,
    output_json: bool,
) -> Result<(), SchemaError> {
    let outcome = Orchestrator::new(config, connector)
        .build(db_dir, scripts_dir)
        .await?;
    if output_json {
        println!("{}", outcome.to_json()?);
    }
    Ok(())
}

async fn update<C: Connector>(
    config: Config,
    connector: C,
    connection_string: &str,
    scripts_dir: &Path,
    output_json: bool,
) -> Result<(), SchemaError> {
    let outcome = Orchestrator::new(config, connector)
        .update(connection_string, scripts_dir)
        .await?;
    if output_json {
        println!("{}", outcome.to_json()?);
    }
    Ok(())
}

#[cfg(feature = "firebird")]
fn live_connector() -> Result<fbschema::FirebirdConnector, SchemaError> {
    Ok(fbschema::FirebirdConnector::new())
}

#[cfg(not(feature = "firebird"))]
fn live_connector() -> Result<DryRunConnector, SchemaError> {
    Err(SchemaError::Driver(
        "this build has no database driver; rebuild with `--features firebird` or pass --dry-run"
            .into(),
    ))
}

fn write_default_config(path: &Path, force: bool) -> Result<(), SchemaError> {
    if path.exists() && !force {
        return Err(SchemaError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    let yaml = Config::default().to_yaml()?;
    std::fs::write(path, format!("# fbschema configuration\n{}", yaml))?;
    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => return Err(format!("unknown verbosity '{}'", other)),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        "json" => subscriber.json().init(),
        "text" => subscriber.init(),
        other => return Err(format!("unknown log format '{}' (use text or json)", other)),
    }

    Ok(())
}
