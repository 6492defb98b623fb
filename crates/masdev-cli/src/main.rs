mod app_cmds;
mod config;
mod open_cmds;
mod prompt;
mod run_cmd;
#[cfg(test)]
mod test_util;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};

use masdev_core::config::validate_toolchain;
use masdev_core::navigation::DimensionView;
use masdev_core::toolchain::JacamoToolchain;

use config::MasdevConfig;

#[derive(Parser)]
#[command(
    name = "masdev",
    version,
    about = "Run and supervise JaCaMo multi-agent system applications"
)]
struct Cli {
    /// Path to the jacamo executable (overrides MASDEV_JACAMO_PATH and the config file)
    #[arg(long, global = true)]
    jacamo_path: Option<String>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a masdev config file recording the jacamo path
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Scaffold a new JaCaMo application
    Create {
        /// Application name (prompted for when omitted)
        name: Option<String>,
        /// Directory to create the application in (default: current directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Run every .jcm application in a directory, one after another
    Run {
        /// Directory to search for .jcm files (default: current directory)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Stop and rerun applications that are already running, without asking
        #[arg(long, conflicts_with = "no_input")]
        stop_running: bool,
        /// Never prompt; applications that are already running are skipped
        #[arg(long)]
        no_input: bool,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Stop the first running MAS
    Stop {
        /// Working directory for the jacamo command (default: current directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// List running MAS instances
    List {
        /// Working directory for the jacamo command (default: current directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Open a dimension inspector of the running application in the browser
    Open {
        /// Which inspector: org, agent or env
        view: DimensionView,
    },
    /// Show the command menu
    Menu,
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Decorated lines for a terminal
    Text,
    /// One JSON object per line
    Json,
}

/// Execute the `masdev init` command: write config file.
fn cmd_init(cli_jacamo_path: Option<&str>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let jacamo_path = cli_jacamo_path
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    let cfg = config::ConfigFile {
        toolchain: config::ToolchainSection {
            jacamo_path: jacamo_path.clone(),
        },
    };
    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    match jacamo_path {
        Some(p) => println!("  toolchain.jacamo_path = {p}"),
        None => println!("  toolchain.jacamo_path not set (using `jacamo` from PATH)"),
    }
    Ok(())
}

/// Working directory for commands that do not name one: the current
/// directory, or the home directory when that is unavailable.
fn working_dir(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    std::env::current_dir()
        .ok()
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow::anyhow!("cannot determine a working directory; pass --dir"))
}

/// Resolve the toolchain and check it is usable before anything is spawned.
async fn resolve_toolchain(
    cli_jacamo_path: Option<&str>,
    cwd: &std::path::Path,
) -> anyhow::Result<JacamoToolchain> {
    let resolved = MasdevConfig::resolve(cli_jacamo_path)?;
    let toolchain = JacamoToolchain::from_config(&resolved.toolchain);
    validate_toolchain(&resolved.toolchain, &toolchain, cwd).await?;
    Ok(toolchain)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let jacamo_path = cli.jacamo_path.as_deref();

    match cli.command {
        Commands::Init { force } => {
            cmd_init(jacamo_path, force)?;
        }
        Commands::Create { name, dir } => {
            let cwd = working_dir(dir)?;
            let toolchain = resolve_toolchain(jacamo_path, &cwd).await?;
            app_cmds::run_create(&toolchain, name, &cwd).await?;
        }
        Commands::Run {
            dir,
            stop_running,
            no_input,
            format,
        } => {
            let cwd = working_dir(dir)?;
            let toolchain = resolve_toolchain(jacamo_path, &cwd).await?;
            let options = run_cmd::RunOptions {
                rerun: run_cmd::RerunMode::from_flags(stop_running, no_input),
                format,
            };
            run_cmd::run_apps(&toolchain, &cwd, &options).await?;
        }
        Commands::Stop { dir } => {
            let cwd = working_dir(dir)?;
            let toolchain = resolve_toolchain(jacamo_path, &cwd).await?;
            app_cmds::run_stop(&toolchain, &cwd).await?;
        }
        Commands::List { dir } => {
            let cwd = working_dir(dir)?;
            let toolchain = resolve_toolchain(jacamo_path, &cwd).await?;
            app_cmds::run_list(&toolchain, &cwd).await?;
        }
        Commands::Open { view } => {
            open_cmds::run_open(view, &open_cmds::BrowserOpener)?;
        }
        Commands::Menu => {
            open_cmds::run_menu(&mut std::io::stdout())?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "masdev", &mut std::io::stdout());
        }
    }

    Ok(())
}
