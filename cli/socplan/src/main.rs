//! socplan CLI: plan clocks and compose FPGA SoCs from board descriptors.

mod commands;
mod manifest;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};

use commands::compose::ComposeArgs;
use manifest::SocplanManifest;

#[derive(Parser)]
#[command(name = "socplan", version, about = "FPGA SoC clock and resource planner")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new socplan project
    Init {
        /// Project name
        name: String,
    },
    /// Manage board descriptors
    Board {
        #[command(subcommand)]
        action: BoardAction,
    },
    /// Plan the system clock of a board
    Plan {
        /// Board name (built-in or boards/<name>.board.toml)
        #[arg(long, default_value = "opsis")]
        board: String,
        /// Reference oscillator frequency in Hz (defaults to the board's)
        #[arg(long)]
        reference: Option<u64>,
        /// Target system frequency in Hz (defaults to the board's)
        #[arg(long)]
        target: Option<u64>,
    },
    /// Compose a SoC variant on a board
    Compose {
        /// Board name (defaults to socplan.toml, then "opsis")
        #[arg(long)]
        board: Option<String>,
        /// SoC variant: base, mini (defaults to socplan.toml, then "base")
        #[arg(long)]
        variant: Option<String>,
        /// System clock in Hz
        #[arg(long)]
        sys_clk: Option<u64>,
        /// Output format: human, json
        #[arg(long)]
        format: Option<String>,
        /// Write the description to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum BoardAction {
    /// List available boards
    List,
    /// Show board details
    Describe {
        /// Board name
        name: String,
        /// Output format: human, toml, json
        #[arg(long)]
        format: Option<String>,
    },
    /// Create a boards/<name>.board.toml template
    Add {
        /// Board name
        name: String,
    },
    /// Validate a board descriptor
    Validate {
        /// Board name
        name: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    Builder::from_env(Env::default().default_filter_or(level.as_str()))
        .format_target(false)
        .init();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { name } => commands::init::run(&name),

        Commands::Board { action } => {
            let (_, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or_else(|| cwd.clone());
            match action {
                BoardAction::List => commands::board::list(Some(&project_dir)),
                BoardAction::Describe { name, format } => {
                    commands::board::describe(&name, Some(&project_dir), format.as_deref())
                }
                BoardAction::Add { name } => commands::board::add(&name, &project_dir),
                BoardAction::Validate { name } => {
                    commands::board::validate(&name, Some(&project_dir))
                }
            }
        }

        Commands::Plan {
            board,
            reference,
            target,
        } => {
            let (_, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or(cwd);
            commands::plan::run(&board, Some(&project_dir), reference, target)
        }

        Commands::Compose {
            board,
            variant,
            sys_clk,
            format,
            output,
        } => {
            let (manifest, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or(cwd);
            let args = ComposeArgs {
                board: board.as_deref(),
                variant: variant.as_deref(),
                sys_clk_hz: sys_clk,
                format: format.as_deref(),
                output: output.as_deref(),
            };
            commands::compose::run(Some(&project_dir), manifest.as_ref(), &args)
        }
    }
}

fn load_manifest_optional(
    cwd: &Path,
) -> anyhow::Result<(Option<SocplanManifest>, Option<PathBuf>)> {
    match SocplanManifest::find_and_load(cwd)? {
        Some((manifest, dir)) => Ok((Some(manifest), Some(dir))),
        None => Ok((None, None)),
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// Full workflow: init → board add → board validate → compose.
    #[test]
    fn init_add_board_compose_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = dir.path().join("workflow-test");

        // 1. Init
        commands::init::create_project(&project_path, "workflow-test").unwrap();
        let (manifest, project_dir) = load_manifest_optional(&project_path).unwrap();
        let manifest = manifest.unwrap();
        let project_dir = project_dir.unwrap();

        // 2. Custom board
        commands::board::add("lab", &project_dir).unwrap();
        commands::board::validate("lab", Some(&project_dir)).unwrap();

        // 3. Compose on it, manifest supplies the variant
        let out = project_dir.join("soc.json");
        let args = ComposeArgs {
            board: Some("lab"),
            format: Some("json"),
            output: Some(out.as_path()),
            ..Default::default()
        };
        commands::compose::run(Some(&project_dir), Some(&manifest), &args).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.contains("\"board\": \"lab\""));
        assert!(text.contains("\"variant\": \"base\""));
    }

    #[test]
    fn cli_parses_verbosity_and_compose_args() {
        let cli = Cli::try_parse_from([
            "socplan", "-vv", "compose", "--variant", "mini", "--sys-clk", "50000000",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Compose {
                variant, sys_clk, ..
            } => {
                assert_eq!(variant.as_deref(), Some("mini"));
                assert_eq!(sys_clk, Some(50_000_000));
            }
            _ => panic!("expected compose"),
        }
    }
}
