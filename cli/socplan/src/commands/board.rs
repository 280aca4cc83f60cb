//! `socplan board`: board listing, description, scaffolding and validation.

use std::path::Path;

use anyhow::{bail, Context, Result};

use socplan_board::parse::{board_to_toml, discover_boards, generate_template, validate_board};
use socplan_board::{builtin_boards, BoardDescriptor};

use crate::manifest::resolve_board;

/// List built-in boards and those found under `boards/`.
pub fn list(project_dir: Option<&Path>) -> Result<()> {
    println!("Built-in boards:");
    println!();
    for (name, description) in builtin_boards() {
        println!("  {name:<25} {description}");
    }

    if let Some(dir) = project_dir {
        let custom = discover_boards(dir).context("scanning boards/ directory")?;
        if !custom.is_empty() {
            println!();
            println!("Project boards:");
            println!();
            for (name, path) in custom {
                println!("  {name:<25} {}", path.display());
            }
        }
    }

    println!();
    println!("Use 'socplan board describe <name>' for details.");
    Ok(())
}

/// Describe one board in detail.
pub fn describe(name: &str, project_dir: Option<&Path>, format: Option<&str>) -> Result<()> {
    let board = resolve_board(name, project_dir)?;
    match format.unwrap_or("human") {
        "human" => print_board(&board),
        "toml" => print!("{}", board_to_toml(&board)?),
        "json" => println!("{}", serde_json::to_string_pretty(&board)?),
        other => bail!("unknown format '{other}' (expected human, toml or json)"),
    }
    Ok(())
}

fn print_board(board: &BoardDescriptor) {
    println!("=== Board: {} ===", board.name);
    println!("Version: {}", board.version);
    println!();

    println!("--- Clocking ---");
    println!("  Reference:      {} Hz", board.reference_clock_hz);
    println!("  Default sys:    {} Hz", board.default_sys_clk_hz);
    let t = &board.topology;
    println!("  Primitive:      {}", t.name);
    println!("  Post-divide:    {}", t.post_divide);
    println!("  VCO range:      {} - {} Hz", t.vco_min_hz, t.vco_max_hz);
    println!("  Memory clocks:  {}", if t.memory_clocking { "yes" } else { "no" });
    println!("  Taps:");
    for tap in &t.taps {
        println!(
            "    {:?}: x{} @ {} deg",
            tap.role, tap.rate_multiple, tap.phase_degrees
        );
    }
    println!();

    println!("--- Capabilities ---");
    let caps = &board.capabilities;
    if caps.has_integrated_main_ram() {
        println!("  Integrated main RAM: {} bytes", caps.integrated_main_ram_bytes);
    } else {
        println!("  Integrated main RAM: none (external DRAM)");
    }
    println!("  Ethernet PHY:        {}", if caps.ethernet_phy { "yes" } else { "no" });
    println!();

    println!("--- Platform ---");
    println!("  Shadow offset: 0x{:08X}", board.address_space.shadow_offset);
    println!("  Granularity:   {} bytes", board.address_space.granularity);
    println!("  CSR banks:     {}", board.limits.register_banks);
    println!("  Interrupts:    {}", board.limits.interrupts);
}

/// Write a new `boards/<name>.board.toml` seeded from the Opsis.
pub fn add(name: &str, project_dir: &Path) -> Result<()> {
    let boards_dir = project_dir.join("boards");
    let path = boards_dir.join(format!("{name}.board.toml"));
    if path.exists() {
        bail!("board file '{}' already exists", path.display());
    }
    std::fs::create_dir_all(&boards_dir).context("creating boards/ directory")?;
    std::fs::write(&path, generate_template(name)?)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(())
}

/// Validate a board and print every issue.
pub fn validate(name: &str, project_dir: Option<&Path>) -> Result<()> {
    let board = resolve_board(name, project_dir)?;
    match validate_board(&board) {
        Ok(()) => {
            println!("Board '{name}' is valid.");
            Ok(())
        }
        Err(issues) => {
            for issue in &issues {
                println!("  {}: {}", issue.severity, issue.message);
            }
            let errors = issues.iter().filter(|i| i.severity == "error").count();
            if errors > 0 {
                bail!("board '{name}' has {errors} error(s)");
            }
            Ok(())
        }
    }
}
