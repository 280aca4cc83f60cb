//! TOML parsing, serialization, validation, and discovery for board descriptors.
//!
//! Board descriptors are stored as `.board.toml` files in the `boards/`
//! directory of a project. This module loads, validates, serializes and
//! discovers those files.

use std::path::{Path, PathBuf};

use socplan_clock::planner;

use crate::board::BoardDescriptor;
use crate::error::{BoardError, Result};

/// A validation issue found in a board descriptor.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity: "error" or "warning".
    pub severity: &'static str,
    /// Human-readable description.
    pub message: String,
}

/// Load a board from a `.board.toml` file.
pub fn load_board_toml(path: &Path) -> Result<BoardDescriptor> {
    if !path.exists() {
        return Err(BoardError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_board_toml(&content)
}

/// Parse a board from a TOML string.
pub fn parse_board_toml(toml_str: &str) -> Result<BoardDescriptor> {
    let board: BoardDescriptor = toml::from_str(toml_str)?;
    Ok(board)
}

/// Serialize a board to pretty TOML.
pub fn board_to_toml(board: &BoardDescriptor) -> Result<String> {
    let toml_str = toml::to_string_pretty(board)?;
    Ok(toml_str)
}

/// Validate a board descriptor for structural correctness.
///
/// Returns `Ok(())` if valid, or `Err(issues)` with a list of problems.
pub fn validate_board(board: &BoardDescriptor) -> std::result::Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    let mut error = |message: String| {
        issues.push(ValidationIssue {
            severity: "error",
            message,
        })
    };

    // 1. Reference clock present
    if board.reference_clock_hz == 0 {
        error("reference clock frequency is zero".into());
    }

    // 2. Topology is realizable
    let topology_ok = match board.topology.validate() {
        Ok(()) => true,
        Err(e) => {
            error(e.to_string());
            false
        }
    };

    // 3. Default system clock is exactly reachable
    if topology_ok && board.reference_clock_hz > 0 {
        if let Err(e) = planner::plan(
            board.reference_clock_hz,
            board.default_sys_clk_hz,
            &board.topology,
        ) {
            error(format!("default system clock: {e}"));
        }
    }

    // 4. Granularity is a power of two
    let granularity = board.address_space.granularity;
    if granularity == 0 || !granularity.is_power_of_two() {
        error(format!(
            "address granularity {granularity} is not a power of two"
        ));
    }

    // 5. Shadow window is non-empty and addressable
    let shadow_offset = board.address_space.shadow_offset;
    if shadow_offset == 0 {
        error("shadow offset is zero; no room for primary windows".into());
    } else if shadow_offset.checked_mul(2).is_none() {
        error(format!(
            "shadow offset {shadow_offset:#x} leaves no room for the shadow window"
        ));
    }

    // 6. Integrated RAM size is whole words
    let ram = board.capabilities.integrated_main_ram_bytes;
    if granularity != 0 && ram % granularity != 0 {
        error(format!(
            "integrated main RAM size {ram:#x} is not a multiple of {granularity} bytes"
        ));
    }

    // 7. Resource limits non-zero
    if board.limits.register_banks == 0 || board.limits.interrupts == 0 {
        error("resource limits must allow at least one CSR bank and interrupt".into());
    }

    // 8. Ethernet without memory clocking is legal but unusual
    if board.capabilities.ethernet_phy
        && board.capabilities.external_dram_required()
        && !board.topology.memory_clocking
    {
        issues.push(ValidationIssue {
            severity: "warning",
            message: "board needs external DRAM but its topology generates no memory clocks"
                .into(),
        });
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Generate a template `.board.toml` for a new board.
///
/// Seeds from the Opsis descriptor with the given custom name.
pub fn generate_template(name: &str) -> Result<String> {
    let mut board = BoardDescriptor::opsis();
    board.name = name.into();
    board.version = "0.1.0".into();
    board_to_toml(&board)
}

/// Discover all `.board.toml` files in a project's `boards/` directory.
///
/// Returns a list of (board_name, file_path) pairs.
pub fn discover_boards(project_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let boards_dir = project_dir.join("boards");
    if !boards_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut boards = Vec::new();
    for entry in std::fs::read_dir(&boards_dir)? {
        let path = entry?.path();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(".board.toml"))
            .map(str::to_string);
        if let Some(name) = name {
            boards.push((name, path));
        }
    }
    boards.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(boards)
}
