//! `socplan.toml` manifest parsing and project configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use socplan_board::parse::{discover_boards, load_board_toml};
use socplan_board::{builtin_board, BoardDescriptor};
use socplan_resources::{ResourceEntry, ResourceKind, ResourceLayer};
use socplan_soc::catalog::DEFAULT_FIRMWARE_RAM_SIZE;

pub const MANIFEST_FILE: &str = "socplan.toml";

/// The top-level manifest structure for a socplan project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocplanManifest {
    /// Project metadata (required).
    pub project: ProjectConfig,
    /// Composition defaults.
    #[serde(default)]
    pub soc: SocConfig,
    /// Project-level resource assignments, applied after everything else.
    #[serde(default)]
    pub overrides: Option<OverridesConfig>,
}

/// Project metadata section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

/// `[soc]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SocConfig {
    #[serde(default)]
    pub board: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub sys_clk_hz: Option<u64>,
    #[serde(default)]
    pub firmware_ram_size: Option<u64>,
}

/// `[overrides]` section: one table per resource kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverridesConfig {
    #[serde(default)]
    pub csr: BTreeMap<String, u64>,
    #[serde(default)]
    pub mem: BTreeMap<String, u64>,
    #[serde(default)]
    pub irq: BTreeMap<String, u64>,
}

impl OverridesConfig {
    /// Convert to a resource layer named after the project.
    pub fn to_layer(&self, origin: &str) -> ResourceLayer {
        let mut layer = ResourceLayer::new(origin);
        let tables = [
            (ResourceKind::RegisterBank, &self.csr),
            (ResourceKind::MemoryBase, &self.mem),
            (ResourceKind::Interrupt, &self.irq),
        ];
        for (kind, table) in tables {
            for (name, &value) in table {
                layer.push(ResourceEntry::new(kind, name.as_str(), value));
            }
        }
        layer
    }
}

impl SocplanManifest {
    /// Search upward from `start_dir` for a `socplan.toml` file, parse and
    /// return it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(MANIFEST_FILE);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: SocplanManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a manifest from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing socplan.toml")
    }

    pub fn firmware_ram_size(&self) -> u64 {
        self.soc.firmware_ram_size.unwrap_or(DEFAULT_FIRMWARE_RAM_SIZE)
    }

    /// Overrides as a resource layer, if the manifest has any.
    pub fn overrides_layer(&self) -> Option<ResourceLayer> {
        self.overrides
            .as_ref()
            .map(|o| o.to_layer(&self.project.name))
            .filter(|layer| !layer.is_empty())
    }

    /// Generate the default template for `socplan init`.
    pub fn template(name: &str) -> String {
        format!(
            r#"[project]
name = "{name}"
version = "0.1.0"

[soc]
board = "opsis"
variant = "base"
"#
        )
    }
}

/// Resolve a board name: built-ins first, then `boards/*.board.toml`.
pub fn resolve_board(name: &str, project_dir: Option<&Path>) -> Result<BoardDescriptor> {
    if let Some(board) = builtin_board(name) {
        return Ok(board);
    }
    if let Some(dir) = project_dir {
        let boards = discover_boards(dir).context("scanning boards/ directory")?;
        if let Some((_, path)) = boards.iter().find(|(n, _)| n == name) {
            log::debug!("loading board '{name}' from {}", path.display());
            return load_board_toml(path).with_context(|| format!("loading {}", path.display()));
        }
    }
    bail!("unknown board: '{name}'. Use 'socplan board list' to see available boards.")
}
