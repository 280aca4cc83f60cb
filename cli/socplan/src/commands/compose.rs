//! `socplan compose`: compose a SoC and print or write its description.

use std::path::Path;

use anyhow::{bail, Context, Result};

use socplan_resources::ResourceKind;
use socplan_soc::variant::{builtin_variant, builtin_variants};
use socplan_soc::{compose, ComposeConfig, ComposedSoc};

use crate::manifest::{resolve_board, SocplanManifest};

/// Options gathered from the command line; unset fields fall back to the manifest.
#[derive(Debug, Default)]
pub struct ComposeArgs<'a> {
    pub board: Option<&'a str>,
    pub variant: Option<&'a str>,
    pub sys_clk_hz: Option<u64>,
    pub format: Option<&'a str>,
    pub output: Option<&'a Path>,
}

pub fn run(
    project_dir: Option<&Path>,
    manifest: Option<&SocplanManifest>,
    args: &ComposeArgs<'_>,
) -> Result<()> {
    let soc_cfg = manifest.map(|m| &m.soc);
    let board_name = args
        .board
        .or_else(|| soc_cfg.and_then(|s| s.board.as_deref()))
        .unwrap_or("opsis");
    let variant_name = args
        .variant
        .or_else(|| soc_cfg.and_then(|s| s.variant.as_deref()))
        .unwrap_or("base");
    let firmware_ram_size = manifest
        .map(SocplanManifest::firmware_ram_size)
        .unwrap_or(socplan_soc::catalog::DEFAULT_FIRMWARE_RAM_SIZE);

    let board = resolve_board(board_name, project_dir)?;
    let variant = match builtin_variant(variant_name, &board.capabilities, firmware_ram_size) {
        Some(v) => v,
        None => {
            let known: Vec<&str> = builtin_variants().iter().map(|(n, _)| *n).collect();
            bail!("unknown variant: '{variant_name}' (expected one of: {})", known.join(", "))
        }
    };

    let mut config = ComposeConfig::new(board, variant);
    if let Some(hz) = args.sys_clk_hz.or_else(|| soc_cfg.and_then(|s| s.sys_clk_hz)) {
        config = config.with_sys_clk(hz);
    }
    if let Some(layer) = manifest.and_then(SocplanManifest::overrides_layer) {
        config = config.with_overrides(layer);
    }

    let soc = compose(&config)
        .with_context(|| format!("composing '{variant_name}' on board '{board_name}'"))?;

    let rendered = match args.format.unwrap_or("human") {
        "human" => render_human(&soc)?,
        "json" => soc.to_json()?,
        other => bail!("unknown format '{other}' (expected human or json)"),
    };

    match args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn render_human(soc: &ComposedSoc) -> Result<String> {
    use std::fmt::Write;

    let mut out = String::new();
    writeln!(out, "=== SoC: {} on {} ===", soc.variant(), soc.board())?;
    writeln!(out, "Chain:       {}", soc.chain().join(" -> "))?;
    writeln!(out, "Fingerprint: {}", soc.fingerprint()?)?;
    writeln!(out)?;

    let plan = soc.plan();
    writeln!(out, "--- Clocks ---")?;
    writeln!(
        out,
        "  {} Hz = {} Hz / {} * {} / {}",
        plan.achieved_hz(),
        plan.reference_hz,
        plan.divide,
        plan.multiply,
        plan.post_divide
    )?;
    for domain in soc.clocks().domains() {
        writeln!(out, "  {:<15} {:>12} Hz", domain.name, domain.frequency_hz)?;
    }
    writeln!(out)?;

    writeln!(out, "--- Subsystems ---")?;
    for subsystem in soc.subsystems() {
        writeln!(out, "  {}", subsystem.name)?;
    }
    writeln!(out)?;

    for kind in ResourceKind::ALL {
        writeln!(out, "--- {kind} ---")?;
        for (name, value) in soc.resources().entries(kind) {
            let origin = soc.resources().origin(kind, name).unwrap_or("?");
            match kind {
                ResourceKind::MemoryBase => {
                    writeln!(out, "  {name:<20} 0x{value:08X}  ({origin})")?
                }
                _ => writeln!(out, "  {name:<20} {value:>10}  ({origin})")?,
            }
        }
        writeln!(out)?;
    }

    writeln!(out, "--- Memory regions ---")?;
    for region in soc.memory_map().regions() {
        writeln!(
            out,
            "  {:<20} 0x{:08X} - 0x{:08X}  shadow 0x{:08X}",
            region.name,
            region.base_address,
            region.end(),
            region.shadow_address
        )?;
    }

    if !soc.false_paths().is_empty() {
        writeln!(out)?;
        writeln!(out, "--- False paths ---")?;
        for path in soc.false_paths() {
            writeln!(out, "  {} -> {}", path.from, path.to)?;
        }
    }

    if let Some(t) = soc.sdram_timings() {
        writeln!(out)?;
        writeln!(out, "--- DRAM timings (cycles) ---")?;
        writeln!(
            out,
            "  tRP {} tRCD {} tWR {} tWTR {} tREFI {} tRFC {}",
            t.t_rp, t.t_rcd, t.t_wr, t.t_wtr, t.t_refi, t.t_rfc
        )?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_defaults() {
        assert!(run(None, None, &ComposeArgs::default()).is_ok());
    }

    #[test]
    fn compose_mini_as_json_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("soc.json");
        let args = ComposeArgs {
            variant: Some("mini"),
            format: Some("json"),
            output: Some(out.as_path()),
            ..Default::default()
        };
        run(None, None, &args).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json["variant"], "mini");
        assert_eq!(json["board"], "opsis");
    }

    #[test]
    fn manifest_supplies_defaults_and_overrides() {
        let manifest: SocplanManifest = toml::from_str(
            r#"
[project]
name = "proj"

[soc]
variant = "mini"
sys-clk-hz = 50000000

[overrides]
csr = { leds = 16 }
"#,
        )
        .unwrap();
        // leds collides with ddrphy on the external DRAM board
        let err = run(None, Some(&manifest), &ComposeArgs::default()).unwrap_err();
        assert!(format!("{err:#}").contains("requested by 'leds' is already held by 'ddrphy'"));
    }

    #[test]
    fn unknown_variant_or_format() {
        let args = ComposeArgs {
            variant: Some("maxi"),
            ..Default::default()
        };
        assert!(run(None, None, &args).is_err());

        let args = ComposeArgs {
            format: Some("yaml"),
            ..Default::default()
        };
        assert!(run(None, None, &args).is_err());
    }

    #[test]
    fn human_rendering_lists_regions() {
        let board = socplan_board::BoardDescriptor::opsis();
        let variant = socplan_soc::SocVariant::mini(&board.capabilities, 0x8000);
        let soc = compose(&ComposeConfig::new(board, variant)).unwrap();
        let text = render_human(&soc).unwrap();
        assert!(text.contains("firmware_ram"));
        assert!(text.contains("shadow 0xB0000000"));
        assert!(text.contains("sys -> eth_rx"));
    }
}
