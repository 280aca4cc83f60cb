//! `socplan plan`: frequency plan and clock domains for one board.

use std::path::Path;

use anyhow::{Context, Result};

use socplan_clock::{planner, ClockDomainGraph};

use crate::manifest::resolve_board;

/// Plan `target_hz` on `board`, optionally overriding its reference clock.
pub fn run(
    board: &str,
    project_dir: Option<&Path>,
    reference_hz: Option<u64>,
    target_hz: Option<u64>,
) -> Result<()> {
    let board = resolve_board(board, project_dir)?;
    let reference_hz = reference_hz.unwrap_or(board.reference_clock_hz);
    let target_hz = target_hz.unwrap_or(board.default_sys_clk_hz);

    let plan = planner::plan(reference_hz, target_hz, &board.topology)
        .with_context(|| format!("planning {target_hz} Hz on board '{}'", board.name))?;
    let graph = ClockDomainGraph::build(&plan, &board.topology)?;

    println!("=== Frequency plan: {} ===", board.name);
    println!("  Reference:    {} Hz", plan.reference_hz);
    println!("  Target:       {} Hz", plan.target_hz);
    println!("  Multiply:     {}", plan.multiply);
    println!("  Divide:       {}", plan.divide);
    println!("  Post-divide:  {}", plan.post_divide);
    println!("  PFD:          {} Hz", plan.pfd_hz());
    println!("  VCO:          {} Hz", plan.vco_hz());
    println!();

    println!("--- Taps ---");
    for tap in graph.taps() {
        println!(
            "  {:<20} /{:<3} {:>4} deg  {} Hz",
            format!("{:?}", tap.role),
            tap.divide,
            tap.phase_degrees,
            tap.frequency_hz
        );
    }
    println!();

    println!("--- Domains ---");
    for domain in graph.domains() {
        println!(
            "  {:<15} {:>12} Hz  {:>3} deg  {:?}",
            domain.name, domain.frequency_hz, domain.phase_degrees, domain.reset_policy
        );
    }
    println!(
        "  power-on reset holds {} cycles",
        graph.por_counter().hold_cycles()
    );

    Ok(())
}
