//! External DRAM module geometry and timings.

use serde::{Deserialize, Serialize};

const NS_PER_SECOND: u64 = 1_000_000_000;

/// Row/column/bank organisation of a DRAM chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SdramGeometry {
    pub banks: u64,
    pub rows: u64,
    pub columns: u64,
    /// Data bus width in bits.
    pub data_width: u64,
}

/// Timing parameters in nanoseconds, except `t_wtr` which is in cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SdramTimings {
    pub t_rp: u64,
    pub t_rcd: u64,
    pub t_wr: u64,
    pub t_wtr: u64,
    pub t_refi: u64,
    pub t_rfc: u64,
}

/// The same timings expressed in controller clock cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CycleTimings {
    pub t_rp: u64,
    pub t_rcd: u64,
    pub t_wr: u64,
    pub t_wtr: u64,
    pub t_refi: u64,
    pub t_rfc: u64,
}

/// A DRAM part the memory controller is generated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SdramModule {
    pub part: String,
    pub geometry: SdramGeometry,
    pub timings: SdramTimings,
}

impl SdramModule {
    /// Micron MT41J128M16, the DDR3 chip on the Opsis.
    pub fn mt41j128m16() -> Self {
        Self {
            part: "MT41J128M16".into(),
            geometry: SdramGeometry {
                banks: 8,
                rows: 16384,
                columns: 1024,
                data_width: 16,
            },
            timings: SdramTimings {
                t_rp: 15,
                t_rcd: 15,
                t_wr: 15,
                t_wtr: 2,
                t_refi: 7800,
                t_rfc: 70,
            },
        }
    }

    /// Capacity in bytes.
    pub fn size_bytes(&self) -> u64 {
        let g = &self.geometry;
        g.banks * g.rows * g.columns * g.data_width / 8
    }

    /// Convert the nanosecond timings to cycles of `clk_hz`, rounding up.
    pub fn timings_in_cycles(&self, clk_hz: u64) -> CycleTimings {
        let cycles = |ns: u64| (ns * clk_hz).div_ceil(NS_PER_SECOND);
        let t = &self.timings;
        CycleTimings {
            t_rp: cycles(t.t_rp),
            t_rcd: cycles(t.t_rcd),
            t_wr: cycles(t.t_wr),
            t_wtr: t.t_wtr,
            t_refi: cycles(t.t_refi),
            t_rfc: cycles(t.t_rfc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mt41j128m16_is_256_mib() {
        assert_eq!(SdramModule::mt41j128m16().size_bytes(), 256 * 1024 * 1024);
    }

    #[test]
    fn timings_at_75_mhz() {
        let c = SdramModule::mt41j128m16().timings_in_cycles(75_000_000);
        // 15 ns * 75 MHz = 1.125 cycles
        assert_eq!(c.t_rp, 2);
        assert_eq!(c.t_rcd, 2);
        assert_eq!(c.t_wr, 2);
        assert_eq!(c.t_wtr, 2);
        assert_eq!(c.t_refi, 585);
        // 70 ns * 75 MHz = 5.25 cycles
        assert_eq!(c.t_rfc, 6);
    }

    #[test]
    fn exact_products_do_not_round_up() {
        let c = SdramModule::mt41j128m16().timings_in_cycles(100_000_000);
        assert_eq!(c.t_rfc, 7);
        assert_eq!(c.t_refi, 780);
    }
}
