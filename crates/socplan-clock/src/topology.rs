//! Clock primitive topology.
//!
//! Describes the fixed divider stages of the clock-generation primitive a
//! board uses: the VCO bounds, the post-divider shared by every output tap,
//! the tap layout and the auxiliary multiply stage. These numbers are
//! properties of one FPGA family and are carried as data, not constants.

use serde::{Deserialize, Serialize};

use crate::error::{ClockError, Result};

/// What a clock tap off the multiplied bus is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TapRole {
    /// Full-rate memory write clock and SERDES strobe.
    MemoryWrite,
    /// Full-rate memory read clock. Left unconnected; reads share the write clock.
    MemoryRead,
    /// Half-rate memory address/control and DQS clock.
    MemoryHalf,
    /// Half-rate clock forwarded off-chip to the DRAM.
    DramClockForward,
    /// System-rate spare output.
    Spare,
    /// System clock.
    System,
}

impl TapRole {
    /// Whether the tap only exists when memory clocking is enabled.
    pub fn is_memory(self) -> bool {
        matches!(
            self,
            TapRole::MemoryWrite
                | TapRole::MemoryRead
                | TapRole::MemoryHalf
                | TapRole::DramClockForward
        )
    }
}

/// One output of the clock primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClockTap {
    /// Tap role.
    pub role: TapRole,
    /// Output rate as a multiple of the system clock (1, 2 or 4).
    ///
    /// The tap's divider is `post_divide / rate_multiple`.
    pub rate_multiple: u64,
    /// Phase offset in degrees.
    pub phase_degrees: u32,
}

/// Second multiply stage driven directly by the reference oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AuxiliaryStage {
    /// Multiply factor.
    pub multiply: u64,
    /// Divide factor.
    pub divide: u64,
}

/// Fixed divider topology of a clock-generation primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClockTopology {
    /// Topology name (e.g., "spartan6-pll").
    pub name: String,
    /// Divider shared by the system tap; also the multiply boost factor.
    pub post_divide: u64,
    /// Largest feedback multiplier the primitive accepts.
    pub max_multiply: u64,
    /// Largest input divider the primitive accepts.
    pub max_divide: u64,
    /// Lowest legal VCO frequency in Hz.
    pub vco_min_hz: u64,
    /// Highest legal VCO frequency in Hz.
    pub vco_max_hz: u64,
    /// Whether the memory taps are generated at all.
    pub memory_clocking: bool,
    /// Output taps of the primitive.
    pub taps: Vec<ClockTap>,
    /// Auxiliary fixed-rate stage.
    pub auxiliary: AuxiliaryStage,
    /// Width of the power-on-reset counter in bits.
    pub por_counter_bits: u32,
}

impl ClockTopology {
    /// Construct the Spartan-6 PLL_ADV + DCM_CLKGEN topology.
    pub fn spartan6() -> Self {
        Self {
            name: "spartan6-pll".into(),
            post_divide: 8,
            max_multiply: 64,
            max_divide: 52,
            vco_min_hz: 400_000_000,
            vco_max_hz: 1_080_000_000,
            memory_clocking: true,
            taps: vec![
                ClockTap {
                    role: TapRole::MemoryWrite,
                    rate_multiple: 4,
                    phase_degrees: 0,
                },
                ClockTap {
                    role: TapRole::MemoryRead,
                    rate_multiple: 4,
                    phase_degrees: 0,
                },
                ClockTap {
                    role: TapRole::MemoryHalf,
                    rate_multiple: 2,
                    phase_degrees: 270,
                },
                ClockTap {
                    role: TapRole::DramClockForward,
                    rate_multiple: 2,
                    phase_degrees: 250,
                },
                ClockTap {
                    role: TapRole::Spare,
                    rate_multiple: 1,
                    phase_degrees: 0,
                },
                ClockTap {
                    role: TapRole::System,
                    rate_multiple: 1,
                    phase_degrees: 0,
                },
            ],
            auxiliary: AuxiliaryStage {
                multiply: 2,
                divide: 4,
            },
            por_counter_bits: 11,
        }
    }

    /// Same primitive with the memory taps switched off.
    pub fn without_memory(mut self) -> Self {
        self.memory_clocking = false;
        self
    }

    /// Look up a tap by role.
    pub fn tap(&self, role: TapRole) -> Option<&ClockTap> {
        self.taps.iter().find(|t| t.role == role)
    }

    /// Divider applied to the VCO for the given tap.
    pub fn tap_divide(&self, tap: &ClockTap) -> u64 {
        self.post_divide / tap.rate_multiple
    }

    /// Check that the tap layout is realizable.
    pub fn validate(&self) -> Result<()> {
        let invalid = |detail: String| Err(ClockError::InvalidTopology { detail });

        if self.post_divide == 0 || self.post_divide % 4 != 0 {
            return invalid(format!(
                "post-divide {} must be a non-zero multiple of 4",
                self.post_divide
            ));
        }
        if self.max_multiply == 0 || self.max_divide == 0 {
            return invalid("multiply and divide bounds must be non-zero".into());
        }
        if self.vco_min_hz > self.vco_max_hz {
            return invalid(format!(
                "VCO range {}..{} Hz is empty",
                self.vco_min_hz, self.vco_max_hz
            ));
        }
        if self.auxiliary.multiply == 0 || self.auxiliary.divide == 0 {
            return invalid("auxiliary multiply/divide must be non-zero".into());
        }
        if self.por_counter_bits == 0 || self.por_counter_bits > 32 {
            return invalid(format!(
                "power-on-reset counter width {} must be 1..=32 bits",
                self.por_counter_bits
            ));
        }

        for (i, tap) in self.taps.iter().enumerate() {
            if !matches!(tap.rate_multiple, 1 | 2 | 4) {
                return invalid(format!(
                    "tap {:?} rate multiple {} must be 1, 2 or 4",
                    tap.role, tap.rate_multiple
                ));
            }
            if tap.phase_degrees >= 360 {
                return invalid(format!(
                    "tap {:?} phase {} is not below 360 degrees",
                    tap.role, tap.phase_degrees
                ));
            }
            if self.taps[..i].iter().any(|t| t.role == tap.role) {
                return invalid(format!("tap {:?} is declared twice", tap.role));
            }
        }

        let mut required = vec![TapRole::System];
        if self.memory_clocking {
            required.extend([
                TapRole::MemoryWrite,
                TapRole::MemoryHalf,
                TapRole::DramClockForward,
            ]);
        }
        for role in required {
            if self.tap(role).is_none() {
                return invalid(format!("missing required tap {role:?}"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spartan6_is_valid() {
        let t = ClockTopology::spartan6();
        assert!(t.validate().is_ok());
        assert_eq!(t.taps.len(), 6);
        let wr = t.tap(TapRole::MemoryWrite).unwrap();
        assert_eq!(t.tap_divide(wr), 2);
        let half = t.tap(TapRole::MemoryHalf).unwrap();
        assert_eq!(t.tap_divide(half), 4);
        assert_eq!(half.phase_degrees, 270);
        let sys = t.tap(TapRole::System).unwrap();
        assert_eq!(t.tap_divide(sys), 8);
    }

    #[test]
    fn post_divide_must_be_multiple_of_four() {
        let mut t = ClockTopology::spartan6();
        t.post_divide = 6;
        assert!(matches!(
            t.validate(),
            Err(ClockError::InvalidTopology { .. })
        ));
    }

    #[test]
    fn duplicate_tap_rejected() {
        let mut t = ClockTopology::spartan6();
        t.taps.push(t.taps[5].clone());
        let err = t.validate().unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn memory_taps_only_required_when_enabled() {
        let mut t = ClockTopology::spartan6().without_memory();
        t.taps.retain(|tap| !tap.role.is_memory());
        assert!(t.validate().is_ok());

        t.memory_clocking = true;
        assert!(t.validate().is_err());
    }

    #[test]
    fn zero_auxiliary_divide_rejected() {
        let mut t = ClockTopology::spartan6();
        t.auxiliary.divide = 0;
        assert!(t.validate().is_err());
    }
}
