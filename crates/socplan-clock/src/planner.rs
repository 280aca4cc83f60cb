//! Rational frequency planning.
//!
//! Finds the integer multiply/divide pair that reproduces a requested system
//! clock exactly from the board's reference oscillator. The pair feeds the
//! clock primitive's feedback multiplier and input divider; the system tap
//! then divides the VCO by the topology's fixed post-divider.

use serde::{Deserialize, Serialize};

use crate::error::{ClockError, Result};
use crate::topology::ClockTopology;

/// An exact multiply/divide solution for one reference/target pair.
///
/// Invariant: `reference_hz * multiply / (divide * post_divide) == target_hz`
/// with no remainder anywhere along the way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FrequencyPlan {
    /// Reference oscillator frequency in Hz.
    pub reference_hz: u64,
    /// Requested system frequency in Hz.
    pub target_hz: u64,
    /// Feedback multiplier.
    pub multiply: u64,
    /// Input divider.
    pub divide: u64,
    /// Fixed post-divider of the system tap.
    pub post_divide: u64,
}

impl FrequencyPlan {
    /// Frequency at the phase detector input.
    pub fn pfd_hz(&self) -> u64 {
        self.reference_hz / self.divide
    }

    /// Frequency of the multiplied clock bus.
    pub fn vco_hz(&self) -> u64 {
        self.pfd_hz() * self.multiply
    }

    /// Frequency of a tap running at `rate_multiple` times the system clock.
    pub fn tap_hz(&self, rate_multiple: u64) -> u64 {
        self.vco_hz() / (self.post_divide / rate_multiple)
    }

    /// System frequency the plan actually produces.
    pub fn achieved_hz(&self) -> u64 {
        self.vco_hz() / self.post_divide
    }

    /// Re-check the exactness invariant.
    pub fn is_exact(&self) -> bool {
        let num = self.reference_hz as u128 * self.multiply as u128;
        let den = self.divide as u128 * self.post_divide as u128;
        den != 0 && num % den == 0 && num / den == self.target_hz as u128
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Plan the multiply/divide pair for `target_hz` off `reference_hz`.
///
/// Fails with [`ClockError::FrequencyMismatch`] instead of rounding when the
/// ratio has no exact in-bounds solution.
pub fn plan(reference_hz: u64, target_hz: u64, topology: &ClockTopology) -> Result<FrequencyPlan> {
    topology.validate()?;

    let mismatch = |detail: String| ClockError::FrequencyMismatch {
        reference_hz,
        target_hz,
        detail,
    };

    if reference_hz == 0 || target_hz == 0 {
        return Err(mismatch("frequencies must be non-zero".into()));
    }

    let g = gcd(target_hz, reference_hz);
    let (numerator, denominator) = (target_hz / g, reference_hz / g);

    let multiply = numerator.checked_mul(topology.post_divide).ok_or_else(|| {
        mismatch(format!(
            "multiply {numerator}*{} overflows",
            topology.post_divide
        ))
    })?;
    let divide = denominator;

    if multiply > topology.max_multiply {
        return Err(mismatch(format!(
            "multiply {multiply} exceeds the {} limit of {}",
            topology.name, topology.max_multiply
        )));
    }
    if divide > topology.max_divide {
        return Err(mismatch(format!(
            "divide {divide} exceeds the {} limit of {}",
            topology.name, topology.max_divide
        )));
    }

    if reference_hz % divide != 0 {
        return Err(mismatch(format!("reference is not divisible by {divide}")));
    }
    let vco_hz = (reference_hz / divide) as u128 * multiply as u128;
    if vco_hz % topology.post_divide as u128 != 0
        || vco_hz / topology.post_divide as u128 != target_hz as u128
    {
        return Err(mismatch(format!(
            "{reference_hz}/{divide}*{multiply}/{} is not exact",
            topology.post_divide
        )));
    }
    if vco_hz < topology.vco_min_hz as u128 || vco_hz > topology.vco_max_hz as u128 {
        return Err(mismatch(format!(
            "VCO {vco_hz} Hz outside {}..={} Hz",
            topology.vco_min_hz, topology.vco_max_hz
        )));
    }

    let plan = FrequencyPlan {
        reference_hz,
        target_hz,
        multiply,
        divide,
        post_divide: topology.post_divide,
    };
    log::debug!(
        "planned {target_hz} Hz from {reference_hz} Hz: M={multiply} D={divide} P={} (VCO {} Hz)",
        plan.post_divide,
        plan.vco_hz()
    );
    Ok(plan)
}
