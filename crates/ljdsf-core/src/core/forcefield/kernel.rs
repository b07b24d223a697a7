use super::damping::DampingFn;
use super::params::PairParams;
use super::shift::ShiftConstants;

/// Result of evaluating one pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PairOutcome {
    /// Force divided by separation; multiply by `x_i - x_j` to get the force on `i`.
    pub fpair: f64,
    pub evdwl: f64,
    pub ecoul: f64,
}

/// Everything the Coulomb half of the kernel needs, resolved at initialization.
#[derive(Debug, Clone, Copy)]
pub struct DsfCoulomb {
    pub damping: DampingFn,
    pub alpha: f64,
    pub shift: ShiftConstants,
    pub coulomb_constant: f64,
}

impl DsfCoulomb {
    /// Evaluates the LJ and DSF terms for a pair already known to be inside its total cutoff.
    ///
    /// Each term is gated by its own cutoff. `rsq` must be positive. Energies are only
    /// computed when `eflag` is set and are zero otherwise.
    #[inline]
    pub fn evaluate(
        &self,
        params: &PairParams,
        rsq: f64,
        factor_lj: f64,
        factor_coul: f64,
        qi: f64,
        qj: f64,
        eflag: bool,
    ) -> PairOutcome {
        let r2inv = 1.0 / rsq;
        let mut outcome = PairOutcome::default();

        if rsq < params.cut_ljsq {
            let r6inv = r2inv * r2inv * r2inv;
            outcome.fpair += factor_lj * r6inv * (params.lj1 * r6inv - params.lj2);
            if eflag {
                outcome.evdwl =
                    factor_lj * r6inv * (params.lj3 * r6inv - params.lj4) - params.offset;
            }
        }

        if rsq < self.shift.cut_coulsq {
            let r = rsq.sqrt();
            let (vr, fr) = (self.damping)(r, self.alpha);
            let prefactor = factor_coul * self.coulomb_constant * qi * qj;
            outcome.fpair += prefactor * (fr - self.shift.f_shift) * r;
            if eflag {
                outcome.ecoul = prefactor * (vr + r * self.shift.f_shift - self.shift.e_shift);
            }
        }

        outcome.fpair *= r2inv;
        outcome
    }
}
