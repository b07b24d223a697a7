use super::damping::DampingKind;
use std::f64::consts::FRAC_2_SQRT_PI;

/// Constants that make the damped Coulomb energy and force vanish at the Coulomb cutoff.
///
/// They depend on the damping kind, `alpha` and the cutoff together, and must be rebuilt with
/// [`ShiftConstants::compute`] whenever any of those change.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShiftConstants {
    pub cut_coul: f64,
    pub cut_coulsq: f64,
    /// `f(r_c)`
    pub f_shift: f64,
    /// `v(r_c) + r_c f(r_c)`
    pub e_shift: f64,
    /// Per-particle self energy in units of `(C q)^2`, where `C` is the Coulomb constant.
    pub e_self: f64,
}

impl ShiftConstants {
    pub fn compute(kind: DampingKind, alpha: f64, cut_coul: f64, coulomb_constant: f64) -> Self {
        let (v_c, f_c) = kind.kernel()(cut_coul, alpha);
        let f_shift = f_c;
        let e_shift = v_c + f_c * cut_coul;

        // Damped shapes that differ from 1/r by a finite amount at r -> 0 need that limit
        // added back, otherwise the self term misses the particle's own screening charge.
        let zero_separation = match kind {
            DampingKind::Debye => alpha,
            DampingKind::Erfc => FRAC_2_SQRT_PI * alpha,
            DampingKind::None | DampingKind::Gauss => 0.0,
        };
        let e_self = -0.5 * (e_shift + zero_separation) / coulomb_constant;

        Self {
            cut_coul,
            cut_coulsq: cut_coul * cut_coul,
            f_shift,
            e_shift,
            e_self,
        }
    }

    /// Self-energy contribution of one particle with charge `q`.
    #[inline]
    pub fn self_energy(&self, q: f64, coulomb_constant: f64) -> f64 {
        let qtmp = coulomb_constant * q;
        self.e_self * qtmp * qtmp
    }
}
