use phf::{Map, phf_map};
use std::f64::consts::FRAC_2_SQRT_PI;
use std::fmt;
use std::str::FromStr;

// Abramowitz & Stegun 7.1.26 rational approximation of erfc.
const EWALD_P: f64 = 0.3275911;
const A1: f64 = 0.254829592;
const A2: f64 = -0.284496736;
const A3: f64 = 1.421413741;
const A4: f64 = -1.453152027;
const A5: f64 = 1.061405429;

/// Signature shared by all damping kernels.
///
/// Given a separation `r > 0` and the damping strength `alpha`, returns `(v, f)` where `v` is
/// the unshifted, damped Coulomb shape and `f = -dv/dr`.
pub type DampingFn = fn(r: f64, alpha: f64) -> (f64, f64);

/// Selects how the bare `1/r` Coulomb shape is screened before shifting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DampingKind {
    /// Undamped `1/r`.
    None,
    /// Exponential (Debye-Hückel style) screening, `exp(-alpha r) / r`.
    Debye,
    /// Gaussian screening, `exp(-(alpha r)^2) / r`.
    Gauss,
    /// Complementary error function screening, `erfc(alpha r) / r`.
    #[default]
    Erfc,
}

static DAMPING_KEYWORDS: Map<&'static str, DampingKind> = phf_map! {
    "none" => DampingKind::None,
    "debye" => DampingKind::Debye,
    "gauss" => DampingKind::Gauss,
    "erfc" => DampingKind::Erfc,
};

impl DampingKind {
    /// Resolves the kernel once so the interaction loop can call it without matching per pair.
    pub fn kernel(self) -> DampingFn {
        match self {
            DampingKind::None => unshifted_none,
            DampingKind::Debye => unshifted_debye,
            DampingKind::Gauss => unshifted_gauss,
            DampingKind::Erfc => unshifted_erfc,
        }
    }

    /// Integer code used in restart records.
    pub fn code(self) -> i32 {
        match self {
            DampingKind::None => 0,
            DampingKind::Debye => 1,
            DampingKind::Gauss => 2,
            DampingKind::Erfc => 3,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(DampingKind::None),
            1 => Some(DampingKind::Debye),
            2 => Some(DampingKind::Gauss),
            3 => Some(DampingKind::Erfc),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            DampingKind::None => "none",
            DampingKind::Debye => "debye",
            DampingKind::Gauss => "gauss",
            DampingKind::Erfc => "erfc",
        }
    }
}

impl FromStr for DampingKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DAMPING_KEYWORDS.get(s).copied().ok_or(())
    }
}

impl fmt::Display for DampingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[inline]
pub fn unshifted_none(r: f64, _alpha: f64) -> (f64, f64) {
    let v = 1.0 / r;
    (v, v * v)
}

#[inline]
pub fn unshifted_debye(r: f64, alpha: f64) -> (f64, f64) {
    let ar = alpha * r;
    let inv_r = 1.0 / r;
    let v = (-ar).exp() * inv_r;
    (v, inv_r * (1.0 + ar) * v)
}

#[inline]
pub fn unshifted_gauss(r: f64, alpha: f64) -> (f64, f64) {
    let ar2 = (alpha * r) * (alpha * r);
    let inv_r = 1.0 / r;
    let v = (-ar2).exp() * inv_r;
    (v, inv_r * (1.0 + 2.0 * ar2) * v)
}

#[inline]
pub fn unshifted_erfc(r: f64, alpha: f64) -> (f64, f64) {
    let ar = alpha * r;
    let gauss_over_r = (-ar * ar).exp() / r;
    let t = 1.0 / (1.0 + EWALD_P * ar);
    let v = t * (A1 + t * (A2 + t * (A3 + t * (A4 + t * A5)))) * gauss_over_r;
    let f = v / r + FRAC_2_SQRT_PI * alpha * gauss_over_r;
    (v, f)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn approx_equal(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    fn numerical_force(kernel: DampingFn, r: f64, alpha: f64) -> f64 {
        let h = 1e-5;
        let (v_plus, _) = kernel(r + h, alpha);
        let (v_minus, _) = kernel(r - h, alpha);
        -(v_plus - v_minus) / (2.0 * h)
    }

    #[test]
    fn none_kernel_returns_bare_coulomb_shape() {
        let (v, f) = unshifted_none(2.0, 0.3);
        assert!(approx_equal(v, 0.5, TOLERANCE));
        assert!(approx_equal(f, 0.25, TOLERANCE));
    }

    #[test]
    fn debye_and_gauss_reduce_to_bare_coulomb_at_zero_alpha() {
        for kernel in [unshifted_debye as DampingFn, unshifted_gauss] {
            let (v, f) = kernel(2.5, 0.0);
            let (v0, f0) = unshifted_none(2.5, 0.0);
            assert!(approx_equal(v, v0, TOLERANCE));
            assert!(approx_equal(f, f0, TOLERANCE));
        }
    }

    #[test]
    fn erfc_kernel_converges_to_bare_coulomb_as_alpha_vanishes() {
        for r in [0.8, 2.0, 7.5, 12.0] {
            let (v, f) = unshifted_erfc(r, 1e-9);
            let (v0, f0) = unshifted_none(r, 0.0);
            assert!(((v - v0) / v0).abs() < 1e-6, "v mismatch at r = {r}");
            assert!(((f - f0) / f0).abs() < 1e-6, "f mismatch at r = {r}");
        }
    }

    #[test]
    fn erfc_kernel_matches_reference_erfc_value() {
        // erfc(0.5) = 0.4795001221869535
        let (v, _) = unshifted_erfc(1.0, 0.5);
        assert!(approx_equal(v, 0.479_500_122_186_953_5, 2e-7));
    }

    #[test]
    fn force_shapes_are_negative_derivatives_of_potential_shapes() {
        let alpha = 0.2;
        for kind in [
            DampingKind::None,
            DampingKind::Debye,
            DampingKind::Gauss,
            DampingKind::Erfc,
        ] {
            let kernel = kind.kernel();
            for r in [1.5, 3.0, 6.0, 9.5] {
                let (_, f) = kernel(r, alpha);
                let expected = numerical_force(kernel, r, alpha);
                assert!(
                    approx_equal(f, expected, 1e-5),
                    "{kind}: f = {f}, expected {expected} at r = {r}"
                );
            }
        }
    }

    #[test]
    fn keywords_parse_and_round_trip_through_codes() {
        for kind in [
            DampingKind::None,
            DampingKind::Debye,
            DampingKind::Gauss,
            DampingKind::Erfc,
        ] {
            assert_eq!(kind.keyword().parse::<DampingKind>(), Ok(kind));
            assert_eq!(DampingKind::from_code(kind.code()), Some(kind));
        }
        assert!("ewald".parse::<DampingKind>().is_err());
        assert_eq!(DampingKind::from_code(7), None);
    }

    #[test]
    fn default_kind_is_erfc() {
        assert_eq!(DampingKind::default(), DampingKind::Erfc);
    }
}
