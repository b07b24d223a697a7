use std::f64::consts::PI;
use std::ops::AddAssign;

/// Analytic long-range corrections for the 12-6 term truncated at the LJ cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TailCorrection {
    /// Energy, to be divided by the volume by the caller.
    pub energy: f64,
    /// Pressure contribution times volume.
    pub pressure: f64,
}

impl TailCorrection {
    /// Contribution of the `(i, j)` type pair given the global particle counts of both types.
    pub fn for_pair(count_i: f64, count_j: f64, epsilon: f64, sigma: f64, cut_lj: f64) -> Self {
        let sig2 = sigma * sigma;
        let sig6 = sig2 * sig2 * sig2;
        let rc3 = cut_lj * cut_lj * cut_lj;
        let rc6 = rc3 * rc3;
        let rc9 = rc3 * rc6;
        let prefactor = PI * count_i * count_j * epsilon * sig6 / (9.0 * rc9);
        Self {
            energy: 8.0 * prefactor * (sig6 - 3.0 * rc6),
            pressure: 16.0 * prefactor * (2.0 * sig6 - 3.0 * rc6),
        }
    }
}

impl AddAssign for TailCorrection {
    fn add_assign(&mut self, rhs: Self) {
        self.energy += rhs.energy;
        self.pressure += rhs.pressure;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Trapezoid rule for `int_rc^inf f(r) dr`, truncated far beyond the cutoff.
    fn integrate_from_cutoff(rc: f64, f: impl Fn(f64) -> f64) -> f64 {
        let upper = 60.0 * rc;
        let steps = 400_000;
        let h = (upper - rc) / steps as f64;
        let mut sum = 0.5 * (f(rc) + f(upper));
        for k in 1..steps {
            sum += f(rc + k as f64 * h);
        }
        sum * h
    }

    /// `2 pi N_i N_j int r^2 u(r) dr` for the 12-6 potential.
    fn integrated_energy(n_i: f64, n_j: f64, eps: f64, sigma: f64, rc: f64) -> f64 {
        let integral = integrate_from_cutoff(rc, |r| {
            let sr6 = (sigma / r).powi(6);
            r * r * 4.0 * eps * (sr6 * sr6 - sr6)
        });
        2.0 * PI * n_i * n_j * integral
    }

    /// `-(2 pi / 3) N_i N_j int r^3 u'(r) dr` for the 12-6 potential.
    fn integrated_pressure(n_i: f64, n_j: f64, eps: f64, sigma: f64, rc: f64) -> f64 {
        let integral = integrate_from_cutoff(rc, |r| {
            let sr6 = (sigma / r).powi(6);
            let du_dr = 4.0 * eps * (-12.0 * sr6 * sr6 + 6.0 * sr6) / r;
            r * r * r * du_dr
        });
        -(2.0 * PI / 3.0) * n_i * n_j * integral
    }

    #[test]
    fn energy_matches_numerical_integral() {
        let tail = TailCorrection::for_pair(100.0, 50.0, 0.2, 3.4, 8.5);
        let numeric = integrated_energy(100.0, 50.0, 0.2, 3.4, 8.5);
        assert!(
            ((tail.energy - numeric) / numeric).abs() < 1e-4,
            "analytic {} vs numeric {}",
            tail.energy,
            numeric
        );
    }

    #[test]
    fn pressure_matches_numerical_virial_integral() {
        let cases = [(100.0, 50.0, 0.2, 3.4, 8.5), (8.0, 8.0, 1.0, 1.0, 1.5)];
        for (n_i, n_j, eps, sigma, rc) in cases {
            let tail = TailCorrection::for_pair(n_i, n_j, eps, sigma, rc);
            let numeric = integrated_pressure(n_i, n_j, eps, sigma, rc);
            assert!(
                ((tail.pressure - numeric) / numeric).abs() < 1e-4,
                "analytic {} vs numeric {}",
                tail.pressure,
                numeric
            );
        }
    }

    #[test]
    fn corrections_are_attractive_for_typical_cutoffs() {
        let tail = TailCorrection::for_pair(10.0, 10.0, 1.0, 1.0, 2.5);
        assert!(tail.energy < 0.0);
        assert!(tail.pressure < 0.0);
    }

    #[test]
    fn corrections_vanish_without_particles() {
        let tail = TailCorrection::for_pair(0.0, 25.0, 1.0, 1.0, 2.5);
        assert_eq!(tail, TailCorrection::default());
    }

    #[test]
    fn add_assign_accumulates_both_terms() {
        let mut total = TailCorrection::default();
        total += TailCorrection {
            energy: -1.0,
            pressure: -2.0,
        };
        total += TailCorrection {
            energy: -0.5,
            pressure: 1.0,
        };
        assert_eq!(
            total,
            TailCorrection {
                energy: -1.5,
                pressure: -1.0
            }
        );
    }
}
