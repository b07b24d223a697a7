use crate::core::forcefield::term::EnergyTerm;
use nalgebra::Vector3;

/// Receives per-pair and per-particle contributions from the interaction loop.
pub trait TallySink {
    /// Reports one evaluated pair. `fpair` is the force divided by separation and `del` is
    /// `x_i - x_j`.
    #[allow(clippy::too_many_arguments)]
    fn tally_pair(
        &mut self,
        i: usize,
        j: usize,
        nlocal: usize,
        newton_pair: bool,
        evdwl: f64,
        ecoul: f64,
        fpair: f64,
        del: Vector3<f64>,
    );

    /// Reports the self-energy of owned particle `i`. Carries no force or virial.
    fn tally_self(&mut self, i: usize, energy: f64);
}

/// Global energy and virial accumulator.
///
/// When pairs straddle shard boundaries without Newton's third law, each side tallies half
/// of the pair so that the sum over shards counts it once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnergyVirialTally {
    pub eflag: bool,
    pub vflag: bool,
    /// Pair energies. The Coulomb part includes self energies.
    pub energy: EnergyTerm,
    /// Self-energy share of `energy.coulomb`.
    pub self_energy: f64,
    /// `xx, yy, zz, xy, xz, yz`
    pub virial: [f64; 6],
}

impl EnergyVirialTally {
    pub fn new(eflag: bool, vflag: bool) -> Self {
        Self {
            eflag,
            vflag,
            ..Self::default()
        }
    }

    pub fn pressure_trace(&self) -> f64 {
        self.virial[0] + self.virial[1] + self.virial[2]
    }
}

impl TallySink for EnergyVirialTally {
    fn tally_pair(
        &mut self,
        i: usize,
        j: usize,
        nlocal: usize,
        newton_pair: bool,
        evdwl: f64,
        ecoul: f64,
        fpair: f64,
        del: Vector3<f64>,
    ) {
        let weight = if newton_pair {
            1.0
        } else {
            0.5 * ((i < nlocal) as u8 + (j < nlocal) as u8) as f64
        };

        if self.eflag {
            self.energy += EnergyTerm::new(weight * evdwl, weight * ecoul);
        }

        if self.vflag {
            let w = weight * fpair;
            self.virial[0] += w * del.x * del.x;
            self.virial[1] += w * del.y * del.y;
            self.virial[2] += w * del.z * del.z;
            self.virial[3] += w * del.x * del.y;
            self.virial[4] += w * del.x * del.z;
            self.virial[5] += w * del.y * del.z;
        }
    }

    fn tally_self(&mut self, _i: usize, energy: f64) {
        if self.eflag {
            self.energy.coulomb += energy;
            self.self_energy += energy;
        }
    }
}
