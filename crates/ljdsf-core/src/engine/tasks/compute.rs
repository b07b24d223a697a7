use crate::core::forcefield::params::ParameterTable;
use crate::core::models::neighbor::{NeighborList, neighbor_index, special_bits};
use crate::core::models::particles::ParticleStore;
use crate::engine::style::Prepared;
use crate::engine::tally::TallySink;
use nalgebra::Vector3;
use tracing::{debug, instrument};

#[instrument(skip_all, name = "pair_compute_task")]
#[allow(clippy::too_many_arguments)]
pub(crate) fn run<P: ParticleStore, T: TallySink>(
    prepared: &Prepared,
    table: &ParameterTable,
    particles: &P,
    list: &NeighborList,
    forces: &mut [Vector3<f64>],
    tally: &mut T,
    eflag: bool,
    vflag: bool,
) {
    let evflag = eflag || vflag;
    let nlocal = particles.nlocal();
    let newton_pair = prepared.settings.newton_pair;
    let special = &prepared.settings.special;
    let coulomb = &prepared.coulomb;

    // Self energy belongs to every owned particle, listed or not.
    if eflag && prepared.self_energy {
        for i in 0..nlocal {
            let e_self = coulomb
                .shift
                .self_energy(particles.charge(i), coulomb.coulomb_constant);
            tally.tally_self(i, e_self);
        }
    }

    for (i, neighbors) in list.iter() {
        let qi = particles.charge(i);
        let xi = particles.position(i);
        let itype = particles.particle_type(i);

        for &entry in neighbors {
            let level = special_bits(entry);
            let j = neighbor_index(entry);

            let del = xi - particles.position(j);
            let rsq = del.norm_squared();
            let params = table.params(itype, particles.particle_type(j));
            if rsq >= params.cutsq {
                continue;
            }

            let outcome = coulomb.evaluate(
                params,
                rsq,
                special.lj[level],
                special.coul[level],
                qi,
                particles.charge(j),
                eflag,
            );

            let f = del * outcome.fpair;
            forces[i] += f;
            if newton_pair || j < nlocal {
                forces[j] -= f;
            }

            if evflag {
                tally.tally_pair(
                    i,
                    j,
                    nlocal,
                    newton_pair,
                    outcome.evdwl,
                    outcome.ecoul,
                    outcome.fpair,
                    del,
                );
            }
        }
    }

    debug!(
        owned = list.inum(),
        pairs = list.num_pairs(),
        "Accumulated pair forces"
    );
}

#[cfg(test)]
mod tests {
    use crate::core::forcefield::term::EnergyTerm;
    use crate::core::models::neighbor::{NeighborList, SpecialFactors, SpecialPairs};
    use crate::core::models::particles::{ParticleStore, Particles};
    use crate::engine::comm::SingleProcess;
    use crate::engine::config::{LoopSettings, LoopSettingsBuilder};
    use crate::engine::error::EngineError;
    use crate::engine::style::LjCutCoulDsf;
    use crate::engine::tally::{EnergyVirialTally, TallySink};
    use nalgebra::{Point3, Vector3};

    const TOLERANCE: f64 = 1e-9;

    #[derive(Default)]
    struct CountingTally {
        pairs: usize,
        selves: usize,
    }

    impl TallySink for CountingTally {
        fn tally_pair(
            &mut self,
            _i: usize,
            _j: usize,
            _nlocal: usize,
            _newton_pair: bool,
            _evdwl: f64,
            _ecoul: f64,
            _fpair: f64,
            _del: Vector3<f64>,
        ) {
            self.pairs += 1;
        }

        fn tally_self(&mut self, _i: usize, _energy: f64) {
            self.selves += 1;
        }
    }

    fn lj_units() -> LoopSettings {
        LoopSettingsBuilder::new().units("lj").build().unwrap()
    }

    fn small_cluster() -> Particles {
        let mut particles = Particles::new();
        particles.push_local(Point3::new(0.0, 0.0, 0.0), 1, 0.8);
        particles.push_local(Point3::new(1.1, 0.2, -0.1), 2, -0.8);
        particles.push_local(Point3::new(0.3, 1.4, 0.5), 1, 0.4);
        particles.push_local(Point3::new(-1.2, 0.4, 0.9), 2, -0.4);
        particles
    }

    fn configured_style(settings_args: &[&str]) -> LjCutCoulDsf {
        let mut style = LjCutCoulDsf::new(2);
        style.settings(settings_args).unwrap();
        style.coeff(&["1", "1", "0.2", "1.0"]).unwrap();
        style.coeff(&["2", "2", "0.1", "1.1"]).unwrap();
        style.modify(&["shift", "yes"]).unwrap();
        style
    }

    fn evaluate(
        style: &mut LjCutCoulDsf,
        particles: &Particles,
        settings: &LoopSettings,
        special: &SpecialPairs,
    ) -> (Vec<Vector3<f64>>, EnergyVirialTally) {
        let summary = style.init(particles, settings, &SingleProcess).unwrap();
        let list =
            NeighborList::build_half(particles, summary.max_cutoff, special, &settings.special);
        let mut forces = vec![Vector3::zeros(); particles.len()];
        let mut tally = EnergyVirialTally::new(true, true);
        style
            .compute(particles, &list, &mut forces, &mut tally, true, true)
            .unwrap();
        (forces, tally)
    }

    #[test]
    fn compute_requires_initialization() {
        let style = configured_style(&["0.3", "3.0"]);
        let particles = small_cluster();
        let mut forces = vec![Vector3::zeros(); particles.len()];
        let result = style.compute(
            &particles,
            &NeighborList::new(),
            &mut forces,
            &mut EnergyVirialTally::default(),
            true,
            false,
        );
        assert!(matches!(result, Err(EngineError::NotInitialized)));
    }

    #[test]
    fn compute_rejects_short_force_buffer() {
        let mut style = configured_style(&["0.3", "3.0"]);
        let particles = small_cluster();
        style.init(&particles, &lj_units(), &SingleProcess).unwrap();
        let mut forces = vec![Vector3::zeros(); 2];
        let result = style.compute(
            &particles,
            &NeighborList::new(),
            &mut forces,
            &mut EnergyVirialTally::default(),
            true,
            false,
        );
        assert!(matches!(
            result,
            Err(EngineError::ForceBufferSize {
                expected: 4,
                found: 2
            })
        ));
    }

    #[test]
    fn forces_on_owned_particles_sum_to_zero() {
        let mut style = configured_style(&["0.3", "3.0"]);
        let particles = small_cluster();
        let (forces, _) = evaluate(&mut style, &particles, &lj_units(), &SpecialPairs::new());
        let net: Vector3<f64> = forces.iter().sum();
        assert!(net.norm() < TOLERANCE, "net force {net}");
    }

    #[test]
    fn pair_energies_match_single_pair_evaluation() {
        let mut style = configured_style(&["0.3", "3.0", "self", "no"]);
        let particles = small_cluster();
        let (_, tally) = evaluate(&mut style, &particles, &lj_units(), &SpecialPairs::new());

        let mut expected = EnergyTerm::default();
        for i in 0..particles.len() {
            for j in i + 1..particles.len() {
                let rsq = (particles.position(i) - particles.position(j)).norm_squared();
                let outcome = style
                    .single(
                        particles.particle_type(i),
                        particles.particle_type(j),
                        rsq,
                        particles.charge(i),
                        particles.charge(j),
                        1.0,
                        1.0,
                    )
                    .unwrap();
                expected += EnergyTerm::new(outcome.evdwl, outcome.ecoul);
            }
        }
        assert!((tally.energy.vdw - expected.vdw).abs() < TOLERANCE);
        assert!((tally.energy.coulomb - expected.coulomb).abs() < TOLERANCE);
        assert_eq!(tally.self_energy, 0.0);
    }

    #[test]
    fn forces_are_negative_energy_gradient() {
        let settings = lj_units();
        let base = small_cluster();
        let mut style = configured_style(&["0.3", "3.0", "damp", "erfc"]);
        let (forces, _) = evaluate(&mut style, &base, &settings, &SpecialPairs::new());

        let energy_with_offset = |dx: Vector3<f64>| {
            let mut moved = Particles::new();
            for k in 0..base.len() {
                let shift = if k == 1 { dx } else { Vector3::zeros() };
                moved.push_local(
                    base.position(k) + shift,
                    base.particle_type(k),
                    base.charge(k),
                );
            }
            let mut style = configured_style(&["0.3", "3.0", "damp", "erfc"]);
            let (_, tally) = evaluate(&mut style, &moved, &settings, &SpecialPairs::new());
            tally.energy.total()
        };

        let h = 1e-6;
        for axis in 0..3 {
            let mut dx = Vector3::zeros();
            dx[axis] = h;
            let numeric = -(energy_with_offset(dx) - energy_with_offset(-dx)) / (2.0 * h);
            assert!(
                (forces[1][axis] - numeric).abs() < 1e-5,
                "axis {axis}: analytic {}, numeric {numeric}",
                forces[1][axis]
            );
        }
    }

    #[test]
    fn undamped_coulomb_with_self_disabled_reduces_to_shifted_bare_form() {
        let mut style = LjCutCoulDsf::new(1);
        style
            .settings(&["0.0", "0.5", "4.0", "self", "no", "damp", "none"])
            .unwrap();
        style.coeff(&["1", "1", "0.0", "1.0"]).unwrap();

        let mut particles = Particles::new();
        particles.push_local(Point3::origin(), 1, 1.5);
        particles.push_local(Point3::new(0.0, 2.5, 0.0), 1, -0.5);

        let settings = lj_units();
        let summary = style.init(&particles, &settings, &SingleProcess).unwrap();
        let list = NeighborList::build_half(
            &particles,
            summary.max_cutoff,
            &SpecialPairs::new(),
            &settings.special,
        );
        let mut forces = vec![Vector3::zeros(); 2];
        let mut counter = CountingTally::default();
        style
            .compute(&particles, &list, &mut forces, &mut counter, true, true)
            .unwrap();
        assert_eq!(counter.selves, 0);
        assert_eq!(counter.pairs, 1);

        let (_, tally) = evaluate(&mut style, &particles, &settings, &SpecialPairs::new());
        let (r, rc, qq) = (2.5, 4.0, 1.5 * -0.5);
        let expected = qq * (1.0 / r - 2.0 / rc + r / (rc * rc));
        assert!((tally.energy.coulomb - expected).abs() < TOLERANCE);
        assert_eq!(tally.energy.vdw, 0.0);
    }

    #[test]
    fn self_energy_is_tallied_once_per_owned_particle() {
        let mut style = configured_style(&["0.3", "3.0"]);
        let mut particles = small_cluster();
        particles.push_ghost(Point3::new(2.0, 2.0, 2.0), 1, 1.0);
        let settings = lj_units();
        let summary = style.init(&particles, &settings, &SingleProcess).unwrap();
        let list = NeighborList::build_half(
            &particles,
            summary.max_cutoff,
            &SpecialPairs::new(),
            &settings.special,
        );

        let mut counter = CountingTally::default();
        let mut forces = vec![Vector3::zeros(); particles.len()];
        style
            .compute(&particles, &list, &mut forces, &mut counter, true, false)
            .unwrap();
        assert_eq!(counter.selves, 4);

        let (_, tally) = evaluate(&mut style, &particles, &settings, &SpecialPairs::new());
        assert!(tally.self_energy < 0.0);

        let mut no_energy = CountingTally::default();
        style
            .compute(&particles, &list, &mut forces, &mut no_energy, false, true)
            .unwrap();
        assert_eq!(no_energy.selves, 0);
    }

    #[test]
    fn self_energy_covers_owned_particles_missing_from_the_list() {
        let mut style = LjCutCoulDsf::new(1);
        style.settings(&["0.3", "2.5", "damp", "erfc"]).unwrap();
        style.coeff(&["1", "1", "1.0", "1.0"]).unwrap();

        let mut particles = Particles::new();
        particles.push_local(Point3::origin(), 1, 1.0);
        particles.push_local(Point3::new(1.0, 0.0, 0.0), 1, -1.0);
        style.init(&particles, &lj_units(), &SingleProcess).unwrap();

        let empty = NeighborList::new();
        let mut forces = vec![Vector3::zeros(); 2];
        let mut tally = EnergyVirialTally::new(true, false);
        style
            .compute(&particles, &empty, &mut forces, &mut tally, true, false)
            .unwrap();
        assert!(tally.self_energy < 0.0);

        let mut counter = CountingTally::default();
        style
            .compute(&particles, &empty, &mut forces, &mut counter, true, false)
            .unwrap();
        assert_eq!(counter.selves, 2);
        assert_eq!(counter.pairs, 0);
    }

    #[test]
    fn ghost_neighbors_receive_reaction_force_only_with_newton_pair() {
        let mut particles = Particles::new();
        particles.push_local(Point3::origin(), 1, 0.5);
        particles.push_ghost(Point3::new(1.2, 0.0, 0.0), 2, -0.5);

        let without_newton = LoopSettingsBuilder::new()
            .units("lj")
            .newton_pair(false)
            .build()
            .unwrap();
        let mut style = configured_style(&["0.3", "3.0"]);
        let (forces, tally) = evaluate(&mut style, &particles, &without_newton, &SpecialPairs::new());
        assert_ne!(forces[0], Vector3::zeros());
        assert_eq!(forces[1], Vector3::zeros());
        let half_pair = tally.energy.vdw;

        let mut style = configured_style(&["0.3", "3.0"]);
        let (forces, tally) = evaluate(&mut style, &particles, &lj_units(), &SpecialPairs::new());
        assert!((forces[0] + forces[1]).norm() < TOLERANCE);
        assert!((tally.energy.vdw - 2.0 * half_pair).abs() < TOLERANCE);
    }

    #[test]
    fn special_factors_scale_bonded_pairs() {
        let mut particles = Particles::new();
        particles.push_local(Point3::origin(), 1, 0.5);
        particles.push_local(Point3::new(1.2, 0.0, 0.0), 1, 0.5);
        let mut special = SpecialPairs::new();
        special.insert(0, 1, 3);

        let plain = LoopSettings {
            special: SpecialFactors::new([1.0; 3], [1.0; 3]),
            ..lj_units()
        };
        let halved = LoopSettings {
            special: SpecialFactors::new([0.0, 0.0, 0.5], [0.0, 0.0, 0.25]),
            ..lj_units()
        };

        let mut style = configured_style(&["0.3", "3.0", "self", "no"]);
        let (_, full) = evaluate(&mut style, &particles, &plain, &special);
        let (_, scaled) = evaluate(&mut style, &particles, &halved, &special);
        assert!((scaled.energy.vdw - 0.5 * full.energy.vdw).abs() < TOLERANCE);
        assert!((scaled.energy.coulomb - 0.25 * full.energy.coulomb).abs() < TOLERANCE);

        special.insert(0, 1, 1);
        let (forces, excluded) = evaluate(&mut style, &particles, &halved, &special);
        assert_eq!(excluded.energy, EnergyTerm::default());
        assert_eq!(forces[0], Vector3::zeros());
    }
}
