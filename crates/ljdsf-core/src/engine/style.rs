use super::comm::Communicator;
use super::config::{CoeffCommand, ConfigError, GlobalSettings, LoopSettings, ModifyCommand};
use super::error::EngineError;
use super::tally::TallySink;
use super::tasks;
use crate::core::forcefield::damping::DampingKind;
use crate::core::forcefield::kernel::{DsfCoulomb, PairOutcome};
use crate::core::forcefield::mixing::MixingRule;
use crate::core::forcefield::params::{CoeffRecord, PairCoeff, PairParams, ParameterTable};
use crate::core::forcefield::shift::ShiftConstants;
use crate::core::forcefield::tail::TailCorrection;
use crate::core::io::restart::{GlobalRecord, RestartRecord};
use crate::core::models::neighbor::NeighborList;
use crate::core::models::particles::ParticleStore;
use nalgebra::Vector3;
use std::io::{Read, Write};
use tracing::{debug, info, instrument, warn};

/// Result of an initialization pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitSummary {
    /// Largest total interaction cutoff over all type pairs; the neighbor list must cover it.
    pub max_cutoff: f64,
    /// Zero unless tail corrections are enabled.
    pub tail: TailCorrection,
}

/// Constants resolved by [`LjCutCoulDsf::init`] and read by the interaction loop.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Prepared {
    pub coulomb: DsfCoulomb,
    pub settings: LoopSettings,
    pub self_energy: bool,
}

/// The Lennard-Jones plus damped-shifted-force pair style.
///
/// Owns the per-type-pair parameter table and every global scalar. Any configuration change
/// discards the constants derived by the last [`init`](Self::init), so the interaction loop
/// can never run on stale shift or self-energy values.
#[derive(Debug, Clone)]
pub struct LjCutCoulDsf {
    ntypes: usize,
    table: ParameterTable,
    alpha: f64,
    cut_lj_global: f64,
    cut_coul: f64,
    damping: DampingKind,
    self_energy: bool,
    mixing: MixingRule,
    offset: bool,
    tail: bool,
    configured: bool,
    prepared: Option<Prepared>,
}

impl LjCutCoulDsf {
    pub fn new(ntypes: usize) -> Self {
        Self {
            ntypes,
            table: ParameterTable::new(ntypes),
            alpha: 0.0,
            cut_lj_global: 0.0,
            cut_coul: 0.0,
            damping: DampingKind::default(),
            self_energy: true,
            mixing: MixingRule::default(),
            offset: false,
            tail: false,
            configured: false,
            prepared: None,
        }
    }

    pub fn ntypes(&self) -> usize {
        self.ntypes
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn lj_cutoff_global(&self) -> f64 {
        self.cut_lj_global
    }

    /// The system-wide Coulomb cutoff.
    pub fn coulomb_cutoff(&self) -> f64 {
        self.cut_coul
    }

    pub fn damping(&self) -> DampingKind {
        self.damping
    }

    pub fn self_energy_enabled(&self) -> bool {
        self.self_energy
    }

    pub fn mixing_rule(&self) -> MixingRule {
        self.mixing
    }

    pub fn offset_enabled(&self) -> bool {
        self.offset
    }

    pub fn tail_enabled(&self) -> bool {
        self.tail
    }

    pub fn table(&self) -> &ParameterTable {
        &self.table
    }

    pub fn is_initialized(&self) -> bool {
        self.prepared.is_some()
    }

    /// Applies the global settings command. The style is left untouched on error.
    ///
    /// Re-issuing settings resets the LJ cutoff of every explicitly set unlike pair to the new
    /// global LJ cutoff. Like pairs keep their own cutoff.
    pub fn settings(&mut self, args: &[&str]) -> Result<(), ConfigError> {
        let parsed = GlobalSettings::parse(args)?;

        self.alpha = parsed.alpha;
        self.cut_lj_global = parsed.cut_lj_global;
        self.cut_coul = parsed.cut_coul;
        self.self_energy = parsed.self_energy;
        self.damping = parsed.damping;

        for i in 1..=self.ntypes {
            for j in i + 1..=self.ntypes {
                if self.table.is_set(i, j) {
                    self.table.set_cut_lj(i, j, self.cut_lj_global);
                }
            }
        }

        if self.damping == DampingKind::None && self.alpha != 0.0 {
            warn!(
                alpha = self.alpha,
                "Damping strength is ignored with 'damp none'"
            );
        }
        info!(
            alpha = self.alpha,
            cut_lj = self.cut_lj_global,
            cut_coul = self.cut_coul,
            damping = %self.damping,
            self_energy = self.self_energy,
            "Applied global pair settings"
        );

        self.configured = true;
        self.prepared = None;
        Ok(())
    }

    /// Applies one per-pair coefficient command and returns the number of pairs it set.
    pub fn coeff(&mut self, args: &[&str]) -> Result<usize, ConfigError> {
        if !self.configured {
            return Err(ConfigError::SettingsRequired);
        }
        let command = CoeffCommand::parse(args, self.ntypes)?;
        let coeff = PairCoeff {
            epsilon: command.epsilon,
            sigma: command.sigma,
            cut_lj: command.cut_lj.unwrap_or(self.cut_lj_global),
        };

        let mut count = 0;
        for (i, j) in command.pairs() {
            self.table.set_explicit(i, j, coeff);
            count += 1;
        }
        if count == 0 {
            return Err(ConfigError::NoPairsMatched);
        }

        debug!(count, ?coeff, "Set explicit pair coefficients");
        self.prepared = None;
        Ok(count)
    }

    /// Applies coefficient rows loaded from a table file, in file order.
    pub fn coeff_records(&mut self, records: &[CoeffRecord]) -> Result<usize, ConfigError> {
        let mut total = 0;
        for record in records {
            let args = record.to_args();
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            total += self.coeff(&args)?;
        }
        Ok(total)
    }

    /// Applies the flags a host would otherwise own: `mix`, `shift` and `tail`.
    pub fn modify(&mut self, args: &[&str]) -> Result<(), ConfigError> {
        let command = ModifyCommand::parse(args)?;
        if let Some(mixing) = command.mixing {
            self.mixing = mixing;
        }
        if let Some(offset) = command.offset {
            self.offset = offset;
        }
        if let Some(tail) = command.tail {
            self.tail = tail;
        }
        info!(mix = %self.mixing, shift = self.offset, tail = self.tail, "Modified pair flags");
        self.prepared = None;
        Ok(())
    }

    /// Derives every per-pair parameter and the shift/self-energy constants.
    ///
    /// Must be called after the last configuration change and before the interaction loop.
    /// With tail corrections enabled, per-type particle counts are summed over all shards.
    #[instrument(skip_all, name = "pair_init")]
    pub fn init<P: ParticleStore, C: Communicator>(
        &mut self,
        particles: &P,
        settings: &LoopSettings,
        comm: &C,
    ) -> Result<InitSummary, EngineError> {
        if !self.configured {
            return Err(ConfigError::SettingsRequired.into());
        }
        if !particles.has_charges() {
            return Err(ConfigError::MissingCharges.into());
        }
        if let Some(index) = (0..particles.len())
            .find(|&k| !(1..=self.ntypes).contains(&particles.particle_type(k)))
        {
            return Err(ConfigError::ParticleType {
                index,
                type_id: particles.particle_type(index),
                ntypes: self.ntypes,
            }
            .into());
        }
        self.table
            .all_diagonals_set()
            .map_err(ConfigError::MissingCoefficients)?;

        let shift = ShiftConstants::compute(
            self.damping,
            self.alpha,
            self.cut_coul,
            settings.coulomb_constant,
        );
        debug!(
            f_shift = shift.f_shift,
            e_shift = shift.e_shift,
            e_self = shift.e_self,
            "Derived DSF shift constants"
        );

        let counts = if self.tail {
            let mut counts = particles.local_type_counts(self.ntypes);
            comm.all_reduce_sum(&mut counts);
            Some(counts)
        } else {
            None
        };

        let mut max_cutoff: f64 = 0.0;
        let mut tail = TailCorrection::default();
        for i in 1..=self.ntypes {
            for j in i..=self.ntypes {
                let (cutoff, pair_tail) = self.init_one(i, j, counts.as_deref());
                max_cutoff = max_cutoff.max(cutoff);
                if let Some(pair_tail) = pair_tail {
                    tail += pair_tail;
                    if i != j {
                        tail += pair_tail;
                    }
                }
            }
        }

        self.prepared = Some(Prepared {
            coulomb: DsfCoulomb {
                damping: self.damping.kernel(),
                alpha: self.alpha,
                shift,
                coulomb_constant: settings.coulomb_constant,
            },
            settings: *settings,
            self_energy: self.self_energy,
        });

        info!(
            max_cutoff,
            etail = tail.energy,
            ptail = tail.pressure,
            "Pair style initialized"
        );
        Ok(InitSummary { max_cutoff, tail })
    }

    /// Derives parameters for one `i <= j` pair, mixing them from the like pairs when the pair
    /// was never set explicitly. Returns the total cutoff and, when counts are given, the tail
    /// correction of the pair.
    fn init_one(
        &mut self,
        i: usize,
        j: usize,
        counts: Option<&[f64]>,
    ) -> (f64, Option<TailCorrection>) {
        if !self.table.is_set(i, j) {
            let (ci, cj) = (self.table.coeff(i, i), self.table.coeff(j, j));
            let mixed = PairCoeff {
                epsilon: self
                    .mixing
                    .mix_energy(ci.epsilon, cj.epsilon, ci.sigma, cj.sigma),
                sigma: self.mixing.mix_distance(ci.sigma, cj.sigma),
                cut_lj: self.mixing.mix_distance(ci.cut_lj, cj.cut_lj),
            };
            debug!(i, j, ?mixed, rule = %self.mixing, "Mixed pair coefficients");
            self.table.set_mixed(i, j, mixed);
        }

        let coeff = self.table.coeff(i, j);
        let params = PairParams::derive(coeff, self.cut_coul, self.offset);
        self.table.set_derived(i, j, params);

        let tail = counts.map(|counts| {
            TailCorrection::for_pair(
                counts[i - 1],
                counts[j - 1],
                coeff.epsilon,
                coeff.sigma,
                coeff.cut_lj,
            )
        });
        (params.cutoff(), tail)
    }

    /// Runs the interaction loop once: accumulates forces into `forces` (indexed like the
    /// particle store, owned and ghost) and reports energies/virial to `tally` when
    /// `eflag`/`vflag` are set.
    pub fn compute<P: ParticleStore, T: TallySink>(
        &self,
        particles: &P,
        list: &NeighborList,
        forces: &mut [Vector3<f64>],
        tally: &mut T,
        eflag: bool,
        vflag: bool,
    ) -> Result<(), EngineError> {
        let prepared = self.prepared.as_ref().ok_or(EngineError::NotInitialized)?;
        if forces.len() < particles.len() {
            return Err(EngineError::ForceBufferSize {
                expected: particles.len(),
                found: forces.len(),
            });
        }
        tasks::compute::run(
            prepared,
            &self.table,
            particles,
            list,
            forces,
            tally,
            eflag,
            vflag,
        );
        Ok(())
    }

    /// Energy and scalar force for a single pair of types at squared separation `rsq`,
    /// computed with the same formulas as the interaction loop. Both types must lie in
    /// `1..=ntypes`.
    #[allow(clippy::too_many_arguments)]
    pub fn single(
        &self,
        itype: usize,
        jtype: usize,
        rsq: f64,
        qi: f64,
        qj: f64,
        factor_coul: f64,
        factor_lj: f64,
    ) -> Result<PairOutcome, EngineError> {
        let prepared = self.prepared.as_ref().ok_or(EngineError::NotInitialized)?;
        let valid = 1..=self.ntypes;
        if !valid.contains(&itype) || !valid.contains(&jtype) {
            return Err(EngineError::TypePair {
                itype,
                jtype,
                ntypes: self.ntypes,
            });
        }
        let params = self.table.params(itype, jtype);
        Ok(prepared
            .coulomb
            .evaluate(params, rsq, factor_lj, factor_coul, qi, qj, true))
    }

    /// Captures the global settings and every explicitly set pair.
    pub fn restart_record(&self) -> RestartRecord {
        RestartRecord {
            global: GlobalRecord {
                alpha: self.alpha,
                cut_lj_global: self.cut_lj_global,
                cut_coul: self.cut_coul,
                offset_flag: self.offset as i32,
                mix_flag: self.mixing.code(),
                tail_flag: self.tail as i32,
                self_flag: self.self_energy as i32,
                damping: self.damping.code(),
            },
            pairs: self
                .table
                .upper_triangle()
                .map(|(_, _, coeff)| coeff)
                .collect(),
        }
    }

    pub fn write_restart(&self, writer: &mut impl Write) -> Result<(), EngineError> {
        self.restart_record().write_to(writer)?;
        Ok(())
    }

    /// Restores the configuration from a restart record.
    ///
    /// Only the root rank reads from `reader`; other ranks receive the record through
    /// `comm` and may pass any reader, such as [`std::io::empty`]. Derived and mixed
    /// parameters are rebuilt by the next [`init`](Self::init).
    pub fn read_restart<C: Communicator>(
        &mut self,
        reader: &mut impl Read,
        comm: &C,
    ) -> Result<(), EngineError> {
        let mut bytes = if comm.is_root() {
            RestartRecord::read_from(reader, self.ntypes)?.to_bytes()?
        } else {
            Vec::new()
        };
        comm.broadcast_bytes(0, &mut bytes);
        let record = RestartRecord::from_bytes(&bytes, self.ntypes)?;
        self.apply_restart(record)
    }

    fn apply_restart(&mut self, record: RestartRecord) -> Result<(), EngineError> {
        let global = record.global;
        let damping = global.damping_kind()?;
        let mixing = global.mixing_rule()?;

        self.alpha = global.alpha;
        self.cut_lj_global = global.cut_lj_global;
        self.cut_coul = global.cut_coul;
        self.offset = global.offset_flag != 0;
        self.mixing = mixing;
        self.tail = global.tail_flag != 0;
        self.self_energy = global.self_flag != 0;
        self.damping = damping;

        self.table = ParameterTable::new(self.ntypes);
        let slots = (1..=self.ntypes).flat_map(|i| (i..=self.ntypes).map(move |j| (i, j)));
        for ((i, j), coeff) in slots.zip(record.pairs) {
            if let Some(coeff) = coeff {
                self.table.set_explicit(i, j, coeff);
            }
        }

        info!(ntypes = self.ntypes, "Restored pair style from restart record");
        self.configured = true;
        self.prepared = None;
        Ok(())
    }
}
