use crate::core::forcefield::params::load_coeff_table;
use crate::core::forcefield::tail::TailCorrection;
use crate::core::forcefield::term::EnergyTerm;
use crate::core::io::restart::RestartError;
use crate::core::models::neighbor::{NeighborList, SpecialPairs};
use crate::core::models::particles::{ParticleStore, Particles};
use crate::engine::comm::SingleProcess;
use crate::engine::config::LoopSettings;
use crate::engine::error::EngineError;
use crate::engine::style::LjCutCoulDsf;
use crate::engine::tally::EnergyVirialTally;
use nalgebra::Vector3;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Commands that configure the pair style, applied in this order: restart record, global
/// settings, coefficient table file, inline coefficients, modify flags.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PairStyleConfig {
    pub ntypes: usize,
    pub restart: Option<PathBuf>,
    pub settings: Vec<String>,
    pub coeff_table: Option<PathBuf>,
    pub coeffs: Vec<Vec<String>>,
    pub modify: Vec<String>,
}

/// Everything needed to evaluate one configuration of a non-distributed system.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemDescription {
    pub style: PairStyleConfig,
    pub loop_settings: LoopSettings,
    pub particles: Particles,
    pub special: SpecialPairs,
}

#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Pair energies; the Coulomb part includes self energies.
    pub energy: EnergyTerm,
    pub self_energy: f64,
    /// `xx, yy, zz, xy, xz, yz`
    pub virial: [f64; 6],
    /// Tail corrections, not yet divided by the volume.
    pub tail: TailCorrection,
    pub max_cutoff: f64,
    pub pair_count: usize,
    /// Force on every particle, owned then ghost.
    pub forces: Vec<Vector3<f64>>,
    /// The configured and initialized style, e.g. for writing a restart record.
    pub style: LjCutCoulDsf,
}

fn as_strs(args: &[String]) -> Vec<&str> {
    args.iter().map(String::as_str).collect()
}

/// Builds the pair style described by `config` without initializing it.
pub fn configure_style(config: &PairStyleConfig) -> Result<LjCutCoulDsf, EngineError> {
    let mut style = LjCutCoulDsf::new(config.ntypes);

    if let Some(path) = &config.restart {
        let file = File::open(path).map_err(RestartError::from)?;
        style.read_restart(&mut BufReader::new(file), &SingleProcess)?;
        info!(path = %path.display(), "Loaded pair style from restart record");
    }
    if !config.settings.is_empty() {
        style.settings(&as_strs(&config.settings))?;
    }
    if let Some(path) = &config.coeff_table {
        let records = load_coeff_table(path)?;
        let count = style.coeff_records(&records)?;
        info!(path = %path.display(), pairs = count, "Applied coefficient table");
    }
    for coeff in &config.coeffs {
        style.coeff(&as_strs(coeff))?;
    }
    if !config.modify.is_empty() {
        style.modify(&as_strs(&config.modify))?;
    }
    Ok(style)
}

/// Configures and initializes the pair style, builds a half neighbor list covering the largest
/// interaction cutoff, and evaluates forces, energies and the virial once.
#[instrument(skip_all, name = "evaluate_workflow")]
pub fn run(system: &SystemDescription) -> Result<Evaluation, EngineError> {
    let mut style = configure_style(&system.style)?;
    let summary = style.init(&system.particles, &system.loop_settings, &SingleProcess)?;

    let list = NeighborList::build_half(
        &system.particles,
        summary.max_cutoff,
        &system.special,
        &system.loop_settings.special,
    );
    info!(
        particles = system.particles.len(),
        pairs = list.num_pairs(),
        cutoff = summary.max_cutoff,
        "Built neighbor list"
    );

    let mut forces = vec![Vector3::zeros(); system.particles.len()];
    let mut tally = EnergyVirialTally::new(true, true);
    style.compute(&system.particles, &list, &mut forces, &mut tally, true, true)?;

    info!(
        vdw = tally.energy.vdw,
        coulomb = tally.energy.coulomb,
        total = tally.energy.total(),
        "Evaluation complete"
    );

    Ok(Evaluation {
        energy: tally.energy,
        self_energy: tally.self_energy,
        virial: tally.virial,
        tail: summary.tail,
        max_cutoff: summary.max_cutoff,
        pair_count: list.num_pairs(),
        forces,
        style,
    })
}
