use crate::error::{CliError, Result};
use ljdsf::core::forcefield::term::EnergyTerm;
use ljdsf::core::io::restart::RestartRecord;
use ljdsf::workflows::evaluate::Evaluation;
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Serialize)]
pub struct TailReport {
    pub energy: f64,
    pub pressure: f64,
}

#[derive(Debug, Serialize)]
pub struct EvaluationReport {
    pub energy: EnergyTerm,
    pub total_energy: f64,
    pub self_energy: f64,
    pub virial: [f64; 6],
    pub tail: Option<TailReport>,
    pub max_cutoff: f64,
    pub pair_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forces: Option<Vec<[f64; 3]>>,
}

impl EvaluationReport {
    pub fn new(evaluation: &Evaluation, include_forces: bool) -> Self {
        let tail = evaluation.style.tail_enabled().then(|| TailReport {
            energy: evaluation.tail.energy,
            pressure: evaluation.tail.pressure,
        });
        let forces = include_forces.then(|| {
            evaluation
                .forces
                .iter()
                .map(|f| [f.x, f.y, f.z])
                .collect()
        });
        Self {
            energy: evaluation.energy,
            total_energy: evaluation.energy.total(),
            self_energy: evaluation.self_energy,
            virial: evaluation.virial,
            tail,
            max_cutoff: evaluation.max_cutoff,
            pair_count: evaluation.pair_count,
            forces,
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Pairs evaluated:     {}", self.pair_count);
        let _ = writeln!(out, "Largest cutoff:      {:.4}", self.max_cutoff);
        let _ = writeln!(out, "van der Waals:       {:.6}", self.energy.vdw);
        let _ = writeln!(out, "Coulomb:             {:.6}", self.energy.coulomb);
        let _ = writeln!(out, "  of which self:     {:.6}", self.self_energy);
        let _ = writeln!(out, "Total:               {:.6}", self.total_energy);
        let [xx, yy, zz, xy, xz, yz] = self.virial;
        let _ = writeln!(
            out,
            "Virial (xx yy zz xy xz yz): {xx:.6} {yy:.6} {zz:.6} {xy:.6} {xz:.6} {yz:.6}"
        );
        if let Some(tail) = &self.tail {
            let _ = writeln!(
                out,
                "Tail correction (x volume): energy {:.6}, pressure {:.6}",
                tail.energy, tail.pressure
            );
        }
        if let Some(forces) = &self.forces {
            let _ = writeln!(out, "Forces:");
            for (i, [fx, fy, fz]) in forces.iter().enumerate() {
                let _ = writeln!(out, "  {i:>6} {fx:>14.6} {fy:>14.6} {fz:>14.6}");
            }
        }
        out
    }
}

#[derive(Debug, Serialize)]
pub struct PairEntry {
    pub i: usize,
    pub j: usize,
    pub epsilon: f64,
    pub sigma: f64,
    pub cut_lj: f64,
}

#[derive(Debug, Serialize)]
pub struct RestartReport {
    pub alpha: f64,
    pub cut_lj_global: f64,
    pub cut_coul: f64,
    pub damping: String,
    pub mixing: String,
    pub offset: bool,
    pub tail: bool,
    pub self_energy: bool,
    pub pairs: Vec<PairEntry>,
}

impl RestartReport {
    pub fn new(record: &RestartRecord, ntypes: usize) -> Result<Self> {
        let global = &record.global;
        let damping = global.damping_kind()?;
        let mixing = global.mixing_rule()?;

        let indices = (1..=ntypes).flat_map(|i| (i..=ntypes).map(move |j| (i, j)));
        let pairs = indices
            .zip(&record.pairs)
            .filter_map(|((i, j), coeff)| {
                coeff.map(|c| PairEntry {
                    i,
                    j,
                    epsilon: c.epsilon,
                    sigma: c.sigma,
                    cut_lj: c.cut_lj,
                })
            })
            .collect();

        Ok(Self {
            alpha: global.alpha,
            cut_lj_global: global.cut_lj_global,
            cut_coul: global.cut_coul,
            damping: damping.keyword().to_string(),
            mixing: mixing.keyword().to_string(),
            offset: global.offset_flag != 0,
            tail: global.tail_flag != 0,
            self_energy: global.self_flag != 0,
            pairs,
        })
    }

    pub fn to_text(&self) -> String {
        let on_off = |flag: bool| if flag { "yes" } else { "no" };
        let mut out = String::new();
        let _ = writeln!(out, "alpha:        {}", self.alpha);
        let _ = writeln!(out, "LJ cutoff:    {}", self.cut_lj_global);
        let _ = writeln!(out, "Coul cutoff:  {}", self.cut_coul);
        let _ = writeln!(out, "damping:      {}", self.damping);
        let _ = writeln!(out, "mixing:       {}", self.mixing);
        let _ = writeln!(out, "shift:        {}", on_off(self.offset));
        let _ = writeln!(out, "tail:         {}", on_off(self.tail));
        let _ = writeln!(out, "self energy:  {}", on_off(self.self_energy));
        let _ = writeln!(out, "explicit pairs: {}", self.pairs.len());
        for pair in &self.pairs {
            let _ = writeln!(
                out,
                "  {} {}  epsilon {}  sigma {}  cutoff {}",
                pair.i, pair.j, pair.epsilon, pair.sigma, pair.cut_lj
            );
        }
        out
    }
}

pub fn to_json<T: Serialize>(report: &T) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(|e| CliError::Other(e.into()))
}
