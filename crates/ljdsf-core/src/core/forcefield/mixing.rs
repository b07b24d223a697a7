use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;

/// Combination rule used to derive unlike-pair Lennard-Jones parameters from the diagonal ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MixingRule {
    /// `eps = sqrt(eps_i eps_j)`, `sigma = sqrt(sigma_i sigma_j)`.
    #[default]
    Geometric,
    /// Lorentz-Berthelot: `eps = sqrt(eps_i eps_j)`, `sigma = (sigma_i + sigma_j) / 2`.
    Arithmetic,
    /// Waldman-Hagler sixth-power rule.
    SixthPower,
}

static MIXING_KEYWORDS: Map<&'static str, MixingRule> = phf_map! {
    "geometric" => MixingRule::Geometric,
    "arithmetic" => MixingRule::Arithmetic,
    "sixthpower" => MixingRule::SixthPower,
};

impl MixingRule {
    pub fn mix_energy(self, eps_i: f64, eps_j: f64, sigma_i: f64, sigma_j: f64) -> f64 {
        match self {
            MixingRule::Geometric | MixingRule::Arithmetic => (eps_i * eps_j).sqrt(),
            MixingRule::SixthPower => {
                2.0 * (eps_i * eps_j).sqrt() * sigma_i.powi(3) * sigma_j.powi(3)
                    / (sigma_i.powi(6) + sigma_j.powi(6))
            }
        }
    }

    /// Also used for the LJ cutoff of unlike pairs.
    pub fn mix_distance(self, d_i: f64, d_j: f64) -> f64 {
        match self {
            MixingRule::Geometric => (d_i * d_j).sqrt(),
            MixingRule::Arithmetic => 0.5 * (d_i + d_j),
            MixingRule::SixthPower => (0.5 * (d_i.powi(6) + d_j.powi(6))).powf(1.0 / 6.0),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            MixingRule::Geometric => 0,
            MixingRule::Arithmetic => 1,
            MixingRule::SixthPower => 2,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(MixingRule::Geometric),
            1 => Some(MixingRule::Arithmetic),
            2 => Some(MixingRule::SixthPower),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            MixingRule::Geometric => "geometric",
            MixingRule::Arithmetic => "arithmetic",
            MixingRule::SixthPower => "sixthpower",
        }
    }
}

impl FromStr for MixingRule {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MIXING_KEYWORDS.get(s).copied().ok_or(())
    }
}

impl fmt::Display for MixingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
