use crate::core::forcefield::damping::DampingKind;
use crate::core::forcefield::mixing::MixingRule;
use crate::core::models::neighbor::SpecialFactors;
use phf::{Map, phf_map};
use std::ops::RangeInclusive;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("'{command}' expects {expected} arguments, got {found}")]
    ArgumentCount {
        command: &'static str,
        expected: &'static str,
        found: usize,
    },

    #[error("Expected a number for {what}, got '{value}'")]
    InvalidNumber { what: &'static str, value: String },

    #[error("Unknown keyword '{keyword}' in '{command}'")]
    UnknownKeyword {
        command: &'static str,
        keyword: String,
    },

    #[error("Keyword '{keyword}' is missing its value")]
    MissingKeywordValue { keyword: String },

    #[error("Invalid value '{value}' for keyword '{keyword}'")]
    InvalidKeywordValue { keyword: String, value: String },

    #[error("Invalid type range '{range}' for {ntypes} atom types")]
    InvalidTypeRange { range: String, ntypes: usize },

    #[error("Coefficient command matched no type pairs")]
    NoPairsMatched,

    #[error("Pair coefficients are not set for atom type {0}")]
    MissingCoefficients(usize),

    #[error("Pair style requires atom attribute q")]
    MissingCharges,

    #[error("Particle {index} has type {type_id}, outside 1..={ntypes}")]
    ParticleType {
        index: usize,
        type_id: usize,
        ntypes: usize,
    },

    #[error("Global settings must be given before pair coefficients")]
    SettingsRequired,

    #[error("Unknown unit system '{0}'")]
    UnknownUnits(String),
}

static LOGICAL_VALUES: Map<&'static str, bool> = phf_map! {
    "yes" => true,
    "no" => false,
};

const REAL_COULOMB_CONSTANT: f64 = 332.06371;

/// Coulomb conversion constant `q_i q_j / r -> energy` for each supported unit system.
static COULOMB_CONSTANTS: Map<&'static str, f64> = phf_map! {
    "real" => REAL_COULOMB_CONSTANT,
    "metal" => 14.399645,
    "si" => 8.9876e9,
    "cgs" => 1.0,
    "electron" => 1.0,
    "micro" => 8.987556e6,
    "nano" => 230.7078669,
    "lj" => 1.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingsKeyword {
    SelfEnergy,
    Damp,
}

static SETTINGS_KEYWORDS: Map<&'static str, SettingsKeyword> = phf_map! {
    "self" => SettingsKeyword::SelfEnergy,
    "damp" => SettingsKeyword::Damp,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModifyKeyword {
    Mix,
    Shift,
    Tail,
}

static MODIFY_KEYWORDS: Map<&'static str, ModifyKeyword> = phf_map! {
    "mix" => ModifyKeyword::Mix,
    "shift" => ModifyKeyword::Shift,
    "tail" => ModifyKeyword::Tail,
};

pub fn coulomb_constant(units: &str) -> Result<f64, ConfigError> {
    COULOMB_CONSTANTS
        .get(units)
        .copied()
        .ok_or_else(|| ConfigError::UnknownUnits(units.to_string()))
}

pub fn parse_f64(token: &str, what: &'static str) -> Result<f64, ConfigError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ConfigError::InvalidNumber {
            what,
            value: token.to_string(),
        })
}

pub fn parse_logical(keyword: &str, value: &str) -> Result<bool, ConfigError> {
    LOGICAL_VALUES
        .get(value)
        .copied()
        .ok_or_else(|| ConfigError::InvalidKeywordValue {
            keyword: keyword.to_string(),
            value: value.to_string(),
        })
}

/// Parses a 1-based type range: `N`, `*`, `N*`, `*M` or `N*M`, bounded by `ntypes`.
pub fn parse_type_range(token: &str, ntypes: usize) -> Result<RangeInclusive<usize>, ConfigError> {
    let invalid = || ConfigError::InvalidTypeRange {
        range: token.to_string(),
        ntypes,
    };
    let bound = |s: &str, default: usize| -> Result<usize, ConfigError> {
        if s.is_empty() {
            Ok(default)
        } else {
            s.parse::<usize>().map_err(|_| invalid())
        }
    };

    let (lo, hi) = match token.split_once('*') {
        Some((lo, hi)) => (bound(lo, 1)?, bound(hi, ntypes)?),
        None => {
            let n = token.parse::<usize>().map_err(|_| invalid())?;
            (n, n)
        }
    };

    if lo < 1 || hi > ntypes || lo > hi {
        return Err(invalid());
    }
    Ok(lo..=hi)
}

/// Parsed form of the global settings command:
/// `alpha cut_lj [cut_coul] [self yes|no] [damp none|debye|gauss|erfc]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalSettings {
    pub alpha: f64,
    pub cut_lj_global: f64,
    pub cut_coul: f64,
    pub self_energy: bool,
    pub damping: DampingKind,
}

impl GlobalSettings {
    pub fn parse(args: &[&str]) -> Result<Self, ConfigError> {
        if args.len() < 2 {
            return Err(ConfigError::ArgumentCount {
                command: "settings",
                expected: "at least 2",
                found: args.len(),
            });
        }

        let alpha = parse_f64(args[0], "alpha")?;
        let cut_lj_global = parse_f64(args[1], "global LJ cutoff")?;

        // A keyword in third position means the Coulomb cutoff was omitted.
        let (cut_coul, mut iarg) = match args.get(2) {
            Some(token) if !SETTINGS_KEYWORDS.contains_key(*token) => {
                (parse_f64(token, "Coulomb cutoff")?, 3)
            }
            _ => (cut_lj_global, 2),
        };

        let mut settings = Self {
            alpha,
            cut_lj_global,
            cut_coul,
            self_energy: true,
            damping: DampingKind::default(),
        };

        while iarg < args.len() {
            let keyword = args[iarg];
            let kind = SETTINGS_KEYWORDS.get(keyword).copied().ok_or_else(|| {
                ConfigError::UnknownKeyword {
                    command: "settings",
                    keyword: keyword.to_string(),
                }
            })?;
            let value = args
                .get(iarg + 1)
                .ok_or_else(|| ConfigError::MissingKeywordValue {
                    keyword: keyword.to_string(),
                })?;
            match kind {
                SettingsKeyword::SelfEnergy => settings.self_energy = parse_logical(keyword, value)?,
                SettingsKeyword::Damp => {
                    settings.damping = value.parse().map_err(|_| ConfigError::InvalidKeywordValue {
                        keyword: keyword.to_string(),
                        value: value.to_string(),
                    })?
                }
            }
            iarg += 2;
        }

        Ok(settings)
    }
}

/// Parsed form of the per-pair coefficient command:
/// `type_range_i type_range_j epsilon sigma [cut_lj]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoeffCommand {
    pub types_i: RangeInclusive<usize>,
    pub types_j: RangeInclusive<usize>,
    pub epsilon: f64,
    pub sigma: f64,
    pub cut_lj: Option<f64>,
}

impl CoeffCommand {
    pub fn parse(args: &[&str], ntypes: usize) -> Result<Self, ConfigError> {
        if !(4..=5).contains(&args.len()) {
            return Err(ConfigError::ArgumentCount {
                command: "coeff",
                expected: "4 or 5",
                found: args.len(),
            });
        }
        Ok(Self {
            types_i: parse_type_range(args[0], ntypes)?,
            types_j: parse_type_range(args[1], ntypes)?,
            epsilon: parse_f64(args[2], "epsilon")?,
            sigma: parse_f64(args[3], "sigma")?,
            cut_lj: args
                .get(4)
                .map(|token| parse_f64(token, "pair LJ cutoff"))
                .transpose()?,
        })
    }

    /// Type pairs `(i, j)` with `j >= i` covered by the two ranges.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.types_i.clone().flat_map(move |i| {
            let jlo = (*self.types_j.start()).max(i);
            (jlo..=*self.types_j.end()).map(move |j| (i, j))
        })
    }
}

/// Flags the host normally owns: offsetting, mixing rule and tail corrections.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModifyCommand {
    pub mixing: Option<MixingRule>,
    pub offset: Option<bool>,
    pub tail: Option<bool>,
}

impl ModifyCommand {
    pub fn parse(args: &[&str]) -> Result<Self, ConfigError> {
        if args.is_empty() || args.len() % 2 != 0 {
            return Err(ConfigError::ArgumentCount {
                command: "modify",
                expected: "keyword/value pairs of",
                found: args.len(),
            });
        }

        let mut command = Self::default();
        for pair in args.chunks_exact(2) {
            let (keyword, value) = (pair[0], pair[1]);
            let kind = MODIFY_KEYWORDS.get(keyword).copied().ok_or_else(|| {
                ConfigError::UnknownKeyword {
                    command: "modify",
                    keyword: keyword.to_string(),
                }
            })?;
            match kind {
                ModifyKeyword::Mix => {
                    command.mixing = Some(value.parse().map_err(|_| {
                        ConfigError::InvalidKeywordValue {
                            keyword: keyword.to_string(),
                            value: value.to_string(),
                        }
                    })?)
                }
                ModifyKeyword::Shift => command.offset = Some(parse_logical(keyword, value)?),
                ModifyKeyword::Tail => command.tail = Some(parse_logical(keyword, value)?),
            }
        }
        Ok(command)
    }
}

/// Host-level settings the interaction loop reads but the pair style does not own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSettings {
    pub coulomb_constant: f64,
    pub special: SpecialFactors,
    /// When set, reaction forces go to ghost neighbors too and are summed back by the host.
    pub newton_pair: bool,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            coulomb_constant: REAL_COULOMB_CONSTANT,
            special: SpecialFactors::default(),
            newton_pair: true,
        }
    }
}

#[derive(Default)]
pub struct LoopSettingsBuilder {
    units: Option<String>,
    special_lj: Option<[f64; 3]>,
    special_coul: Option<[f64; 3]>,
    newton_pair: Option<bool>,
}

impl LoopSettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }
    pub fn special_lj(mut self, factors: [f64; 3]) -> Self {
        self.special_lj = Some(factors);
        self
    }
    pub fn special_coul(mut self, factors: [f64; 3]) -> Self {
        self.special_coul = Some(factors);
        self
    }
    pub fn newton_pair(mut self, newton: bool) -> Self {
        self.newton_pair = Some(newton);
        self
    }

    pub fn build(self) -> Result<LoopSettings, ConfigError> {
        let defaults = LoopSettings::default();
        let coulomb_constant = match self.units.as_deref() {
            Some(units) => coulomb_constant(units)?,
            None => defaults.coulomb_constant,
        };
        Ok(LoopSettings {
            coulomb_constant,
            special: SpecialFactors::new(
                self.special_lj.unwrap_or([0.0; 3]),
                self.special_coul.unwrap_or([0.0; 3]),
            ),
            newton_pair: self.newton_pair.unwrap_or(defaults.newton_pair),
        })
    }
}
