use crate::cli::EvalArgs;
use crate::error::{CliError, Result};
use ljdsf::core::models::neighbor::SpecialPairs;
use ljdsf::core::models::particles::Particles;
use ljdsf::engine::config::LoopSettingsBuilder;
use ljdsf::workflows::evaluate::{PairStyleConfig, SystemDescription};
use nalgebra::Point3;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A command token written either as a string or as a bare TOML number.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
enum Token {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Integer(v) => write!(f, "{v}"),
            Token::Float(v) => write!(f, "{v}"),
            Token::Text(v) => f.write_str(v),
        }
    }
}

fn to_strings(tokens: &[Token]) -> Vec<String> {
    tokens.iter().map(Token::to_string).collect()
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialPairStyleConfig {
    ntypes: Option<usize>,
    restart: Option<PathBuf>,
    settings: Option<Vec<Token>>,
    coeff_table: Option<PathBuf>,
    #[serde(default)]
    coeffs: Vec<Vec<Token>>,
    #[serde(default)]
    modify: Vec<Token>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialSpecialBonds {
    lj: Option<[f64; 3]>,
    coul: Option<[f64; 3]>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct FileParticle {
    position: [f64; 3],
    #[serde(rename = "type")]
    type_id: usize,
    #[serde(default)]
    charge: f64,
    #[serde(default)]
    ghost: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct FileSpecialPair {
    i: usize,
    j: usize,
    level: u8,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialSystemConfig {
    units: Option<String>,
    newton_pair: Option<bool>,
    pair_style: Option<PartialPairStyleConfig>,
    special_bonds: Option<PartialSpecialBonds>,
    #[serde(default)]
    particles: Vec<FileParticle>,
    #[serde(default)]
    special_pairs: Vec<FileSpecialPair>,
}

impl PartialSystemConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading system description from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Combines the file with command-line overrides. Relative paths in the file are resolved
    /// against `base_dir`, the directory holding the file.
    pub fn merge_with_cli(self, args: &EvalArgs, base_dir: &Path) -> Result<SystemDescription> {
        let pair_style = self.pair_style.ok_or_else(|| {
            CliError::Config("`pair-style` section is required.".to_string())
        })?;
        let ntypes = pair_style
            .ntypes
            .ok_or_else(|| CliError::Config("`pair-style.ntypes` is required.".to_string()))?;
        if pair_style.settings.is_none() && pair_style.restart.is_none() {
            return Err(CliError::Config(
                "`pair-style` needs `settings` or a `restart` record.".to_string(),
            ));
        }

        let resolve = |path: PathBuf| {
            if path.is_absolute() {
                path
            } else {
                base_dir.join(path)
            }
        };

        let style = PairStyleConfig {
            ntypes,
            restart: pair_style.restart.map(resolve),
            settings: pair_style
                .settings
                .as_deref()
                .map(to_strings)
                .unwrap_or_default(),
            coeff_table: pair_style.coeff_table.map(resolve),
            coeffs: pair_style.coeffs.iter().map(|c| to_strings(c)).collect(),
            modify: to_strings(&pair_style.modify),
        };

        let mut builder = LoopSettingsBuilder::new();
        if let Some(units) = args.units.as_ref().or(self.units.as_ref()) {
            builder = builder.units(units.clone());
        }
        if let Some(newton) = self.newton_pair {
            builder = builder.newton_pair(newton);
        }
        if let Some(special) = self.special_bonds {
            if let Some(lj) = special.lj {
                builder = builder.special_lj(lj);
            }
            if let Some(coul) = special.coul {
                builder = builder.special_coul(coul);
            }
        }
        let loop_settings = builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let particles = Self::build_particles(&self.particles)?;
        let special = Self::build_special_pairs(&self.special_pairs, self.particles.len())?;

        Ok(SystemDescription {
            style,
            loop_settings,
            particles,
            special,
        })
    }

    fn build_particles(entries: &[FileParticle]) -> Result<Particles> {
        let mut particles = Particles::new();
        let mut seen_ghost = false;
        for (index, entry) in entries.iter().enumerate() {
            let [x, y, z] = entry.position;
            let position = Point3::new(x, y, z);
            if entry.ghost {
                seen_ghost = true;
                particles.push_ghost(position, entry.type_id, entry.charge);
            } else if seen_ghost {
                return Err(CliError::Config(format!(
                    "Particle {index} is owned but follows a ghost; ghosts must come last."
                )));
            } else {
                particles.push_local(position, entry.type_id, entry.charge);
            }
        }
        Ok(particles)
    }

    fn build_special_pairs(entries: &[FileSpecialPair], count: usize) -> Result<SpecialPairs> {
        let mut special = SpecialPairs::new();
        for entry in entries {
            if entry.i == entry.j || entry.i >= count || entry.j >= count {
                return Err(CliError::Config(format!(
                    "Special pair ({}, {}) does not name two distinct particles.",
                    entry.i, entry.j
                )));
            }
            if !(1..=3).contains(&entry.level) {
                return Err(CliError::Config(format!(
                    "Special pair ({}, {}) has level {}; expected 1, 2 or 3.",
                    entry.i, entry.j, entry.level
                )));
            }
            special.insert(entry.i, entry.j, entry.level);
        }
        Ok(special)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use ljdsf::core::models::particles::ParticleStore;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    const SYSTEM: &str = r#"
        units = "metal"
        newton-pair = false

        [pair-style]
        ntypes = 2
        settings = [0.2, 9.0, "damp", "gauss"]
        coeffs = [[1, 1, 0.1, 3.0], ["2", "2", 0.2, 2.5, 6.0]]
        modify = ["mix", "arithmetic"]

        [special-bonds]
        lj = [0.0, 0.0, 0.5]

        [[particles]]
        position = [0.0, 0.0, 0.0]
        type = 1
        charge = 0.5

        [[particles]]
        position = [1.5, 0.0, 0.0]
        type = 2
        charge = -0.5

        [[particles]]
        position = [0.0, 2.0, 0.0]
        type = 2
        ghost = true

        [[special-pairs]]
        i = 0
        j = 1
        level = 3
    "#;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("system.toml");
        fs::write(&path, content).unwrap();
        path
    }

    fn eval_args(extra: &[&str]) -> EvalArgs {
        let mut args = vec!["ljdsf", "eval", "-i", "system.toml"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Eval(args) => args,
            _ => panic!("Expected 'eval' subcommand"),
        }
    }

    #[test]
    fn load_from_file_builds_system_description() {
        let dir = tempdir().unwrap();
        let path = write_config(&dir, SYSTEM);
        let system = PartialSystemConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&eval_args(&[]), dir.path())
            .unwrap();

        assert_eq!(system.style.ntypes, 2);
        assert_eq!(system.style.settings, vec!["0.2", "9", "damp", "gauss"]);
        assert_eq!(system.style.coeffs[0], vec!["1", "1", "0.1", "3"]);
        assert_eq!(system.style.coeffs[1], vec!["2", "2", "0.2", "2.5", "6"]);
        assert_eq!(system.style.modify, vec!["mix", "arithmetic"]);

        assert_eq!(system.loop_settings.coulomb_constant, 14.399645);
        assert!(!system.loop_settings.newton_pair);
        assert_eq!(system.loop_settings.special.lj, [1.0, 0.0, 0.0, 0.5]);
        assert_eq!(system.loop_settings.special.coul, [1.0, 0.0, 0.0, 0.0]);

        assert_eq!(system.particles.nlocal(), 2);
        assert_eq!(system.particles.len(), 3);
        assert_eq!(system.particles.charge(2), 0.0);
        assert_eq!(system.special.level(1, 0), 3);
    }

    #[test]
    fn cli_units_override_file_units() {
        let dir = tempdir().unwrap();
        let path = write_config(&dir, SYSTEM);
        let system = PartialSystemConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&eval_args(&["--units", "lj"]), dir.path())
            .unwrap();
        assert_eq!(system.loop_settings.coulomb_constant, 1.0);
    }

    #[test]
    fn relative_paths_resolve_against_config_directory() {
        let dir = tempdir().unwrap();
        let content = r#"
            [pair-style]
            ntypes = 1
            restart = "state/pair.restart"
            coeff-table = "/abs/coeffs.csv"
        "#;
        let path = write_config(&dir, content);
        let system = PartialSystemConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&eval_args(&[]), dir.path())
            .unwrap();
        assert_eq!(
            system.style.restart,
            Some(dir.path().join("state/pair.restart"))
        );
        assert_eq!(
            system.style.coeff_table,
            Some(PathBuf::from("/abs/coeffs.csv"))
        );
    }

    #[test]
    fn missing_pair_style_settings_are_reported() {
        let dir = tempdir().unwrap();
        let path = write_config(&dir, "[pair-style]\nntypes = 1\n");
        let result = PartialSystemConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&eval_args(&[]), dir.path());
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("settings")));

        let path = write_config(&dir, "units = \"real\"\n");
        let result = PartialSystemConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&eval_args(&[]), dir.path());
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("pair-style")));
    }

    #[test]
    fn unknown_keys_fail_to_parse() {
        let dir = tempdir().unwrap();
        let path = write_config(&dir, "unit = \"real\"\n");
        assert!(matches!(
            PartialSystemConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn owned_particles_after_ghosts_are_rejected() {
        let dir = tempdir().unwrap();
        let content = r#"
            [pair-style]
            ntypes = 1
            settings = [0.2, 9.0]

            [[particles]]
            position = [0.0, 0.0, 0.0]
            type = 1
            ghost = true

            [[particles]]
            position = [1.0, 0.0, 0.0]
            type = 1
        "#;
        let path = write_config(&dir, content);
        let result = PartialSystemConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&eval_args(&[]), dir.path());
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("ghost")));
    }

    #[test]
    fn invalid_special_pairs_are_rejected() {
        let dir = tempdir().unwrap();
        for pair in ["i = 0\nj = 0\nlevel = 1", "i = 0\nj = 5\nlevel = 1", "i = 0\nj = 1\nlevel = 4"] {
            let content = format!(
                "[pair-style]\nntypes = 1\nsettings = [0.2, 9.0]\n\n\
                 [[particles]]\nposition = [0.0, 0.0, 0.0]\ntype = 1\n\n\
                 [[particles]]\nposition = [1.0, 0.0, 0.0]\ntype = 1\n\n\
                 [[special-pairs]]\n{pair}\n"
            );
            let path = write_config(&dir, &content);
            let result = PartialSystemConfig::from_file(&path)
                .unwrap()
                .merge_with_cli(&eval_args(&[]), dir.path());
            assert!(matches!(result, Err(CliError::Config(_))), "{pair}");
        }
    }
}
