use crate::core::forcefield::damping::DampingKind;
use crate::core::forcefield::mixing::MixingRule;
use crate::core::forcefield::params::PairCoeff;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RestartError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to encode or decode restart record: {0}")]
    Codec(#[from] bincode::Error),

    #[error("Restart record holds unknown {field} code {code}")]
    UnknownCode { field: &'static str, code: i32 },
}

/// Global pair style settings, in on-disk order.
///
/// Fixed-width fields: three `f64` followed by five `i32`, little-endian, no padding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalRecord {
    pub alpha: f64,
    pub cut_lj_global: f64,
    pub cut_coul: f64,
    pub offset_flag: i32,
    pub mix_flag: i32,
    pub tail_flag: i32,
    pub self_flag: i32,
    pub damping: i32,
}

impl GlobalRecord {
    pub const ENCODED_LEN: usize = 3 * 8 + 5 * 4;

    pub fn damping_kind(&self) -> Result<DampingKind, RestartError> {
        DampingKind::from_code(self.damping).ok_or(RestartError::UnknownCode {
            field: "damping",
            code: self.damping,
        })
    }

    pub fn mixing_rule(&self) -> Result<MixingRule, RestartError> {
        MixingRule::from_code(self.mix_flag).ok_or(RestartError::UnknownCode {
            field: "mixing rule",
            code: self.mix_flag,
        })
    }
}

#[derive(Serialize, Deserialize)]
struct StoredCoeff {
    epsilon: f64,
    sigma: f64,
    cut_lj: f64,
}

/// A complete restart record: global settings, then one entry per type pair `i <= j` in
/// type-index order, `None` for pairs that were never explicitly configured.
#[derive(Debug, Clone, PartialEq)]
pub struct RestartRecord {
    pub global: GlobalRecord,
    pub pairs: Vec<Option<PairCoeff>>,
}

/// Number of `i <= j` pairs over `ntypes` types.
pub fn upper_triangle_len(ntypes: usize) -> usize {
    ntypes * (ntypes + 1) / 2
}

impl RestartRecord {
    /// Reads a record written for `ntypes` atom types. The type count is not stored in the
    /// record and must come from the caller.
    pub fn read_from(reader: &mut impl Read, ntypes: usize) -> Result<Self, RestartError> {
        let global: GlobalRecord = bincode::deserialize_from(&mut *reader)?;
        let mut pairs = Vec::with_capacity(upper_triangle_len(ntypes));
        for _ in 0..upper_triangle_len(ntypes) {
            let flag: i32 = bincode::deserialize_from(&mut *reader)?;
            let coeff = if flag != 0 {
                let stored: StoredCoeff = bincode::deserialize_from(&mut *reader)?;
                Some(PairCoeff {
                    epsilon: stored.epsilon,
                    sigma: stored.sigma,
                    cut_lj: stored.cut_lj,
                })
            } else {
                None
            };
            pairs.push(coeff);
        }
        Ok(Self { global, pairs })
    }

    pub fn write_to(&self, writer: &mut impl Write) -> Result<(), RestartError> {
        bincode::serialize_into(&mut *writer, &self.global)?;
        for pair in &self.pairs {
            match pair {
                Some(coeff) => {
                    bincode::serialize_into(&mut *writer, &1i32)?;
                    let stored = StoredCoeff {
                        epsilon: coeff.epsilon,
                        sigma: coeff.sigma,
                        cut_lj: coeff.cut_lj,
                    };
                    bincode::serialize_into(&mut *writer, &stored)?;
                }
                None => bincode::serialize_into(&mut *writer, &0i32)?,
            }
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, RestartError> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8], ntypes: usize) -> Result<Self, RestartError> {
        let mut cursor = bytes;
        Self::read_from(&mut cursor, ntypes)
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P, ntypes: usize) -> Result<Self, RestartError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, ntypes)
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), RestartError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
