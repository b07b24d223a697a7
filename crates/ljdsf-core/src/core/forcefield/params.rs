use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Lennard-Jones coefficients for one type pair, as configured or as mixed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PairCoeff {
    pub epsilon: f64,
    pub sigma: f64,
    /// LJ cutoff for this pair. The Coulomb cutoff is global and never stored per pair.
    pub cut_lj: f64,
}

/// Coefficients derived from a [`PairCoeff`] once per initialization.
///
/// Everything the per-pair kernel needs lives here so that the hot loop does one table lookup
/// per neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PairParams {
    pub epsilon: f64,
    pub sigma: f64,
    pub cut_lj: f64,
    pub cut_ljsq: f64,
    /// `48 eps sigma^12`
    pub lj1: f64,
    /// `24 eps sigma^6`
    pub lj2: f64,
    /// `4 eps sigma^12`
    pub lj3: f64,
    /// `4 eps sigma^6`
    pub lj4: f64,
    /// 12-6 energy at `cut_lj` when offsetting is enabled, otherwise zero.
    pub offset: f64,
    /// Square of `max(cut_lj, cut_coul)`.
    pub cutsq: f64,
}

impl PairParams {
    pub fn derive(coeff: PairCoeff, cut_coul: f64, offset_enabled: bool) -> Self {
        let PairCoeff {
            epsilon,
            sigma,
            cut_lj,
        } = coeff;
        let sigma6 = sigma.powi(6);
        let sigma12 = sigma6 * sigma6;

        let offset = if offset_enabled && cut_lj > 0.0 {
            let ratio6 = (sigma / cut_lj).powi(6);
            4.0 * epsilon * (ratio6 * ratio6 - ratio6)
        } else {
            0.0
        };

        let cut = cut_lj.max(cut_coul);
        Self {
            epsilon,
            sigma,
            cut_lj,
            cut_ljsq: cut_lj * cut_lj,
            lj1: 48.0 * epsilon * sigma12,
            lj2: 24.0 * epsilon * sigma6,
            lj3: 4.0 * epsilon * sigma12,
            lj4: 4.0 * epsilon * sigma6,
            offset,
            cutsq: cut * cut,
        }
    }

    /// Total interaction cutoff of the pair, used to size neighbor requests.
    pub fn cutoff(&self) -> f64 {
        self.cutsq.sqrt()
    }
}

/// Symmetric per-type-pair storage indexed by 1-based type identifiers.
///
/// Every write goes to both `(i, j)` and `(j, i)`, so readers never need to order the pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterTable {
    ntypes: usize,
    coeffs: Vec<PairCoeff>,
    setflag: Vec<bool>,
    derived: Vec<PairParams>,
}

impl ParameterTable {
    pub fn new(ntypes: usize) -> Self {
        let len = ntypes * ntypes;
        Self {
            ntypes,
            coeffs: vec![PairCoeff::default(); len],
            setflag: vec![false; len],
            derived: vec![PairParams::default(); len],
        }
    }

    pub fn ntypes(&self) -> usize {
        self.ntypes
    }

    #[inline]
    fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(
            (1..=self.ntypes).contains(&i) && (1..=self.ntypes).contains(&j),
            "type pair ({i}, {j}) outside 1..={}",
            self.ntypes
        );
        (i - 1) * self.ntypes + (j - 1)
    }

    pub fn set_explicit(&mut self, i: usize, j: usize, coeff: PairCoeff) {
        let (ij, ji) = (self.index(i, j), self.index(j, i));
        self.coeffs[ij] = coeff;
        self.coeffs[ji] = coeff;
        self.setflag[ij] = true;
        self.setflag[ji] = true;
    }

    /// Stores mixed coefficients without marking the pair as explicitly set.
    pub fn set_mixed(&mut self, i: usize, j: usize, coeff: PairCoeff) {
        let (ij, ji) = (self.index(i, j), self.index(j, i));
        self.coeffs[ij] = coeff;
        self.coeffs[ji] = coeff;
    }

    pub fn set_derived(&mut self, i: usize, j: usize, params: PairParams) {
        let (ij, ji) = (self.index(i, j), self.index(j, i));
        self.derived[ij] = params;
        self.derived[ji] = params;
    }

    pub fn set_cut_lj(&mut self, i: usize, j: usize, cut_lj: f64) {
        let (ij, ji) = (self.index(i, j), self.index(j, i));
        self.coeffs[ij].cut_lj = cut_lj;
        self.coeffs[ji].cut_lj = cut_lj;
    }

    pub fn is_set(&self, i: usize, j: usize) -> bool {
        self.setflag[self.index(i, j)]
    }

    pub fn coeff(&self, i: usize, j: usize) -> PairCoeff {
        self.coeffs[self.index(i, j)]
    }

    #[inline]
    pub fn params(&self, i: usize, j: usize) -> &PairParams {
        &self.derived[self.index(i, j)]
    }

    /// Iterates `(i, j, explicit coefficients)` for every `i <= j` in type-index order.
    pub fn upper_triangle(&self) -> impl Iterator<Item = (usize, usize, Option<PairCoeff>)> + '_ {
        (1..=self.ntypes).flat_map(move |i| {
            (i..=self.ntypes).map(move |j| {
                let coeff = self.is_set(i, j).then(|| self.coeff(i, j));
                (i, j, coeff)
            })
        })
    }

    pub fn all_diagonals_set(&self) -> Result<(), usize> {
        match (1..=self.ntypes).find(|&i| !self.is_set(i, i)) {
            Some(missing) => Err(missing),
            None => Ok(()),
        }
    }
}

/// One row of a coefficient table file. Type fields accept the same range syntax as the
/// per-pair configuration entry point (`2`, `*`, `1*3`, ...).
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CoeffRecord {
    pub type_i: String,
    pub type_j: String,
    pub epsilon: f64,
    pub sigma: f64,
    #[serde(default)]
    pub cutoff: Option<f64>,
}

impl CoeffRecord {
    /// Arguments in the order accepted by the per-pair configuration entry point.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            self.type_i.clone(),
            self.type_j.clone(),
            self.epsilon.to_string(),
            self.sigma.to_string(),
        ];
        if let Some(cutoff) = self.cutoff {
            args.push(cutoff.to_string());
        }
        args
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CoeffFile {
    #[serde(rename = "coeff", default)]
    coeffs: Vec<CoeffRecord>,
}

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

/// Loads a coefficient table, choosing the format from the file extension: `.toml` files hold
/// `[[coeff]]` entries, anything else is read as CSV.
pub fn load_coeff_table(path: &Path) -> Result<Vec<CoeffRecord>, ParamLoadError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => load_coeff_toml(path),
        _ => load_coeff_csv(path),
    }
}

pub fn load_coeff_toml(path: &Path) -> Result<Vec<CoeffRecord>, ParamLoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    let file: CoeffFile = toml::from_str(&content).map_err(|e| ParamLoadError::Toml {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    Ok(file.coeffs)
}

pub fn load_coeff_csv(path: &Path) -> Result<Vec<CoeffRecord>, ParamLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| ParamLoadError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

    let mut records = Vec::new();
    for result in reader.deserialize::<CoeffRecord>() {
        let record = result.map_err(|e| ParamLoadError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        records.push(record);
    }
    Ok(records)
}
