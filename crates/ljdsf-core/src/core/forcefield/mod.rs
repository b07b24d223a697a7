//! # Force Field Module
//!
//! Mathematical description of the Lennard-Jones plus damped-shifted-force pair interaction.
//!
//! ## Overview
//!
//! The Coulomb half of the interaction screens the bare `1/r` shape with one of four damping
//! kernels and then shifts both potential and force so that they vanish at the Coulomb cutoff.
//! The Lennard-Jones half is a plain 12-6 term truncated at a per-pair cutoff and optionally
//! offset so its energy is zero there.
//!
//! ## Key Components
//!
//! - [`damping`] - The four damping kernels and their selector
//! - [`shift`] - Force/energy shift and self-energy constants tied to the selected kernel
//! - [`params`] - Per-type-pair coefficients, their derivation and the symmetric table
//! - [`mixing`] - Rules combining like-pair coefficients into unlike-pair ones
//! - [`tail`] - Analytic long-range dispersion corrections
//! - [`kernel`] - Per-pair force and energy evaluation
//! - [`term`] - Energy term aggregation and reporting
//!
//! ## Usage
//!
//! ```ignore
//! use ljdsf::core::forcefield::damping::DampingKind;
//! use ljdsf::core::forcefield::kernel::DsfCoulomb;
//! use ljdsf::core::forcefield::shift::ShiftConstants;
//!
//! let kind = DampingKind::Erfc;
//! let coulomb = DsfCoulomb {
//!     damping: kind.kernel(),
//!     alpha: 0.2,
//!     shift: ShiftConstants::compute(kind, 0.2, 10.0, 332.06371),
//!     coulomb_constant: 332.06371,
//! };
//! let outcome = coulomb.evaluate(&params, rsq, 1.0, 1.0, qi, qj, true);
//! ```

pub mod damping;
pub mod kernel;
pub mod mixing;
pub mod params;
pub mod shift;
pub mod tail;
pub mod term;
