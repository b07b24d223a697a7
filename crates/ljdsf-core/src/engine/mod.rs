//! # Engine Module
//!
//! The stateful half of the library: the pair style that owns the parameter table and its
//! lifecycle, plus the seams through which it talks to the rest of a simulation.
//!
//! ## Overview
//!
//! A run goes through three phases. Configuration commands ([`style::LjCutCoulDsf::settings`],
//! [`style::LjCutCoulDsf::coeff`], [`style::LjCutCoulDsf::modify`], or a restart record) set
//! global scalars and explicit coefficients. [`style::LjCutCoulDsf::init`] then mixes unset
//! pairs, derives every per-pair coefficient and the shift/self-energy constants, and sums
//! tail corrections. Finally the interaction loop runs once per timestep against a neighbor
//! list. Any configuration change after `init` invalidates the derived state until the next
//! `init`.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Command parsing, validation and host-level loop settings
//! - **Pair Style** ([`style`]) - Parameter lifecycle, single-pair evaluation and restart I/O
//! - **Communication** ([`comm`]) - Collective operations over process shards
//! - **Tallying** ([`tally`]) - Energy and virial accounting
//! - **Error Handling** ([`error`]) - Engine-level error type

pub mod comm;
pub mod config;
pub mod error;
pub mod style;
pub mod tally;
pub(crate) mod tasks;
