//! # ljdsf Core Library
//!
//! Short-range non-bonded interactions for molecular simulation: a 12-6 Lennard-Jones term
//! plus damped-shifted-force (DSF) electrostatics, which replaces long-range Coulomb summation
//! with a real-space scheme whose energy and force both vanish at a finite cutoff.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless pieces: damping kernels, mixing rules, per-pair
//!   parameter derivation, shift and self-energy constants, the pair kernel, particle and
//!   neighbor-list models, and restart record encoding.
//!
//! - **[`engine`]: The Logic Core.** The stateful pair style that owns the parameter table and
//!   its lifecycle (configuration, initialization, restart), the collaborator seams for
//!   communication and energy/virial tallying, and the interaction loop.
//!
//! - **[`workflows`]: The Public API.** One-call evaluation of a complete system description.

pub mod core;
pub mod engine;
pub mod workflows;
