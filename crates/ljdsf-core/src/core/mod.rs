//! # Core Module
//!
//! Stateless building blocks of the LJ + DSF pair interaction.
//!
//! ## Architecture
//!
//! - **Interaction Physics** ([`forcefield`]) - Damping kernels, mixing rules, per-pair
//!   parameters, shift/self-energy constants, tail corrections and the pair kernel
//! - **Particle Representation** ([`models`]) - The particle store seam and half neighbor lists
//! - **Persistence** ([`io`]) - Binary restart records for the pair style configuration
//!
//! Nothing in this module keeps global state. Every constant the hot loop needs is derived
//! up front and passed in by reference.

pub mod forcefield;
pub mod io;
pub mod models;
