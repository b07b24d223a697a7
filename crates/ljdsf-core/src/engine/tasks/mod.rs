//! Computational passes run by the pair style once it has been initialized.
//!
//! [`compute`] is the per-timestep interaction loop over owned particles and their
//! neighbors.

pub mod compute;
