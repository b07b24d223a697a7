//! # Workflows Module
//!
//! High-level entry points that tie the [`crate::engine`] and [`crate::core`] layers together.
//!
//! ## Architecture
//!
//! - **Evaluation Workflow** ([`evaluate`]) - Configures the pair style from commands, a
//!   coefficient table or a restart record, initializes it, builds a neighbor list and
//!   evaluates forces, energies and the virial of a system in one call.

pub mod evaluate;
