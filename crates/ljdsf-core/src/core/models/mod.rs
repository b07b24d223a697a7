//! Particle data and neighbor lists consumed by the interaction loop.
//!
//! [`particles::ParticleStore`] is the read-only view of positions, types and charges.
//! [`neighbor::NeighborList`] is a half list whose entries carry special-bond codes in their
//! top two bits.

pub mod neighbor;
pub mod particles;
