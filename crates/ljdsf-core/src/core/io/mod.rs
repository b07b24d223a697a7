//! Binary restart records for the pair style configuration.
//!
//! Only explicitly configured coefficients are persisted. Mixed pairs are re-derived on the
//! next initialization.

pub mod restart;
