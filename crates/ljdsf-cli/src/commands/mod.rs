pub mod eval;
pub mod restart;
