pub mod indicators;
pub mod analyzer;


pub use indicators::*;
pub use analyzer::*;
