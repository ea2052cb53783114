//! Bearer tokens and the header sets built from them.

pub mod token;

pub use token::*;
