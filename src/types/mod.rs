//! Type definitions for tmsdash

mod error;
mod records;

pub use error::*;
pub use records::*;
