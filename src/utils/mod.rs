pub mod echar;

pub use echar::*;
