//! Kitchen display protocol types

pub mod ws;

pub use ws::*;
