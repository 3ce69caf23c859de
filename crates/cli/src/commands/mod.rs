//! CLI Commands

pub mod baseline;
pub mod image;
pub mod suite;
