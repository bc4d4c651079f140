//! Utility functions

pub mod checksum;
pub mod sector;
