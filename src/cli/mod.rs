//! Command-line interface for the catalog import engine

pub mod commands;
pub mod error;
pub mod output;
