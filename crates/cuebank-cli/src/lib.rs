//! Cue bank CLI library
//!
//! Command implementations shared by the `cuebank` binary and its tests.

pub mod commands;
