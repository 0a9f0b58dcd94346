//! CLI for reversible, audited host tuning.
//!
//! Thin shell over `accel_common`: argument parsing, mode selection,
//! record persistence in the working directory, and rendering.

pub mod cli;
pub mod doctor;
pub mod logging;
pub mod output;
