//! Sweepgen: Incremental Experiment Config Generation
//!
//! Expands a manifest of parameter sweeps over base configuration documents into one config
//! file per parameter value, plus shell scripts that run them. Content fingerprints of every
//! base config and sweep definition are kept between runs so unchanged sweeps are skipped.

pub mod cli;
pub mod config;
pub mod error;
pub mod expand;
pub mod fingerprint;
pub mod logging;
pub mod manifest;
pub mod mutation;
pub mod naming;
pub mod output;
pub mod planner;
pub mod script;
pub mod tracker;
