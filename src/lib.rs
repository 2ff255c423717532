//! Launcher for the standalone correlator response maker.
//!
//! The launcher looks at its first argument and replaces itself with one of two external commands:
//! 1. `condor` submits the batch job: `condor_submit MakeCorrelatorResponseStandalone.job`
//! 1. anything else (or nothing) runs the macro locally: `root -b -q MakeCorrelatorResponseStandalone.cxx`
//!
//! The job description and the macro are not touched by the launcher. It does not check that they exist,
//! the submission tool or the interpreter will complain if they don't.
pub mod config;
pub mod dispatch;
pub mod entrypoints;
pub mod exec;
pub mod logging;

pub use entrypoints::*;

extern crate log;
extern crate fern;
extern crate serde_json;
extern crate toml;
