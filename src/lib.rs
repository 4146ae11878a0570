//! # hueflux
//!
//! Circadian lighting scheduler for networked smart bulbs.
//!
//! The library holds everything the `hueflux` binary does, so the scheduling
//! core can be tested without hardware:
//!
//! - **Schedule**: `schedule` builds the daily anchor table from solar events
//!   and the configured stop time, interpolates between anchors and plans how
//!   long to sleep until the value changes.
//! - **Lights**: `lights` decides which fixtures need which command and
//!   batches them, retargets flux scenes and maps light levels to brightness.
//! - **Color**: `color` converts between mired, Kelvin, RGB, CIE xy and HSV.
//! - **Loop**: `core` runs one scheduling loop per bridge against the
//!   `bridge::Bridge` trait, driven by a `time_source::Clock`.
//! - **Infrastructure**: configuration, argument parsing, signal handling and
//!   logging.

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod args;
pub mod bridge;
pub mod color;
pub mod commands;
pub mod common;
pub mod config;
pub mod core;
pub mod lights;
pub mod schedule;
pub mod signals;
pub mod time_source;
