//! Shortest edit scripts between two sequences.
//!
//! [`myers`] holds the diff engine, [`varray`] the growable scratch storage
//! it keeps its search frontiers in, and [`patch`] replays computed scripts.

pub mod error;
pub mod myers;
pub mod patch;
pub mod varray;

pub use error::{DiffError, Result};
pub use myers::{diff, diff_lines, distance, Differ, Op, Options, Run, Script};
