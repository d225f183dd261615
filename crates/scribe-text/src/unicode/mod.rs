//! Unicode utilities for scribe-text.
//!
//! The editor addresses lines by UTF-8 byte offset while the shaping
//! engine addresses them in UTF-16 code units; [`code_units`] bridges the two.

pub mod code_units;

pub use code_units::{CodeUnitStep, code_unit_width, sequence_length, step};
