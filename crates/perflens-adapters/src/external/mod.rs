//! Shims around external performance tools.
//!
//! Each shim owns the full translation for one tool: generate its native
//! inputs (or locate its pre-computed artifacts), invoke it under a
//! deadline where execution is needed, and parse its output format into
//! normalized metrics. The parsing never leaks; downstream engines only
//! see `ResultSet`s.

pub mod astra_sim;
pub mod nn_meter;
pub mod timeloop;
pub mod vidur;
