//! Validation engines for the perflens harness.
//!
//! Three pieces, each fed by the crates below it:
//!
//! - [`coverage`]: run every supporting (workload, tool) pair and index the
//!   results into a pass/fail matrix. Failures are matrix cells, never
//!   aborts.
//! - [`accuracy`]: check a wrapped tool's self-reported accuracy against
//!   its own pre-computed artifacts and the published claims in the
//!   catalog. Distinguishes "tool disagrees with its paper" from "we
//!   lacked the data to check".
//! - [`report`]: render both into a markdown document.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

pub mod accuracy;
pub mod coverage;
pub mod report;

pub use accuracy::{run_validation, DataInventory, ValidationOptions, ValidationReport};
pub use coverage::{run_matrix, CellStatus, CoverageRun};
pub use report::render_markdown;
