//! Canonical data model for the perflens harness.
//!
//! Every wrapped tool — roofline estimator, accelerator simulator, learned
//! latency predictor, serving simulator — speaks two shapes:
//!
//! - [`WorkloadSpec`]: immutable, tool-agnostic description of a workload
//!   (model + hardware + task + batch), loaded from a YAML config.
//! - [`ResultSet`]: normalized measurement (metric map + status). A failed
//!   run is a `ResultSet` with `error` set, never a propagated panic.
//!
//! The accuracy side adds [`AccuracyRecord`] (one predicted-vs-actual pair
//! with its APE), [`DeviceModeSummary`] aggregates, and [`ClaimComparison`]
//! verdicts against published figures.
//!
//! # Quick start
//!
//! ```
//! use perflens_core::{ResultSet, WorkloadSpec};
//!
//! let spec: WorkloadSpec = serde_yaml::from_str(
//!     "name: resnet50-inf\nmodel_type: cnn\nmodel:\n  name: ResNet-50\n",
//! ).unwrap();
//!
//! assert_eq!(spec.batch_size, 1); // defaulted
//! let rs = ResultSet::failed("demo", &spec.name, "tool not installed", 1);
//! assert!(!rs.is_ok());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

mod accuracy;
mod error;
mod result;
mod workload;

pub use accuracy::{
    ape, AccuracyRecord, ClaimComparison, DeviceModeSummary, Mode, Verdict,
};
pub use error::{PerflensError, Result};
pub use result::{ResultSet, SENTINEL_EXIT_CODE};
pub use workload::{ModelType, Task, WorkloadSpec};
