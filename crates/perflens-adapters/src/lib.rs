//! Tool adapters for the perflens harness.
//!
//! Every wrapped tool implements [`ToolAdapter`]: translate a
//! `WorkloadSpec` into a tool-native invocation, run it (or read its
//! pre-computed artifacts), and normalize the output into a `ResultSet`.
//! Failures never cross the adapter boundary as errors; they come back as
//! failed `ResultSet`s so batch runs keep going.
//!
//! Adapters are resolved by name through a static [`registry`] table, the
//! same way a runtime `--tool` flag picks a concrete implementation.
//!
//! ```
//! use perflens_adapters::get_adapter;
//!
//! let adapter = get_adapter("analytical").unwrap();
//! assert_eq!(adapter.name(), "analytical");
//! assert!(get_adapter("nonexistent").is_none());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

mod adapter;
mod analytical;
pub mod exec;
mod external;
mod registry;

pub use adapter::{ToolAdapter, ToolCategory};
pub use analytical::AnalyticalAdapter;
pub use external::astra_sim::AstraSimAdapter;
pub use external::nn_meter::NnMeterAdapter;
pub use external::timeloop::TimeloopAdapter;
pub use external::vidur::VidurAdapter;
pub use registry::{adapter_names, all_adapters, get_adapter};
