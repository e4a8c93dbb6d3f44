//! Static catalogs for perflens: device peak specs, model cost profiles,
//! and literature-claimed accuracy figures.
//!
//! Everything in this crate is a process-wide immutable constant, loaded at
//! compile time and never written. Adapters and the validation engine treat
//! these tables as injected configuration; an entry missing from a table is
//! ordinary data (`None`), never a panic.
//!
//! # Quick start
//!
//! ```
//! use perflens_catalog::{device_spec, model_profile};
//!
//! let a100 = device_spec("A100").unwrap();
//! let resnet = model_profile("ResNet-50").unwrap();
//!
//! println!("{}: {} TFLOPS, {} GB/s", a100.name, a100.peak_tflops, a100.mem_bw_gb_s);
//! println!("{}: {:.1} GFLOP / {:.1} M params", resnet.name,
//!          resnet.flops / 1e9, resnet.params / 1e6);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

mod claims;
mod device;
mod model;

pub use claims::{claims_for_tool, published_claim, PublishedClaim, ALL_CLAIMS};
pub use device::{device_spec, DeviceSpec, ALL_DEVICES};
pub use model::{model_profile, ModelProfile, ALL_MODELS};
