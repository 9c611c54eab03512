//! # Data Pipeline Module
//!
//! Batches, toy datasets and an infinite shuffled mini-batch iterator for SGD.
//!
//! ## Key Components
//!
//! - [`Batch`]: aligned per-example arrays (inputs, targets, ids, weights)
//! - [`clean_batch_data`]: fills in missing ids/weights and a 2-D target shape
//! - [`BatchIterator`]: endless stream of fixed-size shuffled mini-batches
//! - [`make_test_data`]: two-moons toy classification data
//!
//! ## Example
//!
//! ```ignore
//! use enn::data::{make_batch_iterator, Batch};
//!
//! let mut batches = make_batch_iterator(Batch::new(x, y), Some(32), 0)?;
//! for batch in batches.by_ref().take(1000) {
//!     // Train on batch
//! }
//! ```

pub mod batch;
pub mod dataset;
pub mod iterator;
pub mod moons;
pub mod sampler;
pub mod transforms;

pub use batch::{clean_batch_data, Batch};
pub use dataset::CachedDataset;
pub use iterator::{make_batch_iterator, BatchIterator, BatchIteratorConfig};
pub use moons::{make_moons, make_test_data, MoonsConfig};
pub use sampler::{BatchSampler, Sampler, ShuffleBufferSampler};
pub use transforms::Standardizer;
