//! # enn: Epistemic Neural Network utilities
//!
//! An **epistemic neural network** (ENN) produces a distribution over
//! predictions by conditioning on a random *epistemic index* in addition to
//! its input. This crate provides the glue around such networks:
//!
//! - building `init`/`apply` pairs from modules that request their parameters
//!   ([`transform`], [`networks::epistemic_network_from_module`]);
//! - converting between plain, indexed, stateless and stateful networks;
//! - standardizing network inputs with training-set statistics;
//! - batching index samples ([`indexers::make_batch_indexer`]);
//! - an infinite shuffled mini-batch pipeline and toy data ([`data`]).
//!
//! ## Usage Example
//!
//! ```no_run
//! use enn::data::make_test_data;
//! use enn::indexers::gaussian_indexer;
//! use enn::networks::{epistemic_network_from_module, make_centered_enn};
//! use enn::transform::{Initializer, ParamScope};
//! use enn::{parse_net_output, Index, Output, Result, RngKey};
//! use ndarray::{ArrayD, Ix2};
//!
//! fn linear(scope: &mut ParamScope<'_>, x: &ArrayD<f32>, z: &Index) -> Result<Output> {
//!     let w = scope.get_parameter("w", &[x.shape()[1], 1], Initializer::default())?;
//!     let x = x.view().into_dimensionality::<Ix2>()?;
//!     let w = w.view().into_dimensionality::<Ix2>()?;
//!     Ok((x.dot(&w) + z.sum()).into_dyn().into())
//! }
//!
//! let mut batches = make_test_data(20)?;
//! let batch = batches.next().expect("batch iterator is infinite");
//!
//! let enn = make_centered_enn(epistemic_network_from_module(|| linear, gaussian_indexer(2)), &batch.x);
//! let z = enn.indexer(RngKey::new(1));
//! let params = enn.init(RngKey::new(0), &batch.x, &z)?;
//! let preds = parse_net_output(&enn.apply(&params, &batch.x, &z)?);
//! # Ok::<(), enn::EnnError>(())
//! ```

pub mod base;
pub mod data;
pub mod error;
pub mod indexers;
pub mod networks;
pub mod output;
pub mod rng;
pub mod transform;

pub use base::{EpistemicNetwork, EpistemicNetworkWithState, Index, Params, State};
pub use error::{EnnError, Result};
pub use output::{parse_net_output, Output, OutputWithPrior};
pub use rng::RngKey;
