//! Bounded-vocabulary token encoding and deterministic skip-gram batch generation.
//!
//! The crate turns a large, pre-tokenized corpus (for example the `text8` Wikipedia dump: one
//! long line of lowercase words) into a fixed-size vocabulary whose index 0 is an
//! out-of-vocabulary sentinel, re-expresses the corpus as indices, and then feeds a training loop
//! with an endless stream of `(target, context)` batches.
//!
//! ```no_run
//! use skipgram::{BatchGenerator, IngestConfig, VocabConfig, VocabularyBuilder};
//!
//! # fn main() -> skipgram::Result<()> {
//! let cfg = VocabConfig::builder()
//!     .vocab_size(50_000)
//!     .show_progress(false)
//!     .build()?;
//! let artifacts = VocabularyBuilder::new(cfg)
//!     .build_from_paths(&["/path/to/text8"], &IngestConfig::default())?;
//! let mut batches = BatchGenerator::new(artifacts.corpus.clone())?;
//! let batch = batches.generate_batch(128, 1)?;
//! for (target, context) in batch.pairs().take(8) {
//!     println!(
//!         "{} -> {}",
//!         artifacts.vocabulary.token(target).unwrap_or_default(),
//!         artifacts.vocabulary.token(context).unwrap_or_default()
//!     );
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The `skipgram` command line interface is enabled by default through the `cli` feature; use
//! `default-features = false` to depend on the library alone.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    clippy::all,
    rust_2018_idioms,
    future_incompatible,
    unused_lifetimes,
    unreachable_pub
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::doc_markdown,
    clippy::multiple_crate_versions
)]

pub mod batch;
pub mod builder;
pub mod config;
pub mod corpus;
pub mod error;
pub mod metrics;
pub mod vocab;

pub use batch::{Batch, BatchGenerator, Batches};
pub use builder::{build_vocabulary, VocabularyArtifacts, VocabularyBuilder};
pub use config::{BatchConfig, IngestConfig, VocabBuilder, VocabConfig};
pub use error::{Result, SkipgramError};
pub use metrics::BuildMetrics;
pub use vocab::{
    EncodedCorpus, FrequencyTable, TokenCount, TokenId, Vocabulary, UNK_ID, UNK_TOKEN,
};
